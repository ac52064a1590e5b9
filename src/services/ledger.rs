//! Daily ledger
//!
//! Water, food and workout logging on top of the profile store, plus the
//! progress summary and chart series derived from it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{UserId, UserRecord};
use crate::services::goals;
use crate::services::profile_store::ProfileStore;
use crate::validation::{self, Field};

/// Result of logging water
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaterLogged {
    pub amount_ml: i64,
    pub remaining_ml: i64,
}

/// Result of logging a workout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogged {
    /// Extra water added to today's goal
    pub water_ml: i64,
    /// Total kcal burned today
    pub burned_total: f64,
}

/// Daily progress summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub water_consumed: i64,
    pub water_goal: i64,
    pub water_remaining: i64,
    pub calories_consumed: f64,
    pub calorie_goal: i64,
    pub calories_burned: f64,
    /// Consumed minus burned
    pub balance: f64,
}

impl From<&UserRecord> for Progress {
    fn from(record: &UserRecord) -> Self {
        let calories_consumed = record.calories_consumed();
        Self {
            water_consumed: record.water_consumed(),
            water_goal: record.water_goal,
            water_remaining: record.water_remaining(),
            calories_consumed,
            calorie_goal: record.profile.calorie_goal,
            calories_burned: record.burned_calories,
            balance: calories_consumed - record.burned_calories,
        }
    }
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Running totals, first point is the sentinel
fn cumulative(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    values
        .into_iter()
        .scan(0.0, |total, value| {
            *total += value;
            Some(*total)
        })
        .collect()
}

/// Daily ledger
#[derive(Clone)]
pub struct DailyLedger {
    store: Arc<dyn ProfileStore>,
}

impl DailyLedger {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Append a water entry, returns what is left to drink today
    pub fn log_water(&self, user_id: UserId, amount_ml: i64) -> Result<WaterLogged> {
        let amount_ml = validation::check_int(Field::Water, amount_ml)?;
        let mut remaining_ml = 0;
        self.store.modify(user_id, &mut |record| {
            record.logged_water.push(amount_ml);
            remaining_ml = record.water_remaining();
        })?;
        tracing::debug!(user_id, amount_ml, remaining_ml, "water logged");
        Ok(WaterLogged {
            amount_ml,
            remaining_ml,
        })
    }

    /// Append a food entry, returns the kcal recorded
    pub fn log_food_calories(
        &self,
        user_id: UserId,
        calories_per_gram: f64,
        grams: i64,
    ) -> Result<f64> {
        let grams = validation::check_int(Field::Grams, grams)?;
        let calories = round2(calories_per_gram * grams as f64);
        self.store.modify(user_id, &mut |record| {
            record.logged_calories.push(calories);
        })?;
        tracing::debug!(user_id, grams, calories, "food logged");
        Ok(calories)
    }

    /// Record a workout: raises today's water goal and burned calories
    pub fn log_workout(
        &self,
        user_id: UserId,
        minutes: i64,
        calories_burned: f64,
    ) -> Result<WorkoutLogged> {
        let minutes = validation::check_int(Field::WorkoutMinutes, minutes)?;
        let water_ml = goals::workout_water(minutes);
        let mut burned_total = 0.0;
        self.store.modify(user_id, &mut |record| {
            record.water_goal += water_ml;
            record.burned_calories += calories_burned;
            burned_total = record.burned_calories;
        })?;
        tracing::debug!(user_id, minutes, water_ml, burned_total, "workout logged");
        Ok(WorkoutLogged {
            water_ml,
            burned_total,
        })
    }

    /// Start a new day with a goal recomputed for the given temperature
    pub fn new_day(&self, user_id: UserId, temperature: f64) -> Result<UserRecord> {
        self.store.reset_day(user_id, temperature)
    }

    pub fn progress(&self, user_id: UserId) -> Result<Progress> {
        self.store.get(user_id).map(|record| Progress::from(&record))
    }

    /// Cumulative water intake, one point per entry
    pub fn water_series(&self, user_id: UserId) -> Result<Vec<f64>> {
        let record = self.store.get(user_id)?;
        Ok(cumulative(record.logged_water.iter().map(|&ml| ml as f64)))
    }

    /// Cumulative calorie intake, one point per entry
    pub fn calorie_series(&self, user_id: UserId) -> Result<Vec<f64>> {
        let record = self.store.get(user_id)?;
        Ok(cumulative(record.logged_calories.iter().copied()))
    }
}
