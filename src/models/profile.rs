//! User profile and daily record
//!
//! Static profile attributes collected by the guided dialogue plus the
//! per-day ledger that tracking commands mutate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chat-level user identity
pub type UserId = i64;

/// Sex, selects the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn is_male(&self) -> bool {
        matches!(self, Sex::Male)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }

    /// Button payload
    pub fn callback_data(&self) -> &'static str {
        match self {
            Sex::Male => "sex_male",
            Sex::Female => "sex_female",
        }
    }

    pub fn from_callback(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.callback_data() == data)
    }
}

/// Physical activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Desk job, no exercise
    Sedentary,
    /// Light exercise 1-3 days a week
    Light,
    /// Moderate exercise 3-5 days a week
    Moderate,
    /// Intense exercise 6-7 days a week
    Intense,
    /// Very intense exercise or physical work
    VeryIntense,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Intense,
        ActivityLevel::VeryIntense,
    ];

    /// TDEE multiplier
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Intense => 1.725,
            ActivityLevel::VeryIntense => 1.9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Desk job, no exercise",
            ActivityLevel::Light => "Light exercise 1-3 days a week",
            ActivityLevel::Moderate => "Moderate exercise 3-5 days a week",
            ActivityLevel::Intense => "Intense exercise 6-7 days a week",
            ActivityLevel::VeryIntense => "Very intense exercise, physical work",
        }
    }

    pub fn callback_data(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "activity_1",
            ActivityLevel::Light => "activity_2",
            ActivityLevel::Moderate => "activity_3",
            ActivityLevel::Intense => "activity_4",
            ActivityLevel::VeryIntense => "activity_5",
        }
    }

    pub fn from_callback(data: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.callback_data() == data)
    }
}

/// Attributes set once by the profile dialogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileAttributes {
    /// kg
    pub weight: f64,
    /// cm
    pub height: i64,
    pub age: i64,
    pub sex: Sex,
    pub activity: ActivityLevel,
    pub city: String,
    /// kcal per day
    pub calorie_goal: i64,
}

/// Everything tracked for one user
///
/// The logged sequences always start with a `0` sentinel so summing them is
/// never a special case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub profile: ProfileAttributes,

    /// ml, derived from the profile and the weather, raised by workouts
    pub water_goal: i64,

    /// ml entries in the order they were logged
    pub logged_water: Vec<i64>,

    /// kcal entries in the order they were logged
    pub logged_calories: Vec<f64>,

    /// kcal burned by workouts today
    pub burned_calories: f64,

    /// Start of the current tracking day
    pub day_started_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a fresh record with an empty ledger
    pub fn new(profile: ProfileAttributes, water_goal: i64) -> Self {
        Self {
            profile,
            water_goal,
            logged_water: vec![0],
            logged_calories: vec![0.0],
            burned_calories: 0.0,
            day_started_at: Utc::now(),
        }
    }

    /// Clear the ledger and apply a new water goal, keeping the profile
    pub fn start_new_day(&mut self, water_goal: i64) {
        self.water_goal = water_goal;
        self.logged_water = vec![0];
        self.logged_calories = vec![0.0];
        self.burned_calories = 0.0;
        self.day_started_at = Utc::now();
    }

    pub fn water_consumed(&self) -> i64 {
        self.logged_water.iter().sum()
    }

    pub fn calories_consumed(&self) -> f64 {
        self.logged_calories.iter().sum()
    }

    pub fn water_remaining(&self) -> i64 {
        self.water_goal - self.water_consumed()
    }
}
