//! Goal calculation
//!
//! Daily water and energy targets derived from the profile and the weather.
//! Inputs are assumed to be validated already; nothing here clamps.

use crate::models::{ProfileAttributes, Sex};

/// ml of water added per full temperature band
pub const WATER_PER_TEMPERATURE_BAND: i64 = 250;
/// Width of a temperature band, °C
pub const TEMPERATURE_BAND: f64 = 25.0;
/// ml of water added per full workout block
pub const WATER_PER_WORKOUT_BLOCK: i64 = 200;
/// Length of a workout block, minutes
pub const WORKOUT_BLOCK_MINUTES: i64 = 30;

/// Basal metabolic rate in kcal/day (Harris-Benedict), truncated
pub fn bmr(weight: f64, height: i64, age: i64, sex: Sex) -> i64 {
    let (height, age) = (height as f64, age as f64);
    let value = if sex.is_male() {
        88.362 + 13.397 * weight + 4.799 * height - 5.677 * age
    } else {
        447.593 + 9.247 * weight + 3.098 * height - 4.330 * age
    };
    value as i64
}

/// Total daily energy expenditure
pub fn tdee(bmr: i64, activity_factor: f64) -> f64 {
    bmr as f64 * activity_factor
}

/// Extra water for hot weather: 250 ml per full 25 °C
pub fn water_from_temperature(temperature: f64) -> i64 {
    (temperature / TEMPERATURE_BAND).floor() as i64 * WATER_PER_TEMPERATURE_BAND
}

/// Daily water goal in ml
///
/// The activity term rounds half to even.
pub fn water_goal(age: i64, activity_factor: f64, temperature: f64) -> i64 {
    age * 30 + (activity_factor * 500.0).round_ties_even() as i64 + water_from_temperature(temperature)
}

/// Daily water goal for a stored profile
pub fn water_goal_for(profile: &ProfileAttributes, temperature: f64) -> i64 {
    water_goal(profile.age, profile.activity.factor(), temperature)
}

/// Extra water for a workout: 200 ml per full 30 minutes
pub fn workout_water(minutes: i64) -> i64 {
    minutes / WORKOUT_BLOCK_MINUTES * WATER_PER_WORKOUT_BLOCK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Sex};
    use rstest::rstest;

    #[test]
    fn test_bmr_branches_on_sex() {
        // 88.362 + 937.79 + 839.825 - 170.31
        assert_eq!(bmr(70.0, 175, 30, Sex::Male), 1695);
        // 447.593 + 647.29 + 542.15 - 129.9
        assert_eq!(bmr(70.0, 175, 30, Sex::Female), 1507);
    }

    #[test]
    fn test_tdee_scales_bmr() {
        assert!((tdee(1695, 1.55) - 2627.25).abs() < 1e-9);
        assert_eq!(tdee(1000, 1.2), 1200.0);
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(24.9, 0)]
    #[case(25.0, 250)]
    #[case(30.0, 250)]
    #[case(50.0, 500)]
    #[case(-5.0, -250)]
    fn test_water_from_temperature(#[case] temperature: f64, #[case] expected: i64) {
        assert_eq!(water_from_temperature(temperature), expected);
    }

    #[test]
    fn test_water_goal_scenario() {
        assert_eq!(water_goal(30, 1.55, 30.0), 1925);
        assert_eq!(water_goal(30, ActivityLevel::Sedentary.factor(), 10.0), 1500);
    }

    #[test]
    fn test_water_goal_rounds_half_to_even() {
        // 1.375 * 500 = 687.5
        assert_eq!(water_goal(20, ActivityLevel::Light.factor(), 0.0), 600 + 688);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(29, 0)]
    #[case(30, 200)]
    #[case(90, 600)]
    #[case(1440, 9600)]
    fn test_workout_water(#[case] minutes: i64, #[case] expected: i64) {
        assert_eq!(workout_water(minutes), expected);
    }
}
