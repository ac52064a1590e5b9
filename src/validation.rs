//! Input validation
//!
//! Checks and coerces raw chat text into typed profile and ledger fields.
//! A value that cannot be parsed and a value outside its range produce the
//! same [`ValidationError`]; callers only learn which field was rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fields accepted from user input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Weight,
    Height,
    Age,
    City,
    CalorieGoal,
    Grams,
    Water,
    WorkoutName,
    WorkoutMinutes,
}

/// Range rule attached to a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Float { min: f64, max: f64 },
    Int { min: i64, max: Option<i64> },
    Text { min_len: usize, max_len: usize },
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Weight => "weight",
            Field::Height => "height",
            Field::Age => "age",
            Field::City => "city",
            Field::CalorieGoal => "calorie_goal",
            Field::Grams => "grams",
            Field::Water => "water",
            Field::WorkoutName => "workout_name",
            Field::WorkoutMinutes => "workout_minutes",
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Field::Weight => Rule::Float {
                min: 50.0,
                max: 200.0,
            },
            Field::Height => Rule::Int {
                min: 50,
                max: Some(220),
            },
            Field::Age => Rule::Int {
                min: 14,
                max: Some(120),
            },
            Field::City => Rule::Text {
                min_len: 2,
                max_len: 20,
            },
            Field::CalorieGoal => Rule::Int {
                min: 500,
                max: Some(5000),
            },
            Field::Grams => Rule::Int { min: 0, max: None },
            Field::Water => Rule::Int {
                min: 0,
                max: Some(5000),
            },
            Field::WorkoutName => Rule::Text {
                min_len: 2,
                max_len: 20,
            },
            Field::WorkoutMinutes => Rule::Int {
                min: 0,
                max: Some(1440),
            },
        }
    }

    /// Guidance shown to the user when the field is rejected
    pub fn guidance(&self) -> &'static str {
        match self {
            Field::Weight => "Invalid value, weight must be between 50 and 200 kg",
            Field::Height => "Invalid value, height must be between 50 and 220 cm",
            Field::Age => "Invalid value, age must be between 14 and 120 years",
            Field::City => "Invalid value, the city name must be 2 to 20 characters long",
            Field::CalorieGoal => "Invalid value, the calorie goal must be between 500 and 5000 kcal",
            Field::Grams => "Invalid value, enter a whole number of grams, 0 or more",
            Field::Water => "Invalid value, enter a whole number of ml between 0 and 5000",
            Field::WorkoutName => {
                "Invalid value, the workout name must be 2 to 20 characters long"
            }
            Field::WorkoutMinutes => {
                "Invalid value, the workout duration must be between 0 and 1440 minutes"
            }
        }
    }
}

/// Rejected input
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{}", .field.guidance())]
pub struct ValidationError {
    field: Field,
}

impl ValidationError {
    pub fn new(field: Field) -> Self {
        Self { field }
    }

    pub fn field(&self) -> Field {
        self.field
    }
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Typed value produced by [`validate`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Text(String),
}

/// Validate raw text for any field
pub fn validate(field: Field, raw: &str) -> ValidationResult<FieldValue> {
    match field.rule() {
        Rule::Float { .. } => parse_float(field, raw).map(FieldValue::Float),
        Rule::Int { .. } => parse_int(field, raw).map(FieldValue::Int),
        Rule::Text { .. } => parse_text(field, raw).map(FieldValue::Text),
    }
}

/// Parse and range-check a float field
pub fn parse_float(field: Field, raw: &str) -> ValidationResult<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::new(field))?;
    check_float(field, value)
}

/// Parse and range-check an integer field
pub fn parse_int(field: Field, raw: &str) -> ValidationResult<i64> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::new(field))?;
    check_int(field, value)
}

/// Length-check a text field
pub fn parse_text(field: Field, raw: &str) -> ValidationResult<String> {
    let value = raw.trim();
    match field.rule() {
        Rule::Text { min_len, max_len } => {
            let len = value.chars().count();
            if (min_len..=max_len).contains(&len) {
                Ok(value.to_string())
            } else {
                Err(ValidationError::new(field))
            }
        }
        _ => Err(ValidationError::new(field)),
    }
}

/// Range-check an already typed float
pub fn check_float(field: Field, value: f64) -> ValidationResult<f64> {
    match field.rule() {
        Rule::Float { min, max } if (min..=max).contains(&value) => Ok(value),
        _ => Err(ValidationError::new(field)),
    }
}

/// Range-check an already typed integer
pub fn check_int(field: Field, value: i64) -> ValidationResult<i64> {
    match field.rule() {
        Rule::Int { min, max } if value >= min && max.is_none_or(|max| value <= max) => {
            Ok(value)
        }
        _ => Err(ValidationError::new(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("50", true)]
    #[case("200", true)]
    #[case("70.5", true)]
    #[case(" 82 ", true)]
    #[case("49.99", false)]
    #[case("200.01", false)]
    #[case("NaN", false)]
    #[case("inf", false)]
    #[case("seventy", false)]
    #[case("", false)]
    fn test_weight_bounds(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(parse_float(Field::Weight, raw).is_ok(), accepted);
    }

    #[rstest]
    #[case(Field::Height, "50", true)]
    #[case(Field::Height, "221", false)]
    #[case(Field::Height, "175.5", false)]
    #[case(Field::Age, "14", true)]
    #[case(Field::Age, "13", false)]
    #[case(Field::Age, "120", true)]
    #[case(Field::CalorieGoal, "499", false)]
    #[case(Field::CalorieGoal, "5000", true)]
    #[case(Field::Water, "0", true)]
    #[case(Field::Water, "5001", false)]
    #[case(Field::Water, "-1", false)]
    #[case(Field::Grams, "0", true)]
    #[case(Field::Grams, "100000", true)]
    #[case(Field::Grams, "-5", false)]
    #[case(Field::WorkoutMinutes, "1440", true)]
    #[case(Field::WorkoutMinutes, "1441", false)]
    fn test_int_bounds(#[case] field: Field, #[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(parse_int(field, raw).is_ok(), accepted);
    }

    #[test]
    fn test_text_length() {
        assert_eq!(parse_text(Field::City, " Moscow ").unwrap(), "Moscow");
        assert!(parse_text(Field::City, "M").is_err());
        assert!(parse_text(Field::City, "Llanfairpwllgwyngyllgogery").is_err());
        // Length counts characters, not bytes
        assert!(parse_text(Field::City, "Санкт-Петербург").is_ok());
        assert!(parse_text(Field::WorkoutName, "бег").is_ok());
    }

    #[test]
    fn test_parse_and_range_errors_are_indistinguishable() {
        let malformed = parse_int(Field::Age, "abc").unwrap_err();
        let out_of_range = parse_int(Field::Age, "500").unwrap_err();
        assert_eq!(malformed, out_of_range);
        assert_eq!(malformed.to_string(), Field::Age.guidance());
    }

    #[test]
    fn test_validate_dispatch() {
        assert_eq!(validate(Field::Weight, "70").unwrap(), FieldValue::Float(70.0));
        assert_eq!(validate(Field::Height, "175").unwrap(), FieldValue::Int(175));
        assert_eq!(
            validate(Field::City, "Kazan").unwrap(),
            FieldValue::Text("Kazan".to_string())
        );
        assert_eq!(
            validate(Field::Weight, "heavy").unwrap_err().field(),
            Field::Weight
        );
    }
}
