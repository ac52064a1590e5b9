//! Hydrotrack - conversational water and calorie tracking
//!
//! Guides users through building a profile, derives daily water and calorie
//! goals, and records what they drink, eat and burn over the day.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod providers;
pub mod services;
pub mod validation;
