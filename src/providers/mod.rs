//! External collaborators
//!
//! Weather, nutrition and translation services behind narrow traits. The
//! assistant only talks to these traits; the HTTP clients here are the
//! production implementations.

pub mod nutritionix;
pub mod openweather;
pub mod translator;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::Result;

pub use nutritionix::NutritionixClient;
pub use openweather::OpenWeatherClient;
pub use translator::{MyMemoryTranslator, PassthroughTranslator};

/// Current temperature lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current temperature in °C for an English city name
    async fn temperature(&self, city: &str) -> Result<f64>;
}

/// Food and exercise energy lookup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NutritionProvider: Send + Sync {
    /// kcal per gram of a food described in English
    async fn calories_per_gram(&self, food: &str) -> Result<f64>;

    /// kcal burned by a workout described in English, duration included
    async fn workout_calories(&self, query: &str) -> Result<f64>;
}

/// Translation into the providers' language
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn to_english(&self, text: &str) -> Result<String>;
}

/// The three collaborators the assistant needs
#[derive(Clone)]
pub struct Providers {
    pub weather: Arc<dyn WeatherProvider>,
    pub nutrition: Arc<dyn NutritionProvider>,
    pub translator: Arc<dyn Translator>,
}

/// HTTP client with the configured per-request timeout
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Build the HTTP-backed providers from configuration
pub fn create_providers(config: &AppConfig) -> Result<Providers> {
    let timeout = Duration::from_secs(config.providers.timeout_secs);

    let weather = OpenWeatherClient::new(&config.weather, timeout)?;
    let nutrition = NutritionixClient::new(&config.nutrition, timeout)?;
    let translator: Arc<dyn Translator> = match config.translator.backend.as_str() {
        "none" => Arc::new(PassthroughTranslator),
        _ if config.translator.source_lang == config.translator.target_lang => {
            Arc::new(PassthroughTranslator)
        }
        _ => Arc::new(MyMemoryTranslator::new(&config.translator, timeout)?),
    };

    Ok(Providers {
        weather: Arc::new(weather),
        nutrition: Arc::new(nutrition),
        translator,
    })
}
