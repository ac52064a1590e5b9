use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Port
    pub port: u16,
}

/// Weather provider (OpenWeatherMap)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Nutrition provider (Nutritionix)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NutritionConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_key: String,
}

/// Translator
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TranslatorConfig {
    /// "mymemory" or "none"
    pub backend: String,
    pub base_url: String,
    /// Language users write in
    pub source_lang: String,
    /// Language the providers understand
    pub target_lang: String,
}

/// Settings shared by every external call
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Upper bound for a single provider call (seconds)
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level, overridden by RUST_LOG
    pub level: String,
    /// JSON output
    pub structured: bool,
    /// Directory for daily rolling log files
    pub log_dir: Option<PathBuf>,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub nutrition: NutritionConfig,
    pub translator: TranslatorConfig,
    pub providers: ProvidersConfig,
    pub logging: LoggingConfig,
    /// Application name
    pub app_name: String,
    /// Environment
    pub environment: String,
}

impl AppConfig {
    /// Development defaults
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 8080,
            },
            weather: WeatherConfig {
                base_url: "http://api.openweathermap.org".into(),
                api_key: String::new(),
            },
            nutrition: NutritionConfig {
                base_url: "https://trackapi.nutritionix.com".into(),
                app_id: String::new(),
                app_key: String::new(),
            },
            translator: TranslatorConfig {
                backend: "mymemory".into(),
                base_url: "https://api.mymemory.translated.net".into(),
                source_lang: "ru".into(),
                target_lang: "en".into(),
            },
            providers: ProvidersConfig { timeout_secs: 10 },
            logging: LoggingConfig {
                level: "debug".into(),
                structured: false,
                log_dir: None,
            },
            app_name: "hydrotrack".into(),
            environment: "development".into(),
        }
    }

    /// Production defaults
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config.logging.log_dir = Some(PathBuf::from("./logs"));
        config
    }
}
