use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Environment variable prefix; nested keys use `__`
pub const ENV_PREFIX: &str = "HYDROTRACK_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the default locations
    ///
    /// Layers, later ones win:
    /// 1. built-in defaults for `environment` (`production` or development)
    /// 2. `hydrotrack.toml`, or the file named by `HYDROTRACK_CONFIG`
    /// 3. `HYDROTRACK_*` environment variables
    pub fn load() -> Result<AppConfig, figment::Error> {
        let path = std::env::var("HYDROTRACK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());
        Self::load_from(path)
    }

    /// Load from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig, figment::Error> {
        Self::figment(path).extract()
    }

    fn figment(path: impl AsRef<Path>) -> Figment {
        let overrides = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));

        let defaults = match overrides.extract_inner::<String>("environment").as_deref() {
            Ok("production") => AppConfig::production(),
            _ => AppConfig::development(),
        };

        Figment::from(Serialized::defaults(defaults)).merge(overrides)
    }

    /// Validate configuration
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.weather.api_key.is_empty() {
            return Err(ConfigValidationError::MissingWeatherKey);
        }

        if config.nutrition.app_id.is_empty() || config.nutrition.app_key.is_empty() {
            return Err(ConfigValidationError::MissingNutritionCredentials);
        }

        if config.providers.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        match config.translator.backend.as_str() {
            "mymemory" | "none" => Ok(()),
            other => Err(ConfigValidationError::UnknownTranslator(other.to_string())),
        }
    }
}

/// Configuration validation error
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigValidationError {
    #[error("server port must be greater than 0")]
    InvalidPort,

    #[error("weather API key is not configured (HYDROTRACK_WEATHER__API_KEY)")]
    MissingWeatherKey,

    #[error(
        "nutrition credentials are not configured (HYDROTRACK_NUTRITION__APP_ID, HYDROTRACK_NUTRITION__APP_KEY)"
    )]
    MissingNutritionCredentials,

    #[error("provider timeout must be greater than 0")]
    InvalidTimeout,

    #[error("unknown translator backend: {0}")]
    UnknownTranslator(String),
}

/// Default configuration file path
pub fn default_config_path() -> PathBuf {
    PathBuf::from("hydrotrack.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        let mut config = AppConfig::development();
        config.weather.api_key = "weather-key".into();
        config.nutrition.app_id = "app-id".into();
        config.nutrition.app_key = "app-key".into();
        config
    }

    #[test]
    fn test_defaults_without_file() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from("missing.toml")?;
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.translator.backend, "mymemory");
            assert_eq!(config.providers.timeout_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_layers() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "hydrotrack.toml",
                r#"
                [server]
                port = 9000

                [weather]
                api_key = "from-file"
                "#,
            )?;
            jail.set_env("HYDROTRACK_WEATHER__API_KEY", "from-env");
            jail.set_env("HYDROTRACK_PROVIDERS__TIMEOUT_SECS", "3");

            let config = ConfigLoader::load()?;
            assert_eq!(config.server.port, 9000);
            assert_eq!(config.weather.api_key, "from-env");
            assert_eq!(config.providers.timeout_secs, 3);
            assert_eq!(config.server.host, "0.0.0.0");
            Ok(())
        });
    }

    #[test]
    fn test_production_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "hydrotrack.toml",
                r#"
                [logging]
                level = "warn"
                "#,
            )?;
            jail.set_env("HYDROTRACK_ENVIRONMENT", "production");

            let config = ConfigLoader::load()?;
            assert_eq!(config.environment, "production");
            assert!(config.logging.structured);
            assert_eq!(config.logging.log_dir, Some(PathBuf::from("./logs")));
            assert_eq!(config.logging.level, "warn");
            assert_eq!(config.server.port, 8080);
            Ok(())
        });
    }

    #[test]
    fn test_development_is_the_default_environment() {
        figment::Jail::expect_with(|_jail| {
            let config = ConfigLoader::load()?;
            assert_eq!(config.environment, "development");
            assert!(!config.logging.structured);
            assert_eq!(config.logging.log_dir, None);
            Ok(())
        });
    }

    #[test]
    fn test_validate() {
        assert_eq!(ConfigLoader::validate(&configured()), Ok(()));

        let config = AppConfig::development();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::MissingWeatherKey)
        );

        let mut config = configured();
        config.nutrition.app_key.clear();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::MissingNutritionCredentials)
        );

        let mut config = configured();
        config.translator.backend = "deepl".into();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::UnknownTranslator("deepl".into()))
        );

        let mut config = configured();
        config.server.port = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigValidationError::InvalidPort)
        );
    }
}
