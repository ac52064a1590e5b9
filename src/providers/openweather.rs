//! OpenWeatherMap current weather client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::config::config::WeatherConfig;
use crate::error::{AppError, Result};
use crate::providers::{WeatherProvider, http_client};

#[derive(Deserialize)]
struct CurrentWeatherResponse {
    main: MainBlock,
}

#[derive(Deserialize)]
struct MainBlock {
    temp: f64,
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn temperature(&self, city: &str) -> Result<f64> {
        tracing::debug!("Fetching current weather for {}", city);

        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", city), ("appid", &self.api_key), ("units", "metric")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NoMatch(city.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "OpenWeatherMap returned status {}: {}",
                status, error_text
            )));
        }

        let weather: CurrentWeatherResponse = response.json().await?;
        Ok(weather.main.temp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> OpenWeatherClient {
        let config = WeatherConfig {
            base_url: server.uri(),
            api_key: "secret".into(),
        };
        OpenWeatherClient::new(&config, Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "Moscow"))
            .and(query_param("appid", "secret"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Moscow",
                "main": { "temp": 30.4, "humidity": 40 }
            })))
            .mount(&server)
            .await;

        let temperature = client(&server).temperature("Moscow").await.unwrap();
        assert_eq!(temperature, 30.4);
    }

    #[tokio::test]
    async fn test_unknown_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = client(&server).temperature("Atlantis").await.unwrap_err();
        assert!(matches!(err, AppError::NoMatch(city) if city == "Atlantis"));
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let err = client(&server).temperature("Moscow").await.unwrap_err();
        assert!(matches!(err, AppError::Provider(_)));
    }
}
