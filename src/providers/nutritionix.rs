//! Nutritionix natural-language client
//!
//! Food energy comes from `/v2/natural/nutrients`, workout energy from
//! `/v2/natural/exercise`. Only the first match of each answer is used.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::config::NutritionConfig;
use crate::error::{AppError, Result};
use crate::providers::{NutritionProvider, http_client};
use crate::services::ledger::round2;

#[derive(Deserialize)]
struct NutrientsResponse {
    #[serde(default)]
    foods: Vec<FoodItem>,
}

#[derive(Deserialize)]
struct FoodItem {
    nf_calories: f64,
    serving_weight_grams: Option<f64>,
}

#[derive(Deserialize)]
struct ExerciseResponse {
    #[serde(default)]
    exercises: Vec<ExerciseItem>,
}

#[derive(Deserialize)]
struct ExerciseItem {
    nf_calories: f64,
}

pub struct NutritionixClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    app_key: String,
}

impl NutritionixClient {
    pub fn new(config: &NutritionConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            app_key: config.app_key.clone(),
        })
    }

    async fn query<T: DeserializeOwned>(&self, endpoint: &str, query: &str) -> Result<T> {
        tracing::debug!("Nutritionix {} query: {}", endpoint, query);

        let response = self
            .client
            .post(format!("{}/v2/natural/{}", self.base_url, endpoint))
            .header("x-app-id", &self.app_id)
            .header("x-app-key", &self.app_key)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        // Nutritionix answers 404 when nothing in the query was recognised
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NoMatch(query.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Nutritionix returned status {}: {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl NutritionProvider for NutritionixClient {
    async fn calories_per_gram(&self, food: &str) -> Result<f64> {
        let nutrients: NutrientsResponse = self.query("nutrients", food).await?;
        let item = nutrients
            .foods
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NoMatch(food.to_string()))?;

        match item.serving_weight_grams {
            Some(grams) if grams > 0.0 => Ok(round2(item.nf_calories / grams)),
            _ => Err(AppError::Provider(format!(
                "no serving weight reported for '{}'",
                food
            ))),
        }
    }

    async fn workout_calories(&self, query: &str) -> Result<f64> {
        let exercise: ExerciseResponse = self.query("exercise", query).await?;
        exercise
            .exercises
            .into_iter()
            .next()
            .map(|item| item.nf_calories)
            .ok_or_else(|| AppError::NoMatch(query.to_string()))
    }
}
