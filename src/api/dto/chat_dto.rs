//! Chat DTOs

use serde::{Deserialize, Serialize};

use crate::models::{BotReply, ChartSeries, ReplyButton, UserId};
use crate::services::Progress;

/// Chat message from the front-end
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

/// Button press from the front-end
#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ButtonResponse {
    pub label: String,
    pub data: String,
}

impl From<ReplyButton> for ButtonResponse {
    fn from(button: ReplyButton) -> Self {
        Self {
            label: button.label,
            data: button.data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<f64>,
}

impl From<ChartSeries> for ChartResponse {
    fn from(chart: ChartSeries) -> Self {
        Self {
            title: chart.title,
            x_label: chart.x_label,
            y_label: chart.y_label,
            points: chart.points,
        }
    }
}

/// Reply to a message or callback
#[derive(Debug, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub text: String,
    pub buttons: Vec<ButtonResponse>,
    pub chart: Option<ChartResponse>,
}

impl From<BotReply> for ReplyResponse {
    fn from(reply: BotReply) -> Self {
        Self {
            text: reply.text,
            buttons: reply.buttons.into_iter().map(Into::into).collect(),
            chart: reply.chart.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WaterProgressResponse {
    /// ml
    pub consumed: i64,
    pub goal: i64,
    pub remaining: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalorieProgressResponse {
    /// kcal
    pub consumed: f64,
    pub goal: i64,
    pub burned: f64,
    pub balance: f64,
}

/// Today's totals for one user
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub user_id: UserId,
    pub water: WaterProgressResponse,
    pub calories: CalorieProgressResponse,
}

impl ProgressResponse {
    pub fn new(user_id: UserId, progress: Progress) -> Self {
        Self {
            user_id,
            water: WaterProgressResponse {
                consumed: progress.water_consumed,
                goal: progress.water_goal,
                remaining: progress.water_remaining,
            },
            calories: CalorieProgressResponse {
                consumed: progress.calories_consumed,
                goal: progress.calorie_goal,
                burned: progress.calories_burned,
                balance: progress.balance,
            },
        }
    }
}
