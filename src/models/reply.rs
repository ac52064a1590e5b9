//! Outgoing replies
//!
//! What the assistant hands back to a chat front-end: text, optional choice
//! buttons and optionally a data series to draw.

use serde::{Deserialize, Serialize};

/// Inline choice button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyButton {
    pub label: String,
    /// Sent back verbatim as callback data when pressed
    pub data: String,
}

impl ReplyButton {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Cumulative line chart, rendered by the front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<f64>,
}

/// One answer to one incoming event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotReply {
    pub text: String,
    pub buttons: Vec<ReplyButton>,
    pub chart: Option<ChartSeries>,
}

impl BotReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<ReplyButton>) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_chart(mut self, chart: ChartSeries) -> Self {
        self.chart = Some(chart);
        self
    }
}
