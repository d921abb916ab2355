use chrono::{DateTime, Utc};
use serde::Deserialize;
use wedding_shared::models::{NewWish, WishStatus};

use crate::error::AppError;

// Request DTOs
#[derive(Deserialize, Debug, Default)]
pub struct SubmitWishRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Kept as text so an unknown value is reported as a bad status rather
    /// than an unreadable body.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SubmitWishRequest {
    /// Checks required fields and fills in defaults. `now` stands in for a
    /// missing timestamp.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewWish, AppError> {
        let name = self.name.filter(|name| !name.trim().is_empty());
        let message = self.message.filter(|message| !message.trim().is_empty());

        let (name, message) = match (name, message) {
            (Some(name), Some(message)) => (name, message),
            _ => return Err(AppError::bad_request("Name and message are required")),
        };

        let status = match self.status {
            Some(status) => parse_status(&status)?,
            None => WishStatus::default(),
        };

        Ok(NewWish {
            name,
            message,
            status,
            timestamp: self.timestamp.unwrap_or(now),
        })
    }
}

fn parse_status(status: &str) -> Result<WishStatus, AppError> {
    serde_json::from_value(serde_json::Value::String(status.to_string())).map_err(|_| {
        AppError::bad_request(format!(
            "Invalid status '{}': expected Going, Maybe or Not Going",
            status
        ))
    })
}
