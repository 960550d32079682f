use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NotificationError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub id: i64,
    pub title: Option<String>,
    pub body: Option<String>,
    pub payload: Option<String>,
    /// Shown immediately when absent.
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Android-style channel description created ahead of showing notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannelSettings {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub importance: i32,
    pub vibrate_pattern: Option<Vec<i64>>,
}

impl NotificationChannelSettings {
    /// Reads settings from the first element of a method-call argument list.
    pub fn from_arguments(arguments: &Value) -> Result<Self> {
        let map = arguments
            .as_array()
            .and_then(|list| list.first())
            .filter(|first| first.is_object())
            .ok_or_else(|| {
                NotificationError::invalid_arguments(
                    "createNotificationChannel",
                    "expected a list whose first element is a settings map",
                )
            })?;
        serde_json::from_value(map.clone()).map_err(|err| {
            NotificationError::invalid_arguments("createNotificationChannel", err.to_string())
        })
    }

    pub fn uses_default_vibrate_pattern(&self) -> bool {
        self.vibrate_pattern.is_none()
    }
}

/// OS-facing scheduler. Platform shells implement this; the core only
/// forwards host requests to it.
pub trait NotificationScheduler: Send + Sync {
    fn show(&self, request: NotificationRequest) -> Result<()>;
    fn cancel(&self, id: i64) -> Result<()>;
    fn cancel_all(&self) -> Result<()>;
    fn create_channel(&self, settings: NotificationChannelSettings) -> Result<()>;
}
