use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A user interaction as reported by the OS, before it has been ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub notification_id: i64,
    pub action_id: Option<String>,
    #[serde(default)]
    pub payload: String,
}

impl Interaction {
    pub fn new(
        notification_id: i64,
        action_id: Option<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            notification_id,
            action_id,
            payload: payload.into(),
        }
    }
}

/// One interaction stamped with its arrival position.
///
/// `received_at` is a logical sequence number, not wall-clock time. It only
/// records the order in which interactions reached the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub notification_id: i64,
    pub action_id: Option<String>,
    pub payload: String,
    pub received_at: u64,
}

impl NotificationResponse {
    pub fn from_interaction(interaction: Interaction, received_at: u64) -> Self {
        Self {
            notification_id: interaction.notification_id,
            action_id: interaction.action_id,
            payload: interaction.payload,
            received_at,
        }
    }

    /// Arguments sent to the host with `selectNotification`.
    pub fn host_arguments(&self) -> Value {
        json!({
            "notificationId": self.notification_id,
            "actionId": self.action_id,
            "payload": self.payload,
        })
    }
}
