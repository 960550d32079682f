use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{NotificationError, Result};
use crate::presentation::{
    PresentationCompletion, PresentationDecider, PresentedNotification, ResponseCompletion,
};
use crate::publisher::{BridgePublisher, Routing};
use crate::response::Interaction;

/// Action identifier the OS reports for a plain tap on the notification body.
pub const DEFAULT_ACTION_IDENTIFIER: &str = "com.apple.UNNotificationDefaultActionIdentifier";
/// `user_info` key holding the id assigned when the notification was scheduled.
pub const NOTIFICATION_ID_KEY: &str = "NotificationId";
/// `user_info` key holding the application payload.
pub const PAYLOAD_KEY: &str = "payload";

/// Response descriptor handed over by the OS when the user taps a
/// notification or one of its actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawResponse {
    pub action_identifier: String,
    pub user_info: Map<String, Value>,
}

impl RawResponse {
    pub fn new(action_identifier: impl Into<String>, user_info: Map<String, Value>) -> Self {
        Self {
            action_identifier: action_identifier.into(),
            user_info,
        }
    }
}

impl TryFrom<&RawResponse> for Interaction {
    type Error = NotificationError;

    fn try_from(raw: &RawResponse) -> Result<Self> {
        let notification_id = match raw.user_info.get(NOTIFICATION_ID_KEY) {
            Some(value) => value.as_i64().ok_or_else(|| {
                NotificationError::malformed(format!(
                    "`{NOTIFICATION_ID_KEY}` is not an integer: {value}"
                ))
            })?,
            None => {
                return Err(NotificationError::malformed(format!(
                    "missing `{NOTIFICATION_ID_KEY}`"
                )))
            }
        };

        Ok(Interaction {
            notification_id,
            action_id: action_id(&raw.action_identifier),
            payload: payload_text(raw.user_info.get(PAYLOAD_KEY)),
        })
    }
}

/// Maps an OS action identifier to the host's `actionId`. A plain tap has
/// none.
pub fn action_id(identifier: &str) -> Option<String> {
    match identifier {
        "" | DEFAULT_ACTION_IDENTIFIER => None,
        other => Some(other.to_string()),
    }
}

/// Renders an opaque payload as text. Missing or null payloads are empty.
pub fn payload_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Hooks the OS notification center invokes on its own dispatch context.
pub trait NotificationCenterDelegate: Send + Sync {
    fn on_presented(&self, notification: PresentedNotification, completion: PresentationCompletion);
    fn on_selected(&self, response: RawResponse, completion: ResponseCompletion);
}

/// Turns OS callbacks into ordered responses for the publisher.
pub struct DelegateAdapter {
    publisher: Arc<BridgePublisher>,
    decider: Arc<dyn PresentationDecider>,
}

impl DelegateAdapter {
    pub fn new(publisher: Arc<BridgePublisher>, decider: Arc<dyn PresentationDecider>) -> Self {
        Self { publisher, decider }
    }

    /// Normalizes a raw response and routes it. Malformed responses are
    /// dropped and reported as errors.
    pub fn select(&self, raw: &RawResponse) -> Result<Routing> {
        let interaction = Interaction::try_from(raw)?;
        Ok(self.route(interaction))
    }

    pub fn route(&self, interaction: Interaction) -> Routing {
        self.publisher.accept(interaction)
    }
}

impl NotificationCenterDelegate for DelegateAdapter {
    fn on_presented(
        &self,
        notification: PresentedNotification,
        completion: PresentationCompletion,
    ) {
        self.decider.decide(&notification, completion);
    }

    fn on_selected(&self, response: RawResponse, completion: ResponseCompletion) {
        if let Err(err) = self.select(&response) {
            tracing::warn!(%err, "dropping notification response");
        }
        completion.complete();
    }
}
