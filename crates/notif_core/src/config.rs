use serde::{Deserialize, Serialize};

use crate::presentation::PresentationOptions;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginConfig {
    pub(crate) presentation: PresentationOptions,
}

impl PluginConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let flag = |key: &str| lookup(key).and_then(|value| parse_flag(&value));
        if let Some(value) = flag("LOCAL_NOTIFICATIONS_PRESENT_ALERT") {
            config.presentation.alert = value;
        }
        if let Some(value) = flag("LOCAL_NOTIFICATIONS_PRESENT_SOUND") {
            config.presentation.sound = value;
        }
        if let Some(value) = flag("LOCAL_NOTIFICATIONS_PRESENT_BADGE") {
            config.presentation.badge = value;
        }
        config
    }

    pub fn presentation(&self) -> PresentationOptions {
        self.presentation
    }

    pub fn with_presentation(mut self, presentation: PresentationOptions) -> Self {
        self.presentation = presentation;
        self
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            presentation: PresentationOptions::all(),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        other => {
            tracing::warn!(value = other, "ignoring unrecognised boolean setting");
            None
        }
    }
}

/// Settings sent by the host with `initialize`. Absent fields keep their
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializationSettings {
    pub default_present_alert: Option<bool>,
    pub default_present_sound: Option<bool>,
    pub default_present_badge: Option<bool>,
}

impl InitializationSettings {
    pub fn apply(&self, current: PresentationOptions) -> PresentationOptions {
        PresentationOptions {
            alert: self.default_present_alert.unwrap_or(current.alert),
            sound: self.default_present_sound.unwrap_or(current.sound),
            badge: self.default_present_badge.unwrap_or(current.badge),
        }
    }
}
