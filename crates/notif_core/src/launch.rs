use once_cell::sync::OnceCell;

use crate::response::NotificationResponse;

/// Records whether this process was launched to handle a notification
/// interaction.
///
/// The flag moves from false to true at most once and never goes back. The
/// interaction that flipped it is kept so the host can ask for the launch
/// payload later.
#[derive(Debug, Default)]
pub struct LaunchState {
    trigger: OnceCell<NotificationResponse>,
}

impl LaunchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the process as resumed by `trigger`. Returns false when an
    /// earlier interaction already did so.
    pub fn mark_resuming(&self, trigger: &NotificationResponse) -> bool {
        let marked = self.trigger.set(trigger.clone()).is_ok();
        if marked {
            tracing::info!(
                notification_id = trigger.notification_id,
                "process launched from notification interaction"
            );
        }
        marked
    }

    pub fn is_resuming(&self) -> bool {
        self.trigger.get().is_some()
    }

    pub fn launch_response(&self) -> Option<&NotificationResponse> {
        self.trigger.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Interaction;

    fn response(id: i64, seq: u64) -> NotificationResponse {
        NotificationResponse::from_interaction(Interaction::new(id, None, format!("p{id}")), seq)
    }

    #[test]
    fn starts_not_resuming() {
        let state = LaunchState::new();
        assert!(!state.is_resuming());
        assert!(state.launch_response().is_none());
    }

    #[test]
    fn second_mark_keeps_first_trigger() {
        let state = LaunchState::new();
        assert!(state.mark_resuming(&response(1, 0)));
        assert!(!state.mark_resuming(&response(2, 1)));
        assert!(state.is_resuming());
        assert_eq!(state.launch_response().map(|r| r.notification_id), Some(1));
    }
}
