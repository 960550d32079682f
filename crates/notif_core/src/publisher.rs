use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::instrument;

use crate::channel::{HostChannel, MethodCall, SELECT_NOTIFICATION};
use crate::error::{NotificationError, Result};
use crate::launch::LaunchState;
use crate::queue::PendingResponses;
use crate::response::{Interaction, NotificationResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    /// Terminal for the lifetime of the process.
    Ready,
}

/// Which path a response took on its way to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    Delivered,
    Queued,
}

struct PublisherState {
    readiness: Readiness,
    pending: PendingResponses,
    next_sequence: u64,
    interactions_seen: u64,
}

/// Single path by which notification responses reach the host.
///
/// Readiness, the pending queue, the sequence counter and the first-event
/// check all live behind one lock, and the host channel is invoked inside
/// that same critical section. A response is therefore either queued or
/// delivered, never both, and host order matches arrival order.
pub struct BridgePublisher {
    channel: Arc<dyn HostChannel>,
    launch: Arc<LaunchState>,
    ready: AtomicBool,
    state: Mutex<PublisherState>,
}

impl BridgePublisher {
    pub fn new(channel: Arc<dyn HostChannel>, launch: Arc<LaunchState>) -> Self {
        Self {
            channel,
            launch,
            ready: AtomicBool::new(false),
            state: Mutex::new(PublisherState {
                readiness: Readiness::NotReady,
                pending: PendingResponses::new(),
                next_sequence: 0,
                interactions_seen: 0,
            }),
        }
    }

    /// Stamps an interaction with the next sequence number and routes it.
    ///
    /// The first interaction of the process marks it as resuming from
    /// background when the host has not attached yet.
    pub fn accept(&self, interaction: Interaction) -> Routing {
        let mut state = self.state.lock();
        let response = NotificationResponse::from_interaction(interaction, state.next_sequence);
        state.next_sequence += 1;

        let first = state.interactions_seen == 0;
        state.interactions_seen += 1;
        if first && state.readiness == Readiness::NotReady {
            self.launch.mark_resuming(&response);
        }

        tracing::debug!(
            notification_id = response.notification_id,
            action_id = ?response.action_id,
            sequence = response.received_at,
            "notification selected"
        );
        self.route_locked(&mut state, response)
    }

    /// Forwards an already-stamped response. Falls back to the queue when
    /// the host is not ready.
    pub fn deliver(&self, response: NotificationResponse) -> Routing {
        let mut state = self.state.lock();
        self.route_locked(&mut state, response)
    }

    /// Marks the host ready and replays everything queued so far, oldest
    /// first. Later calls only retry responses left over from a failed
    /// delivery. Returns how many responses reached the host.
    #[instrument(skip(self))]
    pub fn attach(&self) -> usize {
        let mut state = self.state.lock();
        if state.readiness == Readiness::NotReady {
            state.readiness = Readiness::Ready;
            self.ready.store(true, Ordering::Release);
            tracing::info!(pending = state.pending.len(), "host bridge attached");
        }

        let mut delivered = 0;
        match self.flush_locked(&mut state, &mut delivered) {
            Ok(()) => {
                if delivered > 0 {
                    tracing::info!(delivered, "replayed pending notification responses");
                }
            }
            Err(err) => {
                tracing::warn!(
                    %err,
                    delivered,
                    pending = state.pending.len(),
                    "replay interrupted, keeping remaining responses"
                );
            }
        }
        delivered
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn readiness(&self) -> Readiness {
        if self.is_ready() {
            Readiness::Ready
        } else {
            Readiness::NotReady
        }
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    fn route_locked(&self, state: &mut PublisherState, response: NotificationResponse) -> Routing {
        if state.readiness == Readiness::NotReady {
            tracing::debug!(
                notification_id = response.notification_id,
                "host not attached, queueing response"
            );
            state.pending.enqueue(response);
            return Routing::Queued;
        }

        if !state.pending.is_empty() {
            // Older responses are still waiting after a failed delivery.
            state.pending.enqueue(response);
            let mut delivered = 0;
            return match self.flush_locked(state, &mut delivered) {
                Ok(()) => Routing::Delivered,
                Err(err) => {
                    tracing::warn!(%err, pending = state.pending.len(), "retry failed");
                    Routing::Queued
                }
            };
        }

        match self.forward(&response) {
            Ok(()) => Routing::Delivered,
            Err(err) => {
                tracing::warn!(%err, "delivery failed, response queued for retry");
                state.pending.enqueue(response);
                Routing::Queued
            }
        }
    }

    fn flush_locked(&self, state: &mut PublisherState, delivered: &mut usize) -> Result<()> {
        let mut remaining = state.pending.drain_all().into_iter();
        while let Some(response) = remaining.next() {
            if let Err(err) = self.forward(&response) {
                let mut undelivered = vec![response];
                undelivered.extend(remaining);
                state.pending.requeue_front(undelivered);
                return Err(err);
            }
            *delivered += 1;
        }
        Ok(())
    }

    fn forward(&self, response: &NotificationResponse) -> Result<()> {
        let call = MethodCall::new(SELECT_NOTIFICATION, response.host_arguments());
        self.channel
            .invoke(&call)
            .map_err(|err| NotificationError::DeliveryFailure {
                notification_id: response.notification_id,
                reason: err.0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelError;

    #[derive(Default)]
    struct FlakyChannel {
        failures_left: Mutex<usize>,
        received: Mutex<Vec<i64>>,
    }

    impl HostChannel for FlakyChannel {
        fn invoke(&self, call: &MethodCall) -> std::result::Result<(), ChannelError> {
            let mut failures = self.failures_left.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(ChannelError("channel busy".into()));
            }
            let id = call.arguments["notificationId"].as_i64().unwrap_or(-1);
            self.received.lock().push(id);
            Ok(())
        }
    }

    fn publisher(failures: usize) -> (BridgePublisher, Arc<FlakyChannel>, Arc<LaunchState>) {
        let channel = Arc::new(FlakyChannel {
            failures_left: Mutex::new(failures),
            received: Mutex::new(Vec::new()),
        });
        let launch = Arc::new(LaunchState::new());
        let publisher = BridgePublisher::new(channel.clone(), launch.clone());
        (publisher, channel, launch)
    }

    #[test]
    fn queues_until_attach_then_replays_in_order() {
        let (publisher, channel, launch) = publisher(0);
        assert_eq!(publisher.accept(Interaction::new(1, None, "a")), Routing::Queued);
        assert_eq!(publisher.accept(Interaction::new(2, None, "b")), Routing::Queued);
        assert!(launch.is_resuming());
        assert_eq!(publisher.pending_len(), 2);

        assert_eq!(publisher.attach(), 2);
        assert_eq!(*channel.received.lock(), vec![1, 2]);
        assert_eq!(publisher.pending_len(), 0);
        assert_eq!(publisher.attach(), 0);
        assert_eq!(*channel.received.lock(), vec![1, 2]);
    }

    #[test]
    fn ready_publisher_delivers_directly() {
        let (publisher, channel, launch) = publisher(0);
        assert_eq!(publisher.attach(), 0);
        assert_eq!(publisher.readiness(), Readiness::Ready);
        assert_eq!(publisher.accept(Interaction::new(5, None, "")), Routing::Delivered);
        assert_eq!(*channel.received.lock(), vec![5]);
        assert!(!launch.is_resuming());
    }

    #[test]
    fn failed_replay_keeps_order_for_next_attach() {
        let (publisher, channel, _) = publisher(1);
        publisher.accept(Interaction::new(1, None, ""));
        publisher.accept(Interaction::new(2, None, ""));

        assert_eq!(publisher.attach(), 0);
        assert_eq!(publisher.pending_len(), 2);

        assert_eq!(publisher.attach(), 2);
        assert_eq!(*channel.received.lock(), vec![1, 2]);
    }

    #[test]
    fn live_event_retries_older_failures_first() {
        let (publisher, channel, _) = publisher(0);
        publisher.attach();
        *channel.failures_left.lock() = 1;

        assert_eq!(publisher.accept(Interaction::new(10, None, "")), Routing::Queued);
        assert_eq!(publisher.accept(Interaction::new(11, None, "")), Routing::Delivered);
        assert_eq!(*channel.received.lock(), vec![10, 11]);
        assert_eq!(publisher.pending_len(), 0);
    }

    #[test]
    fn deliver_before_attach_falls_back_to_queue() {
        let (publisher, channel, launch) = publisher(0);
        let response = NotificationResponse::from_interaction(Interaction::new(4, None, ""), 0);
        assert_eq!(publisher.deliver(response), Routing::Queued);
        assert!(channel.received.lock().is_empty());
        assert!(!launch.is_resuming());
    }
}
