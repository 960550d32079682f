use std::collections::VecDeque;

use crate::response::NotificationResponse;

/// Responses waiting for the host bridge, oldest first.
///
/// Not synchronised on its own; the publisher keeps it behind its lock.
#[derive(Debug, Default)]
pub struct PendingResponses {
    entries: VecDeque<NotificationResponse>,
}

impl PendingResponses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, response: NotificationResponse) {
        self.entries.push_back(response);
    }

    /// Takes every buffered response in arrival order and leaves the queue
    /// empty.
    pub fn drain_all(&mut self) -> Vec<NotificationResponse> {
        std::mem::take(&mut self.entries).into()
    }

    /// Puts undelivered responses back ahead of anything queued since.
    pub fn requeue_front(&mut self, responses: Vec<NotificationResponse>) {
        for response in responses.into_iter().rev() {
            self.entries.push_front(response);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationResponse> {
        self.entries.iter()
    }
}
