//! Event bus
//!
//! In-process fan-out of `LedgerEvent`s to any number of subscribers.
//! Each subscriber gets its own unbounded channel; a subscriber that drops
//! its receiver is removed on the next publish.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::domain::LedgerEvent;

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<LedgerEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. Only events published after this call are
    /// delivered.
    pub fn subscribe(&mut self) -> Receiver<LedgerEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Deliver `event` to every live subscriber
    pub fn publish(&mut self, event: LedgerEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());

        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Removed closed subscribers");
        }
    }

    pub fn publish_all(&mut self, events: impl IntoIterator<Item = LedgerEvent>) {
        for event in events {
            self.publish(event);
        }
    }
}
