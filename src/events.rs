//! Fan-out of events to tokio mpsc subscribers.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

/// Sends every event to each live subscriber; closed receivers are pruned
/// on the next emit.
#[derive(Debug)]
pub struct EventHub<E> {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<E>>>,
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<E: Clone> EventHub<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn emit(&self, event: E) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
