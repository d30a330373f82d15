//! Recording event publisher.

use crate::lock;
use corebank_commons::event::Event;
use corebank_credit::model::CreditCreated;
use corebank_credit::publisher::{CreditEventPublisher, PublishError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// [`CreditEventPublisher`] that captures every event instead of sending
/// it, with a switch to reject all publishes.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<Event<CreditCreated>>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingPublisher {
    /// Creates a publisher that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent publish fail.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Returns the captured events, in publish order.
    #[must_use]
    pub fn events(&self) -> Vec<Event<CreditCreated>> {
        lock(&self.events).clone()
    }
}

impl CreditEventPublisher for RecordingPublisher {
    async fn publish(&self, event: &Event<CreditCreated>) -> Result<(), PublishError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Delivery {
                topic: "credit-events".to_string(),
                reason: "injected failure".to_string(),
            });
        }
        lock(&self.events).push(event.clone());
        Ok(())
    }
}
