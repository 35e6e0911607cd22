//! In-memory event publisher.
//!
//! Records published events so tests can assert on them.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::{EngineEvent, EventPublisher, PublishError};

/// Collects events into a vector.
#[derive(Debug, Default)]
pub struct InMemoryEventPublisher {
    events: Mutex<Vec<EngineEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all events published so far, oldest first.
    pub async fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().await.clone()
    }

    /// Drops all recorded events.
    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: EngineEvent) -> Result<(), PublishError> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
