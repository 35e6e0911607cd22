//! Tracing event publisher.
//!
//! Emits every engine event as a structured log line. Useful as the
//! default publisher when no event bus is wired up.

use async_trait::async_trait;
use tracing::info;

use crate::ports::{EngineEvent, EventPublisher, PublishError};

/// Logs events via `tracing` instead of delivering them anywhere.
#[derive(Debug, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: EngineEvent) -> Result<(), PublishError> {
        info!(session_id = %event.session_id(), event = ?event, "engine event");
        Ok(())
    }
}
