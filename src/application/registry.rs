//! Per-session engine registry.
//!
//! Hands out one engine per session behind its own mutex, so updates to
//! a session are serialized while different sessions proceed in
//! parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::EngineConfig;
use crate::domain::foundation::SessionId;
use crate::ports::EventPublisher;

use super::engine::FormEngine;

/// Owns the live engines for all active sessions.
pub struct EngineRegistry {
    config: EngineConfig,
    events: Arc<dyn EventPublisher>,
    engines: Mutex<HashMap<SessionId, Arc<Mutex<FormEngine>>>>,
}

impl EngineRegistry {
    pub fn new(config: EngineConfig, events: Arc<dyn EventPublisher>) -> Self {
        Self {
            config,
            events,
            engines: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the engine for a session, creating it on first use.
    /// Callers lock the returned mutex for the duration of one
    /// operation.
    pub async fn engine(&self, session_id: SessionId) -> Arc<Mutex<FormEngine>> {
        let mut engines = self.engines.lock().await;
        engines
            .entry(session_id)
            .or_insert_with(|| {
                Arc::new(Mutex::new(FormEngine::new(
                    session_id,
                    self.config.clone(),
                    Arc::clone(&self.events),
                )))
            })
            .clone()
    }

    /// Resets a session's engine if one exists.
    pub async fn reset_session(&self, session_id: SessionId) {
        let engine = {
            let engines = self.engines.lock().await;
            engines.get(&session_id).cloned()
        };
        if let Some(engine) = engine {
            engine.lock().await.reset().await;
        }
    }

    /// Drops a session's engine entirely.
    pub async fn evict(&self, session_id: SessionId) {
        self.engines.lock().await.remove(&session_id);
    }

    /// Number of live engines.
    pub async fn len(&self) -> usize {
        self.engines.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventPublisher;

    fn registry() -> EngineRegistry {
        EngineRegistry::new(
            EngineConfig::default(),
            Arc::new(InMemoryEventPublisher::new()),
        )
    }

    #[tokio::test]
    async fn same_session_gets_the_same_engine() {
        let registry = registry();
        let session_id = SessionId::new();
        let a = registry.engine(session_id).await;
        let b = registry.engine(session_id).await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn different_sessions_get_different_engines() {
        let registry = registry();
        let a = registry.engine(SessionId::new()).await;
        let b = registry.engine(SessionId::new()).await;
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn reset_clears_engine_state() {
        let registry = registry();
        let session_id = SessionId::new();
        let engine = registry.engine(session_id).await;
        engine.lock().await.flag_invalid_state().await;
        assert!(engine.lock().await.is_emergency());

        registry.reset_session(session_id).await;
        assert!(!engine.lock().await.is_emergency());
    }

    #[tokio::test]
    async fn evict_drops_the_engine() {
        let registry = registry();
        let session_id = SessionId::new();
        registry.engine(session_id).await;
        assert_eq!(registry.len().await, 1);
        registry.evict(session_id).await;
        assert_eq!(registry.len().await, 0);
    }
}
