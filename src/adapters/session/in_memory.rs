//! In-memory session gateway.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionId;
use crate::ports::{SessionGateway, SessionGatewayError, SessionInfo};

/// HashMap-backed session gateway for tests and single-process use.
#[derive(Debug, Default)]
pub struct InMemorySessionGateway {
    sessions: RwLock<HashMap<SessionId, SessionInfo>>,
}

impl InMemorySessionGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session so later lookups resolve it.
    pub async fn register(&self, info: SessionInfo) {
        self.sessions.write().await.insert(info.session_id, info);
    }
}

#[async_trait]
impl SessionGateway for InMemorySessionGateway {
    async fn session_info(
        &self,
        session_id: SessionId,
    ) -> Result<SessionInfo, SessionGatewayError> {
        self.sessions
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(SessionGatewayError::Unknown(session_id))
    }
}
