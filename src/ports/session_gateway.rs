//! Session Gateway Port - Interface for resolving session identity.

use async_trait::async_trait;

use crate::domain::foundation::{ExpertiseLevel, SessionId, UserId};

/// What the engine needs to know about a session's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub expertise: ExpertiseLevel,
}

/// Errors that can occur while resolving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionGatewayError {
    #[error("Unknown session: {0}")]
    Unknown(SessionId),

    #[error("Session backend error: {0}")]
    Backend(String),
}

/// Port for looking up who owns a session and their expertise level.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    async fn session_info(&self, session_id: SessionId)
        -> Result<SessionInfo, SessionGatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_session_error_names_the_session() {
        let session_id = SessionId::new();
        let err = SessionGatewayError::Unknown(session_id);
        assert!(err.to_string().contains(&session_id.to_string()));
    }
}
