//! In-memory context store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::form::AiFormContext;
use crate::domain::foundation::SessionId;
use crate::ports::{ContextStore, ContextStoreError};

/// HashMap-backed context store for tests and single-process use.
#[derive(Debug, Default)]
pub struct InMemoryContextStore {
    contexts: RwLock<HashMap<SessionId, AiFormContext>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn save(&self, context: &AiFormContext) -> Result<(), ContextStoreError> {
        self.contexts
            .write()
            .await
            .insert(context.session_id, context.clone());
        Ok(())
    }

    async fn load(&self, session_id: SessionId) -> Result<AiFormContext, ContextStoreError> {
        self.contexts
            .read()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(ContextStoreError::NotFound(session_id))
    }

    async fn exists(&self, session_id: SessionId) -> Result<bool, ContextStoreError> {
        Ok(self.contexts.read().await.contains_key(&session_id))
    }

    async fn delete(&self, session_id: SessionId) -> Result<(), ContextStoreError> {
        self.contexts.write().await.remove(&session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let store = InMemoryContextStore::new();
        let context = AiFormContext::new(UserId::new(), SessionId::new());

        store.save(&context).await.unwrap();
        let loaded = store.load(context.session_id).await.unwrap();
        assert_eq!(loaded, context);
    }

    #[tokio::test]
    async fn load_of_unknown_session_is_not_found() {
        let store = InMemoryContextStore::new();
        let result = store.load(SessionId::new()).await;
        assert!(matches!(result, Err(ContextStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_the_context() {
        let store = InMemoryContextStore::new();
        let context = AiFormContext::new(UserId::new(), SessionId::new());
        store.save(&context).await.unwrap();
        store.delete(context.session_id).await.unwrap();
        assert!(!store.exists(context.session_id).await.unwrap());
    }

    #[tokio::test]
    async fn save_replaces_the_previous_revision() {
        let store = InMemoryContextStore::new();
        let context = AiFormContext::new(UserId::new(), SessionId::new());
        store.save(&context).await.unwrap();

        let updated = context.apply_field(
            crate::domain::foundation::FieldId::from("title"),
            crate::domain::foundation::FieldValue::Text("Tuition".into()),
        );
        store.save(&updated).await.unwrap();

        let loaded = store.load(context.session_id).await.unwrap();
        assert_eq!(loaded.revision, 1);
    }
}
