use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{decode_session, encode_session, Session, SessionStore, StoreError};

/// In-process session store.
///
/// Keeps the same JSON text the network backend would hold, so payloads
/// behave identically. Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn set(&self, id: &str, session: &Session) -> Result<(), StoreError> {
        let payload = encode_session(session)?;
        self.entries.write().await.insert(id.to_string(), payload);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Session, StoreError> {
        let entries = self.entries.read().await;
        let payload = entries.get(id).ok_or_else(|| StoreError::Missing(id.to_string()))?;
        decode_session(id, payload.as_bytes())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_and_overwrite() {
        let store = MemorySessionStore::new();
        let mut first = Session::new();
        first.insert("step", 1);
        store.set("s", &first).await.unwrap();
        assert_eq!(store.get("s").await.unwrap(), first);

        let mut second = Session::new();
        second.insert("step", 2);
        store.set("s", &second).await.unwrap();
        assert_eq!(store.get("s").await.unwrap(), second);
    }

    #[tokio::test]
    async fn unset_id_is_missing() {
        let store = MemorySessionStore::new();
        assert!(matches!(store.get("none").await, Err(StoreError::Missing(_))));
    }
}
