//! Session storage.
//!
//! [`SessionStore`] is the capability handlers are given; the backing store
//! is chosen once at startup. [`KvSessionStore`] talks to a network
//! key-value service, [`MemorySessionStore`] keeps everything in process.

pub mod kv_store;
pub mod memory;
pub mod resp;

use std::collections::BTreeMap;
use std::{fmt, io};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use kv_store::KvSessionStore;
pub use memory::MemorySessionStore;

/// Per-visitor state, stored as JSON text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.values.insert(key.into(), value.into());
    }
}

/// Errors from a session backend. Each variant keeps its cause.
#[derive(Debug)]
pub enum StoreError {
    /// The backend could not be reached or did not answer the liveness check
    Connect { addr: String, source: Box<StoreError> },
    Io(io::Error),
    /// The backend sent something that is not a valid reply
    Protocol(String),
    /// The backend answered with an error reply
    Backend(String),
    /// No session is stored under this id
    Missing(String),
    Encode(serde_json::Error),
    Decode { id: String, source: serde_json::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Connect { addr, source } => {
                write!(f, "failed to reach session backend at {}: {}", addr, source)
            }
            StoreError::Io(e) => write!(f, "session backend I/O error: {}", e),
            StoreError::Protocol(msg) => write!(f, "session backend protocol error: {}", msg),
            StoreError::Backend(msg) => write!(f, "session backend error: {}", msg),
            StoreError::Missing(id) => write!(f, "no session stored for '{}'", id),
            StoreError::Encode(e) => write!(f, "failed to encode session: {}", e),
            StoreError::Decode { id, source } => {
                write!(f, "failed to decode session '{}': {}", id, source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Connect { source, .. } => Some(source.as_ref()),
            StoreError::Io(e) => Some(e),
            StoreError::Encode(e) => Some(e),
            StoreError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}

/// Key-value storage for sessions.
///
/// Both failure paths of `get` (absent key, undecodable payload) mean the
/// caller has no usable session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store `session` under `id` with no expiry, replacing any previous value.
    async fn set(&self, id: &str, session: &Session) -> Result<(), StoreError>;

    async fn get(&self, id: &str) -> Result<Session, StoreError>;

    /// Liveness check against the backend.
    async fn ping(&self) -> Result<(), StoreError>;
}

pub(crate) fn encode_session(session: &Session) -> Result<String, StoreError> {
    serde_json::to_string(session).map_err(StoreError::Encode)
}

pub(crate) fn decode_session(id: &str, payload: &[u8]) -> Result<Session, StoreError> {
    serde_json::from_slice(payload).map_err(|source| StoreError::Decode { id: id.to_string(), source })
}
