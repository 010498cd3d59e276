//! tinywiki - a minimal plain-text wiki
//!
//! Pages are stored one file per title, addressed through `/view/`, `/edit/`
//! and `/save/` paths, and listed on the index page. Session state goes to a
//! pluggable key-value store.

pub mod app;
pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod router;
pub mod services;
pub mod session;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use app::{app, build_state};
pub use components::Renderer;
pub use config::Config;
pub use errors::WikiError;
pub use router::{Operation, PathRouter, Route};
pub use services::{Dispatcher, DocumentStore, Outcome};
pub use session::{KvSessionStore, MemorySessionStore, Session, SessionStore, StoreError};
pub use types::{AppState, IndexPage, Page};
