use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use crate::router::PathRouter;
use crate::services::Dispatcher;
use crate::session::SessionStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<PathRouter>,
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: Arc<dyn SessionStore>,
    pub images_dir: Arc<PathBuf>,
}

/// A single wiki page as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: Vec<u8>,
    pub modified: Option<SystemTime>,
}

impl Page {
    /// A page that has not been saved yet
    pub fn empty(title: &str) -> Self {
        Self {
            title: title.to_string(),
            body: Vec::new(),
            modified: None,
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Index view listing every stored page
#[derive(Debug, Clone)]
pub struct IndexPage {
    pub title: String,
    pub titles: Vec<String>,
}
