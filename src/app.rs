use std::sync::Arc;

use axum::{routing::{get, post}, Router};

use crate::components::Renderer;
use crate::config::Config;
use crate::errors::WikiError;
use crate::handlers;
use crate::router::PathRouter;
use crate::services::{Dispatcher, DocumentStore};
use crate::session::{KvSessionStore, MemorySessionStore, SessionStore};
use crate::types::AppState;

/// Build everything the handlers share.
///
/// Creates the pages directory if needed. With a session address configured,
/// the backend must answer before this returns; an unreachable backend is an
/// error and the server does not start.
pub async fn build_state(config: &Config) -> Result<AppState, WikiError> {
    if !config.pages_dir.is_dir() {
        log::info!("Creating pages directory {:?}", config.pages_dir);
        std::fs::create_dir_all(&config.pages_dir)?;
    }

    let renderer = if config.templates_dir.is_dir() {
        Renderer::from_dir(&config.templates_dir)?
    } else {
        log::info!("No templates directory at {:?}, using built-in templates", config.templates_dir);
        Renderer::builtin()
    };

    let router = PathRouter::new()
        .map_err(|e| WikiError::Config(format!("path grammar failed to compile: {}", e)))?;

    let sessions: Arc<dyn SessionStore> = match &config.session_addr {
        Some(addr) => Arc::new(KvSessionStore::connect(addr).await?),
        None => {
            log::info!("No session backend configured, keeping sessions in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let store = DocumentStore::new(config.pages_dir.clone());
    Ok(AppState {
        router: Arc::new(router),
        dispatcher: Arc::new(Dispatcher::new(store, renderer, config.site_title.clone())),
        sessions,
        images_dir: Arc::new(config.images_dir.clone()),
    })
}

/// The HTTP surface: index, the three page operations and images
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_root))
        .route("/view/*id", get(handlers::handle_view))
        .route("/edit/*id", get(handlers::handle_edit))
        .route("/save/*id", post(handlers::handle_save))
        .route("/images/*path", get(handlers::handle_image))
        .fallback(handlers::handle_not_found)
        .with_state(state)
}
