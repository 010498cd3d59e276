use log::{debug, info};
use crate::components::templates::{EDIT_TEMPLATE, VIEW_TEMPLATE};
use crate::components::Renderer;
use crate::errors::WikiError;
use crate::router::{Operation, Route};
use crate::services::DocumentStore;
use crate::types::{IndexPage, Page};

/// What the transport should send back for a handled operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Html(String),
    Redirect(String),
}

/// Runs the list, view, edit and save operations against the page store
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: DocumentStore,
    renderer: Renderer,
    site_title: String,
}

impl Dispatcher {
    pub fn new(store: DocumentStore, renderer: Renderer, site_title: impl Into<String>) -> Self {
        Self { store, renderer, site_title: site_title.into() }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Execute a routed operation. `body` is only consulted for saves.
    pub fn dispatch(&self, route: &Route, body: Option<&str>) -> Result<Outcome, WikiError> {
        match route.operation {
            Operation::View => self.view(&route.id),
            Operation::Edit => self.edit(&route.id),
            Operation::Save => self.save(&route.id, body.unwrap_or_default().as_bytes()),
        }
    }

    /// Render the index of every stored page
    pub fn list(&self) -> Result<Outcome, WikiError> {
        let titles = self.store.list()?;
        let index = IndexPage { title: self.site_title.clone(), titles };
        Ok(Outcome::Html(self.renderer.render_index(&index)?))
    }

    /// Render a page, or send the browser to its editor if it does not exist
    pub fn view(&self, title: &str) -> Result<Outcome, WikiError> {
        match self.store.load(title) {
            Ok(page) => Ok(Outcome::Html(self.renderer.render_page(VIEW_TEMPLATE, &page)?)),
            Err(WikiError::NotFound) => {
                info!("Page '{}' not found, redirecting to editor", title);
                Ok(Outcome::Redirect(Operation::Edit.path_for(title)))
            }
            Err(e) => Err(e),
        }
    }

    /// Render the edit form, empty for a page that does not exist yet
    pub fn edit(&self, title: &str) -> Result<Outcome, WikiError> {
        let page = match self.store.load(title) {
            Ok(page) => page,
            Err(WikiError::NotFound) => {
                debug!("Editing new page '{}'", title);
                Page::empty(title)
            }
            Err(e) => return Err(e),
        };
        Ok(Outcome::Html(self.renderer.render_page(EDIT_TEMPLATE, &page)?))
    }

    /// Store `body` and send the browser to the page view
    pub fn save(&self, title: &str, body: &[u8]) -> Result<Outcome, WikiError> {
        self.store.save(title, body)?;
        Ok(Outcome::Redirect(Operation::View.path_for(title)))
    }
}
