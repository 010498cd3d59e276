pub mod document_store;
pub mod dispatcher;

pub use document_store::DocumentStore;
pub use dispatcher::{Dispatcher, Outcome};
