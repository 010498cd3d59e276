//! Request path validation.
//!
//! Every page operation arrives as `/<operation>/<title>`. The title class is
//! restricted to ASCII letters and digits; it is joined onto the pages
//! directory as-is, so nothing containing `/` or `.` may get through.

use std::fmt;

use log::debug;
use regex::Regex;

const PATH_GRAMMAR: &str = "^/(edit|save|view)/([a-zA-Z0-9]+)$";

/// Page operations reachable through a validated path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    View,
    Edit,
    Save,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::View => "view",
            Operation::Edit => "edit",
            Operation::Save => "save",
        }
    }

    /// Path that addresses `id` with this operation, e.g. `/edit/Home`
    pub fn path_for(&self, id: &str) -> String {
        format!("/{}/{}", self.as_str(), id)
    }

    fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "view" => Some(Operation::View),
            "edit" => Some(Operation::Edit),
            "save" => Some(Operation::Save),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub operation: Operation,
    pub id: String,
}

/// Compiled path grammar, built once at startup
#[derive(Debug, Clone)]
pub struct PathRouter {
    grammar: Regex,
}

impl PathRouter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self { grammar: Regex::new(PATH_GRAMMAR)? })
    }

    /// Match `path` against the grammar, returning `None` on any deviation.
    pub fn validate(&self, path: &str) -> Option<Route> {
        let Some(caps) = self.grammar.captures(path) else {
            debug!("Path rejected by router: '{}'", path);
            return None;
        };
        let operation = Operation::parse(caps.get(1)?.as_str())?;
        let id = caps.get(2)?.as_str().to_string();
        debug!("Path '{}' routed to {} '{}'", path, operation, id);
        Some(Route { operation, id })
    }
}
