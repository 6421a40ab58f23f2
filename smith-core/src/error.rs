//! Error classification shared by every crate in the workspace.

use serde::{Deserialize, Serialize};

/// Category of a failure, independent of the crate that raised it.
///
/// Every category is recoverable: front-ends render the error text to the
/// user and keep serving. The category only tells callers what kind of
/// retry (if any) makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or duplicate name, missing command parameter, bad parameter type.
    Validation,
    /// No matching fact, no such knowledge base, no embeddings.
    Lookup,
    /// Dimension mismatch or empty vector/query.
    Vector,
    /// The language-model service failed or returned garbage.
    ExternalService,
    /// Reading or writing a store file failed.
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Lookup => "lookup",
            ErrorKind::Vector => "vector",
            ErrorKind::ExternalService => "external_service",
            ErrorKind::Persistence => "persistence",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
