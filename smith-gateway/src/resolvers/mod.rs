//! Resolvers turn a question into answers.
//!
//! Each resolver either answers, passes (empty list) or fails. The
//! [`ResolverChain`](crate::chain::ResolverChain) tries them in order.

pub mod authoring;
pub mod command;
pub mod fallback;
pub mod image;
pub mod semantic;

use smith_core::{Answer, ErrorKind, Question};
use smith_knowledge::KnowledgeError;

use crate::providers::ProviderError;
use crate::session::UserSession;

pub use authoring::AuthoringResolver;
pub use command::CommandResolver;
pub use fallback::FallbackResolver;
pub use image::ImageResolver;
pub use semantic::SemanticResolver;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("missing parameter {0}")]
    MissingParameter(&'static str),
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error("language model error: {0}")]
    Provider(#[from] ProviderError),
    #[error("no matching fact")]
    NoMatch,
    #[error("unknown plugin {0}")]
    UnknownPlugin(String),
    #[error("unsupported param type {0}")]
    UnsupportedParamType(String),
    #[error("missing {0}")]
    MissingInput(&'static str),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::MissingParameter(_)
            | ResolveError::UnsupportedParamType(_)
            | ResolveError::MissingInput(_) => ErrorKind::Validation,
            ResolveError::NoMatch | ResolveError::UnknownPlugin(_) => ErrorKind::Lookup,
            ResolveError::Knowledge(err) => err.kind(),
            ResolveError::Provider(err) => err.kind(),
        }
    }
}

#[async_trait::async_trait]
pub trait Resolver: Send + Sync {
    fn name(&self) -> &str;

    /// Whether this resolver takes part for the session's current state.
    fn applies(&self, _session: &UserSession) -> bool {
        true
    }

    /// Answers for `question`. An empty list means "not mine".
    async fn resolve(
        &self,
        session: &mut UserSession,
        question: &Question,
    ) -> Result<Vec<Answer>, ResolveError>;
}
