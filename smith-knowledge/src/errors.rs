use smith_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("missing data directory")]
    MissingDataDir,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("invalid fact: {0}")]
    InvalidFact(String),
    #[error("fact {0} already exists")]
    DuplicateName(String),
    #[error("no fact named {0}")]
    NotFound(String),
    #[error("no embedding for fact {0}")]
    EmbeddingNotFound(String),
    #[error("no knowledge base named {0}")]
    NoSuchBase(String),
    #[error("no embeddings to rank against")]
    EmptyIndex,
    #[error("query has no text or no vector")]
    EmptyQuery,
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("empty vector")]
    EmptyVector,
}

impl KnowledgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KnowledgeError::InvalidFact(_) | KnowledgeError::DuplicateName(_) => {
                ErrorKind::Validation
            }
            KnowledgeError::NotFound(_)
            | KnowledgeError::EmbeddingNotFound(_)
            | KnowledgeError::NoSuchBase(_)
            | KnowledgeError::EmptyIndex => ErrorKind::Lookup,
            KnowledgeError::EmptyQuery
            | KnowledgeError::DimensionMismatch { .. }
            | KnowledgeError::EmptyVector => ErrorKind::Vector,
            KnowledgeError::Http(_) | KnowledgeError::Embedding(_) => ErrorKind::ExternalService,
            KnowledgeError::MissingDataDir | KnowledgeError::Io(_) | KnowledgeError::Json(_) => {
                ErrorKind::Persistence
            }
        }
    }
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(KnowledgeError::EmptyIndex.kind(), ErrorKind::Lookup);
        assert_eq!(
            KnowledgeError::DuplicateName("X".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            KnowledgeError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
            .kind(),
            ErrorKind::Vector
        );
        assert_eq!(
            KnowledgeError::Embedding("boom".into()).kind(),
            ErrorKind::ExternalService
        );
    }
}
