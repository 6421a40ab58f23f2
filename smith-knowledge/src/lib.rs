//! Fact storage, embeddings and knowledge base registry for agent-smith.

pub mod embeddings;
pub mod errors;
pub mod facts;
pub mod models;
pub mod paths;
pub mod registry;
pub mod vector;

pub use embeddings::{Embedder, EmbeddingClient, EmbeddingIndex};
pub use errors::{KnowledgeError, KnowledgeResult};
pub use facts::FactStore;
pub use models::{
    Embedding, EmbeddingsRanking, Fact, ParamType, Parameter, SyncReport, normalize_fact_name,
};
pub use registry::{KnowledgeBase, KnowledgeRegistry};
pub use smith_core::config::KnowledgeSettings;
