//! Embedding client and the per-base embedding index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::KnowledgeSettings;
use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::facts::FactStore;
use crate::models::{Embedding, EmbeddingsRanking, SyncReport, normalize_fact_name};
use crate::vector;

/// Turns text into a vector.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier stamped into every embedding this embedder produces.
    fn model_id(&self) -> &str;

    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>>;
}

/// OpenAI-compatible `/embeddings` client.
#[derive(Clone)]
pub struct EmbeddingClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl EmbeddingClient {
    pub fn new(settings: &KnowledgeSettings, api_key: Option<String>) -> KnowledgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            base_url: settings.embedding_url.trim_end_matches('/').to_string(),
            model: settings.embedding_model.clone(),
            api_key,
            client,
        })
    }
}

#[async_trait::async_trait]
impl Embedder for EmbeddingClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbedRequest {
            input: text,
            model: &self.model,
            encoding_format: "float",
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(KnowledgeError::Embedding(format!(
                "embedding request failed: {status} {text}"
            )));
        }

        let payload: EmbedResponse = response.json().await?;
        if let Some(error) = payload.error {
            return Err(KnowledgeError::Embedding(error.message));
        }

        payload
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| KnowledgeError::Embedding("embedding response missing vectors".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
    model: &'a str,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    data: Vec<EmbedItem>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Embeddings of one knowledge base, keyed by fact name.
///
/// The map lock is async because saving keeps it across file writes.
pub struct EmbeddingIndex {
    name: String,
    path: PathBuf,
    embedder: Arc<dyn Embedder>,
    embeddings: Mutex<HashMap<String, Embedding>>,
}

impl std::fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("model", &self.embedder.model_id())
            .finish()
    }
}

impl EmbeddingIndex {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            embedder,
            embeddings: Mutex::new(HashMap::new()),
        }
    }

    /// Index bound to `path`, loaded from disk if the file exists.
    pub async fn open(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        embedder: Arc<dyn Embedder>,
    ) -> KnowledgeResult<Self> {
        let index = Self::new(name, path, embedder);
        if tokio::fs::try_exists(&index.path).await? {
            index.load().await?;
        }
        Ok(index)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> KnowledgeResult<()> {
        let data = tokio::fs::read_to_string(&self.path).await?;
        let parsed: Vec<Embedding> = serde_json::from_str(&data)?;

        let mut loaded = HashMap::with_capacity(parsed.len());
        for mut embedding in parsed {
            let key = normalize_fact_name(&embedding.fact_name);
            if key.is_empty() {
                return Err(KnowledgeError::InvalidFact(format!(
                    "embedding without a fact name in {}",
                    self.path.display()
                )));
            }
            embedding.fact_name = key.clone();
            embedding.relevance = 0.0;
            loaded.insert(key, embedding);
        }

        let count = loaded.len();
        *self.embeddings.lock().await = loaded;
        info!(base = %self.name, embeddings = count, "loaded embeddings");
        Ok(())
    }

    pub async fn save(&self) -> KnowledgeResult<()> {
        let embeddings = self.embeddings.lock().await;
        self.write(&embeddings).await
    }

    async fn write(&self, embeddings: &HashMap<String, Embedding>) -> KnowledgeResult<()> {
        let mut sorted: Vec<&Embedding> = embeddings.values().collect();
        sorted.sort_by(|a, b| a.fact_name.cmp(&b.fact_name));
        let buf = serde_json::to_string_pretty(&sorted)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, buf).await?;
        debug!(base = %self.name, embeddings = sorted.len(), "saved embeddings");
        Ok(())
    }

    pub async fn get_embedding(&self, fact_name: &str) -> Option<Embedding> {
        let key = normalize_fact_name(fact_name);
        self.embeddings.lock().await.get(&key).cloned()
    }

    pub async fn has_embedding(&self, fact_name: &str) -> bool {
        let key = normalize_fact_name(fact_name);
        self.embeddings.lock().await.contains_key(&key)
    }

    pub async fn num_embeddings(&self) -> usize {
        self.embeddings.lock().await.len()
    }

    /// Insert or replace the embedding for its fact.
    pub async fn add_embedding(&self, mut embedding: Embedding) -> KnowledgeResult<()> {
        let key = normalize_fact_name(&embedding.fact_name);
        if key.is_empty() {
            return Err(KnowledgeError::InvalidFact("embedding has no fact name".to_string()));
        }
        if embedding.embedding.is_empty() {
            return Err(KnowledgeError::EmptyVector);
        }
        if embedding.embedding.len() != embedding.num_dimensions {
            return Err(KnowledgeError::DimensionMismatch {
                expected: embedding.num_dimensions,
                actual: embedding.embedding.len(),
            });
        }
        embedding.fact_name = key.clone();
        self.embeddings.lock().await.insert(key, embedding);
        Ok(())
    }

    pub async fn delete_embedding(&self, fact_name: &str) -> KnowledgeResult<Embedding> {
        let key = normalize_fact_name(fact_name);
        self.embeddings
            .lock()
            .await
            .remove(&key)
            .ok_or(KnowledgeError::EmbeddingNotFound(key))
    }

    pub async fn list_embeddings(&self) -> Vec<Embedding> {
        self.embeddings.lock().await.values().cloned().collect()
    }

    /// Bring the index in line with `facts`.
    ///
    /// Every fact with a question gets a vector computed from exactly that
    /// question. Embeddings whose fact is gone, or has no question any more,
    /// are dropped. The file is written once, and only when something changed.
    /// When the embedder fails part way, the vectors already refreshed are
    /// still written before the error is returned.
    ///
    /// The index stays unlocked while the embedder runs, so ranking is not
    /// blocked by a slow embedding service.
    pub async fn sync_embeddings(&self, facts: &FactStore) -> KnowledgeResult<SyncReport> {
        let mut snapshot = facts.list_facts();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));

        let stale: Vec<(String, String)> = {
            let embeddings = self.embeddings.lock().await;
            snapshot
                .into_iter()
                .filter(|fact| !fact.question.is_empty())
                .filter(|fact| {
                    embeddings
                        .get(&fact.name)
                        .is_none_or(|existing| existing.is_stale_for(&fact.question))
                })
                .map(|fact| (fact.name, fact.question))
                .collect()
        };

        let mut refreshed = Vec::with_capacity(stale.len());
        let mut failure = None;
        for (name, question) in stale {
            info!(base = %self.name, fact = %name, "refreshing embedding");
            match self.embedder.embed(&question).await {
                Ok(vector) if !vector.is_empty() => refreshed.push((name, question, vector)),
                Ok(_) => {
                    failure = Some(KnowledgeError::Embedding(format!(
                        "empty vector returned for fact {name}"
                    )));
                    break;
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        let mut embeddings = self.embeddings.lock().await;
        let mut report = SyncReport::default();
        for (name, question, vector) in refreshed {
            let link = embeddings
                .get(&name)
                .map(|existing| existing.link.clone())
                .unwrap_or_default();
            let mut embedding = Embedding::new(name.clone(), question, self.embedder.model_id())
                .with_vector(vector);
            embedding.link = link;
            embeddings.insert(name, embedding);
            report.refreshed += 1;
        }

        if let Some(err) = failure {
            self.flush_partial(&embeddings, &mut report).await;
            return Err(err);
        }

        let before = embeddings.len();
        embeddings.retain(|name, _| {
            facts
                .get_fact(name)
                .is_some_and(|fact| !fact.question.is_empty())
        });
        report.pruned = before - embeddings.len();
        if report.pruned > 0 {
            info!(base = %self.name, pruned = report.pruned, "pruned orphaned embeddings");
        }

        if report.changed() {
            self.write(&embeddings).await?;
            report.written = true;
        }
        Ok(report)
    }

    async fn flush_partial(&self, embeddings: &HashMap<String, Embedding>, report: &mut SyncReport) {
        if report.refreshed == 0 {
            return;
        }
        match self.write(embeddings).await {
            Ok(()) => report.written = true,
            Err(err) => warn!(base = %self.name, error = %err, "failed to save partial embedding sync"),
        }
    }

    /// Embed free text as a ranking query.
    pub async fn embed_query(&self, text: &str) -> KnowledgeResult<Embedding> {
        if text.trim().is_empty() {
            return Err(KnowledgeError::EmptyQuery);
        }
        let vector = self.embedder.embed(text).await?;
        Ok(Embedding::new("", text, self.embedder.model_id()).with_vector(vector))
    }

    /// Score every stored embedding against `query` by inner product.
    ///
    /// All embeddings are returned, best first. Ties keep fact-name order.
    pub async fn rank_embeddings(&self, query: &Embedding) -> KnowledgeResult<EmbeddingsRanking> {
        let embeddings = self.embeddings.lock().await;
        if embeddings.is_empty() {
            return Err(KnowledgeError::EmptyIndex);
        }
        if query.source.trim().is_empty() || query.embedding.is_empty() {
            return Err(KnowledgeError::EmptyQuery);
        }

        let mut ranked: Vec<Embedding> = embeddings.values().cloned().collect();
        drop(embeddings);
        ranked.sort_by(|a, b| a.fact_name.cmp(&b.fact_name));

        for embedding in &mut ranked {
            embedding.relevance = vector::dot(&embedding.embedding, &query.embedding)?;
        }
        ranked.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));

        Ok(EmbeddingsRanking {
            embeddings: ranked,
            query: query.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fact;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LengthEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Embedder for LengthEmbedder {
        fn model_id(&self) -> &str {
            "length-v1"
        }

        async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    fn index_at(path: PathBuf) -> EmbeddingIndex {
        let embedder = Arc::new(LengthEmbedder {
            calls: AtomicUsize::new(0),
        });
        EmbeddingIndex::new("test", path, embedder)
    }

    fn index() -> EmbeddingIndex {
        index_at(PathBuf::from("/nonexistent/test.json"))
    }

    #[tokio::test]
    async fn test_add_embedding_validates_dimensions() {
        let index = index();
        let mut emb = Embedding::new("a", "q", "m").with_vector(vec![1.0, 2.0]);
        emb.num_dimensions = 5;
        assert!(matches!(
            index.add_embedding(emb).await,
            Err(KnowledgeError::DimensionMismatch { expected: 5, actual: 2 })
        ));

        let empty = Embedding::new("a", "q", "m");
        assert!(matches!(
            index.add_embedding(empty).await,
            Err(KnowledgeError::EmptyVector)
        ));

        let ok = Embedding::new("a", "q", "m").with_vector(vec![1.0]);
        index.add_embedding(ok).await.unwrap();
        assert!(index.has_embedding("A").await);
        assert_eq!(index.get_embedding("a").await.unwrap().fact_name, "A");
    }

    #[tokio::test]
    async fn test_rank_rejects_empty_query() {
        let index = index();
        index
            .add_embedding(Embedding::new("a", "q", "m").with_vector(vec![1.0]))
            .await
            .unwrap();

        let no_text = Embedding::new("", "", "m").with_vector(vec![1.0]);
        assert!(matches!(
            index.rank_embeddings(&no_text).await,
            Err(KnowledgeError::EmptyQuery)
        ));
        let no_vector = Embedding::new("", "hello", "m");
        assert!(matches!(
            index.rank_embeddings(&no_vector).await,
            Err(KnowledgeError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn test_rank_ties_keep_name_order() {
        let index = index();
        for name in ["c", "a", "b"] {
            index
                .add_embedding(Embedding::new(name, "q", "m").with_vector(vec![1.0, 0.0]))
                .await
                .unwrap();
        }
        let query = Embedding::new("", "q", "m").with_vector(vec![2.0, 0.0]);
        let ranking = index.rank_embeddings(&query).await.unwrap();
        let names: Vec<&str> = ranking
            .embeddings
            .iter()
            .map(|e| e.fact_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(ranking.embeddings.iter().all(|e| e.relevance == 2.0));
    }

    #[tokio::test]
    async fn test_sync_drops_embedding_when_question_cleared() {
        let temp = tempfile::TempDir::new().unwrap();
        let index = index_at(temp.path().join("e.json"));
        let facts = FactStore::new("test", temp.path().join("f.json"));
        facts
            .add_fact(Fact {
                name: "A".to_string(),
                question: "first".to_string(),
                ..Fact::default()
            })
            .unwrap();
        index.sync_embeddings(&facts).await.unwrap();
        assert_eq!(index.num_embeddings().await, 1);

        facts.delete_fact("A").unwrap();
        facts
            .add_fact(Fact {
                name: "A".to_string(),
                ..Fact::default()
            })
            .unwrap();
        let report = index.sync_embeddings(&facts).await.unwrap();
        assert_eq!(report.pruned, 1);
        assert_eq!(index.num_embeddings().await, 0);
    }
}
