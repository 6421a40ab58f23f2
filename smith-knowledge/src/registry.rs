//! Named knowledge bases and the pointer to the current one.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::KnowledgeSettings;
use crate::embeddings::{Embedder, EmbeddingIndex};
use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::facts::FactStore;
use crate::paths;

/// A fact store and the embedding index built from it.
#[derive(Debug)]
pub struct KnowledgeBase {
    name: String,
    pub facts: Arc<FactStore>,
    pub embeddings: Arc<EmbeddingIndex>,
}

impl KnowledgeBase {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Every knowledge base found under the storage root. Exactly one is current.
#[derive(Debug)]
pub struct KnowledgeRegistry {
    root: PathBuf,
    bases: HashMap<String, Arc<KnowledgeBase>>,
    current: RwLock<Arc<KnowledgeBase>>,
}

impl KnowledgeRegistry {
    /// Load from the root configured in `settings`.
    pub async fn load(
        settings: &KnowledgeSettings,
        embedder: Arc<dyn Embedder>,
    ) -> KnowledgeResult<Self> {
        let root = paths::knowledge_root(settings)?;
        Self::load_from(&root, &settings.default_base, embedder).await
    }

    /// Scan `<root>/facts/*.json`, open the matching embedding indexes and
    /// synchronize them. The default base is created empty if absent.
    pub async fn load_from(
        root: &Path,
        default_base: &str,
        embedder: Arc<dyn Embedder>,
    ) -> KnowledgeResult<Self> {
        let facts_dir = paths::facts_dir(root);
        let embeddings_dir = paths::embeddings_dir(root);
        tokio::fs::create_dir_all(&facts_dir).await?;
        tokio::fs::create_dir_all(&embeddings_dir).await?;

        let mut names = scan_base_names(&facts_dir).await?;
        names.sort();

        let mut bases = HashMap::with_capacity(names.len() + 1);
        for name in &names {
            let base = open_base(root, name, embedder.clone()).await?;
            bases.insert(name.clone(), Arc::new(base));
        }

        let known: HashSet<&String> = names.iter().collect();
        for orphan in scan_base_names(&embeddings_dir).await? {
            if !known.contains(&orphan) {
                warn!(base = %orphan, "embedding file has no fact file, skipping");
            }
        }

        if !bases.contains_key(default_base) {
            info!(base = %default_base, "default knowledge base missing, creating it");
            let base = open_base(root, default_base, embedder.clone()).await?;
            base.facts.save().await?;
            base.embeddings.save().await?;
            bases.insert(default_base.to_string(), Arc::new(base));
        }

        let current = bases
            .get(default_base)
            .cloned()
            .ok_or_else(|| KnowledgeError::NoSuchBase(default_base.to_string()))?;

        info!(root = %root.display(), bases = bases.len(), current = %default_base, "knowledge registry loaded");
        Ok(Self {
            root: root.to_path_buf(),
            bases,
            current: RwLock::new(current),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current(&self) -> Arc<KnowledgeBase> {
        self.current
            .read()
            .expect("current base lock poisoned")
            .clone()
    }

    pub fn current_base_name(&self) -> String {
        self.current().name.clone()
    }

    pub fn current_facts(&self) -> Arc<FactStore> {
        self.current().facts.clone()
    }

    pub fn current_embeddings(&self) -> Arc<EmbeddingIndex> {
        self.current().embeddings.clone()
    }

    /// Switch the current base. Both its stores must be loaded.
    pub fn set_current_base_name(&self, name: &str) -> KnowledgeResult<()> {
        let base = self
            .bases
            .get(name)
            .cloned()
            .ok_or_else(|| KnowledgeError::NoSuchBase(name.to_string()))?;
        *self.current.write().expect("current base lock poisoned") = base;
        info!(base = %name, "switched current knowledge base");
        Ok(())
    }

    pub fn base(&self, name: &str) -> Option<Arc<KnowledgeBase>> {
        self.bases.get(name).cloned()
    }

    /// Sorted names of every loaded base.
    pub fn list_base_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bases.keys().cloned().collect();
        names.sort();
        names
    }
}

async fn scan_base_names(dir: &Path) -> KnowledgeResult<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if let Some(name) = paths::base_name_of(&entry.path()) {
            names.push(name);
        }
    }
    Ok(names)
}

async fn open_base(
    root: &Path,
    name: &str,
    embedder: Arc<dyn Embedder>,
) -> KnowledgeResult<KnowledgeBase> {
    let facts = FactStore::open(name, paths::fact_file(root, name)).await?;
    let embeddings = EmbeddingIndex::open(name, paths::embedding_file(root, name), embedder).await?;

    match embeddings.sync_embeddings(&facts).await {
        Ok(report) if report.changed() => info!(
            base = %name,
            refreshed = report.refreshed,
            pruned = report.pruned,
            "synchronized embeddings"
        ),
        Ok(_) => {}
        Err(err) => warn!(base = %name, error = %err, "embedding sync failed at startup"),
    }

    Ok(KnowledgeBase {
        name: name.to_string(),
        facts: Arc::new(facts),
        embeddings: Arc::new(embeddings),
    })
}
