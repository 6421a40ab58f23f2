//! File-backed fact store.
//!
//! Facts live in memory behind a mutex held for a single map access only.
//! Persistence is an explicit [`FactStore::save`] that rewrites the whole
//! JSON file. A crash while writing can leave a truncated file behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::{Fact, normalize_fact_name};

#[derive(Debug)]
pub struct FactStore {
    name: String,
    path: PathBuf,
    facts: Mutex<HashMap<String, Fact>>,
}

impl FactStore {
    /// Empty store bound to `path`. Nothing is read or written.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            facts: Mutex::new(HashMap::new()),
        }
    }

    /// Store bound to `path`, loaded from disk if the file exists.
    pub async fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> KnowledgeResult<Self> {
        let store = Self::new(name, path);
        if tokio::fs::try_exists(&store.path).await? {
            store.load().await?;
        }
        Ok(store)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory facts with the file contents.
    pub async fn load(&self) -> KnowledgeResult<()> {
        let data = tokio::fs::read_to_string(&self.path).await?;
        let parsed: Vec<Fact> = serde_json::from_str(&data)?;

        let mut loaded = HashMap::with_capacity(parsed.len());
        for mut fact in parsed {
            let key = normalize_fact_name(&fact.name);
            if key.is_empty() {
                return Err(KnowledgeError::InvalidFact(format!(
                    "fact without a name in {}",
                    self.path.display()
                )));
            }
            fact.name = key.clone();
            if loaded.insert(key.clone(), fact).is_some() {
                warn!(base = %self.name, fact = %key, "duplicate fact in store file, keeping the last one");
            }
        }

        let count = loaded.len();
        *self.facts.lock().expect("fact store lock poisoned") = loaded;
        info!(base = %self.name, facts = count, "loaded facts");
        Ok(())
    }

    /// Rewrite the store file from the in-memory facts, sorted by name.
    pub async fn save(&self) -> KnowledgeResult<()> {
        let mut snapshot = self.list_facts();
        snapshot.sort_by(|a, b| a.name.cmp(&b.name));
        let buf = serde_json::to_string_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, buf).await?;
        debug!(base = %self.name, facts = snapshot.len(), "saved facts");
        Ok(())
    }

    pub fn get_fact(&self, name: &str) -> Option<Fact> {
        let key = normalize_fact_name(name);
        self.facts
            .lock()
            .expect("fact store lock poisoned")
            .get(&key)
            .cloned()
    }

    pub fn has_fact(&self, name: &str) -> bool {
        let key = normalize_fact_name(name);
        self.facts
            .lock()
            .expect("fact store lock poisoned")
            .contains_key(&key)
    }

    pub fn num_facts(&self) -> usize {
        self.facts.lock().expect("fact store lock poisoned").len()
    }

    /// Insert a new fact. The name is normalized before insertion.
    pub fn add_fact(&self, mut fact: Fact) -> KnowledgeResult<()> {
        let key = normalize_fact_name(&fact.name);
        if key.is_empty() {
            return Err(KnowledgeError::InvalidFact("fact name is empty".to_string()));
        }
        fact.name = key.clone();

        let mut facts = self.facts.lock().expect("fact store lock poisoned");
        if facts.contains_key(&key) {
            return Err(KnowledgeError::DuplicateName(key));
        }
        facts.insert(key, fact);
        Ok(())
    }

    /// Replace an existing fact, returning the previous version.
    pub fn update_fact(&self, mut fact: Fact) -> KnowledgeResult<Fact> {
        let key = normalize_fact_name(&fact.name);
        fact.name = key.clone();

        let mut facts = self.facts.lock().expect("fact store lock poisoned");
        match facts.get_mut(&key) {
            Some(existing) => Ok(std::mem::replace(existing, fact)),
            None => Err(KnowledgeError::NotFound(key)),
        }
    }

    /// Remove and return a fact.
    pub fn delete_fact(&self, name: &str) -> KnowledgeResult<Fact> {
        let key = normalize_fact_name(name);
        self.facts
            .lock()
            .expect("fact store lock poisoned")
            .remove(&key)
            .ok_or(KnowledgeError::NotFound(key))
    }

    /// Unordered snapshot of every fact.
    pub fn list_facts(&self) -> Vec<Fact> {
        self.facts
            .lock()
            .expect("fact store lock poisoned")
            .values()
            .cloned()
            .collect()
    }
}
