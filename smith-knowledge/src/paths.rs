use std::path::{Path, PathBuf};

use crate::KnowledgeSettings;
use crate::errors::{KnowledgeError, KnowledgeResult};

pub const KB_DIR: &str = "kb";
pub const FACTS_DIR: &str = "facts";
pub const EMBEDDINGS_DIR: &str = "embeddings";

pub fn data_root() -> KnowledgeResult<PathBuf> {
    if let Ok(override_dir) = std::env::var("AGENT_SMITH_DATA_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let dir = dirs::data_dir().ok_or(KnowledgeError::MissingDataDir)?;
    Ok(dir.join("agent-smith"))
}

/// Directory holding `facts/` and `embeddings/`.
pub fn knowledge_root(settings: &KnowledgeSettings) -> KnowledgeResult<PathBuf> {
    if let Some(path) = &settings.root_override {
        return Ok(path.clone());
    }
    Ok(data_root()?.join(KB_DIR))
}

pub fn facts_dir(root: &Path) -> PathBuf {
    root.join(FACTS_DIR)
}

pub fn embeddings_dir(root: &Path) -> PathBuf {
    root.join(EMBEDDINGS_DIR)
}

pub fn fact_file(root: &Path, base: &str) -> PathBuf {
    facts_dir(root).join(format!("{base}.json"))
}

pub fn embedding_file(root: &Path, base: &str) -> PathBuf {
    embeddings_dir(root).join(format!("{base}.json"))
}

/// Base name for a `<name>.json` store file, `None` for anything else.
pub fn base_name_of(path: &Path) -> Option<String> {
    if path.extension()?.to_str()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_file_layout() {
        let root = Path::new("/srv/kb");
        assert_eq!(
            fact_file(root, "system"),
            PathBuf::from("/srv/kb/facts/system.json")
        );
        assert_eq!(
            embedding_file(root, "system"),
            PathBuf::from("/srv/kb/embeddings/system.json")
        );
    }

    #[test]
    fn test_root_override_wins() {
        let settings = KnowledgeSettings {
            root_override: Some(PathBuf::from("/tmp/override")),
            ..KnowledgeSettings::default()
        };
        assert_eq!(
            knowledge_root(&settings).unwrap(),
            PathBuf::from("/tmp/override")
        );
    }

    #[test]
    fn test_base_name_of() {
        assert_eq!(
            base_name_of(Path::new("/x/facts/system.json")).as_deref(),
            Some("system")
        );
        assert_eq!(base_name_of(Path::new("/x/facts/notes.txt")), None);
        assert_eq!(base_name_of(Path::new("/x/facts/README")), None);
    }
}
