//! Knowledge base configuration types.
//!
//! [`KnowledgeSettings`] is the resolved (non-optional) form consumed by
//! `smith-knowledge`. It is built from the user-facing `[knowledge]` TOML
//! section via `From`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::settings::KnowledgeSection;

/// Resolved knowledge settings (all values filled with defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSettings {
    #[serde(default = "default_base")]
    pub default_base: String,
    #[serde(default = "default_embedding_url")]
    pub embedding_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Override the storage root. When unset the root comes from
    /// `AGENT_SMITH_DATA_DIR` or the XDG data directory.
    #[serde(default)]
    pub root_override: Option<PathBuf>,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            default_base: default_base(),
            embedding_url: default_embedding_url(),
            embedding_model: default_embedding_model(),
            root_override: None,
        }
    }
}

fn default_base() -> String {
    "system".to_string()
}

fn default_embedding_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-ada-002".to_string()
}

impl From<&KnowledgeSection> for KnowledgeSettings {
    fn from(value: &KnowledgeSection) -> Self {
        let mut settings = KnowledgeSettings::default();
        if let Some(base) = value.default_base.as_deref().map(str::trim) {
            if !base.is_empty() {
                settings.default_base = base.to_string();
            }
        }
        if let Some(url) = &value.embedding_url {
            settings.embedding_url = url.clone();
        }
        if let Some(model) = &value.embedding_model {
            settings.embedding_model = model.clone();
        }
        if let Some(root) = &value.root {
            settings.root_override = Some(PathBuf::from(root));
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_section_resolves_to_defaults() {
        let resolved = KnowledgeSettings::from(&KnowledgeSection::default());
        assert_eq!(resolved.default_base, "system");
        assert_eq!(resolved.embedding_model, "text-embedding-ada-002");
        assert!(resolved.root_override.is_none());
    }

    #[test]
    fn test_section_overrides() {
        let section = KnowledgeSection {
            root: Some("/data/kb".to_string()),
            default_base: Some("  ".to_string()),
            embedding_url: Some("http://127.0.0.1:11434/v1".to_string()),
            embedding_model: None,
        };
        let resolved = KnowledgeSettings::from(&section);
        assert_eq!(resolved.default_base, "system");
        assert_eq!(resolved.embedding_url, "http://127.0.0.1:11434/v1");
        assert_eq!(resolved.root_override, Some(PathBuf::from("/data/kb")));
    }
}
