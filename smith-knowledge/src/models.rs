use serde::{Deserialize, Serialize};

/// How a plugin parameter contributes to the rewritten question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamType {
    /// `value` is spliced in verbatim.
    #[default]
    Constant,
    /// `prompt` is sent to the completion service together with the question.
    Prompt,
    /// Anything else found on disk. Rejected at dispatch time.
    Other(String),
}

impl ParamType {
    pub fn as_str(&self) -> &str {
        match self {
            ParamType::Constant => "constant",
            ParamType::Prompt => "prompt",
            ParamType::Other(other) => other,
        }
    }
}

impl From<String> for ParamType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "constant" => ParamType::Constant,
            "prompt" => ParamType::Prompt,
            _ => ParamType::Other(value),
        }
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        match value {
            ParamType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

/// One plugin parameter of a fact.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    /// Extraction prompt for [`ParamType::Prompt`] parameters.
    #[serde(default)]
    pub prompt: String,
}

/// A named unit of knowledge.
///
/// `question` is the canonical text the embedding is generated from.
/// `plugin` is empty unless the fact triggers an action instead of
/// returning `answers`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub name: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub plugin: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub created_by: String,
    /// RFC 3339 creation timestamp
    #[serde(default)]
    pub created_at: String,
}

impl Fact {
    /// A fresh fact under construction, stamped with its creator and the
    /// current time. The name is normalized.
    pub fn pending(name: &str, created_by: impl Into<String>) -> Self {
        Self {
            name: normalize_fact_name(name),
            created_by: created_by.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            ..Self::default()
        }
    }

    pub fn plugin_name(&self) -> Option<&str> {
        let plugin = self.plugin.trim();
        (!plugin.is_empty()).then_some(plugin)
    }
}

/// Fact names are case-insensitive; every store key goes through here.
pub fn normalize_fact_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Vector representation of a fact's question.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Embedding {
    #[serde(rename = "factId", alias = "factName")]
    pub fact_name: String,
    /// Text the vector was computed from
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub model_id: String,
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub num_dimensions: usize,
    /// Only meaningful on ranking results.
    #[serde(default)]
    pub relevance: f64,
}

impl Embedding {
    pub fn new(
        fact_name: impl Into<String>,
        source: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            fact_name: fact_name.into(),
            source: source.into(),
            model_id: model_id.into(),
            ..Self::default()
        }
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.num_dimensions = vector.len();
        self.embedding = vector;
        self
    }

    /// True when the stored vector cannot be trusted for `question`.
    pub fn is_stale_for(&self, question: &str) -> bool {
        self.source != question
            || self.embedding.is_empty()
            || self.num_dimensions == 0
            || self.embedding.len() != self.num_dimensions
    }
}

/// Result of ranking a query against an index.
#[derive(Debug, Clone)]
pub struct EmbeddingsRanking {
    /// Copies of every stored embedding, best match first.
    pub embeddings: Vec<Embedding>,
    pub query: Embedding,
}

impl EmbeddingsRanking {
    pub fn best(&self) -> Option<&Embedding> {
        self.embeddings.first()
    }
}

/// What a synchronization pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub refreshed: usize,
    pub pruned: usize,
    pub written: bool,
}

impl SyncReport {
    pub fn changed(&self) -> bool {
        self.refreshed > 0 || self.pruned > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_wire_format() {
        let json = r#"{
            "name": "WEATHER",
            "question": "what is the weather like?",
            "labels": ["weather"],
            "answers": ["sunny"],
            "links": [],
            "plugin": "",
            "params": [{"name": "city", "value": "Berlin", "type": "constant", "prompt": ""}],
            "isSystem": false,
            "createdBy": "neo",
            "createdAt": "2024-01-02T03:04:05Z"
        }"#;
        let fact: Fact = serde_json::from_str(json).unwrap();
        assert_eq!(fact.name, "WEATHER");
        assert_eq!(fact.params[0].param_type, ParamType::Constant);
        assert_eq!(fact.created_by, "neo");
        assert!(fact.plugin_name().is_none());

        let value = serde_json::to_value(&fact).unwrap();
        assert_eq!(value["isSystem"], false);
        assert_eq!(value["params"][0]["type"], "constant");
    }

    #[test]
    fn test_unknown_param_type_survives() {
        let param: Parameter =
            serde_json::from_str(r#"{"name": "x", "value": "", "type": "regex", "prompt": ""}"#)
                .unwrap();
        assert_eq!(param.param_type, ParamType::Other("regex".to_string()));
        let value = serde_json::to_value(&param).unwrap();
        assert_eq!(value["type"], "regex");
    }

    #[test]
    fn test_pending_fact_normalizes_and_stamps() {
        let fact = Fact::pending(" greeting ", "trinity");
        assert_eq!(fact.name, "GREETING");
        assert_eq!(fact.created_by, "trinity");
        assert!(chrono::DateTime::parse_from_rfc3339(&fact.created_at).is_ok());
    }

    #[test]
    fn test_embedding_accepts_both_key_spellings() {
        let a: Embedding = serde_json::from_str(r#"{"factId": "A", "source": "q"}"#).unwrap();
        let b: Embedding = serde_json::from_str(r#"{"factName": "A", "source": "q"}"#).unwrap();
        assert_eq!(a.fact_name, b.fact_name);

        let value = serde_json::to_value(&a).unwrap();
        assert_eq!(value["factId"], "A");
        assert!(value.get("factName").is_none());
    }

    #[test]
    fn test_staleness() {
        let emb = Embedding::new("A", "q", "m").with_vector(vec![1.0, 2.0]);
        assert!(!emb.is_stale_for("q"));
        assert!(emb.is_stale_for("other"));

        let mut broken = emb.clone();
        broken.num_dimensions = 3;
        assert!(broken.is_stale_for("q"));

        assert!(Embedding::new("A", "q", "m").is_stale_for("q"));
    }
}
