#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use smith_core::{Answer, Question, User};
use smith_gateway::providers::{Provider, ProviderError};
use smith_gateway::{AppState, ResolveError};
use smith_knowledge::{
    Embedder, Fact, FactStore, KnowledgeRegistry, KnowledgeResult, ParamType, Parameter, paths,
};
use tempfile::TempDir;

/// Keywords the fake embedder can tell apart. One dimension each, plus a
/// small constant so no vector is all zeros.
const VOCABULARY: &[&str] = &[
    "weather", "capital", "france", "draw", "picture", "many", "facts", "teleport", "regex",
];

pub struct KeywordEmbedder;

#[async_trait::async_trait]
impl Embedder for KeywordEmbedder {
    fn model_id(&self) -> &str {
        "keyword-v1"
    }

    async fn embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .collect();
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|term| words.iter().filter(|w| w == term).count() as f32)
            .collect();
        vector.push(0.1);
        Ok(vector)
    }
}

/// Scripted completions (default "yes") and recorded prompts.
#[derive(Default)]
pub struct FakeProvider {
    completions: Mutex<VecDeque<Vec<String>>>,
    prompts: Mutex<Vec<String>>,
    image_prompts: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn script(&self, completions: &[&str]) {
        self.completions
            .lock()
            .unwrap()
            .push_back(completions.iter().map(|c| c.to_string()).collect());
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_prompts.lock().unwrap().clone()
    }
}

pub const IMAGE_URL: &str = "https://images.test/generated.png";

#[async_trait::async_trait]
impl Provider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let scripted = self.completions.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| vec!["yes".to_string()]))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        self.image_prompts.lock().unwrap().push(prompt.to_string());
        Ok(vec![IMAGE_URL.to_string()])
    }
}

pub struct Harness {
    _temp: TempDir,
    pub root: PathBuf,
    pub state: Arc<AppState>,
    pub provider: Arc<FakeProvider>,
}

pub fn user() -> User {
    User::new("u-1", "neo", "Neo")
}

/// A registry with a populated `system` base (current) and an empty `ops` base.
pub async fn harness(facts: Vec<Fact>) -> Harness {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();

    let system = FactStore::new("system", paths::fact_file(&root, "system"));
    for fact in facts {
        system.add_fact(fact).unwrap();
    }
    system.save().await.unwrap();
    FactStore::new("ops", paths::fact_file(&root, "ops"))
        .save()
        .await
        .unwrap();

    let registry = KnowledgeRegistry::load_from(&root, "system", Arc::new(KeywordEmbedder))
        .await
        .unwrap();
    let provider = Arc::new(FakeProvider::default());
    let state = Arc::new(AppState::new(Arc::new(registry), provider.clone()));

    Harness {
        _temp: temp,
        root,
        state,
        provider,
    }
}

impl Harness {
    pub async fn ask(&self, text: &str) -> Result<Vec<Answer>, ResolveError> {
        self.state.ask(&user(), &Question::new(text)).await
    }

    pub async fn answer_text(&self, text: &str) -> String {
        let answers = self.ask(text).await.unwrap();
        assert_eq!(answers.len(), 1, "expected one answer for {text:?}");
        answers[0].text.clone()
    }

    pub async fn state_label(&self) -> &'static str {
        let session = self.state.sessions.get_session(&user()).unwrap();
        let session = session.lock().await;
        session.state.label()
    }
}

pub fn fact(name: &str, question: &str, answers: &[&str]) -> Fact {
    Fact {
        name: name.to_string(),
        question: question.to_string(),
        answers: answers.iter().map(|a| a.to_string()).collect(),
        ..Fact::default()
    }
}

pub fn plugin_fact(name: &str, question: &str, plugin: &str, params: Vec<Parameter>) -> Fact {
    Fact {
        name: name.to_string(),
        question: question.to_string(),
        plugin: plugin.to_string(),
        params,
        ..Fact::default()
    }
}

pub fn constant(value: &str) -> Parameter {
    Parameter {
        name: "constant".to_string(),
        value: value.to_string(),
        param_type: ParamType::Constant,
        prompt: String::new(),
    }
}

pub fn prompt(prompt: &str) -> Parameter {
    Parameter {
        name: "prompt".to_string(),
        value: String::new(),
        param_type: ParamType::Prompt,
        prompt: prompt.to_string(),
    }
}

pub fn weather() -> Fact {
    Fact {
        links: vec!["https://weather.test".to_string()],
        ..fact("WEATHER", "how is the weather", &["sunny with a chance of rain"])
    }
}

pub fn capital() -> Fact {
    fact("CAPITAL", "what is the capital of france", &["Paris"])
}
