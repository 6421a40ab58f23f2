//! Plugin dispatch for facts that trigger an action.
//!
//! The question is rewritten from the fact's parameters, then handed to the
//! resolver registered under the fact's plugin name.

use std::collections::HashMap;
use std::sync::Arc;

use smith_core::{Answer, Question};
use smith_knowledge::{Fact, ParamType};
use tracing::debug;

use crate::providers::Provider;
use crate::resolvers::{ResolveError, Resolver};
use crate::session::UserSession;

pub const COMMAND_PLUGIN: &str = "COMMAND_PLUGIN";
pub const IMAGE_PLUGIN: &str = "IMAGE_PLUGIN";

pub struct PluginDispatcher {
    provider: Arc<dyn Provider>,
    plugins: HashMap<String, Arc<dyn Resolver>>,
}

impl PluginDispatcher {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            plugins: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Resolver>) {
        self.plugins.insert(name.into(), handler);
    }

    /// Run the plugin named by `fact` on the rewritten question.
    pub async fn dispatch(
        &self,
        session: &mut UserSession,
        question: &Question,
        fact: &Fact,
    ) -> Result<Vec<Answer>, ResolveError> {
        if question.is_blank() {
            return Err(ResolveError::MissingInput("question"));
        }
        let plugin = fact
            .plugin_name()
            .ok_or(ResolveError::MissingInput("plugin on fact"))?;
        let handler = self
            .plugins
            .get(plugin)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownPlugin(plugin.to_string()))?;

        let rewritten = self.rewrite_question(question, fact).await?;
        debug!(plugin, fact = %fact.name, question = %rewritten.text, "dispatching plugin");
        handler.resolve(session, &rewritten).await
    }

    /// Build the plugin input from the fact's parameters.
    ///
    /// Constants are used verbatim. Prompt parameters ask the completion
    /// service `"<prompt> <question>"` and use its first answer. The parts
    /// are joined with single spaces. Without parameters the original
    /// question is passed through.
    pub async fn rewrite_question(
        &self,
        question: &Question,
        fact: &Fact,
    ) -> Result<Question, ResolveError> {
        if fact.params.is_empty() {
            return Ok(question.clone());
        }

        let mut parts = Vec::with_capacity(fact.params.len());
        for param in &fact.params {
            match &param.param_type {
                ParamType::Constant => parts.push(param.value.clone()),
                ParamType::Prompt => {
                    let prompt = format!("{} {}", param.prompt, question.text);
                    parts.push(self.provider.complete_one(&prompt).await?);
                }
                ParamType::Other(other) => {
                    return Err(ResolveError::UnsupportedParamType(other.clone()));
                }
            }
        }
        Ok(Question::new(parts.join(" ")))
    }
}
