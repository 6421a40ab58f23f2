//! Maintenance commands addressed to the agent.

use std::sync::Arc;

use smith_core::{Answer, Question};
use smith_knowledge::{Fact, KnowledgeError, KnowledgeRegistry, normalize_fact_name};
use tracing::{info, warn};

use crate::resolvers::authoring::is_draft_of;
use crate::resolvers::{ResolveError, Resolver};
use crate::session::{SessionState, UserSession};

pub const LIST_FACTS: &str = "rlistfacts";
pub const LIST_KNOWLEDGE_BASES: &str = "rlistknowledgebases";
pub const NUM_FACTS: &str = "rnumfacts";
pub const GET_FACT: &str = "rgetfact";
pub const GET_CURRENT_KNOWLEDGE_BASE: &str = "rgetcurrentknowledgebase";
pub const SET_CURRENT_KNOWLEDGE_BASE: &str = "rsetcurrentknowledgebase";
pub const ADD_FACT: &str = "raddfact";
pub const DELETE_FACT: &str = "rdeletefact";

/// Prefix of a chat mention token, stripped before matching.
const MENTION_PREFIX: &str = "<@";

pub struct CommandResolver {
    registry: Arc<KnowledgeRegistry>,
}

impl CommandResolver {
    pub fn new(registry: Arc<KnowledgeRegistry>) -> Self {
        Self { registry }
    }

    fn list_facts(&self) -> String {
        let facts = self.registry.current_facts();
        let mut names: Vec<String> = facts.list_facts().into_iter().map(|f| f.name).collect();
        if names.is_empty() {
            return format!("knowledge base {} has no facts", facts.name());
        }
        names.sort();
        names.join("\n")
    }

    fn get_fact(&self, name: &str) -> Result<String, ResolveError> {
        let fact = self
            .registry
            .current_facts()
            .get_fact(name)
            .ok_or_else(|| KnowledgeError::NotFound(normalize_fact_name(name)))?;
        let text = serde_json::to_string_pretty(&fact).map_err(KnowledgeError::from)?;
        Ok(text)
    }

    fn set_current_base(&self, name: &str) -> Result<String, ResolveError> {
        self.registry.set_current_base_name(name)?;
        Ok(format!("set current knowledge base to {name}"))
    }

    fn add_fact(&self, session: &mut UserSession, name: &str) -> Result<String, ResolveError> {
        let facts = self.registry.current_facts();
        if facts.has_fact(name) {
            return Err(KnowledgeError::DuplicateName(normalize_fact_name(name)).into());
        }

        let discarded = self.discard_draft(session);
        let pending = Fact::pending(name, session.user.name.clone());
        let mut text = format!(
            "adding new fact {}, please state a question for this fact!",
            pending.name
        );
        if let Some(discarded) = discarded {
            text = format!("discarding unfinished fact {discarded}, {text}");
        }
        info!(user = %session.user.id, fact = %pending.name, "started fact authoring");
        session.state = SessionState::AddQuestion { pending };
        Ok(text)
    }

    /// Drop the fact the session was authoring, if any, and return its name.
    ///
    /// A draft left in the store by a failed commit is removed again.
    fn discard_draft(&self, session: &mut UserSession) -> Option<String> {
        let (pending, committed) = match std::mem::take(&mut session.state) {
            SessionState::Qa => return None,
            SessionState::AddQuestion { pending } => (pending, false),
            SessionState::AddAnswer { pending, committed } => (pending, committed),
        };

        if committed {
            let facts = self.registry.current_facts();
            if facts
                .get_fact(&pending.name)
                .is_some_and(|stored| is_draft_of(&stored, &pending))
            {
                let _ = facts.delete_fact(&pending.name);
            }
        }
        warn!(user = %session.user.id, fact = %pending.name, "discarded unfinished fact");
        Some(pending.name)
    }

    async fn delete_fact(&self, name: &str) -> Result<String, ResolveError> {
        let base = self.registry.current();
        let deleted = base.facts.delete_fact(name)?;
        base.embeddings.sync_embeddings(&base.facts).await?;
        base.facts.save().await?;
        info!(base = %base.name(), fact = %deleted.name, "deleted fact");
        Ok(format!("deleted fact {}", deleted.name))
    }
}

/// Command tokens with a leading mention removed.
fn command_tokens(question: &Question) -> Vec<&str> {
    let mut tokens = question.tokens();
    if tokens
        .first()
        .is_some_and(|first| first.starts_with(MENTION_PREFIX))
    {
        tokens.remove(0);
    }
    tokens
}

#[async_trait::async_trait]
impl Resolver for CommandResolver {
    fn name(&self) -> &str {
        "command"
    }

    async fn resolve(
        &self,
        session: &mut UserSession,
        question: &Question,
    ) -> Result<Vec<Answer>, ResolveError> {
        let tokens = command_tokens(question);
        let Some(&command) = tokens.first() else {
            return Ok(Vec::new());
        };
        let argument = tokens.get(1).copied();

        let text = match command {
            LIST_FACTS => self.list_facts(),
            LIST_KNOWLEDGE_BASES => self.registry.list_base_names().join("\n"),
            NUM_FACTS => self.registry.current_facts().num_facts().to_string(),
            GET_CURRENT_KNOWLEDGE_BASE => self.registry.current_base_name(),
            GET_FACT => {
                let name = argument.ok_or(ResolveError::MissingParameter("fact name"))?;
                self.get_fact(name)?
            }
            SET_CURRENT_KNOWLEDGE_BASE => {
                let name =
                    argument.ok_or(ResolveError::MissingParameter("knowledge base name"))?;
                self.set_current_base(name)?
            }
            ADD_FACT => {
                let name = argument.ok_or(ResolveError::MissingParameter("fact name"))?;
                self.add_fact(session, name)?
            }
            DELETE_FACT => {
                let name = argument.ok_or(ResolveError::MissingParameter("fact name"))?;
                self.delete_fact(name).await?
            }
            _ => return Ok(Vec::new()),
        };

        Ok(vec![Answer::new(text)])
    }
}
