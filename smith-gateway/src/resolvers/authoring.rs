//! Multi-turn fact authoring: question, answers, then `done`.

use std::sync::Arc;

use smith_core::{Answer, Question};
use smith_knowledge::{Fact, KnowledgeError, KnowledgeRegistry};
use tracing::{info, warn};

use crate::resolvers::{ResolveError, Resolver};
use crate::session::{SessionState, UserSession};

/// Terminates answer collection and commits the pending fact.
pub const DONE: &str = "done";

pub struct AuthoringResolver {
    registry: Arc<KnowledgeRegistry>,
}

impl AuthoringResolver {
    pub fn new(registry: Arc<KnowledgeRegistry>) -> Self {
        Self { registry }
    }

    /// Store `pending` in the current base, sync and save.
    ///
    /// A duplicate name ends authoring with a failure message. Sync or save
    /// failures leave the session in `AddAnswer` with `committed` set, so
    /// that resubmitting the terminator (after more answers, possibly)
    /// replaces the stored draft and retries.
    async fn commit(
        &self,
        session: &mut UserSession,
        pending: Fact,
        committed: bool,
    ) -> Result<Vec<Answer>, ResolveError> {
        let base = self.registry.current();
        let stored = match base.facts.get_fact(&pending.name) {
            Some(existing) if committed && is_draft_of(&existing, &pending) => {
                base.facts.update_fact(pending.clone()).map(|_| ())
            }
            _ => base.facts.add_fact(pending.clone()),
        };

        match stored {
            Ok(()) => {}
            Err(err @ KnowledgeError::DuplicateName(_)) => {
                warn!(user = %session.user.id, fact = %pending.name, "fact name taken before commit");
                session.state = SessionState::Qa;
                return Ok(vec![Answer::new(format!(
                    "failed to add new fact {} to knowledge base: {err}",
                    pending.name
                ))]);
            }
            Err(err) => {
                session.state = SessionState::AddAnswer { pending, committed };
                return Err(err.into());
            }
        }

        let persisted = match base.embeddings.sync_embeddings(&base.facts).await {
            Ok(_) => base.facts.save().await,
            Err(err) => Err(err),
        };
        if let Err(err) = persisted {
            warn!(user = %session.user.id, fact = %pending.name, error = %err, "commit failed, keeping draft");
            session.state = SessionState::AddAnswer {
                pending,
                committed: true,
            };
            return Err(err.into());
        }

        info!(base = %base.name(), fact = %pending.name, answers = pending.answers.len(), "added fact");
        session.state = SessionState::Qa;
        Ok(vec![Answer::new(format!(
            "added new fact {} to knowledge base!",
            pending.name
        ))])
    }
}

/// Whether `stored` is an earlier version of the draft `pending`.
pub(crate) fn is_draft_of(stored: &Fact, pending: &Fact) -> bool {
    stored.name == pending.name
        && stored.created_by == pending.created_by
        && stored.created_at == pending.created_at
}

#[async_trait::async_trait]
impl Resolver for AuthoringResolver {
    fn name(&self) -> &str {
        "authoring"
    }

    fn applies(&self, session: &UserSession) -> bool {
        !session.state.is_qa()
    }

    async fn resolve(
        &self,
        session: &mut UserSession,
        question: &Question,
    ) -> Result<Vec<Answer>, ResolveError> {
        let text = match std::mem::take(&mut session.state) {
            SessionState::AddQuestion { mut pending } => {
                pending.question = question.text.clone();
                session.state = SessionState::AddAnswer {
                    pending,
                    committed: false,
                };
                "please provide an answer to this question!".to_string()
            }
            SessionState::AddAnswer { pending, committed } if question.text.trim() == DONE => {
                return self.commit(session, pending, committed).await;
            }
            SessionState::AddAnswer {
                mut pending,
                committed,
            } => {
                pending.answers.push(question.text.clone());
                session.state = SessionState::AddAnswer { pending, committed };
                "please provide another answer to this question or type 'done' to finish and add fact!"
                    .to_string()
            }
            SessionState::Qa => {
                warn!(user = %session.user.id, "authoring step without a fact in progress");
                "no fact is being authored, reverting to default question/answer state".to_string()
            }
        };

        Ok(vec![Answer::new(text)])
    }
}
