use std::sync::Arc;

use smith_core::{Answer, Question};
use tracing::{debug, info, warn};

use crate::resolvers::{ResolveError, Resolver};
use crate::session::UserSession;

/// Ordered resolvers. The first non-empty answer list wins, the first
/// error aborts.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl ResolverChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    pub fn push(&mut self, resolver: Arc<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    pub fn resolver_names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub async fn ask(
        &self,
        session: &mut UserSession,
        question: &Question,
    ) -> Result<Vec<Answer>, ResolveError> {
        session.last_question = Some(question.clone());

        for resolver in &self.resolvers {
            if !resolver.applies(session) {
                continue;
            }

            match resolver.resolve(session, question).await {
                Ok(answers) if answers.is_empty() => {
                    debug!(resolver = resolver.name(), "resolver passed");
                }
                Ok(answers) => {
                    info!(
                        resolver = resolver.name(),
                        user = %session.user.id,
                        answers = answers.len(),
                        "question answered"
                    );
                    session.last_answer = answers.clone();
                    return Ok(answers);
                }
                Err(err) => {
                    warn!(resolver = resolver.name(), user = %session.user.id, error = %err, "resolver failed");
                    session.last_answer.clear();
                    return Err(err);
                }
            }
        }

        session.last_answer.clear();
        Ok(Vec::new())
    }
}
