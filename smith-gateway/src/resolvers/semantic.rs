//! Answers from the fact whose question is closest to the user's.

use std::sync::Arc;

use smith_core::{Answer, Question};
use smith_knowledge::{Fact, KnowledgeError, KnowledgeRegistry};
use tracing::{debug, info};

use crate::plugins::PluginDispatcher;
use crate::providers::Provider;
use crate::resolvers::{ResolveError, Resolver};
use crate::session::UserSession;

pub struct SemanticResolver {
    registry: Arc<KnowledgeRegistry>,
    provider: Arc<dyn Provider>,
    plugins: PluginDispatcher,
}

/// Yes/no prompt asking whether `answers` fit `question`.
pub fn plausibility_prompt(question: &str, answers: &[String]) -> String {
    let mut prompt = String::from(
        "Please check if the following answer is a plausible answer to the give question. \
         Answer simply with yes or no.\n",
    );
    prompt.push_str("Question:\n");
    prompt.push_str(question);
    prompt.push('\n');
    prompt.push_str("Answer:\n");
    for answer in answers {
        prompt.push_str(answer);
        prompt.push('\n');
    }
    prompt
}

/// Only a single completion reading exactly "no" rejects the answers.
pub fn is_rejection(completions: &[String]) -> bool {
    matches!(completions, [only] if only.to_lowercase() == "no")
}

impl SemanticResolver {
    pub fn new(
        registry: Arc<KnowledgeRegistry>,
        provider: Arc<dyn Provider>,
        plugins: PluginDispatcher,
    ) -> Self {
        Self {
            registry,
            provider,
            plugins,
        }
    }

    async fn best_match(&self, question: &Question) -> Result<(Fact, f64), ResolveError> {
        let base = self.registry.current();
        let query = base.embeddings.embed_query(&question.text).await?;
        let ranking = match base.embeddings.rank_embeddings(&query).await {
            Ok(ranking) => ranking,
            Err(KnowledgeError::EmptyIndex) => return Err(ResolveError::NoMatch),
            Err(err) => return Err(err.into()),
        };

        let best = ranking.best().ok_or(ResolveError::NoMatch)?;
        let fact = base
            .facts
            .get_fact(&best.fact_name)
            .ok_or(ResolveError::NoMatch)?;
        debug!(fact = %fact.name, relevance = best.relevance, "best semantic match");
        Ok((fact, best.relevance))
    }
}

#[async_trait::async_trait]
impl Resolver for SemanticResolver {
    fn name(&self) -> &str {
        "semantic"
    }

    async fn resolve(
        &self,
        session: &mut UserSession,
        question: &Question,
    ) -> Result<Vec<Answer>, ResolveError> {
        if question.is_blank() {
            return Ok(Vec::new());
        }

        let (fact, relevance) = self.best_match(question).await?;

        if fact.plugin_name().is_some() {
            return self.plugins.dispatch(session, question, &fact).await;
        }
        if fact.answers.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = plausibility_prompt(&question.text, &fact.answers);
        let verdict = self.provider.complete(&prompt).await?;
        if is_rejection(&verdict) {
            info!(fact = %fact.name, "answers judged implausible, passing");
            return Ok(Vec::new());
        }

        let answers = fact
            .answers
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                let answer = Answer::new(text.clone())
                    .with_score(relevance)
                    .with_rank(idx + 1);
                match fact.links.get(idx) {
                    Some(link) => answer.with_link(link.clone()),
                    None => answer,
                }
            })
            .collect();
        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausibility_prompt_layout() {
        let prompt = plausibility_prompt(
            "what is the capital of France?",
            &["Paris".to_string(), "Lutetia".to_string()],
        );
        assert_eq!(
            prompt,
            "Please check if the following answer is a plausible answer to the give question. \
             Answer simply with yes or no.\n\
             Question:\nwhat is the capital of France?\n\
             Answer:\nParis\nLutetia\n"
        );
    }

    #[test]
    fn test_only_a_single_no_rejects() {
        assert!(is_rejection(&["no".to_string()]));
        assert!(is_rejection(&["No".to_string()]));
        assert!(!is_rejection(&["No.".to_string()]));
        assert!(!is_rejection(&["yes".to_string()]));
        assert!(!is_rejection(&["no".to_string(), "no".to_string()]));
        assert!(!is_rejection(&[]));
    }
}
