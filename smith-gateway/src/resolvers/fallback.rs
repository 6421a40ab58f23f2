use smith_core::{Answer, Question};

use crate::resolvers::{ResolveError, Resolver};
use crate::session::UserSession;

const GREETINGS: &[&str] = &["hello", "hi", "hey"];
const FAREWELLS: &[&str] = &["bye", "goodbye"];

/// Last resort. Always produces exactly one answer.
pub struct FallbackResolver;

fn has_word(question: &Question, words: &[&str]) -> bool {
    question.tokens().into_iter().any(|token| {
        let word = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        words.contains(&word.as_str())
    })
}

#[async_trait::async_trait]
impl Resolver for FallbackResolver {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn resolve(
        &self,
        session: &mut UserSession,
        question: &Question,
    ) -> Result<Vec<Answer>, ResolveError> {
        let real_name = &session.user.real_name;
        let text = if has_word(question, GREETINGS) {
            format!("Hello {real_name}")
        } else if has_word(question, FAREWELLS) {
            format!("Good bye {real_name}")
        } else {
            format!("Sorry, I don't have the answers yet, {real_name}")
        };
        Ok(vec![Answer::new(text)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smith_core::User;

    async fn reply(text: &str) -> String {
        let mut session = UserSession::new(User::new("u", "neo", "Neo"));
        let answers = FallbackResolver
            .resolve(&mut session, &Question::new(text))
            .await
            .unwrap();
        assert_eq!(answers.len(), 1);
        answers[0].text.clone()
    }

    #[tokio::test]
    async fn test_greeting_and_farewell() {
        assert_eq!(reply("Hi there!").await, "Hello Neo");
        assert_eq!(reply("ok, bye.").await, "Good bye Neo");
        assert_eq!(
            reply("what is the matrix").await,
            "Sorry, I don't have the answers yet, Neo"
        );
    }

    #[tokio::test]
    async fn test_words_inside_other_words_do_not_match() {
        assert_eq!(
            reply("this is a chimney").await,
            "Sorry, I don't have the answers yet, Neo"
        );
    }
}
