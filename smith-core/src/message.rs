use serde::{Deserialize, Serialize};

/// External identity of whoever is talking to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable platform identity, used as the session key
    pub id: String,
    /// Handle on the platform
    pub name: String,
    /// Display name used when greeting
    pub real_name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, real_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            real_name: real_name.into(),
        }
    }
}

/// A single inbound question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whitespace-separated tokens of the question text.
    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<&str> for Question {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Output unit produced by any resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub rank: usize,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
            image_link: None,
            score: 0.0,
            rank: 0,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_image_link(mut self, link: impl Into<String>) -> Self {
        self.image_link = Some(link.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_tokens() {
        let question = Question::new("  <@U123>   rgetfact   HELLO ");
        assert_eq!(question.tokens(), vec!["<@U123>", "rgetfact", "HELLO"]);
        assert!(!question.is_blank());
        assert!(Question::new(" \t ").is_blank());
    }

    #[test]
    fn test_answer_serialization_skips_empty_links() {
        let answer = Answer::new("42").with_rank(1);
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["text"], "42");
        assert_eq!(json["rank"], 1);
        assert!(json.get("link").is_none());
        assert!(json.get("imageLink").is_none());

        let answer = Answer::new("url").with_image_link("https://img");
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["imageLink"], "https://img");
    }
}
