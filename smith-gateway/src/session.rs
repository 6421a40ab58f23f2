//! Per-user conversation state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use smith_core::{Answer, Question, User};
use smith_knowledge::Fact;
use tracing::debug;

/// Where a user is in the fact authoring dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Idle, questions are answered from the knowledge base.
    #[default]
    Qa,
    /// Waiting for the canonical question of `pending`.
    AddQuestion { pending: Fact },
    /// Collecting answers for `pending` until the terminator arrives.
    ///
    /// `committed` is set once `pending` has been inserted into the fact
    /// store by a commit whose sync or save then failed.
    AddAnswer { pending: Fact, committed: bool },
}

impl SessionState {
    pub fn is_qa(&self) -> bool {
        matches!(self, SessionState::Qa)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Qa => "QA",
            SessionState::AddQuestion { .. } => "ADD_QUESTION",
            SessionState::AddAnswer { .. } => "ADD_ANSWER",
        }
    }

    /// The fact under construction, if any.
    pub fn pending_fact(&self) -> Option<&Fact> {
        match self {
            SessionState::Qa => None,
            SessionState::AddQuestion { pending } | SessionState::AddAnswer { pending, .. } => {
                Some(pending)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserSession {
    pub user: User,
    pub state: SessionState,
    pub last_question: Option<Question>,
    pub last_answer: Vec<Answer>,
}

impl UserSession {
    pub fn new(user: User) -> Self {
        Self {
            user,
            state: SessionState::Qa,
            last_question: None,
            last_answer: Vec::new(),
        }
    }
}

pub type SharedSession = Arc<tokio::sync::Mutex<UserSession>>;

/// Sessions keyed by user id. They live until deleted.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing session for `user`, created on first contact.
    /// `None` when the user has no id.
    pub fn get_session(&self, user: &User) -> Option<SharedSession> {
        if user.id.trim().is_empty() {
            return None;
        }

        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        let session = sessions.entry(user.id.clone()).or_insert_with(|| {
            debug!(user = %user.id, "creating session");
            Arc::new(tokio::sync::Mutex::new(UserSession::new(user.clone())))
        });
        Some(session.clone())
    }

    pub fn delete_session(&self, id: &str) -> bool {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .remove(id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .expect("session store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_session_is_get_or_insert() {
        let store = SessionStore::new();
        let user = User::new("u1", "neo", "Thomas Anderson");

        let first = store.get_session(&user).unwrap();
        let second = store.get_session(&user).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_blank_user_has_no_session() {
        let store = SessionStore::new();
        assert!(store.get_session(&User::new(" ", "x", "x")).is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_session_resets_state() {
        let store = SessionStore::new();
        let user = User::new("u1", "neo", "Neo");

        {
            let session = store.get_session(&user).unwrap();
            let mut session = session.lock().await;
            session.state = SessionState::AddQuestion {
                pending: Fact::pending("x", "neo"),
            };
        }

        assert!(store.delete_session("u1"));
        assert!(!store.delete_session("u1"));

        let fresh = store.get_session(&user).unwrap();
        assert!(fresh.lock().await.state.is_qa());
    }

    #[test]
    fn test_state_labels() {
        let pending = Fact::pending("x", "neo");
        assert_eq!(SessionState::Qa.label(), "QA");
        let state = SessionState::AddAnswer {
            pending: pending.clone(),
            committed: false,
        };
        assert_eq!(state.label(), "ADD_ANSWER");
        assert_eq!(state.pending_fact(), Some(&pending));
    }
}
