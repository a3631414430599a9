//! Session context - the signed-in user and their bearer token.
//!
//! A `Session` is created by the caller and handed to whatever needs
//! credentials. It starts signed out, is populated by [`Session::login`]
//! and is torn down by [`Session::logout`] (explicitly, or by the HTTP layer
//! on a 401).

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use crate::time::Time;

/// State held while signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Signed-in user name
    pub user: String,

    /// Bearer token attached to requests
    pub token: String,

    /// When the session started
    pub started_at: Time,
}

/// Shared, explicitly managed session.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<Option<SessionState>>,
}

impl Session {
    /// A signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session already signed in.
    pub fn signed_in(user: impl Into<String>, token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(user, token);
        session
    }

    /// Start a session, replacing any previous one.
    pub fn login(&self, user: impl Into<String>, token: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        *state = Some(SessionState {
            user: user.into(),
            token: token.into(),
            started_at: chrono::Utc::now(),
        });
    }

    /// Clear the session. Returns the state that was cleared.
    pub fn logout(&self) -> Option<SessionState> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.take()
    }

    /// Whether a user is signed in.
    pub fn is_logged_in(&self) -> bool {
        self.state.read().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Bearer token, if signed in.
    pub fn token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Signed-in user name.
    pub fn current_user(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_logout_cycle() {
        let session = Session::new();
        assert!(!session.is_logged_in());
        assert!(session.token().is_none());

        session.login("alice", "tok-1");
        assert!(session.is_logged_in());
        assert_eq!(session.token().as_deref(), Some("tok-1"));
        assert_eq!(session.current_user().as_deref(), Some("alice"));

        let cleared = session.logout().unwrap();
        assert_eq!(cleared.user, "alice");
        assert!(!session.is_logged_in());
        assert!(session.logout().is_none());
    }
}
