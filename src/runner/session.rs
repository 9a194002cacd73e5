use std::collections::HashMap;

/// Per-role authentication state.
///
/// A role starts `NotLoggedIn` and moves to `LoggedIn` on the first
/// successful login. There is no logout; a role whose login failed stays
/// `NotLoggedIn` for the rest of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    NotLoggedIn,
    LoggedIn {
        token: String,
    },
}

/// Tokens issued during the run, keyed by role
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, role: &str) -> SessionState {
        self.sessions.get(role).cloned().unwrap_or_default()
    }

    pub fn token(&self, role: &str) -> Option<&str> {
        match self.sessions.get(role) {
            Some(SessionState::LoggedIn { token }) => Some(token.as_str()),
            _ => None,
        }
    }

    pub fn is_logged_in(&self, role: &str) -> bool {
        self.token(role).is_some()
    }

    pub fn log_in(&mut self, role: &str, token: String) {
        self.sessions
            .insert(role.to_string(), SessionState::LoggedIn { token });
    }
}
