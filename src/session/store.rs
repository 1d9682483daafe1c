//! Session store interface.

use super::types::SessionToken;

/// Holds the single current token of one session.
pub trait SessionStore {
    fn current_token(&self) -> Option<&SessionToken>;

    /// Replace the current token; `None` clears it.
    fn set_current_token(&mut self, token: Option<SessionToken>);
}

/// Session state kept in memory, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    token: Option<SessionToken>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }
}

impl SessionStore for MemorySession {
    fn current_token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    fn set_current_token(&mut self, token: Option<SessionToken>) {
        self.token = token;
    }
}
