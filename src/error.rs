//! Error types for schema registration, principal resolution and reconciliation.

use thiserror::Error;

/// Errors raised while building an attribute schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Alias is empty or contains whitespace.
    #[error("invalid attribute alias: '{0}'")]
    InvalidAlias(String),

    /// Definition has no metadata key to read from.
    #[error("attribute '{alias}' has an empty source key")]
    EmptySourceKey { alias: String },

    /// A configured alias does not exist in the schema.
    #[error("unknown attribute alias: '{0}'")]
    UnknownAlias(String),
}

/// Errors returned by a [`PrincipalResolver`](crate::principal::PrincipalResolver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No durable account exists for the name.
    #[error("principal '{0}' not found")]
    NotFound(String),

    /// The resolver backend could not answer.
    #[error("resolver backend unavailable: {0}")]
    Unavailable(String),
}

/// Reasons a reconciliation failed.
///
/// Every variant causes the current session token to be invalidated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No durable account and the resolver cannot synthesize one.
    #[error("no account found for principal '{name}'")]
    PrincipalNotFound { name: String },

    /// The resolver backend failed.
    #[error("principal resolver unavailable for '{name}': {reason}")]
    ResolverUnavailable { name: String, reason: String },

    /// The durable account exists but is disabled.
    #[error("account '{name}' is disabled")]
    AccountDisabled { name: String },
}

impl AuthError {
    /// Short machine-readable code, used as an audit reason.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::PrincipalNotFound { .. } => "PRINCIPAL_NOT_FOUND",
            AuthError::ResolverUnavailable { .. } => "RESOLVER_UNAVAILABLE",
            AuthError::AccountDisabled { .. } => "ACCOUNT_DISABLED",
        }
    }
}

/// Per-attribute extraction failure. The attribute is dropped, extraction continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("attribute '{alias}' is malformed: {reason}")]
    Malformed { alias: String, reason: String },
}
