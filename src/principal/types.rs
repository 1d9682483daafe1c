//! Principal types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::assertion::AssertedAttributes;

/// Durable account record owned by the embedding application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Disabled accounts are rejected after resolution.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Application-specific profile data.
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

impl UserRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: BTreeSet::new(),
            enabled: true,
            extra: HashMap::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// In-process principal built only from the assertion. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientPrincipal {
    name: String,
    attributes: AssertedAttributes,
    roles: BTreeSet<String>,
}

impl TransientPrincipal {
    pub fn new(
        name: impl Into<String>,
        attributes: AssertedAttributes,
        roles: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &AssertedAttributes {
        &self.attributes
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }
}

/// Subject of a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Principal {
    /// Account returned by the resolver.
    Durable(UserRecord),
    /// Principal synthesized from the assertion.
    Transient(TransientPrincipal),
    /// Bare name, used when synthesis yields nothing.
    Name { name: String },
}

impl Principal {
    pub fn bare(name: impl Into<String>) -> Self {
        Principal::Name { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Principal::Durable(record) => &record.name,
            Principal::Transient(transient) => transient.name(),
            Principal::Name { name } => name,
        }
    }

    /// Roles granted by the principal itself, before the default role is added.
    pub fn roles(&self) -> BTreeSet<String> {
        match self {
            Principal::Durable(record) => record.roles.clone(),
            Principal::Transient(transient) => transient.roles().clone(),
            Principal::Name { .. } => BTreeSet::new(),
        }
    }

    pub fn is_transient(&self) -> bool {
        !matches!(self, Principal::Durable(_))
    }
}
