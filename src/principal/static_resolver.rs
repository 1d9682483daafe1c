//! In-memory resolver with a fixed set of accounts.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use super::resolver::{PrincipalResolver, SupportsSynthesis};
use super::types::{Principal, TransientPrincipal, UserRecord};
use crate::assertion::AssertedAttributes;
use crate::error::ResolveError;

/// Resolver backed by a static account table.
///
/// Unknown names synthesize a transient principal carrying the asserted
/// attributes and `transient_roles`.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    users: HashMap<String, UserRecord>,
    transient_roles: Vec<String>,
}

impl StaticResolver {
    pub fn new(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.name.clone(), u)).collect(),
            transient_roles: Vec::new(),
        }
    }

    /// Roles granted to synthesized principals.
    pub fn with_transient_roles(mut self, roles: impl IntoIterator<Item = String>) -> Self {
        self.transient_roles = roles.into_iter().collect();
        self
    }

    /// Parse `name` or `name:ROLE1,ROLE2` entries.
    pub fn parse_user(entry: &str) -> Option<UserRecord> {
        let (name, roles) = match entry.split_once(':') {
            Some((name, roles)) => (name.trim(), roles),
            None => (entry.trim(), ""),
        };
        if name.is_empty() {
            return None;
        }
        let record = roles
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .fold(UserRecord::new(name), |record, role| record.with_role(role));
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl PrincipalResolver for StaticResolver {
    async fn load_by_name(&self, name: &str) -> Result<Principal, ResolveError> {
        self.users
            .get(name)
            .cloned()
            .map(Principal::Durable)
            .ok_or_else(|| ResolveError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl SupportsSynthesis for StaticResolver {
    async fn synthesize(
        &self,
        name: &str,
        attributes: &AssertedAttributes,
    ) -> Result<Option<Principal>, ResolveError> {
        debug!(user = %name, "Synthesizing transient principal");
        Ok(Some(Principal::Transient(TransientPrincipal::new(
            name,
            attributes.clone(),
            self.transient_roles.clone(),
        ))))
    }
}
