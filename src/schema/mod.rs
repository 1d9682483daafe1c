//! Attribute schema: logical alias to raw metadata key mapping.
//!
//! A schema is assembled once at startup (built-in defaults plus configured
//! overrides) and shared read-only across request handlers.

pub mod defaults;
pub mod definition;

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::SchemaError;

pub use defaults::default_definitions;
pub use definition::{Alias, AttributeDefinition, Charset};

/// Ordered set of attribute definitions keyed by alias.
#[derive(Debug, Clone, Default)]
pub struct AttributeSchema {
    definitions: Vec<AttributeDefinition>,
    index: HashMap<Alias, usize>,
}

impl AttributeSchema {
    /// Empty schema with no definitions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Schema seeded with the built-in attribute table.
    pub fn with_defaults() -> Self {
        let mut schema = Self::empty();
        for def in default_definitions() {
            if let Err(e) = schema.register(def) {
                warn!(error = %e, "Skipping built-in attribute definition");
            }
        }
        schema
    }

    /// Insert a definition, overwriting any existing one with the same alias.
    ///
    /// An overwritten definition keeps its original position.
    pub fn register(&mut self, def: AttributeDefinition) -> Result<(), SchemaError> {
        if def.source_key.trim().is_empty() {
            return Err(SchemaError::EmptySourceKey {
                alias: def.alias.to_string(),
            });
        }

        match self.index.get(&def.alias) {
            Some(&pos) => {
                debug!(
                    alias = %def.alias,
                    source_key = %def.source_key,
                    "Overriding attribute definition"
                );
                self.definitions[pos] = def;
            }
            None => {
                self.index.insert(def.alias.clone(), self.definitions.len());
                self.definitions.push(def);
            }
        }
        Ok(())
    }

    /// Look up a definition by alias.
    pub fn resolve(&self, alias: &Alias) -> Result<&AttributeDefinition, SchemaError> {
        self.get(alias)
            .ok_or_else(|| SchemaError::UnknownAlias(alias.to_string()))
    }

    pub fn get(&self, alias: &Alias) -> Option<&AttributeDefinition> {
        self.index.get(alias).map(|&pos| &self.definitions[pos])
    }

    /// Source key for an alias, if defined.
    pub fn source_key(&self, alias: &Alias) -> Option<&str> {
        self.get(alias).map(|def| def.source_key.as_str())
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
