//! Reads SSO attributes from request metadata through the schema.

use std::sync::Arc;
use tracing::{debug, warn};

use super::attributes::{AssertedAttributes, AttributeValue};
use super::source::{MetadataMode, MetadataSource, RequestContext, RequestMetadata};
use crate::error::{AttributeError, SchemaError};
use crate::schema::{Alias, AttributeDefinition, AttributeSchema, Charset};

/// Extracts the asserted principal and attributes from a request.
#[derive(Debug, Clone)]
pub struct AssertionExtractor {
    schema: Arc<AttributeSchema>,
    mode: MetadataMode,
    username_key: String,
    identity_provider_key: String,
}

impl AssertionExtractor {
    /// Create an extractor. Both aliases must be defined in `schema`.
    pub fn new(
        schema: Arc<AttributeSchema>,
        mode: MetadataMode,
        username_alias: &Alias,
        identity_provider_alias: &Alias,
    ) -> Result<Self, SchemaError> {
        let username_key = schema.resolve(username_alias)?.source_key.clone();
        let identity_provider_key = schema.resolve(identity_provider_alias)?.source_key.clone();

        Ok(Self {
            schema,
            mode,
            username_key,
            identity_provider_key,
        })
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn mode(&self) -> MetadataMode {
        self.mode
    }

    /// Metadata view of `request` for the configured mode.
    pub fn metadata<'r>(&self, request: &'r RequestContext) -> RequestMetadata<'r> {
        request.metadata(self.mode)
    }

    /// True iff the identity-provider indicator is present and non-empty.
    pub fn is_authenticated<M: MetadataSource + ?Sized>(&self, meta: &M) -> bool {
        meta.get(&self.identity_provider_key)
            .is_some_and(|idp| !idp.is_empty())
    }

    /// Asserted principal name, empty when absent.
    pub fn principal_name<M: MetadataSource + ?Sized>(&self, meta: &M) -> String {
        meta.get(&self.username_key).unwrap_or_default().to_string()
    }

    /// All schema attributes present in `meta`.
    ///
    /// Returns an empty map for unauthenticated requests. Attributes that
    /// fail charset transcoding are dropped individually.
    pub fn extract_attributes<M: MetadataSource + ?Sized>(&self, meta: &M) -> AssertedAttributes {
        let mut attributes = AssertedAttributes::new();
        if !self.is_authenticated(meta) {
            return attributes;
        }

        for def in self.schema.iter() {
            let Some(raw) = meta.get(&def.source_key) else {
                continue;
            };
            match decode_value(def, raw) {
                Ok(value) => attributes.insert(def.alias.clone(), value),
                Err(e) => warn!(
                    error = %e,
                    source_key = %def.source_key,
                    "Dropping malformed attribute"
                ),
            }
        }

        debug!(count = attributes.len(), "Extracted asserted attributes");
        attributes
    }
}

/// Apply charset and multivalue handling to one raw value.
fn decode_value(def: &AttributeDefinition, raw: &str) -> Result<AttributeValue, AttributeError> {
    let value = match def.charset {
        Charset::Default => raw.to_string(),
        Charset::Utf8 => latin1_to_utf8(raw).map_err(|reason| AttributeError::Malformed {
            alias: def.alias.to_string(),
            reason,
        })?,
    };

    if def.multivalue {
        Ok(AttributeValue::List(value.split(';').map(String::from).collect()))
    } else {
        Ok(AttributeValue::Scalar(value))
    }
}

/// Reinterpret a value whose chars are Latin-1 bytes as UTF-8.
fn latin1_to_utf8(raw: &str) -> Result<String, String> {
    let bytes = raw
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c)).map_err(|_| format!("character {c:?} is outside Latin-1"))
        })
        .collect::<Result<Vec<u8>, String>>()?;
    String::from_utf8(bytes).map_err(|e| format!("invalid UTF-8 sequence: {e}"))
}
