//! Shibboleth reconciliation configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::assertion::MetadataMode;
use crate::error::SchemaError;
use crate::schema::{Alias, AttributeDefinition, AttributeSchema, Charset};

/// Attribute definition override from configuration, keyed by alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDefinitionConfig {
    /// Header (or server variable) carrying the value.
    pub header: String,

    /// Split on `;` into a list.
    #[serde(default)]
    pub multivalue: bool,

    /// `UTF-8` or `ISO-8859-1`.
    #[serde(default)]
    pub charset: Charset,
}

/// Shibboleth reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShibbolethConfig {
    /// Path of the Shibboleth handler on this host.
    #[serde(default = "default_handler_path")]
    pub handler_path: String,

    /// Handler is only reachable over HTTPS.
    #[serde(default = "default_true")]
    pub secured_handler: bool,

    /// Session initiator path, appended to the handler path.
    #[serde(default = "default_session_initiator_path")]
    pub session_initiator_path: String,

    /// Alias of the attribute naming the principal.
    #[serde(default = "default_username_attribute")]
    pub username_attribute: String,

    /// Alias of the attribute whose presence marks an authenticated request.
    #[serde(default = "default_identity_provider_attribute")]
    pub identity_provider_attribute: String,

    /// Alias of the provider-supplied logout redirect attribute.
    #[serde(default = "default_logout_url_attribute")]
    pub logout_url_attribute: String,

    /// Read attributes from headers (true) or server variables (false).
    #[serde(default = "default_true")]
    pub use_headers: bool,

    /// Role added to every reconciled token.
    #[serde(default = "default_role")]
    pub default_role: String,

    /// Tag identifying tokens produced by this engine.
    #[serde(default = "default_provider_key")]
    pub provider_key: String,

    /// Redirect to the session initiator on authentication failure.
    #[serde(default = "default_true")]
    pub use_login_redirect: bool,

    /// Return target after logout (defaults to the Referer header).
    #[serde(default)]
    pub logout_target: Option<String>,

    /// Attribute definition overrides, merged over the built-in table.
    #[serde(default)]
    pub attribute_definitions: BTreeMap<String, AttributeDefinitionConfig>,
}

fn default_handler_path() -> String {
    "/Shibboleth.sso".to_string()
}

fn default_session_initiator_path() -> String {
    "/Login".to_string()
}

fn default_username_attribute() -> String {
    "uid".to_string()
}

fn default_identity_provider_attribute() -> String {
    "identityProvider".to_string()
}

fn default_logout_url_attribute() -> String {
    "logoutURL".to_string()
}

fn default_role() -> String {
    "USER".to_string()
}

fn default_provider_key() -> String {
    "shibboleth".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ShibbolethConfig {
    fn default() -> Self {
        Self {
            handler_path: default_handler_path(),
            secured_handler: true,
            session_initiator_path: default_session_initiator_path(),
            username_attribute: default_username_attribute(),
            identity_provider_attribute: default_identity_provider_attribute(),
            logout_url_attribute: default_logout_url_attribute(),
            use_headers: true,
            default_role: default_role(),
            provider_key: default_provider_key(),
            use_login_redirect: true,
            logout_target: None,
            attribute_definitions: BTreeMap::new(),
        }
    }
}

impl ShibbolethConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.handler_path.starts_with('/') {
            return Err("handler_path must start with '/'".to_string());
        }

        if !self.session_initiator_path.starts_with('/') {
            return Err("session_initiator_path must start with '/'".to_string());
        }

        if self.default_role.trim().is_empty() {
            return Err("default_role must not be empty".to_string());
        }

        if self.provider_key.trim().is_empty() {
            return Err("provider_key must not be empty".to_string());
        }

        let schema = self.build_schema().map_err(|e| e.to_string())?;
        for alias in [
            &self.username_attribute,
            &self.identity_provider_attribute,
            &self.logout_url_attribute,
        ] {
            let alias = Alias::parse(alias).map_err(|e| e.to_string())?;
            schema.resolve(&alias).map_err(|e| e.to_string())?;
        }

        Ok(())
    }

    pub fn metadata_mode(&self) -> MetadataMode {
        MetadataMode::from_use_headers(self.use_headers)
    }

    /// Built-in attribute table merged with the configured overrides.
    pub fn build_schema(&self) -> Result<AttributeSchema, SchemaError> {
        let mut schema = AttributeSchema::with_defaults();
        for (alias, def) in &self.attribute_definitions {
            schema.register(AttributeDefinition {
                alias: Alias::parse(alias)?,
                source_key: def.header.clone(),
                multivalue: def.multivalue,
                charset: def.charset,
            })?;
        }
        Ok(schema)
    }

    pub fn username_alias(&self) -> Result<Alias, SchemaError> {
        Alias::parse(&self.username_attribute)
    }

    pub fn identity_provider_alias(&self) -> Result<Alias, SchemaError> {
        Alias::parse(&self.identity_provider_attribute)
    }

    pub fn logout_url_alias(&self) -> Result<Alias, SchemaError> {
        Alias::parse(&self.logout_url_attribute)
    }
}

/// JSON configuration for dynamic reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ShibbolethConfigJson {
    pub handler_path: Option<String>,
    pub secured_handler: Option<bool>,
    pub session_initiator_path: Option<String>,
    pub username_attribute: Option<String>,
    pub identity_provider_attribute: Option<String>,
    pub logout_url_attribute: Option<String>,
    pub use_headers: Option<bool>,
    pub default_role: Option<String>,
    pub provider_key: Option<String>,
    pub use_login_redirect: Option<bool>,
    pub logout_target: Option<String>,
    #[serde(default)]
    pub attribute_definitions: BTreeMap<String, AttributeDefinitionConfig>,
}

impl ShibbolethConfigJson {
    /// Merge JSON config into existing config.
    pub fn apply_to(&self, config: &mut ShibbolethConfig) {
        if let Some(ref path) = self.handler_path {
            config.handler_path = path.clone();
        }
        if let Some(secured) = self.secured_handler {
            config.secured_handler = secured;
        }
        if let Some(ref path) = self.session_initiator_path {
            config.session_initiator_path = path.clone();
        }
        if let Some(ref alias) = self.username_attribute {
            config.username_attribute = alias.clone();
        }
        if let Some(ref alias) = self.identity_provider_attribute {
            config.identity_provider_attribute = alias.clone();
        }
        if let Some(ref alias) = self.logout_url_attribute {
            config.logout_url_attribute = alias.clone();
        }
        if let Some(use_headers) = self.use_headers {
            config.use_headers = use_headers;
        }
        if let Some(ref role) = self.default_role {
            config.default_role = role.clone();
        }
        if let Some(ref key) = self.provider_key {
            config.provider_key = key.clone();
        }
        if let Some(redirect) = self.use_login_redirect {
            config.use_login_redirect = redirect;
        }
        if let Some(ref target) = self.logout_target {
            config.logout_target = Some(target.clone());
        }
        for (alias, def) in &self.attribute_definitions {
            config
                .attribute_definitions
                .insert(alias.clone(), def.clone());
        }
    }
}
