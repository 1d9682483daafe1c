//! Attribute aliases, charsets and definitions.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::SchemaError;

/// Logical attribute name, unique within a schema.
///
/// Well-known aliases are available as constants; custom aliases are
/// validated once through [`Alias::parse`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(Cow<'static, str>);

impl Alias {
    pub const UID: Alias = Alias::well_known("uid");
    pub const COMMON_NAME: Alias = Alias::well_known("cn");
    pub const SURNAME: Alias = Alias::well_known("sn");
    pub const GIVEN_NAME: Alias = Alias::well_known("givenName");
    pub const MAIL: Alias = Alias::well_known("mail");
    pub const AFFILIATION: Alias = Alias::well_known("affiliation");
    pub const SCOPED_AFFILIATION: Alias = Alias::well_known("scopedAffiliation");
    pub const LOGOUT_URL: Alias = Alias::well_known("logoutURL");
    pub const IDENTITY_PROVIDER: Alias = Alias::well_known("identityProvider");

    const fn well_known(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Validate and build an alias from configuration input.
    pub fn parse(name: &str) -> Result<Self, SchemaError> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidAlias(name.to_string()));
        }
        Ok(Self(Cow::Owned(name.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Alias {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Alias::parse(&value)
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.0.into_owned()
    }
}

impl std::fmt::Display for Alias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Charset of an inbound attribute value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    /// Passed through unchanged.
    #[default]
    #[serde(rename = "ISO-8859-1", alias = "default", alias = "iso-8859-1", alias = "latin1")]
    Default,
    /// UTF-8 bytes delivered as Latin-1 characters; transcoded on extraction.
    #[serde(rename = "UTF-8", alias = "utf8", alias = "utf-8", alias = "UTF8")]
    Utf8,
}

/// Mapping from an alias to the raw metadata key carrying its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub alias: Alias,
    /// Header or server variable name, matched case-insensitively.
    pub source_key: String,
    /// Split the value on `;` into an ordered list.
    #[serde(default)]
    pub multivalue: bool,
    #[serde(default)]
    pub charset: Charset,
}

impl AttributeDefinition {
    /// Single-valued definition with the default charset.
    pub fn new(alias: Alias, source_key: impl Into<String>) -> Self {
        Self {
            alias,
            source_key: source_key.into(),
            multivalue: false,
            charset: Charset::Default,
        }
    }

    pub fn multivalue(mut self) -> Self {
        self.multivalue = true;
        self
    }

    pub fn utf8(mut self) -> Self {
        self.charset = Charset::Utf8;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_parse() {
        assert_eq!(Alias::parse("uid").unwrap(), Alias::UID);
        assert!(Alias::parse("").is_err());
        assert!(Alias::parse("has space").is_err());
    }

    #[test]
    fn test_charset_names() {
        let utf8: Charset = serde_json::from_str("\"UTF-8\"").unwrap();
        assert_eq!(utf8, Charset::Utf8);
        let latin: Charset = serde_json::from_str("\"ISO-8859-1\"").unwrap();
        assert_eq!(latin, Charset::Default);
        let default: Charset = serde_json::from_str("\"default\"").unwrap();
        assert_eq!(default, Charset::Default);
    }

    #[test]
    fn test_definition_builder_defaults() {
        let def = AttributeDefinition::new(Alias::MAIL, "shib-person-mail");
        assert!(!def.multivalue);
        assert_eq!(def.charset, Charset::Default);

        let def = def.multivalue().utf8();
        assert!(def.multivalue);
        assert_eq!(def.charset, Charset::Utf8);
    }
}
