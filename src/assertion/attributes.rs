//! Typed attribute values asserted for one request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::schema::Alias;

/// Value of one asserted attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Scalar(String),
    List(Vec<String>),
}

impl AttributeValue {
    /// First value; a scalar is its own first value.
    pub fn first(&self) -> Option<&str> {
        match self {
            AttributeValue::Scalar(s) => Some(s),
            AttributeValue::List(values) => values.first().map(|s| s.as_str()),
        }
    }

    /// All values as a slice; a scalar is a one-element slice.
    pub fn values(&self) -> &[String] {
        match self {
            AttributeValue::Scalar(s) => std::slice::from_ref(s),
            AttributeValue::List(values) => values,
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().iter().any(|v| v == value)
    }
}

/// Attributes extracted from the current request, keyed by alias.
///
/// Absent attributes are never present as empty entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertedAttributes(BTreeMap<Alias, AttributeValue>);

impl AssertedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: Alias, value: AttributeValue) {
        self.0.insert(alias, value);
    }

    pub fn get(&self, alias: &Alias) -> Option<&AttributeValue> {
        self.0.get(alias)
    }

    pub fn contains(&self, alias: &Alias) -> bool {
        self.0.contains_key(alias)
    }

    /// First value of an attribute.
    pub fn first(&self, alias: &Alias) -> Option<&str> {
        self.get(alias).and_then(AttributeValue::first)
    }

    /// All values of an attribute, empty when absent.
    pub fn values(&self, alias: &Alias) -> &[String] {
        self.get(alias).map(AttributeValue::values).unwrap_or_default()
    }

    /// True when the attribute is present and, if `value` is given, holds it.
    pub fn has_value(&self, alias: &Alias, value: Option<&str>) -> bool {
        match (self.get(alias), value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(attr), Some(v)) => attr.contains(v),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Alias, &AttributeValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Alias, AttributeValue)> for AssertedAttributes {
    fn from_iter<T: IntoIterator<Item = (Alias, AttributeValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AssertedAttributes {
        [
            (Alias::UID, AttributeValue::Scalar("u0012345".to_string())),
            (
                Alias::AFFILIATION,
                AttributeValue::List(vec!["member".to_string(), "staff".to_string()]),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_first_and_values() {
        let attrs = sample();
        assert_eq!(attrs.first(&Alias::UID), Some("u0012345"));
        assert_eq!(attrs.values(&Alias::UID), ["u0012345".to_string()]);
        assert_eq!(attrs.first(&Alias::AFFILIATION), Some("member"));
        assert_eq!(attrs.values(&Alias::AFFILIATION).len(), 2);
        assert!(attrs.values(&Alias::MAIL).is_empty());
    }

    #[test]
    fn test_has_value() {
        let attrs = sample();
        assert!(attrs.has_value(&Alias::AFFILIATION, None));
        assert!(attrs.has_value(&Alias::AFFILIATION, Some("staff")));
        assert!(!attrs.has_value(&Alias::AFFILIATION, Some("student")));
        assert!(!attrs.has_value(&Alias::MAIL, None));
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["uid"], "u0012345");
        assert_eq!(json["affiliation"][1], "staff");
    }
}
