//! Session token produced by reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::assertion::AssertedAttributes;
use crate::principal::Principal;
use crate::schema::Alias;

/// Which mechanism produced a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenOrigin {
    /// Built by the reconciliation engine for the given provider key.
    Reconciled { provider_key: String },
    /// Any other authentication mechanism (form login, API key, ...).
    Foreign { mechanism: String },
}

/// Immutable authentication state of a session.
///
/// Updating a session means building a new token and replacing the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    id: Uuid,
    origin: TokenOrigin,
    principal: Principal,
    attributes: AssertedAttributes,
    roles: BTreeSet<String>,
    authenticated: bool,
    issued_at: DateTime<Utc>,
}

impl SessionToken {
    /// Authenticated token for a resolved principal. Roles are the
    /// principal's roles plus `default_role`.
    pub fn reconciled(
        provider_key: impl Into<String>,
        principal: Principal,
        attributes: AssertedAttributes,
        default_role: &str,
    ) -> Self {
        let mut roles = principal.roles();
        roles.insert(default_role.to_string());

        Self {
            id: Uuid::new_v4(),
            origin: TokenOrigin::Reconciled {
                provider_key: provider_key.into(),
            },
            principal,
            attributes,
            roles,
            authenticated: true,
            issued_at: Utc::now(),
        }
    }

    /// Token issued by another authentication mechanism.
    pub fn foreign(
        mechanism: impl Into<String>,
        principal: Principal,
        authenticated: bool,
    ) -> Self {
        let roles = principal.roles();
        Self {
            id: Uuid::new_v4(),
            origin: TokenOrigin::Foreign {
                mechanism: mechanism.into(),
            },
            principal,
            attributes: AssertedAttributes::new(),
            roles,
            authenticated,
            issued_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn origin(&self) -> &TokenOrigin {
        &self.origin
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn name(&self) -> &str {
        self.principal.name()
    }

    pub fn attributes(&self) -> &AssertedAttributes {
        &self.attributes
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// True if this token was produced by reconciliation under `provider_key`.
    pub fn is_reconciled_by(&self, provider_key: &str) -> bool {
        matches!(&self.origin, TokenOrigin::Reconciled { provider_key: key } if key == provider_key)
    }

    /// Common name, or the principal name when absent.
    pub fn display_name(&self) -> &str {
        self.common_name().unwrap_or_else(|| self.name())
    }

    pub fn common_name(&self) -> Option<&str> {
        self.attributes.first(&Alias::COMMON_NAME)
    }

    /// Alias for [`common_name`](Self::common_name).
    pub fn full_name(&self) -> Option<&str> {
        self.common_name()
    }

    pub fn surname(&self) -> Option<&str> {
        self.attributes.first(&Alias::SURNAME)
    }

    pub fn given_name(&self) -> Option<&str> {
        self.attributes.first(&Alias::GIVEN_NAME)
    }

    pub fn mail(&self) -> Option<&str> {
        self.attributes.first(&Alias::MAIL)
    }

    pub fn mails(&self) -> &[String] {
        self.attributes.values(&Alias::MAIL)
    }

    pub fn uid(&self) -> Option<&str> {
        self.attributes.first(&Alias::UID)
    }

    pub fn affiliation(&self) -> Option<&str> {
        self.attributes.first(&Alias::AFFILIATION)
    }

    pub fn scoped_affiliation(&self) -> Option<&str> {
        self.attributes.first(&Alias::SCOPED_AFFILIATION)
    }

    pub fn logout_url(&self) -> Option<&str> {
        self.attributes.first(&Alias::LOGOUT_URL)
    }

    pub fn has_affiliation(&self, value: Option<&str>) -> bool {
        self.attributes.has_value(&Alias::AFFILIATION, value)
    }

    pub fn has_scoped_affiliation(&self, value: Option<&str>) -> bool {
        self.attributes.has_value(&Alias::SCOPED_AFFILIATION, value)
    }

    pub fn is_member(&self, scope: Option<&str>) -> bool {
        self.affiliated_as("member", scope)
    }

    pub fn is_employee(&self, scope: Option<&str>) -> bool {
        self.affiliated_as("employee", scope)
    }

    pub fn is_student(&self, scope: Option<&str>) -> bool {
        self.affiliated_as("student", scope)
    }

    pub fn is_staff(&self, scope: Option<&str>) -> bool {
        self.affiliated_as("staff", scope)
    }

    pub fn is_faculty(&self, scope: Option<&str>) -> bool {
        self.affiliated_as("faculty", scope)
    }

    /// Unscoped affiliation without a scope, `role@scope` otherwise.
    fn affiliated_as(&self, role: &str, scope: Option<&str>) -> bool {
        match scope.filter(|s| !s.is_empty()) {
            None => self.has_affiliation(Some(role)),
            Some(scope) => self.has_scoped_affiliation(Some(format!("{role}@{scope}").as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::AttributeValue;
    use crate::principal::UserRecord;

    fn token_with(attributes: AssertedAttributes) -> SessionToken {
        SessionToken::reconciled("shibboleth", Principal::bare("u0012345"), attributes, "USER")
    }

    fn list(values: &[&str]) -> AttributeValue {
        AttributeValue::List(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_reconciled_roles_include_default() {
        let principal = Principal::Durable(UserRecord::new("alice").with_role("ADMIN"));
        let token =
            SessionToken::reconciled("shibboleth", principal, AssertedAttributes::new(), "USER");
        assert!(token.is_authenticated());
        assert!(token.has_role("ADMIN"));
        assert!(token.has_role("USER"));
        assert!(token.is_reconciled_by("shibboleth"));
        assert!(!token.is_reconciled_by("other"));
    }

    #[test]
    fn test_foreign_token() {
        let token = SessionToken::foreign("form_login", Principal::bare("alice"), true);
        assert!(token.is_authenticated());
        assert!(!token.is_reconciled_by("shibboleth"));
        assert!(token.roles().is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_principal() {
        let token = token_with(AssertedAttributes::new());
        assert_eq!(token.display_name(), "u0012345");

        let attrs = [(Alias::COMMON_NAME, AttributeValue::Scalar("Alice Peeters".to_string()))]
            .into_iter()
            .collect();
        let token = token_with(attrs);
        assert_eq!(token.display_name(), "Alice Peeters");
        assert_eq!(token.full_name(), Some("Alice Peeters"));
    }

    #[test]
    fn test_affiliation_predicates() {
        let attrs = [
            (Alias::AFFILIATION, list(&["member", "staff"])),
            (Alias::SCOPED_AFFILIATION, list(&["member@kuleuven.be", "staff@kuleuven.be"])),
            (Alias::MAIL, list(&["alice@kuleuven.be", "alice@example.org"])),
        ]
        .into_iter()
        .collect();
        let token = token_with(attrs);

        assert!(token.is_member(None));
        assert!(token.is_staff(None));
        assert!(!token.is_student(None));
        assert!(token.is_member(Some("kuleuven.be")));
        assert!(!token.is_member(Some("example.org")));
        assert!(!token.is_faculty(Some("kuleuven.be")));
        assert_eq!(token.mail(), Some("alice@kuleuven.be"));
        assert_eq!(token.mails().len(), 2);
    }
}
