//! Login and logout URLs against the Shibboleth handler.

use tracing::debug;

use crate::assertion::{MetadataMode, MetadataSource, RequestContext};
use crate::config::ShibbolethConfig;
use crate::error::SchemaError;
use crate::schema::AttributeSchema;

/// Builds session-initiator and logout URLs for the SSO agent.
#[derive(Debug, Clone)]
pub struct RedirectNegotiator {
    handler_path: String,
    secured_handler: bool,
    session_initiator_path: String,
    /// Metadata key carrying the provider-supplied logout redirect.
    logout_url_key: String,
    mode: MetadataMode,
}

impl RedirectNegotiator {
    pub fn new(
        handler_path: impl Into<String>,
        secured_handler: bool,
        session_initiator_path: impl Into<String>,
        logout_url_key: impl Into<String>,
        mode: MetadataMode,
    ) -> Self {
        Self {
            handler_path: handler_path.into(),
            secured_handler,
            session_initiator_path: session_initiator_path.into(),
            logout_url_key: logout_url_key.into(),
            mode,
        }
    }

    /// Build from configuration, resolving the logout alias through `schema`.
    pub fn from_config(
        config: &ShibbolethConfig,
        schema: &AttributeSchema,
    ) -> Result<Self, SchemaError> {
        let logout_alias = config.logout_url_alias()?;
        let logout_url_key = schema.resolve(&logout_alias)?.source_key.clone();

        Ok(Self::new(
            config.handler_path.clone(),
            config.secured_handler,
            config.session_initiator_path.clone(),
            logout_url_key,
            config.metadata_mode(),
        ))
    }

    /// `scheme://host` plus the handler path.
    pub fn handler_url(&self, request: &RequestContext) -> String {
        let scheme = if self.secured_handler { "https" } else { "http" };
        format!("{}://{}{}", scheme, request.host, self.handler_path)
    }

    /// URL that starts an SSO session and returns to `target`, or to the
    /// current request URI when no target is given.
    pub fn login_url(&self, request: &RequestContext, target: Option<&str>) -> String {
        let target = match target.filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => request.current_uri(),
        };

        let url = format!(
            "{}{}?target={}",
            self.handler_url(request),
            self.session_initiator_path,
            urlencoding::encode(&target)
        );
        debug!(url = %url, "Built login URL");
        url
    }

    /// URL that ends the SSO session.
    ///
    /// A provider-supplied logout redirect takes precedence and wraps
    /// `return_to`; otherwise `return_to` is used directly if given.
    pub fn logout_url(&self, request: &RequestContext, return_to: Option<&str>) -> String {
        let return_to = return_to.filter(|r| !r.is_empty());
        let meta = request.metadata(self.mode);
        let provider_logout = meta.get(&self.logout_url_key).filter(|u| !u.is_empty());
        let logout = format!("{}/Logout", self.handler_url(request));

        let url = match (provider_logout, return_to) {
            (Some(provider), Some(ret)) => format!(
                "{}?return={}",
                logout,
                urlencoding::encode(&format!("{}?return={}", provider, ret))
            ),
            (Some(provider), None) => {
                format!("{}?return={}", logout, urlencoding::encode(provider))
            }
            (None, Some(ret)) => format!("{}?return={}", logout, urlencoding::encode(ret)),
            (None, None) => logout,
        };
        debug!(url = %url, "Built logout URL");
        url
    }
}
