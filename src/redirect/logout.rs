//! Logout handling for reconciled sessions.

use tracing::{debug, info};

use super::negotiator::RedirectNegotiator;
use crate::assertion::RequestContext;
use crate::session::SessionStore;

/// Clears reconciled sessions and sends the user through the SSO logout.
#[derive(Debug, Clone)]
pub struct LogoutHandler {
    negotiator: RedirectNegotiator,
    provider_key: String,
    /// Fixed return target; the Referer header is used when unset.
    target: Option<String>,
}

impl LogoutHandler {
    pub fn new(
        negotiator: RedirectNegotiator,
        provider_key: impl Into<String>,
        target: Option<String>,
    ) -> Self {
        Self {
            negotiator,
            provider_key: provider_key.into(),
            target,
        }
    }

    /// Clear the current token if this provider produced it.
    ///
    /// Returns true when a token was cleared.
    pub fn logout(&self, session: &mut dyn SessionStore) -> bool {
        let owned = session
            .current_token()
            .is_some_and(|t| t.is_reconciled_by(&self.provider_key));

        if owned {
            if let Some(token) = session.current_token() {
                info!(
                    user_id = %token.name(),
                    token_id = %token.id(),
                    "Logging out reconciled session"
                );
            }
            session.set_current_token(None);
        } else {
            debug!("No reconciled token to clear on logout");
        }
        owned
    }

    /// Logout URL returning to the configured target or the referring page.
    pub fn logout_redirect(&self, request: &RequestContext) -> String {
        let target = self
            .target
            .as_deref()
            .or_else(|| request.header("referer"));
        self.negotiator.logout_url(request, target)
    }
}
