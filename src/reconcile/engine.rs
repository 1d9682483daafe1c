//! Per-request reconciliation of the SSO assertion with the session.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::events::EventSink;
use crate::assertion::{AssertedAttributes, AssertionExtractor, RequestContext};
use crate::config::ShibbolethConfig;
use crate::error::{AuthError, ResolveError};
use crate::principal::{Principal, ResolverHandle};
use crate::redirect::{LogoutHandler, RedirectNegotiator};
use crate::session::{SessionStore, SessionToken};

/// Outcome of one reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum ReconciliationResult {
    /// Session left as is.
    Unchanged,
    /// A new token replaced the session's current token.
    Authenticated(SessionToken),
    /// Authentication failed; send the client to this login URL.
    Redirect(String),
    /// Authentication failed and no login redirect is configured.
    Failed(#[serde(serialize_with = "serialize_display")] AuthError),
}

fn serialize_display<S: serde::Serializer>(err: &AuthError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Orchestrates extraction, principal resolution and token replacement.
///
/// Shared across request handlers; all per-request state lives in the
/// request and the session store passed to [`reconcile`](Self::reconcile).
pub struct ReconciliationEngine {
    extractor: AssertionExtractor,
    resolver: ResolverHandle,
    negotiator: RedirectNegotiator,
    provider_key: String,
    default_role: String,
    use_login_redirect: bool,
    logout_target: Option<String>,
    events: Option<Arc<dyn EventSink>>,
}

impl ReconciliationEngine {
    /// Build an engine from validated configuration.
    pub fn from_config(config: &ShibbolethConfig, resolver: ResolverHandle) -> Result<Self> {
        config.validate().map_err(|e| anyhow!(e))?;

        let schema = Arc::new(config.build_schema()?);
        let extractor = AssertionExtractor::new(
            Arc::clone(&schema),
            config.metadata_mode(),
            &config.username_alias()?,
            &config.identity_provider_alias()?,
        )?;
        let negotiator = RedirectNegotiator::from_config(config, &schema)?;

        info!(
            attributes = schema.len(),
            mode = ?config.metadata_mode(),
            can_synthesize = resolver.can_synthesize(),
            provider_key = %config.provider_key,
            "Reconciliation engine configured"
        );

        Ok(Self {
            extractor,
            resolver,
            negotiator,
            provider_key: config.provider_key.clone(),
            default_role: config.default_role.clone(),
            use_login_redirect: config.use_login_redirect,
            logout_target: config.logout_target.clone(),
            events: None,
        })
    }

    /// Attach an event sink notified on successful authentication.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn extractor(&self) -> &AssertionExtractor {
        &self.extractor
    }

    pub fn negotiator(&self) -> &RedirectNegotiator {
        &self.negotiator
    }

    /// Logout handler for sessions reconciled by this engine.
    pub fn logout_handler(&self) -> LogoutHandler {
        LogoutHandler::new(
            self.negotiator.clone(),
            self.provider_key.clone(),
            self.logout_target.clone(),
        )
    }

    /// Login URL for unauthenticated access, returning to the current request.
    pub fn entry_point(&self, request: &RequestContext) -> String {
        self.negotiator.login_url(request, None)
    }

    /// Reconcile the request's assertion with the session's current token.
    ///
    /// Failures never leave an authenticated token behind: the current token
    /// is cleared before `Redirect` or `Failed` is returned.
    pub async fn reconcile<S>(
        &self,
        request: &RequestContext,
        session: &mut S,
    ) -> ReconciliationResult
    where
        S: SessionStore + ?Sized,
    {
        let meta = self.extractor.metadata(request);

        if !self.extractor.is_authenticated(&meta) {
            debug!("No SSO assertion on request");
            return ReconciliationResult::Unchanged;
        }

        let name = self.extractor.principal_name(&meta);
        if name.is_empty() {
            debug!("SSO assertion carries no principal name");
            return ReconciliationResult::Unchanged;
        }

        if let Some(token) = session.current_token() {
            if token.is_authenticated() {
                if !token.is_reconciled_by(&self.provider_key) {
                    debug!(origin = ?token.origin(), "Session authenticated by another mechanism");
                    return ReconciliationResult::Unchanged;
                }
                if token.name() == name {
                    debug!(user_id = %name, "Session principal matches assertion");
                    return ReconciliationResult::Unchanged;
                }
                debug!(previous = %token.name(), user_id = %name, "Asserted principal changed");
            }
        }

        let attributes = self.extractor.extract_attributes(&meta);
        debug!(user_id = %name, attributes = attributes.len(), "Resolving asserted principal");

        match self.resolve(&name, &attributes).await {
            Ok(principal) => {
                let token = SessionToken::reconciled(
                    self.provider_key.as_str(),
                    principal,
                    attributes,
                    &self.default_role,
                );
                info!(
                    user_id = %token.name(),
                    token_id = %token.id(),
                    transient = token.principal().is_transient(),
                    "Shibboleth authentication successful"
                );

                session.set_current_token(Some(token.clone()));
                if let Some(ref sink) = self.events {
                    sink.on_authenticated(request, &token);
                }
                ReconciliationResult::Authenticated(token)
            }
            Err(e) => {
                session.set_current_token(None);

                match e {
                    AuthError::ResolverUnavailable { .. } => warn!(
                        user_id = %name,
                        error = %e,
                        code = e.code(),
                        "Principal resolver unavailable"
                    ),
                    _ => info!(
                        user_id = %name,
                        error = %e,
                        code = e.code(),
                        "Shibboleth authentication failed"
                    ),
                }

                if self.use_login_redirect {
                    ReconciliationResult::Redirect(self.negotiator.login_url(request, None))
                } else {
                    ReconciliationResult::Failed(e)
                }
            }
        }
    }

    /// Load the durable principal, falling back to synthesis when supported.
    async fn resolve(
        &self,
        name: &str,
        attributes: &AssertedAttributes,
    ) -> Result<Principal, AuthError> {
        let principal = match self.resolver.loader().load_by_name(name).await {
            Ok(principal) => principal,
            Err(ResolveError::NotFound(_)) => match self.resolver.synthesizer() {
                Some(synthesizer) => {
                    debug!(user_id = %name, "No durable account, synthesizing principal");
                    synthesizer
                        .synthesize(name, attributes)
                        .await
                        .map_err(|e| auth_error(name, e))?
                        .unwrap_or_else(|| Principal::bare(name))
                }
                None => {
                    return Err(AuthError::PrincipalNotFound {
                        name: name.to_string(),
                    })
                }
            },
            Err(e) => return Err(auth_error(name, e)),
        };

        if let Principal::Durable(ref record) = principal {
            if !record.enabled {
                return Err(AuthError::AccountDisabled {
                    name: record.name.clone(),
                });
            }
        }

        Ok(principal)
    }
}

fn auth_error(name: &str, err: ResolveError) -> AuthError {
    match err {
        ResolveError::NotFound(_) => AuthError::PrincipalNotFound {
            name: name.to_string(),
        },
        ResolveError::Unavailable(reason) => AuthError::ResolverUnavailable {
            name: name.to_string(),
            reason,
        },
    }
}
