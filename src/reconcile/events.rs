//! Authentication event notification.

use tracing::info;

use crate::assertion::RequestContext;
use crate::session::SessionToken;

/// Notified after a session is authenticated by reconciliation.
pub trait EventSink: Send + Sync {
    fn on_authenticated(&self, request: &RequestContext, token: &SessionToken);
}

/// Emits an audit log line for each interactive login.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn on_authenticated(&self, request: &RequestContext, token: &SessionToken) {
        info!(
            user_id = %token.name(),
            display_name = %token.display_name(),
            token_id = %token.id(),
            roles = ?token.roles(),
            host = %request.host,
            path = %request.path_and_query,
            "Interactive login"
        );
    }
}
