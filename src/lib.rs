//! Shibboleth identity reconciliation for Zentinel
//!
//! The Shibboleth SP agent in front of the application authenticates the
//! user and forwards the assertion as request headers or server variables.
//! This crate turns that assertion into a session token on every request:
//!
//! - [`schema`] maps attribute aliases to metadata keys
//! - [`assertion`] reads and decodes the asserted attributes
//! - [`principal`] loads or synthesizes the account behind the assertion
//! - [`reconcile`] replaces the session token when the assertion changes
//! - [`redirect`] builds login and logout URLs against the SP handler

pub mod assertion;
pub mod config;
pub mod error;
pub mod principal;
pub mod reconcile;
pub mod redirect;
pub mod schema;
pub mod session;

pub use assertion::{AssertedAttributes, AssertionExtractor, MetadataMode, RequestContext};
pub use config::{ShibbolethConfig, ShibbolethConfigJson};
pub use error::{AuthError, ResolveError, SchemaError};
pub use principal::{
    Principal, PrincipalResolver, ResolverHandle, StaticResolver, SupportsSynthesis,
};
pub use reconcile::{ReconciliationEngine, ReconciliationResult, TracingEventSink};
pub use redirect::{LogoutHandler, RedirectNegotiator};
pub use schema::{Alias, AttributeSchema};
pub use session::{MemorySession, SessionStore, SessionToken};
