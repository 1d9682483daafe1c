//! Principal resolver capability traits.

use async_trait::async_trait;
use std::sync::Arc;

use super::types::Principal;
use crate::assertion::AssertedAttributes;
use crate::error::ResolveError;

/// Looks up durable principals by name.
///
/// Retry and timeout policy belong to the implementation; the engine
/// calls each method once per reconciliation.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Return the durable principal for `name`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no account exists
    /// - `Unavailable` if the backend cannot answer
    async fn load_by_name(&self, name: &str) -> Result<Principal, ResolveError>;
}

/// Resolvers that can build a principal for an unknown name.
#[async_trait]
pub trait SupportsSynthesis: PrincipalResolver {
    /// Build a principal from the asserted attributes. `Ok(None)` falls back
    /// to a bare principal carrying only the name.
    async fn synthesize(
        &self,
        name: &str,
        attributes: &AssertedAttributes,
    ) -> Result<Option<Principal>, ResolveError>;
}

/// Resolver plus its synthesis capability, fixed at construction.
#[derive(Clone)]
pub struct ResolverHandle {
    loader: Arc<dyn PrincipalResolver>,
    synthesizer: Option<Arc<dyn SupportsSynthesis>>,
}

impl ResolverHandle {
    /// Resolver without synthesis: unknown names are hard failures.
    pub fn new(resolver: Arc<dyn PrincipalResolver>) -> Self {
        Self {
            loader: resolver,
            synthesizer: None,
        }
    }

    /// Resolver that synthesizes principals for unknown names.
    pub fn with_synthesis<R: SupportsSynthesis + 'static>(resolver: Arc<R>) -> Self {
        Self {
            loader: resolver.clone(),
            synthesizer: Some(resolver),
        }
    }

    pub fn can_synthesize(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub fn loader(&self) -> &dyn PrincipalResolver {
        self.loader.as_ref()
    }

    pub fn synthesizer(&self) -> Option<&dyn SupportsSynthesis> {
        self.synthesizer.as_deref()
    }
}

impl std::fmt::Debug for ResolverHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverHandle")
            .field("can_synthesize", &self.can_synthesize())
            .finish()
    }
}
