//! Principal resolution.
//!
//! The embedding application supplies a [`PrincipalResolver`]; resolvers that
//! can create principals for unknown names also implement [`SupportsSynthesis`].

pub mod resolver;
pub mod static_resolver;
pub mod types;

pub use resolver::{PrincipalResolver, ResolverHandle, SupportsSynthesis};
pub use static_resolver::StaticResolver;
pub use types::{Principal, TransientPrincipal, UserRecord};
