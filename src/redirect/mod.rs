//! Redirects to the SSO agent's session initiator and logout endpoints.

pub mod logout;
pub mod negotiator;

pub use logout::LogoutHandler;
pub use negotiator::RedirectNegotiator;
