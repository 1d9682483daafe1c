//! Reconciliation of asserted identity with session state.

pub mod engine;
pub mod events;

pub use engine::{ReconciliationEngine, ReconciliationResult};
pub use events::{EventSink, TracingEventSink};
