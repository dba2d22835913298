//! # autonomic-observability
//!
//! Structured tracing (subscriber setup, one event function per domain
//! event, span macros per loop stage) and lock-free control-loop metrics.
//! Nothing here installs global state on its own: the host process calls
//! [`tracing_setup::init_tracing`] if it wants a subscriber.

pub mod metrics;
pub mod tracing_setup;

#[doc(hidden)]
pub use tracing;

pub use metrics::{LoopMetrics, MetricsSnapshot};
