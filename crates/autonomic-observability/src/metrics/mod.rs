//! Control-loop metrics.

mod loop_metrics;

pub use loop_metrics::{LoopMetrics, MetricsSnapshot};
