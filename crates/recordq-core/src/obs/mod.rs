//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! This module does not access store internals. Sessions and fetch builders
//! report through `sink::record` only.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EntitySummary, EventOps, EventPerf, EventReport, EventState};
pub use sink::{
    ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
