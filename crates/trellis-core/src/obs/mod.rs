//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! The engine never logs. Index and relation code report structural
//! changes as `MetricsEvent`s; callers decide what to surface.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventReport, KindCounters};
pub use sink::{
    MetricsEvent, MetricsSink, metrics_enabled, metrics_report, metrics_reset_all,
    set_metrics_enabled, with_metrics_sink,
};
