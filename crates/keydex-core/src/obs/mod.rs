//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! This module does not access storage internals directly.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventReport, KeyspaceCounters, MetricsRecorder};
pub use sink::{ExecKind, LookupKind, MetricsEvent, MetricsSink, TracingSink};
