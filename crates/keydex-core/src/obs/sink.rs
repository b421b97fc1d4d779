//! Metrics sink boundary.
//!
//! Executors never touch counters directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.

use std::fmt;

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Load,
    Save,
    Delete,
    Flush,
}

impl fmt::Display for ExecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Load => "load",
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Flush => "flush",
        };
        write!(f, "{label}")
    }
}

///
/// LookupKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LookupKind {
    Equality,
    Near,
    Members,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    ExecStart {
        kind: ExecKind,
        keyspace: &'a str,
    },
    ExecFinish {
        kind: ExecKind,
        keyspace: &'a str,
        rows_touched: u64,
    },
    IndexDelta {
        keyspace: &'a str,
        inserts: u64,
        removes: u64,
    },
    IndexLookup {
        kind: LookupKind,
        keyspace: &'a str,
        hits: u64,
    },
    ReferenceMiss {
        keyspace: &'a str,
        field: &'a str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// TracingSink
/// Default sink: forwards every event to `tracing` at trace level.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ExecStart { kind, keyspace } => {
                tracing::trace!(%kind, keyspace, "exec start");
            }
            MetricsEvent::ExecFinish {
                kind,
                keyspace,
                rows_touched,
            } => {
                tracing::trace!(%kind, keyspace, rows_touched, "exec finish");
            }
            MetricsEvent::IndexDelta {
                keyspace,
                inserts,
                removes,
            } => {
                tracing::trace!(keyspace, inserts, removes, "index delta");
            }
            MetricsEvent::IndexLookup {
                kind,
                keyspace,
                hits,
            } => {
                tracing::trace!(?kind, keyspace, hits, "index lookup");
            }
            MetricsEvent::ReferenceMiss { keyspace, field } => {
                tracing::trace!(keyspace, field, "reference miss");
            }
        }
    }
}

///
/// Span
/// Records `ExecStart` on creation and `ExecFinish` on drop.
///

pub(crate) struct Span<'a> {
    sink: &'a dyn MetricsSink,
    kind: ExecKind,
    keyspace: &'a str,
    rows: u64,
}

impl<'a> Span<'a> {
    pub(crate) fn new(sink: &'a dyn MetricsSink, kind: ExecKind, keyspace: &'a str) -> Self {
        sink.record(MetricsEvent::ExecStart { kind, keyspace });

        Self {
            sink,
            kind,
            keyspace,
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        self.sink.record(MetricsEvent::ExecFinish {
            kind: self.kind,
            keyspace: self.keyspace,
            rows_touched: self.rows,
        });
    }
}
