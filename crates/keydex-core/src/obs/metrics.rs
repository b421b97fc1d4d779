use crate::obs::sink::{ExecKind, LookupKind, MetricsEvent, MetricsSink};
use std::{collections::BTreeMap, sync::Mutex};

///
/// KeyspaceCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct KeyspaceCounters {
    pub load_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub flush_calls: u64,
    pub rows_loaded: u64,
    pub rows_deleted: u64,
}

///
/// EventReport
/// Point-in-time snapshot of everything a [`MetricsRecorder`] has seen.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EventReport {
    pub keyspaces: BTreeMap<String, KeyspaceCounters>,
    pub index_inserts: u64,
    pub index_removes: u64,
    pub equality_lookups: u64,
    pub near_lookups: u64,
    pub member_lookups: u64,
    pub reference_misses: u64,
}

impl EventReport {
    #[must_use]
    pub fn keyspace(&self, name: &str) -> KeyspaceCounters {
        self.keyspaces.get(name).cloned().unwrap_or_default()
    }
}

///
/// MetricsRecorder
/// In-memory sink that aggregates events into counters.
///

#[derive(Debug, Default)]
pub struct MetricsRecorder {
    state: Mutex<EventReport>,
}

impl MetricsRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the counters collected so far.
    #[must_use]
    pub fn report(&self) -> EventReport {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    pub fn reset(&self) {
        if let Ok(mut state) = self.state.lock() {
            *state = EventReport::default();
        }
    }
}

impl MetricsSink for MetricsRecorder {
    fn record(&self, event: MetricsEvent<'_>) {
        // a poisoned recorder drops events rather than failing the operation
        let Ok(mut m) = self.state.lock() else {
            return;
        };

        match event {
            MetricsEvent::ExecStart { kind, keyspace } => {
                let entry = m.keyspaces.entry(keyspace.to_string()).or_default();
                let calls = match kind {
                    ExecKind::Load => &mut entry.load_calls,
                    ExecKind::Save => &mut entry.save_calls,
                    ExecKind::Delete => &mut entry.delete_calls,
                    ExecKind::Flush => &mut entry.flush_calls,
                };
                *calls = calls.saturating_add(1);
            }
            MetricsEvent::ExecFinish {
                kind,
                keyspace,
                rows_touched,
            } => {
                let entry = m.keyspaces.entry(keyspace.to_string()).or_default();
                match kind {
                    ExecKind::Load => {
                        entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                    }
                    ExecKind::Delete | ExecKind::Flush => {
                        entry.rows_deleted = entry.rows_deleted.saturating_add(rows_touched);
                    }
                    ExecKind::Save => {}
                }
            }
            MetricsEvent::IndexDelta {
                inserts, removes, ..
            } => {
                m.index_inserts = m.index_inserts.saturating_add(inserts);
                m.index_removes = m.index_removes.saturating_add(removes);
            }
            MetricsEvent::IndexLookup { kind, .. } => {
                let counter = match kind {
                    LookupKind::Equality => &mut m.equality_lookups,
                    LookupKind::Near => &mut m.near_lookups,
                    LookupKind::Members => &mut m.member_lookups,
                };
                *counter = counter.saturating_add(1);
            }
            MetricsEvent::ReferenceMiss { .. } => {
                m.reference_misses = m.reference_misses.saturating_add(1);
            }
        }
    }
}

///
/// TESTS
///
