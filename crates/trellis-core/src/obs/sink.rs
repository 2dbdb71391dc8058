//! Metrics sink boundary.
//!
//! Index and relation code MUST NOT touch obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::{
    model::{index::IndexKind, relation::RelationKind},
    obs::metrics::{self, EventReport},
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
    static METRICS_ENABLED: Cell<bool> = const { Cell::new(true) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    IndexInsert {
        kind: IndexKind,
    },
    IndexRemove {
        kind: IndexKind,
    },
    IndexRejected {
        kind: IndexKind,
        reason: &'static str,
    },
    AssociationLink {
        kind: RelationKind,
    },
    AssociationUnlink {
        kind: RelationKind,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into global metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::IndexInsert { kind } => metrics::with_state_mut(|m| {
                m.ops.index_inserts = m.ops.index_inserts.saturating_add(1);
                let entry = metrics::kind_entry(m, kind.label());
                entry.inserts = entry.inserts.saturating_add(1);
            }),
            MetricsEvent::IndexRemove { kind } => metrics::with_state_mut(|m| {
                m.ops.index_removes = m.ops.index_removes.saturating_add(1);
                let entry = metrics::kind_entry(m, kind.label());
                entry.removes = entry.removes.saturating_add(1);
            }),
            MetricsEvent::IndexRejected { kind, .. } => metrics::with_state_mut(|m| {
                m.ops.index_rejected = m.ops.index_rejected.saturating_add(1);
                let entry = metrics::kind_entry(m, kind.label());
                entry.rejected = entry.rejected.saturating_add(1);
            }),
            MetricsEvent::AssociationLink { kind } => metrics::with_state_mut(|m| {
                m.ops.association_links = m.ops.association_links.saturating_add(1);
                let entry = metrics::kind_entry(m, kind.label());
                entry.inserts = entry.inserts.saturating_add(1);
            }),
            MetricsEvent::AssociationUnlink { kind } => metrics::with_state_mut(|m| {
                m.ops.association_unlinks = m.ops.association_unlinks.saturating_add(1);
                let entry = metrics::kind_entry(m, kind.label());
                entry.removes = entry.removes.saturating_add(1);
            }),
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    if !metrics_enabled() {
        return;
    }

    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics counters for the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

#[must_use]
pub fn metrics_enabled() -> bool {
    METRICS_ENABLED.with(Cell::get)
}

pub fn set_metrics_enabled(enabled: bool) {
    METRICS_ENABLED.with(|cell| cell.set(enabled));
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
