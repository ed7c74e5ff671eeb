//! Metrics sink boundary.
//!
//! Query and session logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the thread-local metrics state.
use crate::{obs::metrics, traits::EntityKind, types::Timestamp};
use std::{cell::RefCell, marker::PhantomData, rc::Rc, time::Instant};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Load,
    Save,
    Delete,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        entity: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        entity: &'static str,
        rows_touched: u64,
        elapsed_micros: u64,
    },
    ExistsCall {
        entity: &'static str,
    },
    NotFound {
        entity: &'static str,
    },
    UniqueViolation {
        entity: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

impl<T: MetricsSink + ?Sized> MetricsSink for &T {
    fn record(&self, event: MetricsEvent) {
        (**self).record(event);
    }
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, entity } => {
                metrics::with_state_mut(|m| {
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.load_calls = m.ops.load_calls.saturating_add(1);
                            entry.load_calls = entry.load_calls.saturating_add(1);
                        }
                        ExecKind::Save => {
                            m.ops.save_calls = m.ops.save_calls.saturating_add(1);
                            entry.save_calls = entry.save_calls.saturating_add(1);
                        }
                        ExecKind::Delete => {
                            m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                            entry.delete_calls = entry.delete_calls.saturating_add(1);
                        }
                    }
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                entity,
                rows_touched,
                elapsed_micros,
            } => {
                metrics::with_state_mut(|m| {
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    match kind {
                        ExecKind::Load => {
                            m.ops.rows_loaded = m.ops.rows_loaded.saturating_add(rows_touched);
                            entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut m.perf.load_micros_total,
                                &mut m.perf.load_micros_max,
                                elapsed_micros,
                            );
                        }
                        ExecKind::Save => {
                            m.ops.rows_saved = m.ops.rows_saved.saturating_add(rows_touched);
                            entry.rows_saved = entry.rows_saved.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut m.perf.save_micros_total,
                                &mut m.perf.save_micros_max,
                                elapsed_micros,
                            );
                        }
                        ExecKind::Delete => {
                            m.ops.rows_deleted = m.ops.rows_deleted.saturating_add(rows_touched);
                            entry.rows_deleted = entry.rows_deleted.saturating_add(rows_touched);
                            metrics::add_elapsed(
                                &mut m.perf.delete_micros_total,
                                &mut m.perf.delete_micros_max,
                                elapsed_micros,
                            );
                        }
                    }
                });
            }

            MetricsEvent::ExistsCall { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.exists_calls = m.ops.exists_calls.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.exists_calls = entry.exists_calls.saturating_add(1);
                });
            }

            MetricsEvent::NotFound { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.not_found = m.ops.not_found.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.not_found = entry.not_found.saturating_add(1);
                });
            }

            MetricsEvent::UniqueViolation { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.unique_violations = m.ops.unique_violations.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.unique_violations = entry.unique_violations.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start` filters by window start (`EventState::since`), not by
/// per-event timestamps.
#[must_use]
pub fn metrics_report(window_start: Option<Timestamp>) -> metrics::EventReport {
    metrics::report_window_start(window_start)
}

/// Reset all metrics state (counters + perf).
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
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

/// Span
/// RAII guard that emits start/finish metrics events for one operation.
/// Ensures finish accounting happens even on early return.

pub(crate) struct Span<E: EntityKind> {
    kind: ExecKind,
    start: Instant,
    rows: u64,
    _marker: PhantomData<E>,
}

impl<E: EntityKind> Span<E> {
    #[must_use]
    pub(crate) fn new(kind: ExecKind) -> Self {
        record(MetricsEvent::ExecStart {
            kind,
            entity: E::ENTITY_NAME,
        });

        Self {
            kind,
            start: Instant::now(),
            rows: 0,
            _marker: PhantomData,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: usize) {
        self.rows = rows as u64;
    }
}

impl<E: EntityKind> Drop for Span<E> {
    fn drop(&mut self) {
        let elapsed_micros = u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX);

        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            entity: E::ENTITY_NAME,
            rows_touched: self.rows,
            elapsed_micros,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        cell::Cell,
        panic::{AssertUnwindSafe, catch_unwind},
    };

    #[derive(Default)]
    struct CountingSink {
        calls: Cell<usize>,
    }

    impl MetricsSink for CountingSink {
        fn record(&self, _: MetricsEvent) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    fn ping() {
        record(MetricsEvent::ExistsCall { entity: "Ping" });
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        let outer = Rc::new(CountingSink::default());
        let inner = Rc::new(CountingSink::default());

        ping();
        assert_eq!(outer.calls.get(), 0);

        with_metrics_sink(outer.clone(), || {
            ping();
            assert_eq!(outer.calls.get(), 1);

            with_metrics_sink(inner.clone(), ping);

            // inner override restored to outer
            ping();
        });

        assert_eq!(outer.calls.get(), 2);
        assert_eq!(inner.calls.get(), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));

        ping();
        assert_eq!(outer.calls.get(), 2);
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        let sink = Rc::new(CountingSink::default());

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(sink.clone(), || {
                ping();
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();

        assert!(panicked);
        assert_eq!(sink.calls.get(), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn metrics_report_window_start_after_window_returns_empty() {
        metrics_reset_all();
        let since = metrics::with_state(|m| m.since);
        ping();

        let later = Timestamp::from_millis(since.as_millis().saturating_add(1));
        let report = metrics_report(Some(later));
        assert!(report.counters.is_none());
        assert!(report.entity_counters.is_empty());

        let report = metrics_report(Some(since));
        let counters = report.counters.expect("counters within window");
        assert_eq!(counters.ops.exists_calls, 1);
    }

    #[test]
    fn exec_events_accumulate_per_kind() {
        metrics_reset_all();

        record(MetricsEvent::ExecStart {
            kind: ExecKind::Delete,
            entity: "Note",
        });
        record(MetricsEvent::ExecFinish {
            kind: ExecKind::Delete,
            entity: "Note",
            rows_touched: 3,
            elapsed_micros: 40,
        });
        record(MetricsEvent::NotFound { entity: "Note" });
        record(MetricsEvent::UniqueViolation { entity: "Note" });

        let counters = metrics_report(None).counters.expect("counters");
        assert_eq!(counters.ops.delete_calls, 1);
        assert_eq!(counters.ops.rows_deleted, 3);
        assert_eq!(counters.ops.not_found, 1);
        assert_eq!(counters.ops.unique_violations, 1);
        assert_eq!(counters.perf.delete_micros_total, 40);
        assert_eq!(counters.perf.delete_micros_max, 40);

        let entity = counters.entities.get("Note").expect("entity counters");
        assert_eq!(entity.rows_deleted, 3);
        assert_eq!(entity.unique_violations, 1);
    }
}
