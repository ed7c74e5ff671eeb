use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters and simple timing totals for operations.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub perf: EventPerf,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since: Timestamp,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            perf: EventPerf::default(),
            entities: BTreeMap::new(),
            since: Timestamp::now(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // entrypoints
    pub load_calls: u64,
    pub exists_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,

    // rows touched
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,

    // outcomes
    pub not_found: u64,
    pub unique_violations: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub load_calls: u64,
    pub exists_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,
    pub not_found: u64,
    pub unique_violations: u64,
}

///
/// EventPerf
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventPerf {
    // wall-clock totals per operation kind, microseconds
    pub load_micros_total: u128,
    pub save_micros_total: u128,
    pub delete_micros_total: u128,

    // maximum observed durations
    pub load_micros_max: u64,
    pub save_micros_max: u64,
    pub delete_micros_max: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all event state: counters and perf.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Accumulate a duration and track a max.
pub(crate) fn add_elapsed(total: &mut u128, max: &mut u64, elapsed: u64) {
    *total = total.saturating_add(u128::from(elapsed));
    if elapsed > *max {
        *max = elapsed;
    }
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `since`.
    pub counters: Option<EventState>,
    /// Per-entity counters and averages.
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub load_calls: u64,
    pub exists_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,
    pub rows_loaded: u64,
    pub rows_deleted: u64,
    pub avg_rows_per_load: f64,
    pub avg_rows_per_delete: f64,
    pub not_found: u64,
    pub unique_violations: u64,
}

#[allow(clippy::cast_precision_loss)]
fn average(rows: u64, calls: u64) -> f64 {
    if calls > 0 {
        rows as f64 / calls as f64
    } else {
        0.0
    }
}

/// Build a report, empty when the current window began before
/// `window_start`.
pub(crate) fn report_window_start(window_start: Option<Timestamp>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start.is_some_and(|start| start > snap.since) {
        return EventReport::default();
    }

    let mut entity_counters: Vec<EntitySummary> = snap
        .entities
        .iter()
        .map(|(entity, ops)| EntitySummary {
            entity: entity.clone(),
            load_calls: ops.load_calls,
            exists_calls: ops.exists_calls,
            save_calls: ops.save_calls,
            delete_calls: ops.delete_calls,
            rows_loaded: ops.rows_loaded,
            rows_deleted: ops.rows_deleted,
            avg_rows_per_load: average(ops.rows_loaded, ops.load_calls),
            avg_rows_per_delete: average(ops.rows_deleted, ops.delete_calls),
            not_found: ops.not_found,
            unique_violations: ops.unique_violations,
        })
        .collect();

    entity_counters.sort_by(|a, b| {
        b.avg_rows_per_load
            .partial_cmp(&a.avg_rows_per_load)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.rows_loaded.cmp(&a.rows_loaded))
            .then_with(|| a.entity.cmp(&b.entity))
    });

    EventReport {
        counters: Some(snap),
        entity_counters,
    }
}

///
/// TESTS
///
