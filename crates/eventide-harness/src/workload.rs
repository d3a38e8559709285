//! The workload: populate, query, remove by type, query again.
//!
//! Every store call runs as a job on the runtime's blocking pool, which is
//! capped at `workload.workers` threads. A phase submits all its jobs, then
//! waits for them under the phase deadline.
//!
//! ```text
//! populate ──▶ query ──▶ remove ──▶ requery
//!  N inserts   Q queries  1 per type  Q queries
//! ```

use std::thread;
use std::time::Duration;

use chrono::Utc;
use eventide_store::EventStore;
use eventide_types::Event;
use futures::future::join_all;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::WorkloadConfig;
use crate::error::HarnessError;

/// Range used by every harness query: all non-negative timestamps.
const QUERY_START: i64 = 0;
const QUERY_END: i64 = i64::MAX;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of one workload run, printed as JSON at exit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Insert jobs submitted.
    pub inserts_submitted: usize,
    /// Inserts that added a new event (the rest were duplicates).
    pub inserts_applied: usize,
    /// First query phase.
    pub queries: Vec<QueryReport>,
    /// One entry per `remove_all` call.
    pub removals: Vec<RemovalReport>,
    /// Query phase after removal.
    pub queries_after_removal: Vec<QueryReport>,
    /// Store size at the end of the run.
    pub final_size: usize,
}

/// Result of a single query job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryReport {
    /// Queried type.
    pub event_type: String,
    /// Events the cursor yielded.
    pub matched: usize,
}

/// Result of a single `remove_all` job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// Removed type.
    pub event_type: String,
    /// Events removed.
    pub removed: usize,
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the full workload against `store`.
///
/// # Errors
///
/// Returns [`HarnessError::PhaseTimeout`] if a phase misses its deadline,
/// or [`HarnessError::Worker`] if a job panics.
pub async fn run(store: &EventStore, config: &WorkloadConfig) -> Result<RunSummary, HarnessError> {
    let timeout_ms = config.phase_timeout_ms;

    let events = random_events(&config.event_types, config.insert_count);
    let inserts_submitted = events.len();
    let jobs: Vec<_> = events
        .into_iter()
        .map(|event| {
            let store = store.clone();
            move || store.insert(event)
        })
        .collect();
    let inserts_applied = run_phase("populate", jobs, timeout_ms)
        .await?
        .into_iter()
        .filter(|added| *added)
        .count();
    info!(
        inserts_submitted,
        inserts_applied,
        store_size = store.len(),
        "populate phase complete"
    );

    let queries = query_phase("query", store, config, timeout_ms).await?;

    let jobs: Vec<_> = config
        .event_types
        .iter()
        .map(|event_type| {
            let store = store.clone();
            let event_type = event_type.clone();
            move || {
                let removed = store.remove_all(&event_type);
                info!(event_type = %event_type, removed, "removed all");
                RemovalReport {
                    event_type,
                    removed,
                }
            }
        })
        .collect();
    let removals = run_phase("remove", jobs, timeout_ms).await?;
    info!(store_size = store.len(), "remove phase complete");

    let queries_after_removal = query_phase("requery", store, config, timeout_ms).await?;

    Ok(RunSummary {
        inserts_submitted,
        inserts_applied,
        queries,
        removals,
        queries_after_removal,
        final_size: store.len(),
    })
}

/// Submit `query_count` queries over random types and collect their reports.
async fn query_phase(
    phase: &'static str,
    store: &EventStore,
    config: &WorkloadConfig,
    timeout_ms: u64,
) -> Result<Vec<QueryReport>, HarnessError> {
    let jobs: Vec<_> = random_types(&config.event_types, config.query_count)
        .into_iter()
        .map(|event_type| {
            let store = store.clone();
            move || {
                let matched = drive_query(&store, &event_type);
                QueryReport {
                    event_type,
                    matched,
                }
            }
        })
        .collect();
    let reports = run_phase(phase, jobs, timeout_ms).await?;
    info!(phase, queries = reports.len(), "query phase complete");
    Ok(reports)
}

/// Run one filtered query to completion and release its cursor.
fn drive_query(store: &EventStore, event_type: &str) -> usize {
    let worker = thread::current().id();
    let mut cursor = store.query(Some(event_type), QUERY_START, QUERY_END);
    let mut matched: usize = 0;
    while cursor.move_next() {
        match cursor.current() {
            Ok(event) => {
                debug!(?worker, %event, "query result");
                matched = matched.saturating_add(1);
            }
            Err(err) => {
                error!(?worker, event_type, %err, "query traversal failed");
                break;
            }
        }
    }
    cursor.close();
    info!(?worker, event_type, matched, "query finished");
    matched
}

/// Run every job on the blocking pool and wait for all of them.
async fn run_phase<T, F>(
    phase: &'static str,
    jobs: Vec<F>,
    timeout_ms: u64,
) -> Result<Vec<T>, HarnessError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    debug!(phase, jobs = jobs.len(), "phase starting");
    let handles: Vec<_> = jobs.into_iter().map(tokio::task::spawn_blocking).collect();

    let joined = tokio::time::timeout(Duration::from_millis(timeout_ms), join_all(handles))
        .await
        .map_err(|source| HarnessError::PhaseTimeout {
            phase,
            timeout_ms,
            source,
        })?;

    joined
        .into_iter()
        .map(|result| result.map_err(|source| HarnessError::Worker { phase, source }))
        .collect()
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// `count` events with random types from `types`, stamped with the current
/// wall-clock milliseconds.
fn random_events(types: &[String], count: usize) -> Vec<Event> {
    random_types(types, count)
        .into_iter()
        .map(|event_type| Event::new(event_type, Utc::now().timestamp_millis()))
        .collect()
}

/// `count` labels drawn uniformly from `types`. Empty if `types` is empty.
fn random_types(types: &[String], count: usize) -> Vec<String> {
    if types.is_empty() {
        return Vec::new();
    }
    let mut rng = rand::rng();
    (0..count)
        .filter_map(|_| types.get(rng.random_range(0..types.len())).cloned())
        .collect()
}
