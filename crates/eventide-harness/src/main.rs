//! Workload driver for the Eventide store.
//!
//! Exercises a shared [`EventStore`] from a fixed pool of worker threads
//! and prints a JSON summary of what happened.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `eventide-config.yaml` (or `EVENTIDE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build a runtime whose blocking pool is capped at `workload.workers`
//! 4. Run the populate, query, remove, and requery phases
//! 5. Print the run summary

mod config;
mod error;
mod workload;

use std::path::PathBuf;

use eventide_store::EventStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH, HarnessConfig, LoggingConfig};
use crate::error::HarnessError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the runtime cannot be
/// built, or a workload phase fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var(CONFIG_PATH_VAR)
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = HarnessConfig::load(&config_path).map_err(HarnessError::from)?;

    init_logging(&config.logging);
    info!(
        config_file = %config_path.display(),
        config_file_found = config_path.exists(),
        workers = config.workload.workers,
        insert_count = config.workload.insert_count,
        query_count = config.workload.query_count,
        event_types = ?config.workload.event_types,
        "eventide-harness starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .max_blocking_threads(config.workload.workers)
        .enable_all()
        .build()
        .map_err(HarnessError::from)?;

    let store = EventStore::new();
    let summary = runtime.block_on(workload::run(&store, &config.workload))?;
    info!(
        final_size = summary.final_size,
        inserts_applied = summary.inserts_applied,
        "workload finished"
    );

    let report = serde_json::to_string_pretty(&summary).map_err(HarnessError::from)?;
    println!("{report}");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
