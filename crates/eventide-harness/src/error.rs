//! Error types for the harness binary.
//!
//! [`HarnessError`] is the top-level error that `main` propagates with `?`.

/// Top-level error for the harness binary.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The async runtime could not be built.
    #[error("runtime error: {source}")]
    Runtime {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A phase's jobs did not all finish before its deadline.
    #[error("{phase} phase exceeded its {timeout_ms}ms deadline")]
    PhaseTimeout {
        /// The phase that timed out.
        phase: &'static str,
        /// The configured deadline.
        timeout_ms: u64,
        /// The elapsed-timer error.
        source: tokio::time::error::Elapsed,
    },

    /// A worker job panicked or was cancelled.
    #[error("{phase} worker failed: {source}")]
    Worker {
        /// The phase the job belonged to.
        phase: &'static str,
        /// The join failure.
        source: tokio::task::JoinError,
    },

    /// The run summary could not be serialized.
    #[error("summary serialization error: {source}")]
    Summary {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },
}
