//! Configuration loading and typed config structures for the harness.
//!
//! Configuration lives in an optional YAML file (`eventide-config.yaml` by
//! default, or the path in `EVENTIDE_CONFIG`). Every key has a default, so
//! a missing file or an empty document yields a runnable configuration.
//! A few environment variables override file values after parsing.

use std::path::Path;

use serde::Deserialize;

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "EVENTIDE_CONFIG";

/// Config file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "eventide-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidOverride {
        /// The environment variable.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The configuration parsed but cannot drive a workload.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HarnessConfig {
    /// Workload shape and worker pool.
    #[serde(default)]
    pub workload: WorkloadConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HarnessConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist. Environment overrides are applied either way.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed, an override is malformed, or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or an
    /// override/validation error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides,
    /// no validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply overrides from the process environment:
    /// - `EVENTIDE_WORKERS` overrides `workload.workers`
    /// - `EVENTIDE_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for a non-numeric worker
    /// count.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("EVENTIDE_WORKERS") {
            let parsed = value.trim().parse::<usize>();
            self.workload.workers = parsed.map_err(|_parse_err| ConfigError::InvalidOverride {
                name: "EVENTIDE_WORKERS",
                value,
            })?;
        }
        if let Some(value) = lookup("EVENTIDE_LOG_LEVEL") {
            self.logging.level = value;
        }
        Ok(())
    }

    /// Reject configurations the harness cannot run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for zero workers, an empty or
    /// blank event type list, or a zero phase timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workload.workers == 0 {
            return Err(ConfigError::Invalid("workload.workers must be at least 1"));
        }
        if self.workload.event_types.is_empty() {
            return Err(ConfigError::Invalid("workload.event_types must not be empty"));
        }
        if self.workload.event_types.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid(
                "workload.event_types must not contain an empty label",
            ));
        }
        if self.workload.phase_timeout_ms == 0 {
            return Err(ConfigError::Invalid("workload.phase_timeout_ms must be positive"));
        }
        Ok(())
    }
}

/// Workload shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkloadConfig {
    /// Labels the workload draws event types from.
    #[serde(default = "default_event_types")]
    pub event_types: Vec<String>,

    /// Number of insert jobs in the populate phase.
    #[serde(default = "default_insert_count")]
    pub insert_count: usize,

    /// Number of query jobs in each query phase.
    #[serde(default = "default_query_count")]
    pub query_count: usize,

    /// Size of the blocking worker pool.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Deadline for all jobs of one phase to finish.
    #[serde(default = "default_phase_timeout_ms")]
    pub phase_timeout_ms: u64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            event_types: default_event_types(),
            insert_count: default_insert_count(),
            query_count: default_query_count(),
            workers: default_workers(),
            phase_timeout_ms: default_phase_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error).
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_event_types() -> Vec<String> {
    vec![
        "Event-1".to_owned(),
        "Event-2".to_owned(),
        "Event-3".to_owned(),
    ]
}

const fn default_insert_count() -> usize {
    1001
}

const fn default_query_count() -> usize {
    10
}

const fn default_workers() -> usize {
    5
}

const fn default_phase_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
workload:
  event_types: [login, logout]
  insert_count: 50
  query_count: 3
  workers: 2
  phase_timeout_ms: 250
logging:
  level: debug
  json: true
";
        let config = HarnessConfig::parse(yaml).unwrap();
        assert_eq!(config.workload.event_types, vec!["login", "logout"]);
        assert_eq!(config.workload.insert_count, 50);
        assert_eq!(config.workload.query_count, 3);
        assert_eq!(config.workload.workers, 2);
        assert_eq!(config.workload.phase_timeout_ms, 250);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = HarnessConfig::parse("workload:\n  workers: 9\n").unwrap();
        assert_eq!(config.workload.workers, 9);
        // Everything else uses defaults
        assert_eq!(config.workload.insert_count, 1001);
        assert_eq!(config.workload.event_types.len(), 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_empty_yaml() {
        let config = HarnessConfig::parse("").unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_workers() {
        let result = HarnessConfig::parse("workload:\n  workers: 0\n").unwrap().validate();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_empty_type_list() {
        let result = HarnessConfig::parse("workload:\n  event_types: []\n").unwrap().validate();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = HarnessConfig::parse("workload:\n  event_types: ['']\n").unwrap().validate();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let result = HarnessConfig::parse("workload: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("EVENTIDE_WORKERS", " 12 "), ("EVENTIDE_LOG_LEVEL", "trace")]);
        let mut config = HarnessConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| (*v).to_owned()))
            .unwrap();
        assert_eq!(config.workload.workers, 12);
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn malformed_override_is_reported() {
        let mut config = HarnessConfig::default();
        let result = config.apply_overrides(|name| {
            (name == "EVENTIDE_WORKERS").then(|| "many".to_owned())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidOverride { name: "EVENTIDE_WORKERS", .. })
        ));
        assert_eq!(config.workload.workers, 5);
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("no-such-config.yaml");
        let config = HarnessConfig::load(&path);
        assert!(config.is_ok());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_PATH);
        if path.exists() {
            let config = HarnessConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
