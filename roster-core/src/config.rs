//! Configuration management for the review roster
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (ROSTER_*)
//! 3. Config file (~/.config/roster/config.toml)
//! 4. Default values

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default number of reviewers drawn for a new pull request
pub const DEFAULT_REVIEWERS_PER_PR: usize = 2;

/// Storage settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Path to the SQLite database file
    pub path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// How long a transaction waits for the write lock
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Reviewer assignment settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Reviewers drawn when a pull request is opened
    pub reviewers_per_pr: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            reviewers_per_pr: DEFAULT_REVIEWERS_PER_PR,
        }
    }
}

/// Per-operation settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OperationConfig {
    /// Deadline applied to every operation (None = no deadline)
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub assignment: AssignmentConfig,
    pub operation: OperationConfig,
}

/// `~/.cache/roster/roster.db`
fn default_database_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roster")
        .join("roster.db")
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/roster/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("roster").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - ROSTER_DB_PATH: Path to the database file
    /// - ROSTER_REVIEWERS_PER_PR: Reviewers drawn per new pull request
    /// - ROSTER_OPERATION_TIMEOUT: Per-operation deadline, e.g. `30s`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(path) = std::env::var("ROSTER_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }

        if let Ok(count) = std::env::var("ROSTER_REVIEWERS_PER_PR") {
            self.assignment.reviewers_per_pr = count.parse().map_err(|_| {
                Error::Config(format!("ROSTER_REVIEWERS_PER_PR is not a number: {}", count))
            })?;
        }

        if let Ok(timeout) = std::env::var("ROSTER_OPERATION_TIMEOUT") {
            self.operation.timeout = Some(parse_duration(&timeout)?);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, db_path: Option<PathBuf>, timeout: Option<Duration>) -> Self {
        if let Some(path) = db_path {
            self.database.path = path;
        }

        if let Some(t) = timeout {
            self.operation.timeout = Some(t);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(db_path: Option<PathBuf>, timeout: Option<Duration>) -> Result<Self> {
        let config = Self::load()?
            .with_env_overrides()?
            .with_cli_overrides(db_path, timeout);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a human-readable duration such as `500ms` or `1m 30s`
pub fn parse_duration(value: &str) -> Result<Duration> {
    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(with = "humantime_serde")]
        value: Duration,
    }

    let wrapper: Wrapper = toml::from_str(&format!("value = {:?}", value))
        .map_err(|e| Error::Config(format!("Invalid duration '{}': {}", value, e)))?;
    Ok(wrapper.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.assignment.reviewers_per_pr, 2);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.busy_timeout, Duration::from_secs(5));
        assert!(config.operation.timeout.is_none());
        assert!(config.database.path.ends_with("roster/roster.db"));
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default().with_cli_overrides(
            Some(PathBuf::from("/tmp/custom.db")),
            Some(Duration::from_secs(3)),
        );

        assert_eq!(config.database.path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.operation.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[database]
path = "/var/lib/roster/roster.db"
max_connections = 8
busy_timeout = "250ms"

[assignment]
reviewers_per_pr = 3

[operation]
timeout = "30s"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/var/lib/roster/roster.db"));
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.assignment.reviewers_per_pr, 3);
        assert_eq!(config.operation.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[assignment]
reviewers_per_pr = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // database settings should use defaults
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.assignment.reviewers_per_pr, 1);
    }

    #[test]
    fn test_load_from_file_rejects_zero_connections() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[database]\nmax_connections = 0\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1m 30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert!(parse_duration("soon").is_err());
    }
}
