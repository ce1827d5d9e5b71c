//! Service configuration loaded from a static JSON file
//!
//! The file carries the connection settings for the pool plus a few
//! optional knobs for the scheduler and the HTTP listener:
//!
//! ```json
//! {
//!   "host": "localhost",
//!   "port": 5432,
//!   "user": "postgres",
//!   "password": "secret",
//!   "database": "stocks",
//!   "schedule": "0 * * * * *",
//!   "overlap": "skip"
//! }
//! ```

use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

use crate::scheduler::{parse_schedule, OverlapPolicy, ScheduleError};

/// Config location used when neither `--config` nor `ACHIEVEMENTD_CONFIG` is set
pub const DEFAULT_CONFIG_PATH: &str = "database/db_config.json";

/// Fire once per minute, on the minute
pub const DEFAULT_SCHEDULE: &str = "0 * * * * *";

/// Port the trigger endpoints listen on unless `bind` is set
pub const DEFAULT_PORT: u16 = 5001;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Connection settings plus scheduler and listener options.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,

    /// Pool size; sqlx's default applies when absent
    #[serde(default)]
    pub max_connections: Option<u32>,

    /// How long to wait for a pooled connection; sqlx's default applies when absent
    #[serde(default)]
    pub acquire_timeout_secs: Option<u64>,

    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Six-field cron expression (seconds first), evaluated in UTC
    #[serde(default = "default_schedule")]
    pub schedule: String,

    #[serde(default)]
    pub overlap: OverlapPolicy,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
}

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}

impl ServiceConfig {
    /// Read, parse and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configs that would only fail later at connect or tick time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("host", &self.host),
            ("user", &self.user),
            ("database", &self.database),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }

        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be 0".to_string()));
        }

        if self.max_connections == Some(0) {
            return Err(ConfigError::Invalid(
                "max_connections must be at least 1".to_string(),
            ));
        }

        parse_schedule(&self.schedule)?;
        Ok(())
    }

    /// Connection options for the pool.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .application_name("achievementd")
    }

    pub fn acquire_timeout(&self) -> Option<Duration> {
        self.acquire_timeout_secs.map(Duration::from_secs)
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("bind", &self.bind)
            .field("schedule", &self.schedule)
            .field("overlap", &self.overlap)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"{
        "host": "db.internal",
        "port": 5432,
        "user": "swift",
        "password": "hunter2",
        "database": "stocks"
    }"#;

    fn parse(json: &str) -> ServiceConfig {
        serde_json::from_str(json).expect("config should parse")
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = parse(MINIMAL);
        config.validate().unwrap();

        assert_eq!(config.bind.port(), DEFAULT_PORT);
        assert_eq!(config.schedule, DEFAULT_SCHEDULE);
        assert_eq!(config.overlap, OverlapPolicy::Skip);
        assert!(config.max_connections.is_none());
        assert!(config.acquire_timeout().is_none());
    }

    #[test]
    fn connect_options_carry_file_values() {
        let options = parse(MINIMAL).connect_options();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "swift");
        assert_eq!(options.get_database(), Some("stocks"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let json = MINIMAL.replace("\"database\"", "\"databse_typo\": 1, \"database\"");
        assert!(serde_json::from_str::<ServiceConfig>(&json).is_err());
    }

    #[test]
    fn overlap_policy_parses_lowercase() {
        let json = MINIMAL.replace("\"database\"", "\"overlap\": \"allow\", \"database\"");
        assert_eq!(parse(&json).overlap, OverlapPolicy::Allow);
    }

    #[test]
    fn empty_host_is_invalid() {
        let json = MINIMAL.replace("db.internal", " ");
        let err = parse(&json).validate().unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn zero_pool_size_is_invalid() {
        let json = MINIMAL.replace("\"database\"", "\"max_connections\": 0, \"database\"");
        assert!(matches!(
            parse(&json).validate(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn bad_schedule_is_invalid() {
        let json = MINIMAL.replace("\"database\"", "\"schedule\": \"every minute\", \"database\"");
        assert!(matches!(
            parse(&json).validate(),
            Err(ConfigError::Schedule(_))
        ));
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", parse(MINIMAL));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();
        assert_eq!(config.database, "stocks");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ServiceConfig::load(Path::new("/nonexistent/db_config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reports_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ \"host\": ").unwrap();

        let err = ServiceConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
