//! Backend selection and connection settings.
//!
//! Loaded from environment variables at the binary edge; the store backends
//! only ever receive the finished values.
//!
//! | Variable                | Meaning                              | Default              |
//! |-------------------------|--------------------------------------|----------------------|
//! | `AUCTION_STORE_BACKEND` | `file` or `postgres`                 | `file`               |
//! | `AUCTION_COMMANDS_PATH` | command log file                     | `tmp/commands.json`  |
//! | `AUCTION_EVENTS_PATH`   | event log file                       | `tmp/events.json`    |
//! | `PGHOST` / `PGPORT`     | database host and port               | `localhost` / `5432` |
//! | `PGUSER` / `PGPASSWORD` | credentials                          | `postgres` / empty   |
//! | `PGDATABASE`            | database name                        | `auction`            |
//! | `PGSSLMODE`             | transport security mode              | `prefer`             |
//! | `PGMAXCONNECTIONS`      | pool size                            | `5`                  |
//! | `PGCONNECT_TIMEOUT`     | seconds to wait for a connection     | `30`                 |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown store backend: {0}")]
    UnknownBackend(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Transport security mode for the database connection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    Disable,
    Allow,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl FromStr for SslMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disable" => Ok(SslMode::Disable),
            "allow" => Ok(SslMode::Allow),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(ConfigError::InvalidValue {
                var: "PGSSLMODE",
                value: other.to_string(),
            }),
        }
    }
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Allow => PgSslMode::Allow,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
            SslMode::VerifyCa => PgSslMode::VerifyCa,
            SslMode::VerifyFull => PgSslMode::VerifyFull,
        }
    }
}

/// PostgreSQL connection parameters.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    #[serde(default)]
    pub ssl_mode: SslMode,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "auction".to_string(),
            ssl_mode: SslMode::default(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl PostgresConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(self.ssl_mode.into())
    }

    /// Read `PG*` variables through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            host: lookup("PGHOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PGPORT")?.unwrap_or(defaults.port),
            user: lookup("PGUSER").unwrap_or(defaults.user),
            password: lookup("PGPASSWORD").unwrap_or(defaults.password),
            dbname: lookup("PGDATABASE").unwrap_or(defaults.dbname),
            ssl_mode: lookup("PGSSLMODE")
                .map(|mode| mode.parse::<SslMode>())
                .transpose()?
                .unwrap_or(defaults.ssl_mode),
            max_connections: parse_var(&lookup, "PGMAXCONNECTIONS")?
                .unwrap_or(defaults.max_connections),
            connect_timeout_secs: parse_var(&lookup, "PGCONNECT_TIMEOUT")?
                .unwrap_or(defaults.connect_timeout_secs),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(var)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var, value })
        })
        .transpose()
}

/// Paths of the two log files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileStoreConfig {
    pub commands_path: PathBuf,
    pub events_path: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            commands_path: PathBuf::from("tmp/commands.json"),
            events_path: PathBuf::from("tmp/events.json"),
        }
    }
}

/// Which backend the application should construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    File(FileStoreConfig),
    Postgres(PostgresConfig),
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = lookup("AUCTION_STORE_BACKEND").unwrap_or_else(|| "file".to_string());

        match backend.as_str() {
            "file" => {
                let defaults = FileStoreConfig::default();
                Ok(StoreConfig::File(FileStoreConfig {
                    commands_path: lookup("AUCTION_COMMANDS_PATH")
                        .map(PathBuf::from)
                        .unwrap_or(defaults.commands_path),
                    events_path: lookup("AUCTION_EVENTS_PATH")
                        .map(PathBuf::from)
                        .unwrap_or(defaults.events_path),
                }))
            }
            "postgres" => Ok(StoreConfig::Postgres(PostgresConfig::from_lookup(lookup)?)),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_to_file_backend() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::File(FileStoreConfig::default()));
    }

    #[test]
    fn test_file_paths_from_env() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("AUCTION_COMMANDS_PATH", "/data/c.json"),
            ("AUCTION_EVENTS_PATH", "/data/e.json"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            StoreConfig::File(FileStoreConfig {
                commands_path: PathBuf::from("/data/c.json"),
                events_path: PathBuf::from("/data/e.json"),
            })
        );
    }

    #[test]
    fn test_postgres_config_from_env() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("AUCTION_STORE_BACKEND", "postgres"),
            ("PGHOST", "db.internal"),
            ("PGPORT", "6543"),
            ("PGUSER", "auction"),
            ("PGPASSWORD", "secret"),
            ("PGDATABASE", "bids"),
            ("PGSSLMODE", "verify-full"),
            ("PGCONNECT_TIMEOUT", "3"),
        ]))
        .unwrap();

        let StoreConfig::Postgres(pg) = config else {
            panic!("expected postgres config");
        };
        assert_eq!(pg.host, "db.internal");
        assert_eq!(pg.port, 6543);
        assert_eq!(pg.user, "auction");
        assert_eq!(pg.password, "secret");
        assert_eq!(pg.dbname, "bids");
        assert_eq!(pg.ssl_mode, SslMode::VerifyFull);
        assert_eq!(pg.max_connections, 5);
        assert_eq!(pg.connect_timeout_secs, 3);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = PostgresConfig::from_lookup(lookup(&[("PGPORT", "eighty")]));
        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                var: "PGPORT",
                value: "eighty".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_ssl_mode_is_rejected() {
        assert!(PostgresConfig::from_lookup(lookup(&[("PGSSLMODE", "sometimes")])).is_err());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert_eq!(
            StoreConfig::from_lookup(lookup(&[("AUCTION_STORE_BACKEND", "redis")])),
            Err(ConfigError::UnknownBackend("redis".to_string()))
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = PostgresConfig {
            password: "hunter2".to_string(),
            ..PostgresConfig::default()
        };
        let debug = format!("{config:?}");

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
