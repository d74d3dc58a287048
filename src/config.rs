//! # Database configuration
//!
//! Settings are read from `DB_`-prefixed environment variables after loading
//! an optional `.env` file:
//!
//! | Variable           | Field          | Default     |
//! |--------------------|----------------|-------------|
//! | `DB_DRIVER`        | `driver`       | `sqlite`    |
//! | `DB_HOST`          | `host`         | `localhost` |
//! | `DB_PORT`          | `port`         | `5432`      |
//! | `DB_NAME`          | `database`     | `crudrouter`|
//! | `DB_USER`          | `username`     | `postgres`  |
//! | `DB_PASSWORD`      | `password`     | empty       |
//! | `DB_POOL_SIZE`     | `pool_size`    | `10`        |
//! | `DB_MAX_OVERFLOW`  | `max_overflow` | `20`        |
//! | `DB_POOL_TIMEOUT`  | `pool_timeout` | `30` (s)    |
//! | `DB_POOL_RECYCLE`  | `pool_recycle` | `3600` (s)  |
//! | `DB_ECHO`          | `echo`         | `false`     |
//! | `TEST_MODE`        | `test_mode`    | `true`      |
//! | `DB_TEST_DB_PATH`  | `test_db_path` | `test.db`   |

use sea_orm::ConnectOptions;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub pool_size: u32,
    pub max_overflow: u32,
    /// Seconds to wait for a pooled connection
    pub pool_timeout: u64,
    /// Seconds before a pooled connection is recycled
    pub pool_recycle: u64,
    /// Log every SQL statement
    pub echo: bool,
    /// Use the SQLite file at `test_db_path` instead of the server settings
    pub test_mode: bool,
    /// `:memory:` selects an in-memory database
    pub test_db_path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: "crudrouter".to_string(),
            username: "postgres".to_string(),
            password: String::new(),
            pool_size: 10,
            max_overflow: 20,
            pool_timeout: 30,
            pool_recycle: 3600,
            echo: false,
            test_mode: true,
            test_db_path: "test.db".to_string(),
        }
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

impl DatabaseConfig {
    /// Load `.env` (if present) and read the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, starting from the defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a value is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("DB_DRIVER") {
            config.driver = v;
        }
        if let Some(v) = lookup("DB_HOST") {
            config.host = v;
        }
        if let Some(v) = lookup("DB_PORT") {
            config.port = parse_var("DB_PORT", &v)?;
        }
        if let Some(v) = lookup("DB_NAME") {
            config.database = v;
        }
        if let Some(v) = lookup("DB_USER") {
            config.username = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            config.password = v;
        }
        if let Some(v) = lookup("DB_POOL_SIZE") {
            config.pool_size = parse_var("DB_POOL_SIZE", &v)?;
        }
        if let Some(v) = lookup("DB_MAX_OVERFLOW") {
            config.max_overflow = parse_var("DB_MAX_OVERFLOW", &v)?;
        }
        if let Some(v) = lookup("DB_POOL_TIMEOUT") {
            config.pool_timeout = parse_var("DB_POOL_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("DB_POOL_RECYCLE") {
            config.pool_recycle = parse_var("DB_POOL_RECYCLE", &v)?;
        }
        if let Some(v) = lookup("DB_ECHO") {
            config.echo = parse_bool("DB_ECHO", &v)?;
        }
        if let Some(v) = lookup("TEST_MODE") {
            config.test_mode = parse_bool("TEST_MODE", &v)?;
        }
        if let Some(v) = lookup("DB_TEST_DB_PATH") {
            config.test_db_path = v;
        }

        Ok(config)
    }

    /// In-memory SQLite settings for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            test_db_path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    /// Connection URL for Sea-ORM.
    ///
    /// ```text
    /// test mode            sqlite://test.db?mode=rwc   (sqlite::memory: for ":memory:")
    /// server, no password  postgres://app@db:5432/app
    /// server, password     postgres://app:secret@db:5432/app
    /// ```
    #[must_use]
    pub fn database_url(&self) -> String {
        if self.test_mode {
            return if self.test_db_path == ":memory:" {
                "sqlite::memory:".to_string()
            } else {
                format!("sqlite://{}?mode=rwc", self.test_db_path)
            };
        }
        let credentials = if self.password.is_empty() {
            self.username.clone()
        } else {
            format!("{}:{}", self.username, self.password)
        };
        format!(
            "{}://{}@{}:{}/{}",
            self.driver, credentials, self.host, self.port, self.database
        )
    }

    /// Sea-ORM connect options. Pool sizing applies outside test mode only.
    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.database_url());
        options.sqlx_logging(self.echo);
        if !self.test_mode {
            options
                .max_connections(self.pool_size.saturating_add(self.max_overflow))
                .min_connections(1)
                .acquire_timeout(Duration::from_secs(self.pool_timeout))
                .max_lifetime(Duration::from_secs(self.pool_recycle));
        }
        options
    }
}
