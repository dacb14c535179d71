use std::fmt;
use thiserror::Error;

pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_NAME: &str = "DB_NAME";

pub const DEFAULT_PORT: u16 = 3306;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration value: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Connection settings for the MySQL row store.
///
/// Built once at process start and handed to the connector by reference.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    /// Reads the settings from the process environment, seeding it from a
    /// `.env` file in the working directory when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(ConfigError::Missing(name)),
            }
        };

        let host = required(ENV_HOST)?;
        let user = required(ENV_USER)?;
        let password = required(ENV_PASSWORD)?;
        let database = required(ENV_NAME)?;

        let port = match lookup(ENV_PORT) {
            None => DEFAULT_PORT,
            Some(value) if value.trim().is_empty() => DEFAULT_PORT,
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|err| ConfigError::Invalid {
                    name: ENV_PORT,
                    value: value.clone(),
                    reason: err.to_string(),
                })?,
        };

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
        })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}
