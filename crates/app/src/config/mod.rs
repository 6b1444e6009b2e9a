use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use usage_core::Ident;

use crate::error::{AppError, Result};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DB: &str = "postgres";
const DEFAULT_USER: &str = "postgres";
const DEFAULT_SOURCE_SCHEMA: &str = "public";
const DEFAULT_USAGE_SCHEMA: &str = "usage";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection target and schemas for a collection run.
///
/// TOML files may use either the snake_case field names or the PascalCase
/// option names (`PostgresHost`, `PostgresSourceSchema`, ...).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(alias = "PostgresHost")]
    pub postgres_host: String,
    #[serde(alias = "PostgresPort")]
    pub postgres_port: u16,
    #[serde(alias = "PostgresDb")]
    pub postgres_db: String,
    #[serde(alias = "PostgresUser")]
    pub postgres_user: String,
    #[serde(alias = "PostgresPw")]
    pub postgres_pw: String,
    #[serde(alias = "PostgresSourceSchema")]
    pub postgres_source_schema: String,
    #[serde(alias = "PostgresUsageSchema")]
    pub postgres_usage_schema: String,
    pub connect_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            postgres_host: DEFAULT_HOST.to_string(),
            postgres_port: DEFAULT_PORT,
            postgres_db: DEFAULT_DB.to_string(),
            postgres_user: DEFAULT_USER.to_string(),
            postgres_pw: String::new(),
            postgres_source_schema: DEFAULT_SOURCE_SCHEMA.to_string(),
            postgres_usage_schema: DEFAULT_USAGE_SCHEMA.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("postgres_host", &self.postgres_host)
            .field("postgres_port", &self.postgres_port)
            .field("postgres_db", &self.postgres_db)
            .field("postgres_user", &self.postgres_user)
            .field("postgres_pw", &"<redacted>")
            .field("postgres_source_schema", &self.postgres_source_schema)
            .field("postgres_usage_schema", &self.postgres_usage_schema)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|err| AppError::Config(format!("parse config: {}", err)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            AppError::Config(format!("read config {}: {}", path.display(), err))
        })?;
        toml::from_str(&contents)
            .map_err(|err| AppError::Config(format!("parse config {}: {}", path.display(), err)))
    }

    /// Overrides fields from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("POSTGRES_HOST") {
            self.postgres_host = value;
        }
        if let Some(value) = lookup("POSTGRES_PORT") {
            self.postgres_port = value
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("invalid POSTGRES_PORT value: {value}")))?;
        }
        if let Some(value) = lookup("POSTGRES_DB") {
            self.postgres_db = value;
        }
        if let Some(value) = lookup("POSTGRES_USER") {
            self.postgres_user = value;
        }
        if let Some(value) = lookup("POSTGRES_PW") {
            self.postgres_pw = value;
        }
        if let Some(value) = lookup("POSTGRES_SOURCE_SCHEMA") {
            self.postgres_source_schema = value;
        }
        if let Some(value) = lookup("POSTGRES_USAGE_SCHEMA") {
            self.postgres_usage_schema = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.postgres_host.trim().is_empty() {
            return Err(AppError::Config("postgres host is empty".to_string()));
        }
        if self.postgres_port == 0 {
            return Err(AppError::Config("postgres port must be non-zero".to_string()));
        }
        Ident::new(&self.postgres_source_schema)
            .map_err(|err| AppError::Config(format!("source schema: {}", err)))?;
        Ident::new(&self.postgres_usage_schema)
            .map_err(|err| AppError::Config(format!("usage schema: {}", err)))?;
        if self.postgres_source_schema == self.postgres_usage_schema {
            return Err(AppError::Config(
                "usage schema must differ from source schema".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.postgres_host)
            .port(self.postgres_port)
            .database(&self.postgres_db)
            .username(&self.postgres_user)
            .application_name("timescale-usage");
        if self.postgres_pw.is_empty() {
            options
        } else {
            options.password(&self.postgres_pw)
        }
    }
}
