//! Database credentials and their on-disk cache
//!
//! Entered credentials are cached as JSON so later imports can reuse them.

use crate::{ConfigError, ConfigResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::mysql::MySqlConnectOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_TABLE: &str = "posts";

static TABLE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("hardcoded regex pattern is valid")
});

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

/// Connection parameters for the import source
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCredentials {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub database: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Table holding the posts
    #[serde(default = "default_table", alias = "table")]
    pub table_name: String,
}

impl Default for DbCredentials {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            table_name: default_table(),
        }
    }
}

impl std::fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DbCredentials {
    /// Checks that an import can be attempted with these credentials
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Database and username present, table name safe to interpolate
    /// * `Err(ConfigError::IncompleteCredentials)` - Database or username missing
    /// * `Err(ConfigError::Validation)` - Empty host or unsafe table name
    pub fn validate(&self) -> ConfigResult<()> {
        let mut missing = Vec::new();
        if self.database.trim().is_empty() {
            missing.push("database");
        }
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if !missing.is_empty() {
            return Err(ConfigError::IncompleteCredentials(format!(
                "{} required",
                missing.join(" and ")
            )));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::Validation("host cannot be empty".to_string()));
        }

        if !TABLE_NAME.is_match(&self.table_name) {
            return Err(ConfigError::Validation(format!(
                "table name '{}' may only contain letters, digits and underscores",
                self.table_name
            )));
        }

        Ok(())
    }

    /// sqlx connection options for these credentials
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
    }
}

/// Reads cached credentials
///
/// # Returns
///
/// * `Ok(None)` - No cache file exists
/// * `Ok(Some(DbCredentials))` - The cached credentials
/// * `Err(ConfigError)` - The cache exists but cannot be read or parsed
pub fn load_credentials(path: &Path) -> ConfigResult<Option<DbCredentials>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Writes credentials to the cache file
pub fn save_credentials(path: &Path, credentials: &DbCredentials) -> ConfigResult<()> {
    let json = serde_json::to_string_pretty(credentials)?;
    std::fs::write(path, json)?;
    Ok(())
}
