//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory and
//! are overridden by `ICEWALLET__<SECTION>__<KEY>` environment variables, e.g.
//! `ICEWALLET__SERVER__PORT=8080`.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// `database = "memory"` or `database = { sqlite = "path/to/file.db" }`
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Engine {
    pub query_timeout_secs: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            query_timeout_secs: engine::DEFAULT_QUERY_TIMEOUT.as_secs(),
        }
    }
}

impl Engine {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub engine: Engine,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("ICEWALLET").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.bind, "127.0.0.1");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.engine.query_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn full_file() {
        let settings = from_toml(
            r#"
            database = { sqlite = "/var/lib/icewallet/ledger.db" }

            [app]
            level = "debug"

            [server]
            bind = "0.0.0.0"
            port = 8080

            [engine]
            query_timeout_secs = 3
            "#,
        );
        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.server.bind, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(
            settings.database.url(),
            "sqlite:/var/lib/icewallet/ledger.db?mode=rwc"
        );
        assert_eq!(settings.engine.query_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn memory_database() {
        let settings = from_toml(r#"database = "memory""#);
        assert_eq!(settings.database.url(), "sqlite::memory:");
    }
}
