//! Settings for the `ledger` binary.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. `settings.toml` in the working directory (optional)
//! 2. `config/{APP_ENV}.toml` where `APP_ENV` is `local`, `develop` or `prod`
//!    (optional, `local` when unset)
//! 3. environment variables prefixed with `LEDGER`, nested keys separated by
//!    `__` (e.g. `LEDGER__SERVER__PORT=8080`)
use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

const APP_ENV: &str = "APP_ENV";
const ENVIRONMENTS: [&str; 3] = ["local", "develop", "prod"];

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
    Url(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub max_connections: Option<u32>,
    pub unit_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var(APP_ENV).unwrap_or_else(|_| "local".to_string());
        if !ENVIRONMENTS.contains(&env.as_str()) {
            return Err(ConfigError::Message(format!(
                "invalid {APP_ENV} `{env}`, expected one of {ENVIRONMENTS:?}"
            )));
        }

        let builder = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                Environment::with_prefix("LEDGER")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::load(builder)
    }

    fn load(builder: config::ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(server) = &settings.server {
            if server.port == 0 {
                return Err(ConfigError::Message(
                    "server.port must be non-zero".to_string(),
                ));
            }
            if server.max_connections == Some(0) {
                return Err(ConfigError::Message(
                    "server.max_connections must be non-zero".to_string(),
                ));
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(raw: &str) -> Result<Settings, ConfigError> {
        Settings::load(Config::builder().add_source(File::from_str(raw, FileFormat::Toml)))
    }

    #[test]
    fn empty_settings_default_level_and_no_server() {
        let settings = from_toml("").unwrap();
        assert_eq!(settings.app.level, "info");
        assert!(settings.server.is_none());
    }

    #[test]
    fn memory_database() {
        let settings = from_toml(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert_eq!(server.database, Database::Memory);
        assert!(server.bind.is_none());
        assert!(server.unit_timeout_ms.is_none());
    }

    #[test]
    fn sqlite_and_url_databases() {
        let settings = from_toml(
            r#"
            [server]
            port = 3000
            database = { sqlite = "ledger.db" }
            max_connections = 8
            unit_timeout_ms = 5000
            "#,
        )
        .unwrap();
        let server = settings.server.unwrap();
        assert_eq!(server.database, Database::Sqlite("ledger.db".to_string()));
        assert_eq!(server.max_connections, Some(8));
        assert_eq!(server.unit_timeout_ms, Some(5000));

        let settings = from_toml(
            r#"
            [server]
            port = 3000
            database = { url = "postgres://ledger@localhost/ledger" }
            "#,
        )
        .unwrap();
        assert_eq!(
            settings.server.unwrap().database,
            Database::Url("postgres://ledger@localhost/ledger".to_string())
        );
    }

    #[test]
    fn zero_port_is_rejected() {
        let err = from_toml(
            r#"
            [server]
            port = 0
            database = "memory"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn zero_max_connections_is_rejected() {
        let err = from_toml(
            r#"
            [server]
            port = 3000
            database = "memory"
            max_connections = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("max_connections"));
    }
}
