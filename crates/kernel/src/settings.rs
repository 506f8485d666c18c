use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "BOOKSHELF_ENV";
const CONFIG_DIR_ENV: &str = "BOOKSHELF_CONFIG_DIR";
const SETTINGS_PREFIX: &str = "BOOKSHELF";
const DATABASE_PREFIX: &str = "DB";

/// Environment file read at startup. Failing to load it aborts the process.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// The HTTP listener always binds this port.
pub const LISTEN_PORT: u16 = 8080;

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration after reading `.env` from the working directory.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with_env_file(Path::new(DEFAULT_ENV_FILE))
    }

    /// Load the environment file into the process environment, then layer
    /// the base file, the environment overlay, and environment variables.
    pub fn load_with_env_file(env_file: &Path) -> anyhow::Result<Self> {
        dotenvy::from_path(env_file)
            .with_context(|| format!("failed to load environment file {}", env_file.display()))?;

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        Self::from_sources(&config_dir, &environment, None)
    }

    /// Build settings from a config directory and an environment name.
    ///
    /// `vars` replaces the process environment when given, which keeps
    /// tests independent of whatever the test runner exported.
    pub fn from_sources(
        config_dir: &Path,
        environment: &str,
        vars: Option<HashMap<String, String>>,
    ) -> anyhow::Result<Self> {
        let environment: Environment = environment.parse()?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment_name(&environment)));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(SETTINGS_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(vars.clone()),
            )
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.database = DatabaseSettings::from_vars(vars)?;
        settings.environment = environment;

        Ok(settings)
    }
}

fn environment_name(environment: &Environment) -> &'static str {
    match environment {
        Environment::Local => "local",
        Environment::Staging => "staging",
        Environment::Production => "production",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, LISTEN_PORT)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
        }
    }
}

/// Connection fields read from the unprefixed `DB_*` variables.
///
/// Every field is passed through untouched; an absent variable becomes an
/// empty string and the driver decides whether that is acceptable.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub sslmode: String,
}

impl DatabaseSettings {
    fn from_vars(vars: Option<HashMap<String, String>>) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix(DATABASE_PREFIX).source(vars))
            .build()
            .with_context(|| "failed to read DB_* variables")?
            .try_deserialize()
            .with_context(|| "failed to deserialize database settings")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default = "TelemetrySettings::default_level")]
    pub level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl TelemetrySettings {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
