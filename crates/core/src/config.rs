use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "wardrobe.toml";

/// Effective settings. Layers, lowest first: defaults, the TOML file, `WARDROBE_*`
/// environment variables, then [`ConfigOverrides`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Read instead of the discovered `wardrobe.toml`; must exist.
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://wardrobe.db".to_string(), max_connections: 5, timeout_secs: 30 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 8080, graceful_shutdown_secs: 15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = match options.config_path.or_else(config_file_path) {
            Some(path) => read_config_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        if let Some(database_url) = options.overrides.database_url {
            config.database.url = database_url;
        }
        config.validate()?;

        Ok(config)
    }

    /// `host:port` the HTTP server binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        env_override("WARDROBE_DATABASE_URL", &mut self.database.url)?;
        env_override("WARDROBE_DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections)?;
        env_override("WARDROBE_DATABASE_TIMEOUT_SECS", &mut self.database.timeout_secs)?;
        env_override("WARDROBE_SERVER_BIND_ADDRESS", &mut self.server.bind_address)?;
        env_override("WARDROBE_SERVER_PORT", &mut self.server.port)?;
        env_override(
            "WARDROBE_SERVER_GRACEFUL_SHUTDOWN_SECS",
            &mut self.server.graceful_shutdown_secs,
        )?;
        env_override("WARDROBE_LOGGING_LEVEL", &mut self.logging.level)?;
        env_override("WARDROBE_LOGGING_FORMAT", &mut self.logging.format)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.database.url.trim();
        if !(url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:") {
            return Err(invalid(
                "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(invalid("database.max_connections must be greater than zero"));
        }
        if !(1..=300).contains(&self.database.timeout_secs) {
            return Err(invalid("database.timeout_secs must be in range 1..=300"));
        }

        if self.server.bind_address.trim().is_empty() {
            return Err(invalid("server.bind_address must not be empty"));
        }
        if self.server.port == 0 {
            return Err(invalid("server.port must be greater than zero"));
        }
        if self.server.graceful_shutdown_secs == 0 {
            return Err(invalid("server.graceful_shutdown_secs must be greater than zero"));
        }

        match self.logging.level.trim().to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(invalid("logging.level must be one of trace|debug|info|warn|error")),
        }
    }
}

/// `wardrobe.toml` in the working directory, else `config/wardrobe.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    [PathBuf::from(DEFAULT_CONFIG_FILE), Path::new("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str(&interpolate_env_vars(&raw)?)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces every `${VAR}` with the variable's value.
fn interpolate_env_vars(raw: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let expression = &rest[start + 2..];
        let end = expression.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &expression[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &expression[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

/// Blank variables count as unset.
fn env_override<T: FromStr>(key: &str, target: &mut T) -> Result<(), ConfigError> {
    let Some(value) = env::var(key).ok().filter(|value| !value.trim().is_empty()) else {
        return Ok(());
    };
    match value.trim().parse() {
        Ok(parsed) => {
            *target = parsed;
            Ok(())
        }
        Err(_) => Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value }),
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Validation(message.to_string())
}
