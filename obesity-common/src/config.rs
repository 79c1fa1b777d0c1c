//! Configuration loading and bootstrap settings resolution
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops startup; the remaining
//! sources are used and the caller reports what happened.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::assessment::Framing;
use crate::{Error, Result};

pub const ENV_CONFIG_FILE: &str = "OBESITY_CONFIG";
pub const ENV_MODEL_PATH: &str = "OBESITY_MODEL_PATH";
pub const ENV_HOST: &str = "OBESITY_HOST";
pub const ENV_PORT: &str = "OBESITY_PORT";
pub const ENV_FRAMING: &str = "OBESITY_FRAMING";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5750;
pub const DEFAULT_MODEL_FILE: &str = "obesity_forest.json";

/// Built-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub model_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub framing: Framing,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            model_path: default_data_folder().join(DEFAULT_MODEL_FILE),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            framing: Framing::default(),
            log_level: default_log_level(),
        }
    }
}

/// OS-dependent data folder holding the model artifact
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\obesity
        dirs::data_local_dir()
            .map(|d| d.join("obesity"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\obesity"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/obesity
        dirs::data_dir()
            .map(|d| d.join("obesity"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/obesity"))
    } else {
        // ~/.local/share/obesity
        dirs::data_local_dir()
            .map(|d| d.join("obesity"))
            .unwrap_or_else(|| PathBuf::from("./obesity_data"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolved logging settings
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// `[logging]` table of the TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlLoggingConfig {
    #[serde(default)]
    pub level: Option<String>,

    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Bootstrap configuration read from the TOML file
///
/// Every key is optional. Unknown keys are rejected so typos surface as a
/// warning at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Parsed like the CLI and environment values, so any case is accepted
    #[serde(default, deserialize_with = "deserialize_framing")]
    pub framing: Option<Framing>,

    #[serde(default)]
    pub logging: TomlLoggingConfig,
}

fn deserialize_framing<'de, D>(deserializer: D) -> std::result::Result<Option<Framing>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse::<Framing>().map_err(serde::de::Error::custom))
        .transpose()
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Locate the TOML config file
///
/// `$OBESITY_CONFIG` wins; otherwise `<config_dir>/obesity/config.toml` if it
/// exists.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|d| d.join("obesity").join("config.toml"))
        .filter(|p| p.exists())
}

/// Where the bootstrap TOML settings came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// No config file present
    Defaults,
    /// Settings read from this file
    File(PathBuf),
    /// File present but unusable; defaults used instead
    Ignored { path: PathBuf, reason: String },
}

/// Load the TOML config, falling back to an empty config on any failure
///
/// Does not log: callers load config before tracing is installed and report
/// the returned [`ConfigSource`] afterwards.
pub fn load_config(explicit: Option<&Path>) -> (TomlConfig, ConfigSource) {
    let path = match explicit.map(Path::to_path_buf).or_else(config_file_path) {
        Some(path) => path,
        None => return (TomlConfig::default(), ConfigSource::Defaults),
    };

    match load_toml_config(&path) {
        Ok(config) => (config, ConfigSource::File(path)),
        Err(e) => (
            TomlConfig::default(),
            ConfigSource::Ignored {
                path,
                reason: e.to_string(),
            },
        ),
    }
}

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub framing: Option<Framing>,
    pub log_level: Option<String>,
}

/// Fully resolved bootstrap settings for the service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub model_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub framing: Framing,
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Merge CLI, environment, TOML and compiled defaults
    ///
    /// # Errors
    /// `Error::Config` when an environment variable holds an unparsable value.
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::for_current_platform();

        let model_path = cli
            .model_path
            .clone()
            .or_else(|| env_var(ENV_MODEL_PATH).map(PathBuf::from))
            .or_else(|| toml.model_path.clone())
            .unwrap_or(defaults.model_path);

        let host = cli
            .host
            .clone()
            .or_else(|| env_var(ENV_HOST))
            .or_else(|| toml.host.clone())
            .unwrap_or(defaults.host);

        let env_port = env_var(ENV_PORT)
            .map(|s| {
                s.trim()
                    .parse::<u16>()
                    .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", ENV_PORT, s, e)))
            })
            .transpose()?;
        let port = cli.port.or(env_port).or(toml.port).unwrap_or(defaults.port);

        let env_framing = env_var(ENV_FRAMING).map(|s| s.parse::<Framing>()).transpose()?;
        let framing = cli
            .framing
            .or(env_framing)
            .or(toml.framing)
            .unwrap_or(defaults.framing);

        let logging = LoggingConfig {
            level: cli
                .log_level
                .clone()
                .or_else(|| toml.logging.level.clone())
                .unwrap_or(defaults.log_level),
            file: toml.logging.file.clone(),
        };

        Ok(Self {
            model_path,
            host,
            port,
            framing,
            logging,
        })
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
