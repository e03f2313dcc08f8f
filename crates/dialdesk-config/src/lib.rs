use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dialdesk_core::domain::{AgentId, OrganizationId};
use dialdesk_core::rules::{validate_max_attempts, AttemptPolicy, MAX_ATTEMPTS};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "dialdesk";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 2000;
pub const MAX_BUSY_TIMEOUT_MS: u32 = 60_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub max_attempts: u32,
    pub store: StoreConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub busy_timeout_ms: u32,
}

/// Defaults for commands that act on behalf of one agent.
#[derive(Debug, Clone, Default)]
pub struct AgentConfig {
    pub id: Option<AgentId>,
    pub organization: Option<OrganizationId>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            store: StoreConfig {
                busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            },
            agent: AgentConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn attempt_policy(&self) -> AttemptPolicy {
        // max_attempts is validated on load; default covers hand-built configs
        AttemptPolicy::new(self.max_attempts).unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid max_attempts value: {0}")]
    InvalidMaxAttempts(u32),
    #[error("invalid store.busy_timeout_ms value: {0}")]
    InvalidBusyTimeout(u32),
    #[error("invalid agent.{field} value: {value:?}")]
    InvalidAgentField { field: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    max_attempts: Option<u32>,
    store: Option<StoreFile>,
    agent: Option<AgentFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreFile {
    busy_timeout_ms: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AgentFile {
    id: Option<String>,
    organization: Option<String>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(max_attempts) = parsed.max_attempts {
        config.max_attempts = validate_max_attempts(max_attempts)
            .map_err(|_| ConfigError::InvalidMaxAttempts(max_attempts))?;
    }

    if let Some(store) = parsed.store {
        if let Some(timeout) = store.busy_timeout_ms {
            if timeout == 0 || timeout > MAX_BUSY_TIMEOUT_MS {
                return Err(ConfigError::InvalidBusyTimeout(timeout));
            }
            config.store.busy_timeout_ms = timeout;
        }
    }

    if let Some(agent) = parsed.agent {
        if let Some(id) = agent.id {
            let parsed = AgentId::new(&id)
                .map_err(|_| ConfigError::InvalidAgentField { field: "id", value: id })?;
            config.agent.id = Some(parsed);
        }
        if let Some(organization) = agent.organization {
            let parsed =
                OrganizationId::new(&organization).map_err(|_| ConfigError::InvalidAgentField {
                    field: "organization",
                    value: organization,
                })?;
            config.agent.organization = Some(parsed);
        }
    }

    Ok(config)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
