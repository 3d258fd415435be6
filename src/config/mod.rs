//! Configuration system (layered: defaults < config file < env).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SessionError};
use crate::session::{PermissionMode, SessionOptions, DEFAULT_MODEL};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "SESSIONFOLD_CONFIG";

const ENV_AGENT_BINARY: &str = "SESSIONFOLD_AGENT_BINARY";
const ENV_MODEL: &str = "SESSIONFOLD_MODEL";
const ENV_PERMISSION_MODE: &str = "SESSIONFOLD_PERMISSION_MODE";
const ENV_CONTINUE_ON_FAIL: &str = "SESSIONFOLD_CONTINUE_ON_FAIL";
const ENV_DEBUG: &str = "SESSIONFOLD_DEBUG";

/// Host-level settings shared by every item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Agent CLI to spawn.
    pub agent_binary: PathBuf,
    /// Model for items that do not name one.
    pub default_model: String,
    pub default_permission_mode: PermissionMode,
    pub continue_on_failure: bool,
    pub debug: bool,
    /// Extra environment for the agent process.
    pub env: BTreeMap<String, String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            agent_binary: PathBuf::from("claude"),
            default_model: DEFAULT_MODEL.to_string(),
            default_permission_mode: PermissionMode::default(),
            continue_on_failure: false,
            debug: false,
            env: BTreeMap::new(),
        }
    }
}

impl RelayConfig {
    /// Resolve the full layering. `path` overrides the default file location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os(CONFIG_PATH_ENV)
                .map(PathBuf::from)
                .or_else(default_config_path),
        };
        let mut config = match path {
            Some(path) => Self::from_file(&path)?.unwrap_or_default(),
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML file. A missing file is `Ok(None)`.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let config = toml::from_str(&raw).map_err(|err| {
            SessionError::Configuration(format!("{}: {err}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(Some(config))
    }

    /// Apply `SESSIONFOLD_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(binary) = lookup(ENV_AGENT_BINARY).filter(|v| !v.trim().is_empty()) {
            self.agent_binary = PathBuf::from(binary.trim());
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.default_model = model.trim().to_string();
        }
        if let Some(mode) = lookup(ENV_PERMISSION_MODE) {
            self.default_permission_mode = PermissionMode::from_str(mode.trim()).map_err(|_| {
                SessionError::Configuration(format!("{ENV_PERMISSION_MODE}: unknown mode '{mode}'"))
            })?;
        }
        if let Some(flag) = lookup(ENV_CONTINUE_ON_FAIL) {
            self.continue_on_failure = parse_flag(ENV_CONTINUE_ON_FAIL, &flag)?;
        }
        if let Some(flag) = lookup(ENV_DEBUG) {
            self.debug = parse_flag(ENV_DEBUG, &flag)?;
        }
        Ok(())
    }

    /// Decode one item, filling fields it leaves out from this config.
    pub fn item_options(&self, item: Value) -> Result<SessionOptions> {
        let Value::Object(mut fields) = item else {
            return Err(SessionError::InvalidArgument(
                "each item must be a JSON object".to_string(),
            ));
        };
        fields
            .entry("model")
            .or_insert_with(|| Value::String(self.default_model.clone()));
        fields
            .entry("permission_mode")
            .or_insert_with(|| Value::String(self.default_permission_mode.to_string()));
        if self.debug {
            fields.insert("debug".to_string(), Value::Bool(true));
        }
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::UserDirs::new().map(|dirs| dirs.home_dir().join(".sessionfold").join("config.toml"))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SessionError::Configuration(format!(
            "{name}: expected a boolean, got '{other}'"
        ))),
    }
}
