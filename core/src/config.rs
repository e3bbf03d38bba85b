//! Persisted user settings.
//!
//! Loaded once at startup and written back on change; components take a
//! `&Settings` rather than reaching for globals. The on-disk format is a
//! flat JSON document with only string/boolean values, so hand edits and
//! older versions stay readable: unknown keys are ignored and missing
//! keys fall back to defaults.

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const HOME_ENV_VAR: &str = "HEMTT_WORKBENCH_HOME";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path or bare name of the hemtt executable.
    pub hemtt_path: String,
    /// Directory containing the mod project; the working directory for
    /// most commands.
    pub project_dir: PathBuf,
    /// Arma 3 executable handed to `hemtt launch -e` when set.
    pub arma3_executable: Option<String>,
    pub dark_mode: bool,
    pub verbose: bool,
    pub pedantic: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hemtt_path: "hemtt".to_string(),
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            arma3_executable: None,
            dark_mode: false,
            verbose: false,
            pedantic: false,
        }
    }
}

impl Settings {
    /// Load from the given file, falling back to defaults when the file
    /// is missing, unreadable, or not valid JSON. A broken settings file
    /// should never keep the tool from starting.
    pub fn load_from(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                if path.exists() {
                    warn!(path = %path.display(), error = %err, "failed to read settings; using defaults");
                }
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "settings file is invalid; using defaults");
                Self::default()
            }
        }
    }

    /// Load from the default location (see [`config_path`]).
    pub fn load() -> Self {
        match config_path() {
            Ok(path) => Self::load_from(&path),
            Err(err) => {
                warn!(error = %err, "no settings location; using defaults");
                Self::default()
            }
        }
    }

    /// Persist to the given file. The write is atomic: a sibling temp
    /// file is written first, then renamed over the target.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| ConfigError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// String view of a field, for `config get`.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "hemtt_path" => Ok(self.hemtt_path.clone()),
            "project_dir" => Ok(self.project_dir.display().to_string()),
            "arma3_executable" => Ok(self.arma3_executable.clone().unwrap_or_default()),
            "dark_mode" => Ok(self.dark_mode.to_string()),
            "verbose" => Ok(self.verbose.to_string()),
            "pedantic" => Ok(self.pedantic.to_string()),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    /// Update a field from its string form, for `config set`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "hemtt_path" => self.hemtt_path = value.to_string(),
            "project_dir" => self.project_dir = PathBuf::from(value),
            "arma3_executable" => {
                self.arma3_executable = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "dark_mode" => self.dark_mode = parse_bool(key, value)?,
            "verbose" => self.verbose = parse_bool(key, value)?,
            "pedantic" => self.pedantic = parse_bool(key, value)?,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("expected true or false, got `{value}`"),
    })
}

/// Where settings live: `$HEMTT_WORKBENCH_HOME/config.json` when the
/// variable is set, else the platform config directory.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::var_os(HOME_ENV_VAR) {
        return Ok(PathBuf::from(home).join(CONFIG_FILE_NAME));
    }
    dirs::config_dir()
        .map(|dir| dir.join("hemtt-workbench").join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}
