//! User configuration loaded from `~/.pintport/config.json`.
//!
//! The file is optional. When it does not exist the configuration is empty and
//! every API key lookup returns `None`.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const CONFIG_FILE_NAME: &str = "config.json";

static GLOBAL: OnceLock<Config> = OnceLock::new();

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Provider name to API key.
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
}

impl Config {
    /// Load from the default location, see [`default_config_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(default_config_path())
    }

    /// Load from `path`. A missing file is an empty configuration.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("no config at {}, using empty configuration", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "loaded config from {} ({} api keys)",
            path.display(),
            config.api_keys.len()
        );
        Ok(config)
    }

    /// Process-wide configuration, loaded once on first use.
    ///
    /// Read or parse failures are logged and replaced by an empty
    /// configuration so that source construction never fails on config.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| {
            Self::load().unwrap_or_else(|error| {
                warn!("{error}; continuing with empty configuration");
                Self::default()
            })
        })
    }

    /// Install `config` as the process-wide configuration.
    ///
    /// Returns the rejected value if the global was already initialised.
    pub fn install(config: Self) -> Result<(), Self> {
        GLOBAL.set(config)
    }

    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys.get(provider).map(String::as_str)
    }

    pub fn with_api_key(mut self, provider: impl Into<String>, key: impl Into<String>) -> Self {
        self.api_keys.insert(provider.into(), key.into());
        self
    }
}

/// Directory holding pintport's user files.
///
/// `PINTPORT_HOME` wins when set and non-empty, then `$HOME/.pintport`.
fn resolve_pintport_home() -> PathBuf {
    home_from(env::var_os("PINTPORT_HOME"), env::var_os("HOME"))
}

fn home_from(pintport_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
    if let Some(path) = pintport_home.filter(|path| !path.is_empty()) {
        return PathBuf::from(path);
    }

    match home {
        Some(home) => PathBuf::from(home).join(".pintport"),
        None => PathBuf::from(".pintport"),
    }
}

pub fn default_config_path() -> PathBuf {
    resolve_pintport_home().join(CONFIG_FILE_NAME)
}
