//! Configuration loading utilities
//!
//! Settings are resolved from several sources, highest priority first:
//! 1. CLI arguments
//! 2. Environment variables (handled by clap)
//! 3. Config file (searched in standard locations)
//! 4. Built-in defaults

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;

use crate::APP_NAME;

/// Describes where a configuration was loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Explicit path provided via CLI or env var
    Explicit(PathBuf),
    /// Found in current working directory
    CurrentDir(PathBuf),
    /// Found in XDG config home (~/.config/wims-feed/)
    XdgConfig(PathBuf),
    /// Found in system config (/etc/wims-feed/)
    System(PathBuf),
    /// No config file found, using defaults
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ConfigSource::Explicit(p)
            | ConfigSource::CurrentDir(p)
            | ConfigSource::XdgConfig(p)
            | ConfigSource::System(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.path() {
            Some(p) => write!(f, "{}", p.display()),
            None => write!(f, "(defaults)"),
        }
    }
}

/// Every place a config file may live, in search order.
///
/// An explicit path from `env_var` comes first, then the working directory,
/// the XDG config home and finally `/etc/wims-feed/`.
pub fn config_candidates(env_var: &str, filename: &str) -> Vec<ConfigSource> {
    let mut candidates = Vec::with_capacity(4);
    if let Ok(path) = env::var(env_var) {
        candidates.push(ConfigSource::Explicit(PathBuf::from(path)));
    }
    candidates.push(ConfigSource::CurrentDir(PathBuf::from(filename)));
    candidates.push(ConfigSource::XdgConfig(xdg_config_home().join(APP_NAME).join(filename)));
    candidates.push(ConfigSource::System(Path::new("/etc").join(APP_NAME).join(filename)));
    candidates
}

/// First existing candidate, or [`ConfigSource::Defaults`].
pub fn find_config_file(env_var: &str, filename: &str) -> ConfigSource {
    config_candidates(env_var, filename)
        .into_iter()
        .find(|source| source.path().is_some_and(|p| p.is_file()))
        .unwrap_or(ConfigSource::Defaults)
}

fn xdg_config_home() -> PathBuf {
    match (env::var_os("XDG_CONFIG_HOME"), env::var_os("HOME")) {
        (Some(xdg), _) => PathBuf::from(xdg),
        (None, Some(home)) => PathBuf::from(home).join(".config"),
        (None, None) => PathBuf::from(".config"),
    }
}

/// Load and parse a TOML configuration file
///
/// Returns `T::default()` when the source is [`ConfigSource::Defaults`],
/// and an error when the file cannot be read or parsed.
pub fn load_config<T: DeserializeOwned + Default>(source: &ConfigSource) -> anyhow::Result<T> {
    match source.path() {
        Some(path) => {
            debug!("loading config from {}", path.display());
            let content = fs::read_to_string(path)?;
            let config: T = toml::from_str(&content)?;
            Ok(config)
        }
        None => Ok(T::default()),
    }
}
