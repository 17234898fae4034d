use crate::extensions::ExtensionSet;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "photo";

/// Defaults for a run, read from `config.toml`. Every key is optional and the
/// command line overrides what is set here. The file is never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    pub prefix: String,
    pub extensions: ExtensionSet,
    pub recursive: bool,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            extensions: ExtensionSet::default(),
            recursive: false,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "exif-date-rename").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Loads `explicit` if given (it must exist), otherwise the per-user config
/// file when present, otherwise the built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<RenameConfig> {
    match explicit {
        Some(path) => read_config_file(path),
        None => match default_config_path() {
            Some(path) if path.is_file() => read_config_file(&path),
            _ => Ok(RenameConfig::default()),
        },
    }
}

fn read_config_file(path: &Path) -> Result<RenameConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read config file: {}", path.display()))?;
    toml::from_str::<RenameConfig>(&raw)
        .with_context(|| format!("could not parse config file: {}", path.display()))
}
