//! Configuration file layers.
//!
//! warpcheck reads up to three TOML files, each overriding the one before:
//! the user's file under the platform config directory, `warpcheck.toml` in
//! the project directory and the untracked `warpcheck.local.toml` beside it.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::ConfigError;

/// One file-backed configuration source, in increasing precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigLayer {
    User,
    Project,
    Local,
}

impl ConfigLayer {
    pub const ALL: [ConfigLayer; 3] = [ConfigLayer::User, ConfigLayer::Project, ConfigLayer::Local];

    /// Location of this layer's file for a run in `project_dir`.
    ///
    /// Only the user layer can fail, when the platform has no home directory.
    pub fn file(self, project_dir: &Path) -> Result<PathBuf, ConfigError> {
        match self {
            ConfigLayer::User => ProjectDirs::from("", "", "warpcheck")
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .ok_or_else(|| ConfigError::XdgError("no home directory for user config".into())),
            ConfigLayer::Project => Ok(project_dir.join("warpcheck.toml")),
            ConfigLayer::Local => Ok(project_dir.join("warpcheck.local.toml")),
        }
    }
}

impl Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigLayer::User => write!(f, "user"),
            ConfigLayer::Project => write!(f, "project"),
            ConfigLayer::Local => write!(f, "local"),
        }
    }
}

/// Existing layer files for `project_dir`, lowest precedence first.
pub fn existing_layers(project_dir: &Path, include_user: bool) -> Vec<(ConfigLayer, PathBuf)> {
    ConfigLayer::ALL
        .into_iter()
        .filter(|layer| include_user || *layer != ConfigLayer::User)
        .filter_map(|layer| layer.file(project_dir).ok().map(|file| (layer, file)))
        .filter(|(_, file)| file.is_file())
        .collect()
}
