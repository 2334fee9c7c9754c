use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Node-level recovery settings, usually loaded from YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryConfig {
    /// Volume roots to scan, one worker each.
    pub volumes: Vec<PathBuf>,
    /// Default `env_logger` filter for the recovery binary.
    #[serde(default)]
    pub log_filter: Option<String>,
}

/// If `path` is relative, joins it to `base`; otherwise returns it unchanged.
pub fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Loads a [`RecoveryConfig`], resolving relative volume roots against the
/// config file's directory.
pub fn load_recovery_config(path: &Path) -> Result<RecoveryConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: RecoveryConfig =
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    for volume in &mut config.volumes {
        *volume = resolve_relative(&base, volume);
    }
    if config.volumes.is_empty() {
        return Err(ConfigError::NoVolumes {
            path: path.to_path_buf(),
        });
    }
    Ok(config)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("config {path:?} lists no volumes")]
    NoVolumes { path: PathBuf },
}
