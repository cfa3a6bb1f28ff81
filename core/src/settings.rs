use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Runtime configuration, read from a YAML file next to the binary.
/// Every key is optional; a missing file yields the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Backing file for the object store.
    pub data_file: PathBuf,
    /// Log filter handed to the logger, e.g. "info" or "debug".
    pub log_level: String,
    /// Directory for log files. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            data_file: PathBuf::from("lodgebook.json"),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl Settings {
    /// Read settings from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Settings, String> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        serde_yaml::from_str(&text)
            .map_err(|e| format!("invalid settings file {}: {}", path.display(), e))
    }
}

/// Settings location: the `LODGEBOOK_CONFIG` variable when set, otherwise
/// `lodgebook.yaml` in the working directory.
pub fn resolve_config_path() -> PathBuf {
    match std::env::var("LODGEBOOK_CONFIG") {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from("lodgebook.yaml"),
    }
}
