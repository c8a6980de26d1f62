//! CLI Configuration

use sase_rules::EngineConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Load the engine config from `explicit`, or from the default location.
///
/// An explicit path must exist; a missing default file means defaults.
pub fn load(explicit: Option<&Path>) -> Result<EngineConfig, String> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Ok(path) if path.exists() => path,
            _ => return Ok(EngineConfig::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
    let config: EngineConfig =
        toml::from_str(&content).map_err(|e| format!("invalid config {}: {}", path.display(), e))?;
    config.validate().map_err(|e| e.to_string())?;
    tracing::debug!(path = %path.display(), "loaded engine config");
    Ok(config)
}

/// Write `config` to `path`, creating parent directories.
pub fn save(config: &EngineConfig, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let content = toml::to_string_pretty(config).map_err(|e| e.to_string())?;
    fs::write(path, content).map_err(|e| e.to_string())
}

pub fn default_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Cannot find home directory")?;
    Ok(home.join(".opensase").join("forms.toml"))
}
