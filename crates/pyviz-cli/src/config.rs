//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use pyviz::{PyvizError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for PyvizError {
    fn from(err: ConfigError) -> Self {
        PyvizError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (pyviz/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, PyvizError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("pyviz/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "pyviz", "pyviz") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if the file doesn't exist, cannot be read, or is not a
/// valid configuration.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, PyvizError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pyviz::config::{LayoutEngine, RankDirection};
    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let file = config_file(
            r#"
            [layout]
            engine = "layered"
            direction = "top-bottom"
            node_spacing = 12.0

            [style]
            link_color = "red"
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.layout().engine(), LayoutEngine::Layered);
        assert_eq!(config.layout().direction(), RankDirection::TopBottom);
        assert_eq!(config.layout().node_spacing(), 12.0);
        assert_eq!(config.layout().rank_spacing(), 80.0);
        assert!(config.style().link_color().is_ok());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = load_config(Some("/definitely/not/here/config.toml")).unwrap_err();
        assert!(matches!(err, PyvizError::Config(msg) if msg.contains("Missing")));
    }

    #[test]
    fn test_unknown_engine_is_a_parse_error() {
        let file = config_file("[layout]\nengine = \"force\"\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, PyvizError::Config(msg) if msg.contains("parse")));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = config_file("");
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.layout().engine(), LayoutEngine::Sugiyama);
    }
}
