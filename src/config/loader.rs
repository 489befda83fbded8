//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load configuration, apply `overrides`, then validate the result.
///
/// Without a file the defaults are used.
pub fn load_config<F>(path: Option<&Path>, overrides: F) -> Result<ServiceConfig, ConfigError>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ServiceConfig::default(),
    };
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nport = 4000\n\n[timeouts]\nshutdown_grace_secs = 3").unwrap();

        let config = load_config(Some(file.path()), |_| {}).unwrap();
        assert_eq!(config.listener.port, 4000);
        assert_eq!(config.timeouts.shutdown_grace_secs, 3);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[timeouts]\nshutdown_grace_secs = 0").unwrap();

        let err = load_config(Some(file.path()), |_| {}).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().contains("shutdown_grace_secs"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nport = ").unwrap();

        assert!(matches!(load_config(Some(file.path()), |_| {}), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides_are_validated() {
        let config = load_config(None, |c| c.listener.port = 8080).unwrap();
        assert_eq!(config.listener.port, 8080);

        let err = load_config(None, |c| c.listener.host.clear()).unwrap_err();
        assert!(err.to_string().contains("listener.host"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml")), |_| {}).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
