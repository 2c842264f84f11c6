use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::ClientConfig;

/// Environment variable that overrides the configured server URL
pub const API_URL_ENV: &str = "TAYRA_API_URL";

/// Error type for config file operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    EditError(#[from] toml_edit::TomlError),
    #[error("unknown config key '{0}' (expected: server.base_url, server.timeout_secs, state.path)")]
    UnknownKey(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// The tayra config directory, respecting XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    base.join("tayra")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Read the config file. A missing file gives the defaults.
pub fn read_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    if !path.exists() {
        return Ok(ClientConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Layer overrides over the file config. A command-line flag beats the
/// environment, which beats the file.
pub fn apply_overrides(
    mut config: ClientConfig,
    env_url: Option<String>,
    api_url: Option<&str>,
    state_file: Option<&str>,
) -> ClientConfig {
    if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
        config.server.base_url = url;
    }
    if let Some(url) = api_url {
        config.server.base_url = url.to_string();
    }
    if let Some(path) = state_file {
        config.state.path = Some(path.to_string());
    }
    config
}

/// Where the triage state lives for this config
pub fn state_path(config: &ClientConfig) -> PathBuf {
    match config.state.path {
        Some(ref p) => PathBuf::from(p),
        None => config_dir().join("triage.json"),
    }
}

/// Set `key` (dotted, e.g. `server.base_url`) in the config file, keeping
/// the rest of the document's formatting and comments intact.
pub fn set_config_value(path: &Path, key: &str, value: &str) -> Result<(), ConfigError> {
    let text = if path.exists() {
        fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = text.parse()?;
    set_in_document(&mut doc, key, value)?;

    // Validate before writing so a bad edit never lands on disk
    toml::from_str::<ClientConfig>(&doc.to_string())?;

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| ConfigError::ReadError {
            path: dir.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, doc.to_string()).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn set_in_document(doc: &mut toml_edit::DocumentMut, key: &str, value: &str) -> Result<(), ConfigError> {
    let (table, field) = match key {
        "server.base_url" => ("server", "base_url"),
        "server.timeout_secs" => ("server", "timeout_secs"),
        "state.path" => ("state", "path"),
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    };
    if !doc.contains_key(table) {
        doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc[table][field] = if field == "timeout_secs" {
        let secs: i64 = value.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        toml_edit::value(secs)
    } else {
        toml_edit::value(value)
    };
    Ok(())
}
