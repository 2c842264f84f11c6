use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the task API, including the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Where the triage board (sections, order, expanded tasks) is kept.
    /// If absent, `triage.json` next to config.toml.
    #[serde(default)]
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.base_url, "http://localhost:5000/api");
        assert_eq!(config.server.timeout_secs, 10);
        assert!(config.state.path.is_none());
    }

    #[test]
    fn partial_server_table_keeps_other_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"[server]
base_url = "https://tasks.example.com/api"
"#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://tasks.example.com/api");
        assert_eq!(config.server.timeout_secs, 10);
    }
}
