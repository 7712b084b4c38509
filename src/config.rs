use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub jira: Option<JiraConfig>,
    /// Label values offered for selection; empty means unrestricted.
    /// Enforced in the CLI layer only, never by the core operations.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Client values offered for selection; same rules as `labels`.
    #[serde(default)]
    pub clients: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct JiraConfig {
    pub domain: String,
    pub email: String,
    pub api_token: String,
    pub project: String,
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jiradash")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: AppConfig =
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml = r#"
            labels = ["backend", "frontend"]
            clients = ["Acme Corp", "Globex"]

            [jira]
            domain = "example"
            email = "dev@example.com"
            api_token = "token123"
            project = "OPS"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        let jira = config.jira.unwrap();
        assert_eq!(jira.domain, "example");
        assert_eq!(jira.project, "OPS");
        assert_eq!(config.labels, vec!["backend", "frontend"]);
        assert_eq!(config.clients, vec!["Acme Corp", "Globex"]);
    }

    #[test]
    fn option_lists_default_to_empty() {
        let toml = r#"
            [jira]
            domain = "example"
            email = "dev@example.com"
            api_token = "token123"
            project = "OPS"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert!(config.labels.is_empty());
        assert!(config.clients.is_empty());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.jira.is_none());
    }

    #[test]
    fn reads_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "clients = [\"Acme\"]\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.clients, vec!["Acme"]);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "jira = \"not a table\"").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
