use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Path to the document template.
    pub template: PathBuf,
    /// Path to the spreadsheet (CSV, first record is the header).
    pub spreadsheet: PathBuf,
    /// Local scratch directory for filled documents awaiting upload.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Column whose value names the output document; falls back to a
    /// timestamp + row index when absent or empty.
    #[serde(default)]
    pub name_column: Option<String>,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    /// Minutes between scheduled pipeline runs.
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    #[serde(default)]
    pub remote: RemoteConfig,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_output_prefix() -> String {
    "document".to_string()
}

fn default_interval_minutes() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_rclone_path")]
    pub rclone_path: String,
    /// Name of the configured rclone remote.
    #[serde(default = "default_remote_name")]
    pub remote_name: String,
    /// Folder inside the remote where documents are published.
    #[serde(default = "default_folder")]
    pub folder: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            rclone_path: default_rclone_path(),
            remote_name: default_remote_name(),
            folder: default_folder(),
        }
    }
}

fn default_rclone_path() -> String {
    "rclone".to_string()
}

fn default_remote_name() -> String {
    "sharepoint".to_string()
}

fn default_folder() -> String {
    "files".to_string()
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = serde_yaml::from_str(
            r#"
template: templates/model.json
spreadsheet: data/rows.csv
"#,
        )
        .unwrap();
        assert_eq!(config.work_dir, PathBuf::from("temp"));
        assert_eq!(config.name_column, None);
        assert_eq!(config.output_prefix, "document");
        assert_eq!(config.interval_minutes, 60);
        assert_eq!(config.remote.rclone_path, "rclone");
        assert_eq!(config.remote.folder, "files");
    }

    #[test]
    fn test_full_config() {
        let config: Config = serde_yaml::from_str(
            r#"
template: model.json
spreadsheet: rows.csv
work_dir: scratch
name_column: "Entreprise/Commune"
output_prefix: diagnostic
interval_minutes: 15
remote:
  rclone_path: /usr/local/bin/rclone
  remote_name: onedrive
  folder: reports
"#,
        )
        .unwrap();
        assert_eq!(config.name_column.as_deref(), Some("Entreprise/Commune"));
        assert_eq!(config.interval_minutes, 15);
        assert_eq!(config.remote.remote_name, "onedrive");
    }
}
