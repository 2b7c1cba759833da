//! Configuration loading and generation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enable debug logging to file
    pub debug: bool,

    /// Path to log directory
    pub log_path: PathBuf,

    /// How many revisions to look back per file
    pub history_depth: usize,

    /// Max candidate authors considered per file
    pub candidate_limit: usize,

    /// Author identities never suggested (name, email, or "Name <email>")
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            log_path: default_log_path(),
            history_depth: 1000,
            candidate_limit: 10,
            exclude: Vec::new(),
        }
    }
}

/// Default log path: ~/.config/review-sight/logs
fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("review-sight")
        .join("logs")
}

/// Configuration service.
pub struct ConfigService;

impl ConfigService {
    /// Get the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("review-sight")
            .join("config.toml")
    }

    /// Load configuration from file.
    ///
    /// If `path` is `None`, uses the default path.
    /// If the file doesn't exist, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);
        let config_dir = path.parent();

        if !path.exists() {
            // Return defaults — don't auto-create
            let mut config = Config::default();
            if let Some(dir) = config_dir {
                config.log_path = dir.join("logs");
            }
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // If log_path was not explicitly set, use config file's directory/logs
        if config.log_path == default_log_path()
            && let Some(dir) = config_dir
        {
            config.log_path = dir.join("logs");
        }

        Ok(config)
    }

    /// Generate default configuration file at the default path.
    pub fn generate_default() -> Result<()> {
        Self::generate_at(&Self::default_path())
    }

    /// Generate default configuration file at the specified path.
    pub fn generate_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = Self::default_config_content();
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Generate default configuration content with comments.
    fn default_config_content() -> String {
        r#"# review-sight configuration file

# Enable debug logging to file (default: false)
debug = false

# Path to log directory (default: ~/.config/review-sight/logs)
# log_path = "~/.config/review-sight/logs"

# How many revisions to look back per file (default: 1000)
history_depth = 1000

# Max candidate authors considered per file (default: 10)
candidate_limit = 10

# Author identities never suggested: name, email, or "Name <email>"
# exclude = ["ci-bot@example.com"]
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_config_toml() {
        let path = ConfigService::default_path();
        assert!(path.ends_with("review-sight/config.toml"));
    }

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(!config.debug);
        assert_eq!(config.history_depth, 1000);
        assert_eq!(config.candidate_limit, 10);
        assert!(config.exclude.is_empty());
    }

    #[test]
    fn generate_at_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("test_config.toml");

        ConfigService::generate_at(&config_path).unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("debug = false"));
        assert!(content.contains("history_depth = 1000"));
        assert!(content.contains("candidate_limit = 10"));
    }

    #[test]
    fn generate_at_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("nested").join("dir").join("config.toml");

        ConfigService::generate_at(&config_path).unwrap();

        assert!(config_path.exists());
    }

    #[test]
    fn load_returns_defaults_when_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = ConfigService::load(Some(&config_path)).unwrap();

        // Should return defaults without creating file
        assert!(!config_path.exists());
        assert!(!config.debug);
        assert_eq!(config.candidate_limit, 10);
    }

    #[test]
    fn load_parses_existing_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "debug = true\nhistory_depth = 200\nexclude = [\"bot@example.com\"]\n",
        )
        .unwrap();

        let config = ConfigService::load(Some(&config_path)).unwrap();
        assert!(config.debug);
        assert_eq!(config.history_depth, 200);
        assert_eq!(config.exclude, ["bot@example.com"]);
        // Unset fields fall back to defaults
        assert_eq!(config.candidate_limit, 10);
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("bad.toml");

        fs::write(&config_path, "not valid [[[").unwrap();

        let result = ConfigService::load(Some(&config_path));
        assert!(result.is_err());
    }

    #[test]
    fn load_custom_log_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "debug = true\nlog_path = \"/tmp/review-sight-logs\"\n",
        )
        .unwrap();

        let config = ConfigService::load(Some(&config_path)).unwrap();
        assert!(config.debug);
        assert_eq!(config.log_path, PathBuf::from("/tmp/review-sight-logs"));
    }
}
