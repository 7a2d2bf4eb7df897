use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

pub const APP_PREFIX: &str = "code-navigator";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub cascade: CascadeConfig,
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// 0 = no client-side timeout
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Environment variable holding the bearer token
    pub token_env: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    pub skip_redundant_file_fetch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub help: char,
    pub logout: char,
    pub refresh_stats: char,
    pub load_sample: char,
    /// Copy the file shown in the viewer
    pub yank: char,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            timeout_secs: 30,
            max_retries: 1,
            retry_backoff_ms: 300,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_env: "CNAV_SESSION_TOKEN".to_owned(),
            user_id: String::new(),
            name: String::new(),
            email: String::new(),
        }
    }
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            help: '?',
            logout: 'L',
            refresh_stats: 'S',
            load_sample: 's',
            yank: 'y',
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> PathBuf {
        BaseDirectories::with_prefix(APP_PREFIX)
            .map(|dirs| dirs.get_config_home().join("config.toml"))
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }

    /// Token from the configured environment variable, if set and non-empty
    pub fn token_from_env(&self) -> Option<String> {
        std::env::var(&self.session.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.backend.timeout_secs, 30);
        assert!(!config.cascade.skip_redundant_file_fetch);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nbase_url = \"https://navigator.example.com\"\n\n\
             [cascade]\nskip_redundant_file_fetch = true"
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.backend.base_url, "https://navigator.example.com");
        assert_eq!(config.backend.max_retries, 1);
        assert!(config.cascade.skip_redundant_file_fetch);
        assert_eq!(config.keybindings.help, '?');
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nbase_url =").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_token_from_env() {
        let mut config = Config::default();
        config.session.token_env = "CNAV_TEST_TOKEN_VAR".to_string();

        std::env::remove_var("CNAV_TEST_TOKEN_VAR");
        assert_eq!(config.token_from_env(), None);

        std::env::set_var("CNAV_TEST_TOKEN_VAR", "  ");
        assert_eq!(config.token_from_env(), None);

        std::env::set_var("CNAV_TEST_TOKEN_VAR", "abc123");
        assert_eq!(config.token_from_env(), Some("abc123".to_string()));
        std::env::remove_var("CNAV_TEST_TOKEN_VAR");
    }
}
