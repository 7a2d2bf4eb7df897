use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use xdg::BaseDirectories;

use code_navigator::config::APP_PREFIX;

/// Default config.toml content
pub const DEFAULT_CONFIG: &str = r#"[backend]
base_url = "http://localhost:8000"
# Seconds before a request is abandoned (0 = wait forever)
timeout_secs = 30
# Retries apply to network failures only, never to error responses
max_retries = 1
retry_backoff_ms = 300

[session]
# Environment variable holding the bearer token (overridden by --token)
token_env = "CNAV_SESSION_TOKEN"
user_id = ""
name = ""
email = ""

[cascade]
# Skip refetching a file that is already displayed
skip_redundant_file_fetch = false

[keybindings]
help = '?'
logout = 'L'
refresh_stats = 'S'
load_sample = 's'
yank = 'y'
"#;

/// Run the init command
pub fn run_init(force: bool) -> Result<()> {
    let base_dirs =
        BaseDirectories::with_prefix(APP_PREFIX).context("Failed to get config directory")?;
    init_in(&base_dirs.get_config_home(), force)?;

    println!();
    println!("Initialization complete!");
    Ok(())
}

fn init_in(config_home: &Path, force: bool) -> Result<()> {
    if !config_home.exists() {
        println!(
            "Creating configuration directory: {}",
            config_home.display()
        );
        fs::create_dir_all(config_home).context("Failed to create config directory")?;
    }

    write_file_if_needed(
        &config_home.join("config.toml"),
        DEFAULT_CONFIG,
        force,
        "config.toml",
    )
}

/// Write a file if it doesn't exist or force is true
fn write_file_if_needed(path: &Path, content: &str, force: bool, name: &str) -> Result<()> {
    if path.exists() && !force {
        println!(
            "Skipping {} (already exists, use --force to overwrite)",
            name
        );
        return Ok(());
    }

    println!("Writing {}...", name);
    fs::write(path, content).with_context(|| format!("Failed to write {}", name))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use code_navigator::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_init_creates_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_home = temp_dir.path().join("code-navigator");

        init_in(&config_home, false).unwrap();

        let content = fs::read_to_string(config_home.join("config.toml")).unwrap();
        assert!(content.contains("[backend]"));
        assert!(content.contains("token_env = \"CNAV_SESSION_TOKEN\""));
    }

    #[test]
    fn test_init_skips_existing() {
        let temp_dir = TempDir::new().unwrap();
        let config_home = temp_dir.path().join("code-navigator");
        fs::create_dir_all(&config_home).unwrap();
        fs::write(config_home.join("config.toml"), "custom = true").unwrap();

        init_in(&config_home, false).unwrap();

        let content = fs::read_to_string(config_home.join("config.toml")).unwrap();
        assert_eq!(content, "custom = true");
    }

    #[test]
    fn test_init_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let config_home = temp_dir.path().join("code-navigator");
        fs::create_dir_all(&config_home).unwrap();
        fs::write(config_home.join("config.toml"), "custom = true").unwrap();

        init_in(&config_home, true).unwrap();

        let content = fs::read_to_string(config_home.join("config.toml")).unwrap();
        assert!(content.contains("[keybindings]"));
        assert!(!content.contains("custom = true"));
    }
}
