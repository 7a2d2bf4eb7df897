use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::APP_PREFIX;

/// ログレベルを指定する環境変数
pub const LOG_ENV: &str = "CNAV_LOG";
const LOG_FILE: &str = "cnav.log";

/// Default log file in the XDG state dir
pub fn default_log_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix(APP_PREFIX)
        .context("Failed to get XDG directories")?;
    dirs.place_state_file(LOG_FILE)
        .context("Failed to create log directory")
}

/// Route `tracing` output to a file. The terminal belongs to the TUI.
pub fn init(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter())
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(())
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}
