use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use code_navigator::{app, backend, config, logging, session};

// init is only used by the binary
mod init;

#[derive(Parser, Debug)]
#[command(name = "cnav")]
#[command(about = "Terminal dashboard for exploring code and finding first contributions")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Backend base URL (overrides config)
    #[arg(long)]
    backend_url: Option<String>,

    /// Session bearer token (overrides the environment and config)
    #[arg(long)]
    token: Option<String>,

    /// Path to config.toml (default: $XDG_CONFIG_HOME/code-navigator/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (default: $XDG_STATE_HOME/code-navigator/cnav.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the default configuration file
    Init {
        /// Force overwrite existing files
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

/// Restore terminal to normal state
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Set up panic hook to restore terminal on panic
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up panic hook before anything else
    setup_panic_hook();

    let args = Args::parse();

    // Handle subcommands
    if let Some(command) = args.command {
        return match command {
            Commands::Init { force } => init::run_init(force),
        };
    }

    let log_path = match args.log_file {
        Some(path) => path,
        None => logging::default_log_path()?,
    };
    logging::init(&log_path)?;

    let mut config = match &args.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    if let Some(url) = args.backend_url {
        config.backend.base_url = url;
    }

    // CLI > 環境変数 > ログイン画面
    let token = args.token.or_else(|| config.token_from_env());
    let profile = session::UserProfile {
        user_id: config.session.user_id.clone(),
        name: config.session.name.clone(),
        email: config.session.email.clone(),
        picture: None,
    };
    let identity = session::TokenSession::with_token(profile, token);

    let http = backend::HttpBackend::new(&config.backend)
        .context("Failed to create backend client")?;
    info!("starting with backend {}", config.backend.base_url);

    let mut app = app::App::new(config, Box::new(identity), Arc::new(http))?;
    app.run().await
}
