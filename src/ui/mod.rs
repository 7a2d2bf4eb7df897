mod chat;
pub mod clipboard;
mod common;
mod dashboard;
mod file_tree;
mod footer;
mod help;
mod issue_list;
mod login;
mod plan_modal;
pub mod text_area;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, Stdout};

use crate::app::App;
use crate::session::Route;
use crate::view;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

pub fn render(frame: &mut Frame, app: &App) {
    match app.route() {
        Route::SessionLoading => login::render_splash(frame, app),
        Route::Login => login::render(frame, app),
        Route::Dashboard => match view::project(&app.dashboard) {
            Ok(screen) => {
                dashboard::render(frame, app, &screen);
                if let Some(plan) = &screen.plan {
                    plan_modal::render(frame, app, plan);
                }
                if app.show_help {
                    help::render(frame, app);
                }
            }
            // 登録済みリージョン名のみ参照するため通常は到達しない
            Err(err) => common::render_error(frame, &err.to_string()),
        },
    }
}
