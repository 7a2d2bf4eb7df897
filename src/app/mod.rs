use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::backend::Backend;
use crate::config::Config;
use crate::loader::{self, RegionEvent};
use crate::session::{route_for, IdentityProvider, Route, UserProfile};
use crate::ui;

mod dashboard;
mod input;
mod types;
pub use dashboard::{regions, Dashboard, TreeView, CHAT_APOLOGY, EMPTY_CODE_MESSAGE};
pub use types::*;


const SPINNER_FRAMES: &[&str] = &[
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];

/// 完了イベントチャンネルの容量
const EVENT_CHANNEL_CAPACITY: usize = 64;

const SAMPLE_CODE: &str = "def factorial(n)
    if n == 0:
        return 1
    else
        return n * factorial(n-1)";

const SAMPLE_CONTEXT: &str =
    "A Python function to calculate factorial. I think there might be a syntax error.";

pub struct App {
    pub config: Config,
    pub dashboard: Dashboard,
    identity: Box<dyn IdentityProvider>,
    pub focus: Panel,
    /// 編集中の入力欄（None = ナビゲーションモード）
    pub input_target: Option<InputTarget>,
    pub forms: Forms,
    pub show_help: bool,
    pub login_error: Option<String>,
    /// フッターに一度だけ出す通知
    pub notice: Option<String>,
    pub should_quit: bool,
    spinner_frame: usize,
    /// ダッシュボード表示後に一度だけ統計を取得
    stats_requested: bool,
    backend: Arc<dyn Backend>,
    event_tx: mpsc::Sender<RegionEvent>,
    event_rx: mpsc::Receiver<RegionEvent>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(
        config: Config,
        identity: Box<dyn IdentityProvider>,
        backend: Arc<dyn Backend>,
    ) -> Result<Self> {
        let dashboard =
            Dashboard::new(&config.cascade).context("Failed to build dashboard regions")?;
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            config,
            dashboard,
            identity,
            focus: Panel::default(),
            input_target: None,
            forms: Forms::default(),
            show_help: false,
            login_error: None,
            notice: None,
            should_quit: false,
            spinner_frame: 0,
            stats_requested: false,
            backend,
            event_tx,
            event_rx,
            cancel: CancellationToken::new(),
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;

        let result = self.event_loop(&mut terminal).await;

        // Stop outstanding requests; their results would be discarded anyway
        self.cancel.cancel();
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Tui) -> Result<()> {
        while !self.should_quit {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            self.tick()?;
            terminal.draw(|frame| ui::render(frame, self))?;
            self.handle_input().await?;
        }
        Ok(())
    }

    /// One loop iteration without terminal I/O
    pub(crate) fn tick(&mut self) -> Result<()> {
        self.poll_events()?;
        self.ensure_user_stats()?;
        self.dispatch();
        Ok(())
    }

    /// Apply every completion that has arrived, one at a time
    pub(crate) fn poll_events(&mut self) -> Result<()> {
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => self.apply_event(event)?,
                Err(mpsc::error::TryRecvError::Empty) => return Ok(()),
                Err(mpsc::error::TryRecvError::Disconnected) => return Ok(()),
            }
        }
    }

    fn apply_event(&mut self, event: RegionEvent) -> Result<()> {
        self.dashboard.apply(event).map_err(|err| {
            error!("region wiring error: {err}");
            anyhow::Error::new(err)
        })
    }

    /// Send queued requests to the backend
    pub(crate) fn dispatch(&mut self) {
        for request in self.dashboard.take_outbox() {
            // トークンはリクエストごとに取得し、保持しない
            match self.identity.session_token() {
                Some(bearer) => loader::spawn(
                    Arc::clone(&self.backend),
                    bearer.to_string(),
                    request,
                    self.event_tx.clone(),
                    self.cancel.child_token(),
                ),
                None => {
                    let event = loader::unauthenticated(request);
                    if let Err(err) = self.event_tx.try_send(event) {
                        error!("failed to queue unauthenticated result: {err}");
                    }
                }
            }
        }
    }

    fn ensure_user_stats(&mut self) -> Result<()> {
        if self.stats_requested || self.route() != Route::Dashboard {
            return Ok(());
        }
        self.stats_requested = true;
        self.dashboard.load_user_stats()?;
        Ok(())
    }

    pub fn route(&self) -> Route {
        route_for(self.identity.as_ref())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.identity.current_user()
    }

    /// Greeting name, "Coder" when the profile has none
    pub fn display_name(&self) -> &str {
        self.user().map_or("Coder", UserProfile::display_name)
    }

    pub(crate) fn login(&mut self) {
        let credential = self.forms.login.content();
        match self.identity.login(&credential) {
            Ok(()) => {
                info!("signed in");
                self.login_error = None;
                self.forms.login.clear();
            }
            Err(err) => self.login_error = Some(err.to_string()),
        }
    }

    pub(crate) fn logout(&mut self) -> Result<()> {
        info!("signed out");
        self.identity.logout();
        self.dashboard.reset_all()?;
        self.forms = Forms::default();
        self.focus = Panel::default();
        self.input_target = None;
        self.show_help = false;
        self.notice = None;
        self.stats_requested = false;
        Ok(())
    }

    /// Copy the file shown in the viewer to the clipboard
    pub(crate) fn yank_file(&mut self) -> Result<()> {
        let notice = match self.dashboard.displayed_file_content()? {
            Some((path, text)) => match ui::clipboard::copy(text) {
                Ok(()) => format!("Copied {path} to clipboard"),
                Err(err) => {
                    warn!("clipboard copy failed: {err:#}");
                    format!("Clipboard error: {err}")
                }
            },
            None => "No file to copy".to_string(),
        };
        self.notice = Some(notice);
        Ok(())
    }

    pub(crate) fn load_sample(&mut self) {
        self.forms.code.set_content(SAMPLE_CODE);
        self.forms.context.set_content(SAMPLE_CONTEXT);
    }

    /// Get the current spinner character for loading animations
    pub fn spinner_char(&self) -> &str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }
}
