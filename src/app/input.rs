use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use super::{App, InputTarget, Panel};
use crate::session::Route;
use crate::ui::text_area::TextAreaAction;

impl App {
    pub(crate) async fn handle_input(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key)?;
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        match self.route() {
            Route::SessionLoading => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.should_quit = true;
                }
                Ok(())
            }
            Route::Login => {
                self.handle_login_key(key);
                Ok(())
            }
            Route::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) {
        match self.forms.login.input(key) {
            TextAreaAction::Submit => self.login(),
            TextAreaAction::Cancel => self.should_quit = true,
            TextAreaAction::Continue => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Result<()> {
        self.notice = None;
        if let Some(target) = self.input_target {
            return self.handle_editing_key(target, key);
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                || key.code == KeyCode::Char(self.config.keybindings.help)
            {
                self.show_help = false;
            }
            return Ok(());
        }

        if self.dashboard.plan_modal.is_some() {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.dashboard.move_plan_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.dashboard.move_plan_cursor(-1),
                KeyCode::Enter => self.dashboard.toggle_plan_step(),
                KeyCode::Char('q') | KeyCode::Esc => self.dashboard.close_plan_modal(),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Char('/') | KeyCode::Char('i') => {
                self.input_target = self.focus.primary_input();
            }
            KeyCode::Char('c') if self.focus == Panel::Analysis => {
                self.input_target = Some(InputTarget::Context);
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('l') | KeyCode::Right if self.focus == Panel::Repository => {
                self.dashboard.expand_tree_row();
            }
            KeyCode::Char('h') | KeyCode::Left if self.focus == Panel::Repository => {
                self.dashboard.collapse_tree_row();
            }
            KeyCode::Enter => match self.focus {
                Panel::Issues => self.dashboard.open_issue()?,
                Panel::Repository => self.dashboard.activate_tree_row()?,
                _ => {}
            },
            KeyCode::Char(c) => self.handle_configured_key(c)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_configured_key(&mut self, c: char) -> Result<()> {
        let bindings = self.config.keybindings.clone();
        if c == bindings.help {
            self.show_help = true;
        } else if c == bindings.logout {
            self.logout()?;
        } else if c == bindings.refresh_stats {
            self.dashboard.load_user_stats()?;
        } else if c == bindings.load_sample {
            self.load_sample();
        } else if c == bindings.yank && self.focus == Panel::Viewer {
            self.yank_file()?;
        }
        Ok(())
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.focus {
            Panel::Issues => self.dashboard.move_issue_cursor(delta),
            Panel::Repository => self.dashboard.move_tree_cursor(delta),
            Panel::Viewer => {
                let scroll = &mut self.dashboard.viewer_scroll;
                *scroll = if delta < 0 {
                    scroll.saturating_sub(1)
                } else {
                    scroll.saturating_add(1)
                };
            }
            Panel::Analysis | Panel::Chat => {}
        }
    }

    fn handle_editing_key(&mut self, target: InputTarget, key: KeyEvent) -> Result<()> {
        match self.forms.get_mut(target).input(key) {
            TextAreaAction::Continue => Ok(()),
            TextAreaAction::Cancel => {
                self.input_target = None;
                Ok(())
            }
            TextAreaAction::Submit => {
                self.input_target = None;
                self.submit_form(target)
            }
        }
    }

    fn submit_form(&mut self, target: InputTarget) -> Result<()> {
        match target {
            InputTarget::Skills => {
                let skills = self.forms.skills.content();
                self.dashboard.search_issues(&skills)?;
            }
            InputTarget::RepoUrl => {
                let url = self.forms.repo_url.content();
                self.dashboard.submit_repository(&url)?;
            }
            InputTarget::Code | InputTarget::Context => {
                let code = self.forms.code.content();
                let context = self.forms.context.content();
                self.dashboard.analyze_code(&code, &context)?;
            }
            InputTarget::Chat => {
                let message = self.forms.chat.content();
                if self.dashboard.send_chat(&message)? {
                    self.forms.chat.clear();
                }
            }
        }
        Ok(())
    }
}
