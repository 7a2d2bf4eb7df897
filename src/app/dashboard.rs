//! Dashboard controller: owns every region and cascade of the screen.
//!
//! User actions never touch the network directly. They transition a region
//! and queue a [`Request`] in the outbox; the app drains the outbox and
//! feeds completions back through [`Dashboard::apply`].

use std::collections::HashSet;

use tracing::{debug, warn};

use super::types::{ChatTranscript, PlanModal, Sender, TreeRow};
use crate::backend::{
    ChatReply, CodeAnalysis, ContributionPlan, DirectoryContents, FileContent, FileTreeNode, Issue,
    NodeKind, RepoAnalysis, UserStats,
};
use crate::config::CascadeConfig;
use crate::error::{ErrorInfo, RegionError};
use crate::loader::{FileKey, RegionEvent, Request};
use crate::region::{
    AsyncRegion, CascadePolicy, RegionPolicy, RegionRegistry, RequestToken, SelectionCascade,
    Ticket,
};

pub mod regions {
    pub const REPOSITORY: &str = "repository";
    pub const FILE_CONTENT: &str = "file_content";
    pub const ISSUES: &str = "issues";
    pub const CONTRIBUTION_PLAN: &str = "contribution_plan";
    pub const CODE_ANALYSIS: &str = "code_analysis";
    pub const CHAT: &str = "chat";
    pub const USER_STATS: &str = "user_stats";
}

use regions::*;

pub const EMPTY_CODE_MESSAGE: &str = "Please enter some code to analyze";
pub const CHAT_APOLOGY: &str = "Sorry, I couldn't get a response. Please try again.";

/// Expand/collapse state of the code map. UI-local, never fetches.
#[derive(Debug, Clone, Default)]
pub struct TreeView {
    expanded: HashSet<String>,
    pub cursor: usize,
}

impl TreeView {
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }
}

pub struct Dashboard {
    registry: RegionRegistry,
    repo_cascade: SelectionCascade<String>,
    file_cascade: SelectionCascade<FileKey>,
    plan_cascade: SelectionCascade<u64>,
    pub tree: TreeView,
    pub issues_cursor: usize,
    pub plan_modal: Option<PlanModal>,
    pub chat: ChatTranscript,
    pub viewer_scroll: u16,
    outbox: Vec<Request>,
}

impl Dashboard {
    pub fn new(cascade: &CascadeConfig) -> Result<Self, RegionError> {
        let registry = RegionRegistry::builder()
            .region::<RepoAnalysis>(REPOSITORY, RegionPolicy::REPLACE_REJECT)
            .region::<FileContent>(FILE_CONTENT, RegionPolicy::OVERLAY_SUPERSEDE)
            .region::<Vec<Issue>>(ISSUES, RegionPolicy::REPLACE_REJECT)
            .region::<ContributionPlan>(CONTRIBUTION_PLAN, RegionPolicy::REPLACE_SUPERSEDE)
            .region::<CodeAnalysis>(CODE_ANALYSIS, RegionPolicy::REPLACE_REJECT)
            .region::<ChatReply>(CHAT, RegionPolicy::REPLACE_REJECT)
            .region::<UserStats>(USER_STATS, RegionPolicy::REPLACE_REJECT)
            .build()?;

        Ok(Self {
            registry,
            repo_cascade: SelectionCascade::new("repository", REPOSITORY, CascadePolicy::default()),
            file_cascade: SelectionCascade::new(
                "file",
                FILE_CONTENT,
                CascadePolicy {
                    skip_redundant: cascade.skip_redundant_file_fetch,
                },
            ),
            plan_cascade: SelectionCascade::new(
                "plan",
                CONTRIBUTION_PLAN,
                CascadePolicy::default(),
            ),
            tree: TreeView::default(),
            issues_cursor: 0,
            plan_modal: None,
            chat: ChatTranscript::default(),
            viewer_scroll: 0,
            outbox: Vec::new(),
        })
    }

    pub fn registry(&self) -> &RegionRegistry {
        &self.registry
    }

    pub fn region<T: 'static>(&self, name: &str) -> Result<&AsyncRegion<T>, RegionError> {
        self.registry.get::<T>(name)
    }

    pub fn is_any_loading(&self) -> bool {
        self.registry.is_any_loading()
    }

    /// Repository URL the code map was requested for
    pub fn selected_repository(&self) -> Option<&str> {
        self.repo_cascade.current_key().map(String::as_str)
    }

    pub fn selected_file(&self) -> Option<&FileKey> {
        self.file_cascade.current_key()
    }

    /// File whose content the viewer region currently holds
    pub fn displayed_file(&self) -> Option<&FileKey> {
        self.file_cascade.delivered_key()
    }

    /// Path and text of the file shown in the viewer
    pub fn displayed_file_content(&self) -> Result<Option<(&str, &str)>, RegionError> {
        let Some(key) = self.displayed_file() else {
            return Ok(None);
        };
        let file = self.registry.get::<FileContent>(FILE_CONTENT)?.data();
        Ok(file.map(|file| (key.path.as_str(), file.content.as_str())))
    }

    /// Drain requests queued since the last call
    pub fn take_outbox(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    // --- repository / file cascade ---

    pub fn submit_repository(&mut self, url: &str) -> Result<(), RegionError> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(());
        }
        if self.registry.get::<RepoAnalysis>(REPOSITORY)?.is_loading() {
            debug!("repository analysis already in flight, ignoring submit");
            return Ok(());
        }

        // 先にファイル表示をクリアしてからリポジトリを再取得
        self.file_cascade
            .clear(self.registry.get_mut::<FileContent>(FILE_CONTENT)?)?;
        self.tree = TreeView::default();
        self.viewer_scroll = 0;

        let region = self.registry.get_mut::<RepoAnalysis>(REPOSITORY)?;
        if let Some(ticket) = self.repo_cascade.select(url.to_string(), region)? {
            self.outbox.push(Request::AnalyzeRepository { ticket });
        }
        Ok(())
    }

    /// Rows of the code map in display order
    pub fn tree_rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        if let Ok(Some(analysis)) = self.registry.get::<RepoAnalysis>(REPOSITORY).map(|r| r.data())
        {
            flatten(&analysis.structure, 0, &self.tree, &mut rows);
        }
        rows
    }

    pub fn move_tree_cursor(&mut self, delta: isize) {
        let len = self.tree_rows().len();
        self.tree.cursor = step_cursor(self.tree.cursor, delta, len);
    }

    /// Enter on a tree row: directories toggle locally, files select
    pub fn activate_tree_row(&mut self) -> Result<(), RegionError> {
        let Some(row) = self.tree_rows().into_iter().nth(self.tree.cursor) else {
            return Ok(());
        };
        if row.is_dir {
            if !self.tree.expanded.remove(&row.path) {
                self.tree.expanded.insert(row.path);
            }
            return Ok(());
        }
        self.select_file(row.path)
    }

    /// `l`: expand the directory under the cursor
    pub fn expand_tree_row(&mut self) {
        if let Some(row) = self.tree_rows().into_iter().nth(self.tree.cursor) {
            if row.is_dir {
                self.tree.expanded.insert(row.path);
            }
        }
    }

    /// `h`: collapse the directory under the cursor, or jump to its parent
    pub fn collapse_tree_row(&mut self) {
        let rows = self.tree_rows();
        let Some(row) = rows.get(self.tree.cursor) else {
            return;
        };
        if row.is_dir && row.expanded {
            self.tree.expanded.remove(&row.path);
            return;
        }
        if row.depth == 0 {
            return;
        }
        if let Some(parent) = rows[..self.tree.cursor]
            .iter()
            .rposition(|r| r.is_dir && r.depth + 1 == row.depth)
        {
            self.tree.cursor = parent;
        }
    }

    fn select_file(&mut self, path: String) -> Result<(), RegionError> {
        let Some(repo_url) = self.repo_cascade.current_key().cloned() else {
            return Ok(());
        };
        let region = self.registry.get_mut::<FileContent>(FILE_CONTENT)?;
        let key = FileKey { repo_url, path };
        if let Some(ticket) = self.file_cascade.select(key, region)? {
            self.viewer_scroll = 0;
            self.outbox.push(Request::FileContent { ticket });
        }
        Ok(())
    }

    // --- issues / plan cascade ---

    pub fn search_issues(&mut self, skills: &str) -> Result<(), RegionError> {
        let skills = skills.trim();
        if skills.is_empty() {
            return Ok(());
        }
        let region = self.registry.get_mut::<Vec<Issue>>(ISSUES)?;
        if region.is_loading() {
            return Ok(());
        }
        let token = region.start()?;
        self.issues_cursor = 0;
        self.outbox.push(Request::FindIssues {
            token,
            skills: skills.to_string(),
        });
        Ok(())
    }

    pub fn move_issue_cursor(&mut self, delta: isize) {
        let len = self
            .registry
            .get::<Vec<Issue>>(ISSUES)
            .ok()
            .and_then(|r| r.data())
            .map_or(0, Vec::len);
        self.issues_cursor = step_cursor(self.issues_cursor, delta, len);
    }

    /// Open the plan modal for the issue under the cursor
    pub fn open_issue(&mut self) -> Result<(), RegionError> {
        let Some(issue) = self
            .registry
            .get::<Vec<Issue>>(ISSUES)?
            .data()
            .and_then(|issues| issues.get(self.issues_cursor))
            .cloned()
        else {
            return Ok(());
        };

        let region = self.registry.get_mut::<ContributionPlan>(CONTRIBUTION_PLAN)?;
        if let Some(ticket) = self.plan_cascade.select(issue.id, region)? {
            self.outbox.push(Request::ContributionPlan {
                ticket,
                repo_url: issue.repo_url(),
                issue_url: issue.url.clone(),
                issue_title: issue.title.clone(),
            });
        }
        self.plan_modal = Some(PlanModal::new(issue.id, issue.title));
        Ok(())
    }

    /// Closing does not cancel the plan request
    pub fn close_plan_modal(&mut self) {
        self.plan_modal = None;
    }

    pub fn move_plan_cursor(&mut self, delta: isize) {
        let len = self
            .registry
            .get::<ContributionPlan>(CONTRIBUTION_PLAN)
            .ok()
            .and_then(|r| r.data())
            .map_or(0, |p| p.plan.len());
        if let Some(modal) = self.plan_modal.as_mut() {
            modal.cursor = step_cursor(modal.cursor, delta, len);
        }
    }

    pub fn toggle_plan_step(&mut self) {
        if let Some(modal) = self.plan_modal.as_mut() {
            let cursor = modal.cursor;
            modal.toggle(cursor);
        }
    }

    // --- independent regions ---

    pub fn analyze_code(&mut self, code: &str, context: &str) -> Result<(), RegionError> {
        let region = self.registry.get_mut::<CodeAnalysis>(CODE_ANALYSIS)?;
        if region.is_loading() {
            return Ok(());
        }
        let token = region.start()?;
        if code.trim().is_empty() {
            return region.fail(token, ErrorInfo::invalid_input(EMPTY_CODE_MESSAGE));
        }
        self.outbox.push(Request::ExplainCode {
            token,
            code: code.to_string(),
            context: context.to_string(),
        });
        Ok(())
    }

    /// Returns whether the message was sent
    pub fn send_chat(&mut self, message: &str) -> Result<bool, RegionError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(false);
        }
        let region = self.registry.get_mut::<ChatReply>(CHAT)?;
        if region.is_loading() {
            return Ok(false);
        }
        let token = region.start()?;
        self.chat.push(Sender::User, message);
        self.outbox.push(Request::Chat {
            token,
            message: message.to_string(),
        });
        Ok(true)
    }

    pub fn load_user_stats(&mut self) -> Result<(), RegionError> {
        let region = self.registry.get_mut::<UserStats>(USER_STATS)?;
        if region.is_loading() {
            return Ok(());
        }
        let token = region.start()?;
        self.outbox.push(Request::UserStats { token });
        Ok(())
    }

    // --- completions ---

    /// Apply one completion. Stale completions are dropped here.
    pub fn apply(&mut self, event: RegionEvent) -> Result<(), RegionError> {
        let outcome = match event {
            RegionEvent::Repository { ticket, result } => self.apply_repository(&ticket, result),
            RegionEvent::FileContent { ticket, result } => {
                let region = self.registry.get_mut::<FileContent>(FILE_CONTENT)?;
                match result {
                    Ok(content) => self.file_cascade.resolve(&ticket, content, region),
                    Err(err) => self.file_cascade.fail(&ticket, err, region),
                }
            }
            RegionEvent::Issues { token, result } => {
                let region = self.registry.get_mut::<Vec<Issue>>(ISSUES)?;
                match result {
                    Ok(issues) => region.succeed(token, issues),
                    Err(err) => region.fail(token, err),
                }
            }
            RegionEvent::ContributionPlan { ticket, result } => {
                let region = self.registry.get_mut::<ContributionPlan>(CONTRIBUTION_PLAN)?;
                match result {
                    Ok(plan) => self.plan_cascade.resolve(&ticket, plan, region),
                    Err(err) => self.plan_cascade.fail(&ticket, err, region),
                }
            }
            RegionEvent::CodeAnalysis { token, result } => {
                let region = self.registry.get_mut::<CodeAnalysis>(CODE_ANALYSIS)?;
                match result {
                    Ok(analysis) => region.succeed(token, analysis),
                    Err(err) => region.fail(token, err),
                }
            }
            RegionEvent::Chat { token, result } => self.apply_chat(token, result),
            RegionEvent::UserStats { token, result } => {
                let region = self.registry.get_mut::<UserStats>(USER_STATS)?;
                match result {
                    Ok(stats) => region.succeed(token, stats),
                    Err(err) => {
                        warn!("failed to load user stats: {err}");
                        region.fail(token, err)
                    }
                }
            }
        };

        match outcome {
            Err(err) if err.is_stale() => {
                debug!("dropped {err}");
                Ok(())
            }
            other => other,
        }
    }

    fn apply_repository(
        &mut self,
        ticket: &Ticket<String>,
        result: Result<RepoAnalysis, ErrorInfo>,
    ) -> Result<(), RegionError> {
        let region = self.registry.get_mut::<RepoAnalysis>(REPOSITORY)?;
        match result {
            Ok(analysis) => {
                self.repo_cascade.resolve(ticket, analysis, region)?;
                self.tree = TreeView::default();
                Ok(())
            }
            Err(err) => self.repo_cascade.fail(ticket, err, region),
        }
    }

    fn apply_chat(
        &mut self,
        token: RequestToken,
        result: Result<ChatReply, ErrorInfo>,
    ) -> Result<(), RegionError> {
        let region = self.registry.get_mut::<ChatReply>(CHAT)?;
        match result {
            Ok(reply) => {
                let text = reply.response.clone();
                region.succeed(token, reply)?;
                self.chat.push(Sender::Assistant, text);
            }
            Err(err) => {
                region.fail(token, err)?;
                self.chat.push(Sender::Assistant, CHAT_APOLOGY);
            }
        }
        Ok(())
    }

    /// Unmount: every region Idle, every cascade cleared, transcript emptied
    pub fn reset_all(&mut self) -> Result<(), RegionError> {
        self.registry.reset_all();
        self.repo_cascade
            .clear(self.registry.get_mut::<RepoAnalysis>(REPOSITORY)?)?;
        self.file_cascade
            .clear(self.registry.get_mut::<FileContent>(FILE_CONTENT)?)?;
        self.plan_cascade
            .clear(self.registry.get_mut::<ContributionPlan>(CONTRIBUTION_PLAN)?)?;
        self.tree = TreeView::default();
        self.issues_cursor = 0;
        self.plan_modal = None;
        self.chat.clear();
        self.viewer_scroll = 0;
        self.outbox.clear();
        Ok(())
    }
}

fn flatten(nodes: &[FileTreeNode], depth: usize, view: &TreeView, rows: &mut Vec<TreeRow>) {
    for node in nodes {
        let expanded = view.is_expanded(&node.path);
        rows.push(TreeRow {
            depth,
            name: node.name.clone(),
            path: node.path.clone(),
            is_dir: node.is_dir(),
            expanded,
            not_loaded: matches!(
                node.kind,
                NodeKind::Directory(DirectoryContents::NotExpanded)
            ),
        });
        if expanded {
            flatten(node.children(), depth + 1, view, rows);
        }
    }
}

fn step_cursor(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}
