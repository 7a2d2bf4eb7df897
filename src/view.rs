//! Pure projection from dashboard state to a screen description.
//!
//! `project` never mutates, never performs I/O and never starts a fetch;
//! the same state always yields an equal [`ScreenView`].

use crate::app::{regions, ChatMessage, Dashboard, PlanModal, TreeRow};
use crate::backend::{
    ChatReply, CodeAnalysis, ContributionPlan, FileContent, Issue, RepoAnalysis, UserStats,
};
use crate::error::RegionError;
use crate::region::{AsyncRegion, DataPolicy, RegionStatus};

pub const PLAN_TITLE: &str = "AI Contribution Plan";
pub const NO_ISSUES: &str = "No issues found. Try different skills.";
pub const CHAT_PLACEHOLDER: &str = "Your AI Assistant is ready!\nAsk a question about the code.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub busy: bool,
    pub stats: RegionBody,
    pub issues: RegionBody,
    pub repository: PanelView,
    pub viewer: PanelView,
    pub analysis: RegionBody,
    pub chat: RegionBody,
    pub plan: Option<PlanView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub title: String,
    pub body: RegionBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanView {
    pub title: &'static str,
    pub subtitle: String,
    pub body: RegionBody,
}

/// Exactly one representation per region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionBody {
    Idle(String),
    Loading {
        message: String,
        /// Last good content kept under the spinner
        stale: Option<PanelContent>,
    },
    Ready(PanelContent),
    Failed {
        message: String,
        stale: Option<PanelContent>,
    },
}

impl RegionBody {
    pub fn content(&self) -> Option<&PanelContent> {
        match self {
            RegionBody::Idle(_) => None,
            RegionBody::Ready(content) => Some(content),
            RegionBody::Loading { stale, .. } | RegionBody::Failed { stale, .. } => stale.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelContent {
    Tree {
        rows: Vec<TreeRow>,
        cursor: usize,
    },
    Text {
        language: String,
        text: String,
        scroll: u16,
    },
    Issues {
        issues: Vec<IssueRow>,
        cursor: usize,
    },
    NoIssues,
    Plan(Vec<PlanStep>),
    Analysis {
        is_correct: bool,
        explanation: String,
        correction: Option<String>,
    },
    Chat(Vec<ChatMessage>),
    Stats(UserStats),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRow {
    pub title: String,
    pub repo: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub step: u32,
    pub title: String,
    pub details: String,
    pub expanded: bool,
    pub selected: bool,
}

pub fn project(dashboard: &Dashboard) -> Result<ScreenView, RegionError> {
    Ok(ScreenView {
        busy: dashboard.is_any_loading(),
        stats: project_stats(dashboard.region::<UserStats>(regions::USER_STATS)?),
        issues: project_issues(dashboard)?,
        repository: project_repository(dashboard)?,
        viewer: project_viewer(dashboard)?,
        analysis: project_analysis(dashboard.region::<CodeAnalysis>(regions::CODE_ANALYSIS)?),
        chat: project_chat(dashboard)?,
        plan: project_plan(dashboard)?,
    })
}

/// Common status mapping; `content` renders the region's data
fn body<T>(
    region: &AsyncRegion<T>,
    placeholder: &str,
    loading: &str,
    content: impl Fn(&T) -> PanelContent,
) -> RegionBody {
    // Overlay 以外はロード中/エラー時にデータを持たない
    let stale = || match region.policy().data {
        DataPolicy::Overlay => region.data().map(&content),
        DataPolicy::Replace => None,
    };
    match region.status() {
        RegionStatus::Idle => RegionBody::Idle(placeholder.to_string()),
        RegionStatus::Loading => RegionBody::Loading {
            message: loading.to_string(),
            stale: stale(),
        },
        RegionStatus::Success => match region.data() {
            Some(data) => RegionBody::Ready(content(data)),
            None => RegionBody::Idle(placeholder.to_string()),
        },
        RegionStatus::Error => RegionBody::Failed {
            message: region
                .error()
                .map(|e| e.message.clone())
                .unwrap_or_default(),
            stale: stale(),
        },
    }
}

fn project_stats(region: &AsyncRegion<UserStats>) -> RegionBody {
    body(region, "...", "...", |stats| PanelContent::Stats(*stats))
}

fn project_issues(dashboard: &Dashboard) -> Result<RegionBody, RegionError> {
    let region = dashboard.region::<Vec<Issue>>(regions::ISSUES)?;
    Ok(body(
        region,
        "Enter your skills to find approachable issues",
        "Searching for issues...",
        |issues| {
            if issues.is_empty() {
                return PanelContent::NoIssues;
            }
            PanelContent::Issues {
                issues: issues
                    .iter()
                    .map(|issue| IssueRow {
                        title: issue.title.clone(),
                        repo: issue.repo_name.clone(),
                        labels: issue.labels.clone(),
                    })
                    .collect(),
                cursor: dashboard.issues_cursor,
            }
        },
    ))
}

fn project_repository(dashboard: &Dashboard) -> Result<PanelView, RegionError> {
    let region = dashboard.region::<RepoAnalysis>(regions::REPOSITORY)?;
    let title = region
        .data()
        .and_then(|analysis| analysis.name.clone())
        .map_or_else(|| "Code Map".to_string(), |name| format!("Code Map: {name}"));
    let rows = dashboard.tree_rows();
    let body = body(
        region,
        "Enter a GitHub repository URL to view its code map",
        "Analyzing repository...",
        |_| PanelContent::Tree {
            rows: rows.clone(),
            cursor: dashboard.tree.cursor,
        },
    );
    Ok(PanelView { title, body })
}

fn project_viewer(dashboard: &Dashboard) -> Result<PanelView, RegionError> {
    let region = dashboard.region::<FileContent>(regions::FILE_CONTENT)?;
    let selected = dashboard.selected_file();
    let displayed = dashboard.displayed_file();
    let language = displayed.map_or_else(
        || "plaintext".to_string(),
        |key| language_of(&key.path),
    );
    let mut body = body(
        region,
        "Select a file from the code map to view its content",
        "Loading file...",
        |file| PanelContent::Text {
            language: language.clone(),
            text: file.content.clone(),
            scroll: dashboard.viewer_scroll,
        },
    );

    // 見出しは表示中の内容と同じファイルを指す。選択中のファイルは状態行に出す
    if let Some(key) = selected {
        match &mut body {
            RegionBody::Loading { message, .. } => {
                *message = format!("Loading {}...", key.path);
            }
            RegionBody::Failed { message, .. } => {
                *message = format!("{}: {message}", key.path);
            }
            RegionBody::Idle(_) | RegionBody::Ready(_) => {}
        }
    }
    let heading = if body.content().is_some() {
        displayed
    } else {
        selected
    };
    let title = match heading {
        Some(key) => format!("{} [{}]", key.path, language_of(&key.path).to_uppercase()),
        None => "File Viewer".to_string(),
    };
    Ok(PanelView { title, body })
}

fn project_analysis(region: &AsyncRegion<CodeAnalysis>) -> RegionBody {
    body(
        region,
        "Paste code, add context and press Ctrl+S to analyze",
        "Analyzing code...",
        |analysis| PanelContent::Analysis {
            is_correct: analysis.is_correct,
            explanation: analysis.explanation.clone(),
            correction: analysis.correction().map(str::to_string),
        },
    )
}

fn project_chat(dashboard: &Dashboard) -> Result<RegionBody, RegionError> {
    let region = dashboard.region::<ChatReply>(regions::CHAT)?;
    let transcript = dashboard.chat.messages();
    let history = (!transcript.is_empty()).then(|| PanelContent::Chat(transcript.to_vec()));

    // トランスクリプトはリージョンとは別に保持される
    Ok(match region.status() {
        RegionStatus::Idle => match history {
            Some(content) => RegionBody::Ready(content),
            None => RegionBody::Idle(CHAT_PLACEHOLDER.to_string()),
        },
        RegionStatus::Loading => RegionBody::Loading {
            message: "Thinking...".to_string(),
            stale: history,
        },
        RegionStatus::Success => RegionBody::Ready(PanelContent::Chat(transcript.to_vec())),
        RegionStatus::Error => RegionBody::Failed {
            message: region
                .error()
                .map(|e| e.message.clone())
                .unwrap_or_default(),
            stale: history,
        },
    })
}

fn project_plan(dashboard: &Dashboard) -> Result<Option<PlanView>, RegionError> {
    let Some(modal) = dashboard.plan_modal.as_ref() else {
        return Ok(None);
    };
    let region = dashboard.region::<ContributionPlan>(regions::CONTRIBUTION_PLAN)?;
    Ok(Some(PlanView {
        title: PLAN_TITLE,
        subtitle: format!("For issue: \"{}\"", modal.issue_title),
        body: body(
            region,
            "",
            "Generating your personalized contribution guide...",
            |plan| PanelContent::Plan(plan_steps(plan, modal)),
        ),
    }))
}

fn plan_steps(plan: &ContributionPlan, modal: &PlanModal) -> Vec<PlanStep> {
    plan.plan
        .iter()
        .enumerate()
        .map(|(i, step)| PlanStep {
            step: step.step,
            title: step.title.clone(),
            details: step.details.clone(),
            expanded: modal.is_expanded(i),
            selected: modal.cursor == i,
        })
        .collect()
}

/// Text after the last `.` of the file name, `plaintext` when that is empty.
///
/// Names without a dot use the whole name (`Makefile` → `makefile`).
pub fn language_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit('.').next() {
        Some(ext) if !ext.is_empty() => ext.to_lowercase(),
        _ => "plaintext".to_string(),
    }
}
