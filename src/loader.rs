use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::{
    Backend, ChatReply, CodeAnalysis, ContributionPlan, FileContent, Issue, RepoAnalysis,
    UserStats,
};
use crate::error::ErrorInfo;
use crate::region::{RequestToken, Ticket};

/// Selection key of the file cascade
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileKey {
    pub repo_url: String,
    pub path: String,
}

/// バックエンドへの1回分のリクエスト（トークン/チケット付き）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    AnalyzeRepository {
        ticket: Ticket<String>,
    },
    FileContent {
        ticket: Ticket<FileKey>,
    },
    FindIssues {
        token: RequestToken,
        skills: String,
    },
    ContributionPlan {
        ticket: Ticket<u64>,
        repo_url: String,
        issue_url: String,
        issue_title: String,
    },
    ExplainCode {
        token: RequestToken,
        code: String,
        context: String,
    },
    Chat {
        token: RequestToken,
        message: String,
    },
    UserStats {
        token: RequestToken,
    },
}

impl Request {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AnalyzeRepository { .. } => "analyze_repo",
            Self::FileContent { .. } => "file_content",
            Self::FindIssues { .. } => "find_issues",
            Self::ContributionPlan { .. } => "contribution_plan",
            Self::ExplainCode { .. } => "explain_code",
            Self::Chat { .. } => "chat",
            Self::UserStats { .. } => "user_stats",
        }
    }
}

/// 完了イベント（UIループで1件ずつ適用される）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionEvent {
    Repository {
        ticket: Ticket<String>,
        result: Result<RepoAnalysis, ErrorInfo>,
    },
    FileContent {
        ticket: Ticket<FileKey>,
        result: Result<FileContent, ErrorInfo>,
    },
    Issues {
        token: RequestToken,
        result: Result<Vec<Issue>, ErrorInfo>,
    },
    ContributionPlan {
        ticket: Ticket<u64>,
        result: Result<ContributionPlan, ErrorInfo>,
    },
    CodeAnalysis {
        token: RequestToken,
        result: Result<CodeAnalysis, ErrorInfo>,
    },
    Chat {
        token: RequestToken,
        result: Result<ChatReply, ErrorInfo>,
    },
    UserStats {
        token: RequestToken,
        result: Result<UserStats, ErrorInfo>,
    },
}

/// Run one request against the backend and wrap the outcome as an event
pub async fn execute(backend: &dyn Backend, bearer: &str, request: Request) -> RegionEvent {
    match request {
        Request::AnalyzeRepository { ticket } => {
            let result = backend.analyze_repo(bearer, &ticket.key).await;
            RegionEvent::Repository { ticket, result }
        }
        Request::FileContent { ticket } => {
            let result = backend
                .file_content(bearer, &ticket.key.repo_url, &ticket.key.path)
                .await;
            RegionEvent::FileContent { ticket, result }
        }
        Request::FindIssues { token, skills } => {
            let result = backend.find_issues(bearer, &skills).await;
            RegionEvent::Issues { token, result }
        }
        Request::ContributionPlan {
            ticket,
            repo_url,
            issue_url,
            issue_title,
        } => {
            let result = backend
                .contribution_plan(bearer, &repo_url, &issue_url, &issue_title)
                .await;
            RegionEvent::ContributionPlan { ticket, result }
        }
        Request::ExplainCode {
            token,
            code,
            context,
        } => {
            let result = backend.explain_code(bearer, &code, &context).await;
            RegionEvent::CodeAnalysis { token, result }
        }
        Request::Chat { token, message } => {
            let result = backend.chat(bearer, &message).await;
            RegionEvent::Chat { token, result }
        }
        Request::UserStats { token } => {
            let result = backend.user_stats(bearer).await;
            RegionEvent::UserStats { token, result }
        }
    }
}

/// Event for a request that could not be dispatched because nobody is signed in
pub fn unauthenticated(request: Request) -> RegionEvent {
    let err = ErrorInfo::unauthenticated;
    match request {
        Request::AnalyzeRepository { ticket } => RegionEvent::Repository {
            ticket,
            result: Err(err()),
        },
        Request::FileContent { ticket } => RegionEvent::FileContent {
            ticket,
            result: Err(err()),
        },
        Request::FindIssues { token, .. } => RegionEvent::Issues {
            token,
            result: Err(err()),
        },
        Request::ContributionPlan { ticket, .. } => RegionEvent::ContributionPlan {
            ticket,
            result: Err(err()),
        },
        Request::ExplainCode { token, .. } => RegionEvent::CodeAnalysis {
            token,
            result: Err(err()),
        },
        Request::Chat { token, .. } => RegionEvent::Chat {
            token,
            result: Err(err()),
        },
        Request::UserStats { token } => RegionEvent::UserStats {
            token,
            result: Err(err()),
        },
    }
}

/// バックグラウンドで実行し、結果をチャンネルに送信
///
/// Superseded requests still run to completion; the region drops their result.
pub fn spawn(
    backend: Arc<dyn Backend>,
    bearer: String,
    request: Request,
    tx: mpsc::Sender<RegionEvent>,
    cancel: CancellationToken,
) {
    let label = request.label();
    debug!("dispatching {label}");
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("{label} cancelled on shutdown");
            }
            event = execute(backend.as_ref(), &bearer, request) => {
                let _ = tx.send(event).await;
            }
        }
    });
}
