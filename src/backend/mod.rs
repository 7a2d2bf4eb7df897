//! Contract with the external analysis backend.

mod client;
mod types;

pub use client::{HttpBackend, RetryPolicy};
pub use types::{
    ChatReply, CodeAnalysis, ContributionPlan, ContributionStep, DirectoryContents, FileContent,
    FileTreeNode, Issue, NodeKind, RepoAnalysis, UserStats,
};

use async_trait::async_trait;

use crate::error::ErrorInfo;

/// Backend operations used by the dashboard
///
/// NOTE: async-trait keeps the trait dyn-compatible so the app can hold an
/// `Arc<dyn Backend>` and tests can swap in a scripted implementation.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn explain_code(
        &self,
        bearer: &str,
        code: &str,
        context: &str,
    ) -> Result<CodeAnalysis, ErrorInfo>;

    async fn analyze_repo(&self, bearer: &str, repo_url: &str) -> Result<RepoAnalysis, ErrorInfo>;

    async fn file_content(
        &self,
        bearer: &str,
        repo_url: &str,
        file_path: &str,
    ) -> Result<FileContent, ErrorInfo>;

    async fn find_issues(&self, bearer: &str, skills: &str) -> Result<Vec<Issue>, ErrorInfo>;

    async fn contribution_plan(
        &self,
        bearer: &str,
        repo_url: &str,
        issue_url: &str,
        issue_title: &str,
    ) -> Result<ContributionPlan, ErrorInfo>;

    async fn chat(&self, bearer: &str, message: &str) -> Result<ChatReply, ErrorInfo>;

    async fn user_stats(&self, bearer: &str) -> Result<UserStats, ErrorInfo>;
}
