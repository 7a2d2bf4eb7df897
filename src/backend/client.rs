use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{
    AnalyzeRepoBody, ChatBody, ChatReply, CodeAnalysis, ContributionPlan, ErrorBody, FileContent,
    FindIssuesBody, GuideBody, Issue, RepoAnalysis, UserStats,
};
use super::Backend;
use crate::config::BackendConfig;
use crate::error::{ErrorCode, ErrorInfo};

/// Retries apply to network failures only; a response with an error status
/// is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// 線形バックオフ。大きな設定値でも溢れない
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

pub struct HttpBackend {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        // 0 はタイムアウトなし
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder
            .build()
            .context("failed to build backend HTTP client")?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: Duration::from_millis(config.retry_backoff_ms),
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let suffix = path.trim_start_matches('/');
        format!("{base}/{suffix}")
    }

    /// Send a request built fresh for every attempt and decode the JSON body.
    ///
    /// This is the only place transport errors become `ErrorInfo`.
    async fn request_json<T, F>(&self, label: &str, build: F) -> Result<T, ErrorInfo>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            match self.send_once(build()).await {
                Err(err)
                    if err.code == ErrorCode::NetworkFailure
                        && attempt < self.retry.max_retries =>
                {
                    attempt += 1;
                    debug!("{label}: network failure, retry {attempt}: {err}");
                    tokio::time::sleep(self.retry.delay(attempt)).await;
                }
                Err(err) => {
                    warn!("{label} failed ({}): {err}", err.code.label());
                    return Err(err);
                }
                Ok(body) => return decode(&body),
            }
        }
    }

    async fn send_once(&self, request: RequestBuilder) -> Result<String, ErrorInfo> {
        let response = request
            .send()
            .await
            .map_err(|error| ErrorInfo::network(format!("Could not reach the backend: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| ErrorInfo::network(format!("Failed to read response: {error}")))?;

        if !status.is_success() {
            return Err(ErrorInfo::backend(error_detail(status, &body)));
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ErrorInfo> {
    serde_json::from_str(body)
        .map_err(|error| ErrorInfo::backend(format!("Malformed response from backend: {error}")))
}

/// `{detail}` if the body carries one, otherwise the status line
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        match parsed.detail {
            serde_json::Value::String(s) if !s.is_empty() => return s,
            serde_json::Value::String(_) | serde_json::Value::Null => {}
            other => return other.to_string(),
        }
    }
    match status.canonical_reason() {
        Some(reason) => format!("Request failed with status {}: {reason}", status.as_u16()),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn explain_code(
        &self,
        bearer: &str,
        code: &str,
        context: &str,
    ) -> Result<CodeAnalysis, ErrorInfo> {
        let url = self.endpoint("/api/explain/code");
        self.request_json("explain_code", || {
            self.client
                .post(&url)
                .bearer_auth(bearer)
                .form(&[("code", code), ("context", context)])
        })
        .await
    }

    async fn analyze_repo(&self, bearer: &str, repo_url: &str) -> Result<RepoAnalysis, ErrorInfo> {
        let url = self.endpoint("/api/analyze/repo");
        self.request_json("analyze_repo", || {
            self.client
                .post(&url)
                .bearer_auth(bearer)
                .json(&AnalyzeRepoBody { repo_url })
        })
        .await
    }

    async fn file_content(
        &self,
        bearer: &str,
        repo_url: &str,
        file_path: &str,
    ) -> Result<FileContent, ErrorInfo> {
        let url = self.endpoint("/api/repo/file_content");
        self.request_json("file_content", || {
            self.client
                .get(&url)
                .bearer_auth(bearer)
                .query(&[("repo_url", repo_url), ("file_path", file_path)])
        })
        .await
    }

    async fn find_issues(&self, bearer: &str, skills: &str) -> Result<Vec<Issue>, ErrorInfo> {
        let url = self.endpoint("/api/issues/find");
        self.request_json("find_issues", || {
            self.client
                .post(&url)
                .bearer_auth(bearer)
                .json(&FindIssuesBody { skills })
        })
        .await
    }

    async fn contribution_plan(
        &self,
        bearer: &str,
        repo_url: &str,
        issue_url: &str,
        issue_title: &str,
    ) -> Result<ContributionPlan, ErrorInfo> {
        let url = self.endpoint("/api/contribute/guide");
        self.request_json("contribution_plan", || {
            self.client.post(&url).bearer_auth(bearer).json(&GuideBody {
                repo_url,
                issue_url,
                issue_title,
            })
        })
        .await
    }

    async fn chat(&self, bearer: &str, message: &str) -> Result<ChatReply, ErrorInfo> {
        let url = self.endpoint("/api/chat");
        self.request_json("chat", || {
            self.client
                .post(&url)
                .bearer_auth(bearer)
                .json(&ChatBody { message })
        })
        .await
    }

    async fn user_stats(&self, bearer: &str) -> Result<UserStats, ErrorInfo> {
        let url = self.endpoint("/api/user/stats");
        self.request_json("user_stats", || self.client.get(&url).bearer_auth(bearer))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            base_url: base_url.to_string(),
            ..BackendConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        assert_eq!(
            backend("http://localhost:8000/").endpoint("/api/chat"),
            "http://localhost:8000/api/chat"
        );
        assert_eq!(
            backend("http://localhost:8000").endpoint("api/chat"),
            "http://localhost:8000/api/chat"
        );
    }

    #[test]
    fn test_error_detail_prefers_detail_field() {
        let msg = error_detail(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Failed to fetch issues from GitHub: rate limited"}"#,
        );
        assert_eq!(msg, "Failed to fetch issues from GitHub: rate limited");
    }

    #[test]
    fn test_error_detail_falls_back_to_status() {
        let msg = error_detail(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(msg, "Request failed with status 502: Bad Gateway");
    }

    #[test]
    fn test_error_detail_structured_value() {
        let msg = error_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "skills"], "msg": "field required"}]}"#,
        );
        assert!(msg.contains("field required"));
    }

    #[test]
    fn test_error_detail_empty_string_uses_status() {
        let msg = error_detail(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail": ""}"#);
        assert_eq!(msg, "Request failed with status 500: Internal Server Error");
    }

    #[test]
    fn test_retry_delay_is_linear_and_saturates() {
        let retry = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(200),
        };
        assert_eq!(retry.delay(1), Duration::from_millis(200));
        assert_eq!(retry.delay(3), Duration::from_millis(600));

        let huge = RetryPolicy {
            max_retries: u32::MAX,
            backoff: Duration::from_millis(u64::MAX),
        };
        assert_eq!(huge.delay(2), Duration::MAX);
        assert_eq!(RetryPolicy::none().delay(5), Duration::ZERO);
    }

    #[test]
    fn test_decode_malformed_is_backend_error() {
        let err = decode::<ChatReply>("not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::BackendError);
    }
}
