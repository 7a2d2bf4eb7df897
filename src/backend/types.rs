//! Wire shapes of the analysis backend.

use serde::{Deserialize, Serialize};

/// Node of the repository code map
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTreeNode")]
pub struct FileTreeNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory(DirectoryContents),
}

/// `children` on the wire: absent/null, `[]`, or a non-empty list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryContents {
    NotExpanded,
    Empty,
    Populated(Vec<FileTreeNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawNodeType {
    File,
    Directory,
}

#[derive(Deserialize)]
struct RawTreeNode {
    name: String,
    path: String,
    #[serde(rename = "type")]
    node_type: RawNodeType,
    #[serde(default)]
    children: Option<Vec<FileTreeNode>>,
}

impl From<RawTreeNode> for FileTreeNode {
    fn from(raw: RawTreeNode) -> Self {
        let kind = match raw.node_type {
            RawNodeType::File => NodeKind::File,
            RawNodeType::Directory => NodeKind::Directory(match raw.children {
                None => DirectoryContents::NotExpanded,
                Some(children) if children.is_empty() => DirectoryContents::Empty,
                Some(children) => DirectoryContents::Populated(children),
            }),
        };
        Self {
            name: raw.name,
            path: raw.path,
            kind,
        }
    }
}

impl FileTreeNode {
    pub fn file(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            kind: NodeKind::File,
        }
    }

    pub fn directory(name: &str, path: &str, contents: DirectoryContents) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            kind: NodeKind::Directory(contents),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn children(&self) -> &[FileTreeNode] {
        match &self.kind {
            NodeKind::Directory(DirectoryContents::Populated(children)) => children,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoAnalysis {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub structure: Vec<FileTreeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(rename = "repoName")]
    pub repo_name: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Issue {
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}", self.repo_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContributionStep {
    pub step: u32,
    pub title: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContributionPlan {
    pub plan: Vec<ContributionStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeAnalysis {
    pub is_correct: bool,
    pub explanation: String,
    #[serde(default)]
    pub corrected_code: Option<String>,
}

impl CodeAnalysis {
    /// 誤りがあり、修正コードが返ってきた場合のみ表示
    pub fn correction(&self) -> Option<&str> {
        if self.is_correct {
            return None;
        }
        self.corrected_code.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UserStats {
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeRepoBody<'a> {
    pub repo_url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct FindIssuesBody<'a> {
    pub skills: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GuideBody<'a> {
    pub repo_url: &'a str,
    pub issue_url: &'a str,
    pub issue_title: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatBody<'a> {
    pub message: &'a str,
}

/// `{detail}` error body
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_tri_state() {
        let json = r#"[
            {"name": "src", "path": "src", "type": "directory", "children": [
                {"name": "lib.rs", "path": "src/lib.rs", "type": "file"}
            ]},
            {"name": "docs", "path": "docs", "type": "directory", "children": []},
            {"name": "vendor", "path": "vendor", "type": "directory"},
            {"name": "target", "path": "target", "type": "directory", "children": null},
            {"name": "README.md", "path": "README.md", "type": "file"}
        ]"#;
        let nodes: Vec<FileTreeNode> = serde_json::from_str(json).unwrap();

        assert_eq!(nodes[0].children().len(), 1);
        assert_eq!(nodes[0].children()[0].kind, NodeKind::File);
        assert_eq!(
            nodes[1].kind,
            NodeKind::Directory(DirectoryContents::Empty)
        );
        assert_eq!(
            nodes[2].kind,
            NodeKind::Directory(DirectoryContents::NotExpanded)
        );
        assert_eq!(
            nodes[3].kind,
            NodeKind::Directory(DirectoryContents::NotExpanded)
        );
        assert!(!nodes[4].is_dir());
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let json = r#"{"name": "x", "path": "x", "type": "symlink"}"#;
        assert!(serde_json::from_str::<FileTreeNode>(json).is_err());
    }

    #[test]
    fn test_issue_wire_names() {
        let json = r#"{"id": 42, "title": "Fix typo",
                       "url": "https://github.com/acme/widgets/issues/42",
                       "repoName": "acme/widgets", "labels": ["good first issue"]}"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.repo_name, "acme/widgets");
        assert_eq!(issue.repo_url(), "https://github.com/acme/widgets");
    }

    #[test]
    fn test_correction_only_when_incorrect() {
        let ok = CodeAnalysis {
            is_correct: true,
            explanation: "fine".to_string(),
            corrected_code: Some("same".to_string()),
        };
        assert_eq!(ok.correction(), None);

        let bad = CodeAnalysis {
            is_correct: false,
            explanation: "missing colon".to_string(),
            corrected_code: Some("def f():".to_string()),
        };
        assert_eq!(bad.correction(), Some("def f():"));
    }

    #[test]
    fn test_request_bodies_use_camel_case() {
        let body = GuideBody {
            repo_url: "https://github.com/acme/widgets",
            issue_url: "https://github.com/acme/widgets/issues/1",
            issue_title: "Docs",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["repoUrl"], "https://github.com/acme/widgets");
        assert_eq!(value["issueUrl"], "https://github.com/acme/widgets/issues/1");
        assert_eq!(value["issueTitle"], "Docs");
    }
}
