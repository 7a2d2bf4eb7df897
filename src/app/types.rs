use crate::ui::text_area::TextArea;

/// フォーカス可能なパネル（Tab で巡回）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Issues,
    Repository,
    Viewer,
    Analysis,
    Chat,
}

impl Panel {
    const ORDER: [Panel; 5] = [
        Panel::Issues,
        Panel::Repository,
        Panel::Viewer,
        Panel::Analysis,
        Panel::Chat,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    /// `/` or `i` で編集を始める入力欄
    pub fn primary_input(self) -> Option<InputTarget> {
        match self {
            Panel::Issues => Some(InputTarget::Skills),
            Panel::Repository => Some(InputTarget::RepoUrl),
            Panel::Analysis => Some(InputTarget::Code),
            Panel::Chat => Some(InputTarget::Chat),
            Panel::Viewer => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Skills,
    RepoUrl,
    Code,
    Context,
    Chat,
}

/// Text inputs of the dashboard forms
pub struct Forms {
    pub skills: TextArea,
    pub repo_url: TextArea,
    pub code: TextArea,
    pub context: TextArea,
    pub chat: TextArea,
    pub login: TextArea,
}

impl Default for Forms {
    fn default() -> Self {
        Self {
            skills: TextArea::single_line("e.g. python, docs, good first issue"),
            repo_url: TextArea::single_line("https://github.com/owner/repo"),
            code: TextArea::new("Paste your code here..."),
            context: TextArea::single_line("What is this code supposed to do?"),
            chat: TextArea::single_line("Ask a question about the code..."),
            login: TextArea::single_line("Paste your session token"),
        }
    }
}

impl Forms {
    pub fn get(&self, target: InputTarget) -> &TextArea {
        match target {
            InputTarget::Skills => &self.skills,
            InputTarget::RepoUrl => &self.repo_url,
            InputTarget::Code => &self.code,
            InputTarget::Context => &self.context,
            InputTarget::Chat => &self.chat,
        }
    }

    pub fn get_mut(&mut self, target: InputTarget) -> &mut TextArea {
        match target {
            InputTarget::Skills => &mut self.skills,
            InputTarget::RepoUrl => &mut self.repo_url,
            InputTarget::Code => &mut self.code,
            InputTarget::Context => &mut self.context,
            InputTarget::Chat => &mut self.chat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
}

/// Append-only Q&A history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) {
        self.messages.push(ChatMessage {
            text: text.into(),
            sender,
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// ログアウト時のみ
    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Open contribution-plan modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanModal {
    pub issue_id: u64,
    pub issue_title: String,
    pub cursor: usize,
    /// Steps whose expansion differs from the default (first step open)
    toggled: std::collections::HashSet<usize>,
}

impl PlanModal {
    pub fn new(issue_id: u64, issue_title: String) -> Self {
        Self {
            issue_id,
            issue_title,
            cursor: 0,
            toggled: Default::default(),
        }
    }

    pub fn is_expanded(&self, step: usize) -> bool {
        (step == 0) != self.toggled.contains(&step)
    }

    pub fn toggle(&mut self, step: usize) {
        if !self.toggled.remove(&step) {
            self.toggled.insert(step);
        }
    }
}

/// Visible row of the code map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub depth: usize,
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub expanded: bool,
    /// Directory whose children the backend did not send
    pub not_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_cycle() {
        assert_eq!(Panel::Issues.next(), Panel::Repository);
        assert_eq!(Panel::Chat.next(), Panel::Issues);
        assert_eq!(Panel::Issues.prev(), Panel::Chat);
    }

    #[test]
    fn test_plan_modal_first_step_open_by_default() {
        let mut modal = PlanModal::new(1, "Docs".to_string());
        assert!(modal.is_expanded(0));
        assert!(!modal.is_expanded(1));

        modal.toggle(0);
        modal.toggle(1);
        assert!(!modal.is_expanded(0));
        assert!(modal.is_expanded(1));

        modal.toggle(1);
        assert!(!modal.is_expanded(1));
    }
}
