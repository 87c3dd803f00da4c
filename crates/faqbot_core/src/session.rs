use crate::generate::TextGenerator;
use crate::model::{AttachmentKind, ChatTurn, Role};
use crate::orchestrator::Assistant;
use std::path::{Path, PathBuf};

/// In-memory chat history for one interactive session.
#[derive(Debug, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
    attachment: Option<PathBuf>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::new(Role::User, content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::new(Role::Assistant, content));
    }

    /// Drops every turn and the current attachment.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.attachment = None;
    }

    /// Kinds outside the upload surface are ignored and `false` is returned.
    pub fn attach(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if !AttachmentKind::is_uploadable(&path) {
            tracing::debug!(path = %path.display(), "ignoring upload of unsupported kind");
            return false;
        }
        self.attachment = Some(path);
        true
    }

    pub fn detach(&mut self) -> Option<PathBuf> {
        self.attachment.take()
    }

    pub fn attachment(&self) -> Option<&Path> {
        self.attachment.as_deref()
    }

    /// Runs one turn against the current attachment and records both sides.
    pub fn ask<G: TextGenerator>(&mut self, assistant: &Assistant<G>, query: &str) -> &str {
        let attachment = self.attachment.clone();
        self.ask_with(assistant, query, attachment.as_deref())
    }

    /// Like [`ChatSession::ask`] but with a single-turn attachment that is not
    /// kept on the session.
    pub fn ask_with<G: TextGenerator>(
        &mut self,
        assistant: &Assistant<G>,
        query: &str,
        attachment: Option<&Path>,
    ) -> &str {
        self.push_user(query);
        let response = assistant.respond(query, attachment);
        self.push_assistant(response);
        self.turns
            .last()
            .map(|turn| turn.content.as_str())
            .unwrap_or_default()
    }
}
