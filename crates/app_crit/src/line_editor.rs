//! Inline apparatus criticus line editor
//!
//! Tracks which line is being edited, whether the new-line form is open and
//! the current builder area markup. Every server call bumps a generation
//! counter; a response that comes back after a newer request started is
//! discarded with [`ClientError::Stale`] instead of overwriting newer markup.

use crate::client::{ApparatusClient, LineId, OriginalTextId};
use crate::transport::Transport;
use crate::{ClientError, Dialogs, Result};
use std::sync::{Mutex, MutexGuard};

/// What the editor is doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    /// A line is open for inline editing; `original` is restored on cancel
    Editing { line_id: LineId, original: String },
    /// The new-line form is open below position `insert_at`
    NewLine { insert_at: usize },
}

struct Inner {
    state: EditorState,
    builder_html: String,
    generation: u64,
}

/// Line editor bound to one original text
pub struct LineEditor<T, D> {
    client: ApparatusClient<T>,
    dialogs: D,
    parent_id: OriginalTextId,
    inner: Mutex<Inner>,
}

impl<T: Transport, D: Dialogs> LineEditor<T, D> {
    pub fn new(
        client: ApparatusClient<T>,
        dialogs: D,
        parent_id: OriginalTextId,
        builder_html: impl Into<String>,
    ) -> Self {
        Self {
            client,
            dialogs,
            parent_id,
            inner: Mutex::new(Inner {
                state: EditorState::Idle,
                builder_html: builder_html.into(),
                generation: 0,
            }),
        }
    }

    pub fn client(&self) -> &ApparatusClient<T> {
        &self.client
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn state(&self) -> EditorState {
        self.inner().state.clone()
    }

    /// Current builder area markup
    pub fn builder_html(&self) -> String {
        self.inner().builder_html.clone()
    }

    /// Whether the edit toggle of `line_id` is shown.
    ///
    /// Only the line being edited keeps its toggle while editing, and all
    /// toggles hide while the new-line form is open.
    pub fn toggle_visible(&self, line_id: LineId) -> bool {
        match &self.inner().state {
            EditorState::Idle => true,
            EditorState::Editing { line_id: editing, .. } => *editing == line_id,
            EditorState::NewLine { .. } => false,
        }
    }

    /// Open a line for editing; returns `false` if another edit is open
    pub fn begin_edit(&self, line_id: LineId, content: impl Into<String>) -> bool {
        let mut inner = self.inner();
        if inner.state != EditorState::Idle {
            tracing::debug!("Ignoring edit of line {} while busy", line_id);
            return false;
        }
        inner.state = EditorState::Editing {
            line_id,
            original: content.into(),
        };
        true
    }

    /// Discard the edit; returns the content to restore
    pub fn cancel(&self) -> Option<String> {
        let mut inner = self.inner();
        match std::mem::replace(&mut inner.state, EditorState::Idle) {
            EditorState::Editing { original, .. } => Some(original),
            other => {
                inner.state = other;
                None
            }
        }
    }

    /// Save the line being edited.
    ///
    /// Returns `Ok(None)` when no line is open. The line stays open if the
    /// request fails, and closes when a newer request supersedes the reply.
    pub async fn save(&self, content: &str) -> Result<Option<String>> {
        let EditorState::Editing { line_id, .. } = self.state() else {
            tracing::debug!("Save with no line open");
            return Ok(None);
        };
        let generation = self.next_generation();
        let result = self.client.update_line(line_id, content).await;
        let html = match self.settle(generation, result).await {
            Ok(html) => html,
            Err(ClientError::Stale) => {
                // The server accepted the save; only its markup is outdated
                self.close_edit(line_id);
                return Err(ClientError::Stale);
            }
            Err(e) => return Err(e),
        };

        self.close_edit(line_id);
        self.inner().builder_html = html.clone();
        Ok(Some(html))
    }

    /// Open the new-line form at `insert_at`; returns `false` while editing
    pub fn show_new_line_form(&self, insert_at: usize) -> bool {
        let mut inner = self.inner();
        if matches!(inner.state, EditorState::Editing { .. }) {
            return false;
        }
        inner.state = EditorState::NewLine { insert_at };
        true
    }

    pub fn cancel_new_line(&self) -> bool {
        let mut inner = self.inner();
        if matches!(inner.state, EditorState::NewLine { .. }) {
            inner.state = EditorState::Idle;
            true
        } else {
            false
        }
    }

    /// Submit the new-line form
    pub async fn submit_new_line(&self, content: &str) -> Result<Option<String>> {
        let EditorState::NewLine { insert_at } = self.state() else {
            tracing::debug!("Submit with no new-line form open");
            return Ok(None);
        };
        let generation = self.next_generation();
        let result = self
            .client
            .create_line(self.parent_id, insert_at, content)
            .await;
        let html = self.settle(generation, result).await?;

        let mut inner = self.inner();
        if matches!(inner.state, EditorState::NewLine { .. }) {
            inner.state = EditorState::Idle;
        }
        inner.builder_html = html.clone();
        Ok(Some(html))
    }

    /// Delete a line after the user confirms; `Ok(None)` if they decline
    pub async fn delete_line(&self, index: usize, line_id: LineId) -> Result<Option<String>> {
        let message = self.client.config().delete_confirmation.clone();
        if !self.dialogs.confirm(&message).await {
            return Ok(None);
        }
        let generation = self.next_generation();
        let result = self.client.delete_line(index, line_id).await;
        let html = self.settle(generation, result).await?;

        self.close_edit(line_id);
        self.inner().builder_html = html.clone();
        Ok(Some(html))
    }

    /// Leave editing mode if `line_id` is the open line
    fn close_edit(&self, line_id: LineId) {
        let mut inner = self.inner();
        if matches!(inner.state, EditorState::Editing { line_id: open, .. } if open == line_id) {
            inner.state = EditorState::Idle;
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_generation(&self) -> u64 {
        let mut inner = self.inner();
        inner.generation += 1;
        inner.generation
    }

    /// Report failures and drop responses superseded by a newer request
    async fn settle(&self, generation: u64, result: Result<String>) -> Result<String> {
        match result {
            Ok(html) => {
                if self.inner().generation != generation {
                    tracing::debug!("Discarding response for request {}", generation);
                    return Err(ClientError::Stale);
                }
                Ok(html)
            }
            Err(e) => {
                tracing::error!("Apparatus criticus request failed: {}", e);
                let message = self.client.config().error_message.clone();
                self.dialogs.alert(&message).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{RecordingTransport, Response};
    use crate::{ClientConfig, CsrfToken};

    #[derive(Default)]
    struct NoDialogs;

    impl Dialogs for NoDialogs {
        async fn alert(&self, _message: &str) {}

        async fn confirm(&self, _message: &str) -> bool {
            true
        }
    }

    fn editor() -> LineEditor<RecordingTransport, NoDialogs> {
        let client = ApparatusClient::new(
            RecordingTransport::new(),
            ClientConfig::default(),
            CsrfToken::new("t"),
        );
        LineEditor::new(client, NoDialogs, 1, "<div>old</div>")
    }

    #[test]
    fn test_editing_hides_other_toggles() {
        let editor = editor();
        assert!(editor.begin_edit(4, "a"));
        assert!(editor.toggle_visible(4));
        assert!(!editor.toggle_visible(5));
        assert!(!editor.begin_edit(5, "b"));
    }

    #[test]
    fn test_cancel_restores_original() {
        let editor = editor();
        editor.begin_edit(4, "<b>a</b>");
        assert_eq!(editor.cancel(), Some("<b>a</b>".to_string()));
        assert_eq!(editor.state(), EditorState::Idle);
        assert!(editor.toggle_visible(5));
        assert_eq!(editor.cancel(), None);
    }

    #[test]
    fn test_new_line_form_not_available_while_editing() {
        let editor = editor();
        editor.begin_edit(4, "a");
        assert!(!editor.show_new_line_form(0));
        editor.cancel();
        assert!(editor.show_new_line_form(0));
        assert!(!editor.toggle_visible(4));
        assert!(editor.cancel_new_line());
        assert!(!editor.cancel_new_line());
    }

    #[tokio::test]
    async fn test_save_without_edit_is_noop() {
        let editor = editor();
        assert_eq!(editor.save("x").await.unwrap(), None);
        assert!(editor.client().transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_save_replaces_builder() {
        let editor = editor();
        editor
            .client()
            .transport()
            .respond(Response::ok(r#"{"status": 200, "html": "<div>new</div>"}"#));
        editor.begin_edit(4, "a");

        let html = editor.save("b").await.unwrap();
        assert_eq!(html.as_deref(), Some("<div>new</div>"));
        assert_eq!(editor.builder_html(), "<div>new</div>");
        assert_eq!(editor.state(), EditorState::Idle);
    }
}
