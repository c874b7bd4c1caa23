//! Rich text modal prompt
//!
//! The footnote editor asks for note text through a modal whose markup is
//! served by the application. [`ModalPrompt`] fetches that markup and hands
//! it to the host to display.

use crate::client::ApparatusClient;
use crate::transport::Transport;
use edit_engine::plugins::{ContentPrompt, PromptRequest};

/// Displays modal markup and collects the user's answer
#[trait_variant::make(Send)]
pub trait ModalHost: Send + Sync {
    /// `None` when the user dismisses the modal
    async fn show(&self, template: &str, request: &PromptRequest) -> Option<String>;
}

/// [`ContentPrompt`] backed by the server's editor modal
pub struct ModalPrompt<T, H> {
    client: ApparatusClient<T>,
    host: H,
}

impl<T, H> ModalPrompt<T, H> {
    pub fn new(client: ApparatusClient<T>, host: H) -> Self {
        Self { client, host }
    }

    pub fn client(&self) -> &ApparatusClient<T> {
        &self.client
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<T: Transport, H: ModalHost> ContentPrompt for ModalPrompt<T, H> {
    async fn prompt(&self, request: PromptRequest) -> Option<String> {
        let template = match self.client.fetch_modal_template().await {
            Ok(template) => template,
            Err(e) => {
                tracing::error!("Failed to load editor modal: {}", e);
                return None;
            }
        };
        self.host.show(&template, &request).await
    }
}
