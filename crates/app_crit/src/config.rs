//! Client configuration
//!
//! Endpoint paths and user-facing messages, read from a JSON file. Missing
//! fields take their defaults and an unreadable file falls back to defaults
//! entirely.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server endpoints and messages used by the apparatus criticus client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix joined to every endpoint path
    pub base_url: String,
    pub create_line: String,
    pub update_line: String,
    pub delete_line: String,
    pub search_lines: String,
    /// Raw HTML for the rich text modal
    pub modal_template: String,
    /// Header carrying the CSRF token on POST requests
    pub csrf_header: String,
    /// Shown to the user when a request fails
    pub error_message: String,
    pub delete_confirmation: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            create_line: "/app-crit/create-line/".to_string(),
            update_line: "/app-crit/update-line/".to_string(),
            delete_line: "/app-crit/delete-line/".to_string(),
            search_lines: "/app-crit/search-lines/".to_string(),
            modal_template: "/render-editor-modal-template/".to_string(),
            csrf_header: "X-CSRFToken".to_string(),
            error_message: "Sorry, an error occurred.".to_string(),
            delete_confirmation: "Are you sure you want to delete this line? This cannot be undone."
                .to_string(),
        }
    }
}

impl ClientConfig {
    /// Full URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Load from disk, or return defaults if the file doesn't exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        Ok(Self::parse_or_default(&content))
    }

    /// Load synchronously (for use during startup)
    pub fn load_sync(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse_or_default(&content))
    }

    /// Save to disk, creating parent directories
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    fn parse_or_default(content: &str) -> Self {
        match serde_json::from_str::<ClientConfig>(content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse client config, using defaults: {}", e);
                Self::default()
            }
        }
    }
}
