//! Apparatus criticus server client

use crate::transport::{Request, Response, Transport};
use crate::{ClientConfig, ClientError, CsrfToken, Result};
use serde::{Deserialize, Serialize};

/// Server id of an apparatus criticus line
pub type LineId = u64;

/// Server id of the original text owning the lines
pub type OriginalTextId = u64;

#[derive(Debug, Clone, Serialize)]
struct CreateLine<'a> {
    content: &'a str,
    insert_at: usize,
    parent_id: OriginalTextId,
}

#[derive(Debug, Clone, Serialize)]
struct UpdateLine<'a> {
    line_id: LineId,
    content: &'a str,
}

/// Builder area re-rendered by the server after a change
#[derive(Debug, Clone, Deserialize)]
struct Rendered {
    html: String,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineMatch {
    pub id: LineId,
    pub target: String,
    pub value: String,
}

/// Client for the line endpoints and the editor modal template
pub struct ApparatusClient<T> {
    transport: T,
    config: ClientConfig,
    csrf: CsrfToken,
}

impl<T: Transport> ApparatusClient<T> {
    pub fn new(transport: T, config: ClientConfig, csrf: CsrfToken) -> Self {
        Self {
            transport,
            config,
            csrf,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a line at `insert_at`; returns the new builder area markup
    pub async fn create_line(
        &self,
        parent_id: OriginalTextId,
        insert_at: usize,
        content: &str,
    ) -> Result<String> {
        let body = serde_json::to_string(&CreateLine {
            content,
            insert_at,
            parent_id,
        })?;
        let request = self
            .post(&self.config.create_line, body)
            .header("Content-Type", "application/json");
        self.rendered(request).await
    }

    /// Replace a line's content
    pub async fn update_line(&self, line_id: LineId, content: &str) -> Result<String> {
        let body = serde_json::to_string(&UpdateLine { line_id, content })?;
        let request = self
            .post(&self.config.update_line, body)
            .header("Content-Type", "application/json");
        self.rendered(request).await
    }

    /// Delete a line; `index` is its position in the builder
    pub async fn delete_line(&self, index: usize, line_id: LineId) -> Result<String> {
        let body = format!("index={}&line_id={}", index, line_id);
        let request = self
            .post(&self.config.delete_line, body)
            .header("Content-Type", "application/x-www-form-urlencoded");
        self.rendered(request).await
    }

    /// Look up lines by their 1-based number.
    ///
    /// Only integer terms match anything, so other terms return no results
    /// without contacting the server.
    pub async fn search_lines(
        &self,
        original_text: OriginalTextId,
        q: &str,
    ) -> Result<Vec<LineMatch>> {
        let term = q.trim();
        if term.parse::<i64>().is_err() {
            tracing::debug!("Ignoring non-integer line search {:?}", q);
            return Ok(Vec::new());
        }
        let url = format!(
            "{}?original_text={}&q={}",
            self.config.url(&self.config.search_lines),
            original_text,
            urlencoding::encode(term)
        );
        let response = self.send(Request::get(url)).await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Raw markup of the rich text modal
    pub async fn fetch_modal_template(&self) -> Result<String> {
        let request = Request::get(self.config.url(&self.config.modal_template));
        Ok(self.send(request).await?.body)
    }

    fn post(&self, path: &str, body: String) -> Request {
        Request::post(self.config.url(path), body)
            .header(self.config.csrf_header.as_str(), self.csrf.as_str())
    }

    async fn rendered(&self, request: Request) -> Result<String> {
        let response = self.send(request).await?;
        let rendered: Rendered = serde_json::from_str(&response.body)?;
        Ok(rendered.html)
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let url = request.url.clone();
        let request = request.header("X-Requested-With", "XMLHttpRequest");
        tracing::debug!("{:?} {}", request.method, url);
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ClientError::Status {
                status: response.status,
                url,
            });
        }
        Ok(response)
    }
}
