//! CSRF token extraction

use crate::{ClientError, Result};
use regex_lite::Regex;

/// Token sent in the CSRF header of every POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Read the token from the page's `csrfmiddlewaretoken` hidden input
    pub fn from_page(html: &str) -> Result<Self> {
        extract_token(html)
            .filter(|token| !token.is_empty())
            .map(Self)
            .ok_or(ClientError::MissingCsrfToken)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn extract_token(html: &str) -> Option<String> {
    let input = Regex::new(r#"<input[^>]*name=["']csrfmiddlewaretoken["'][^>]*>"#).ok()?;
    let value = Regex::new(r#"value=["']([^"']*)["']"#).ok()?;
    let tag = input.find(html)?;
    let caps = value.captures(tag.as_str())?;
    Some(caps.get(1)?.as_str().to_string())
}
