//! HTTP transport seam
//!
//! The client talks to the server through [`Transport`] so the host decides
//! how requests travel. [`RecordingTransport`] answers from a queue and keeps
//! every request it saw.

use crate::{ClientError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header, compared case-insensitively
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response as received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the server.
///
/// Errors are reserved for requests that never got a response; an error
/// status is still `Ok`.
#[trait_variant::make(Send)]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

enum Reply {
    Respond(Response),
    Fail(String),
}

struct Queued {
    reply: Reply,
    delay: Option<Duration>,
}

/// In-memory transport answering from a queue of canned replies
#[derive(Default)]
pub struct RecordingTransport {
    replies: Mutex<VecDeque<Queued>>,
    requests: Mutex<Vec<Request>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn respond(&self, response: Response) -> &Self {
        self.enqueue(Reply::Respond(response), None)
    }

    /// Queue a response that arrives after `delay`
    pub fn respond_after(&self, response: Response, delay: Duration) -> &Self {
        self.enqueue(Reply::Respond(response), Some(delay))
    }

    /// Queue a transport failure
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.enqueue(Reply::Fail(message.into()), None)
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn pending(&self) -> usize {
        self.replies.lock().map(|replies| replies.len()).unwrap_or(0)
    }

    fn enqueue(&self, reply: Reply, delay: Option<Duration>) -> &Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Queued { reply, delay });
        }
        self
    }
}

impl Transport for RecordingTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let queued = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|_| ClientError::Transport("request log poisoned".into()))?;
            requests.push(request);
            let mut replies = self
                .replies
                .lock()
                .map_err(|_| ClientError::Transport("reply queue poisoned".into()))?;
            replies.pop_front()
        };

        let Some(Queued { reply, delay }) = queued else {
            return Err(ClientError::Transport("no response queued".into()));
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match reply {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(message) => Err(ClientError::Transport(message)),
        }
    }
}
