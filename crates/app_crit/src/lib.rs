//! Apparatus criticus client
//!
//! Talks to the server endpoints that create, update, delete and search the
//! apparatus criticus lines of an original text, drives the inline line
//! editor, and supplies the modal prompt used by the footnote editor.

mod client;
mod config;
mod csrf;
mod dialogs;
mod error;
mod line_editor;
mod modal;
pub mod transport;

pub use client::{ApparatusClient, LineId, LineMatch, OriginalTextId};
pub use config::ClientConfig;
pub use csrf::CsrfToken;
pub use dialogs::Dialogs;
pub use error::{ClientError, Result};
pub use line_editor::{EditorState, LineEditor};
pub use modal::{ModalHost, ModalPrompt};
pub use transport::{RecordingTransport, Request, Response, Transport};
