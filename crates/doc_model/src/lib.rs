//! Document Model - Core document tree structure and types
//!
//! This crate provides the document model for the scholarly text editor:
//! paragraphs of text runs, footnote indicators paired with entries in a
//! trailing notes area, and tables whose rows carry a row-format tag.
//! Positions are linear document indices; see [`DocumentTree::locate`].

mod node;
mod document;
mod paragraph;
mod run;
mod selection;
mod node_id;
mod tree;
mod error;
pub mod table;
pub mod footnote;
pub mod html;

pub use node::*;
pub use document::*;
pub use paragraph::*;
pub use run::*;
pub use selection::*;
pub use node_id::*;
pub use tree::*;
pub use error::*;
pub use table::*;
pub use footnote::*;
pub use html::render_html;
