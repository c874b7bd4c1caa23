//! Edit Engine - Command system, selection, and undo/redo
//!
//! This crate implements the command-based editing system: footnote, table,
//! text and diacritic commands over a [`doc_model::DocumentTree`], snapshot
//! based undo/redo, the invariant repair pass and the toolbar plugins.

mod command;
mod config;
mod diacritic_commands;
mod executor;
mod undo;
mod error;
mod invariants;
mod table_commands;
mod footnote_commands;
pub mod plugins;

pub use command::*;
pub use config::*;
pub use diacritic_commands::*;
pub use executor::*;
pub use undo::*;
pub use error::*;
pub use invariants::*;
pub use table_commands::*;
pub use footnote_commands::*;
