//! Toolbar-facing plugins
//!
//! Plugins translate user gestures (toolbar buttons, clicks, hovers) into
//! commands on an [`EditingEngine`](crate::EditingEngine). Unmet
//! preconditions are swallowed here, so a button pressed at the wrong time
//! does nothing instead of surfacing an error.

mod footnotes;
mod prompt;
mod tables;

pub use footnotes::*;
pub use prompt::*;
pub use tables::*;
