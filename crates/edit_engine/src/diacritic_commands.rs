//! Combining diacritic commands
//!
//! Editors of epigraphic and papyrological texts mark abbreviations with a
//! vinculum (overline) and uncertain letters with an underdot. Both are
//! applied as combining marks after every grapheme in the selection.

use crate::command::snapshot;
use crate::{Command, CommandResult, EditError, Result};
use doc_model::{DocumentTree, Node, NodeId, Selection};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Supported combining marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombiningMark {
    /// U+0305 COMBINING OVERLINE
    Vinculum,
    /// U+0323 COMBINING DOT BELOW
    Underdot,
}

impl CombiningMark {
    pub fn as_char(&self) -> char {
        match self {
            CombiningMark::Vinculum => '\u{0305}',
            CombiningMark::Underdot => '\u{0323}',
        }
    }

    /// Append the mark to every grapheme that lacks it
    pub fn apply_to(&self, text: &str) -> String {
        let mark = self.as_char();
        let mut out = String::with_capacity(text.len() * 2);
        for grapheme in text.graphemes(true) {
            out.push_str(grapheme);
            if !grapheme.contains(mark) && !grapheme.chars().all(char::is_whitespace) {
                out.push(mark);
            }
        }
        out
    }

    /// Strip every occurrence of the mark
    pub fn strip_from(&self, text: &str) -> String {
        let mark = self.as_char();
        text.chars().filter(|&c| c != mark).collect()
    }
}

/// Runs overlapping `[index, index + length)` with run-local char ranges
fn runs_in_range(tree: &DocumentTree, index: usize, length: usize) -> Vec<(NodeId, usize, usize)> {
    let end = index + length;
    let mut targets = Vec::new();
    for &block_id in tree.blocks() {
        let (Some(para), Some(mut at)) = (tree.get_paragraph(block_id), tree.block_start(block_id))
        else {
            continue;
        };
        for &child in para.children() {
            let len = tree.inline_len(child);
            if tree.get_run(child).is_some() && at < end && at + len > index {
                targets.push((child, index.saturating_sub(at), (end - at).min(len)));
            }
            at += len;
        }
    }
    targets
}

/// Rewrite every run in range; returns the change in document length
fn rewrite_range(
    tree: &mut DocumentTree,
    index: usize,
    length: usize,
    f: impl Fn(&str) -> String,
) -> isize {
    let mut delta = 0;
    for (run_id, start, end) in runs_in_range(tree, index, length) {
        if let Some(run) = tree.get_run_mut(run_id) {
            delta += run.map_chars(start, end, &f);
        }
    }
    delta
}

fn require_range(selection: Option<Selection>) -> Result<Selection> {
    match selection {
        Some(sel) if !sel.is_collapsed() => Ok(sel),
        _ => Err(EditError::Precondition("no text selected".into())),
    }
}

// =============================================================================
// Add / Remove
// =============================================================================

/// Add a combining mark to every grapheme of the selection
#[derive(Debug, Clone)]
pub struct AddCombiningMark {
    pub mark: CombiningMark,
}

impl Command for AddCombiningMark {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let range = require_range(selection)?;
        let mut new_tree = tree.clone();
        let delta = rewrite_range(&mut new_tree, range.index(), range.length(), |s| {
            self.mark.apply_to(s)
        });
        let length = (range.length() as isize + delta).max(0) as usize;

        Ok(CommandResult {
            tree: new_tree,
            selection: Some(Selection::range(range.index(), length)),
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        match self.mark {
            CombiningMark::Vinculum => "Add Vinculum",
            CombiningMark::Underdot => "Add Underdot",
        }
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}

/// Remove a combining mark from the selection
#[derive(Debug, Clone)]
pub struct RemoveCombiningMark {
    pub mark: CombiningMark,
}

impl Command for RemoveCombiningMark {
    fn apply(&self, tree: &DocumentTree, selection: Option<Selection>) -> Result<CommandResult> {
        let range = require_range(selection)?;
        let mut new_tree = tree.clone();
        let delta = rewrite_range(&mut new_tree, range.index(), range.length(), |s| {
            self.mark.strip_from(s)
        });
        let length = (range.length() as isize + delta).max(0) as usize;

        Ok(CommandResult {
            tree: new_tree,
            selection: Some(Selection::range(range.index(), length)),
            inverse: snapshot(tree, selection),
        })
    }

    fn display_name(&self) -> &str {
        match self.mark {
            CombiningMark::Vinculum => "Remove Vinculum",
            CombiningMark::Underdot => "Remove Underdot",
        }
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }
}
