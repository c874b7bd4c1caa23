//! Text run node - a contiguous span of plain text inside a paragraph

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// A text run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    id: NodeId,
    parent: Option<NodeId>,
    /// The text content of this run
    pub text: String,
}

impl Run {
    /// Create a new run with text content
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            text: text.into(),
        }
    }

    /// Length in document indices (one per `char`)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if this run is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Get the number of grapheme clusters in this run
    pub fn grapheme_count(&self) -> usize {
        use unicode_segmentation::UnicodeSegmentation;
        self.text.graphemes(true).count()
    }

    /// Insert text at a char offset (clamped to the run length)
    pub fn insert_text(&mut self, char_offset: usize, text: &str) {
        let at = byte_offset(&self.text, char_offset);
        self.text.insert_str(at, text);
    }

    /// Remove the chars in `[start, end)`
    pub fn remove_chars(&mut self, start: usize, end: usize) {
        let from = byte_offset(&self.text, start);
        let to = byte_offset(&self.text, end);
        if from < to {
            self.text.replace_range(from..to, "");
        }
    }

    /// Rewrite the chars in `[start, end)`, returning the change in length
    pub fn map_chars(&mut self, start: usize, end: usize, f: impl FnOnce(&str) -> String) -> isize {
        let from = byte_offset(&self.text, start);
        let to = byte_offset(&self.text, end);
        if from >= to {
            return 0;
        }
        let before = self.text[from..to].chars().count() as isize;
        let replacement = f(&self.text[from..to]);
        let after = replacement.chars().count() as isize;
        self.text.replace_range(from..to, &replacement);
        after - before
    }

    /// Split at a char offset, keeping the head and returning the tail
    pub fn split_off(&mut self, char_offset: usize) -> String {
        let at = byte_offset(&self.text, char_offset);
        self.text.split_off(at)
    }
}

/// Byte offset of the `char_offset`-th char, clamped to the string length
fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

impl Node for Run {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Run
    }

    fn children(&self) -> &[NodeId] {
        // Runs have no children
        &[]
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn can_have_children(&self) -> bool {
        false
    }

    fn text_content(&self) -> Option<&str> {
        Some(&self.text)
    }
}
