//! Selection model - caret and range over the linear document index

use serde::{Deserialize, Serialize};

/// A selection over document indices.
///
/// Every text character, inline embed and paragraph break occupies one
/// index; tables and the notes area occupy one index each. When
/// `anchor == focus` the selection is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started
    pub anchor: usize,
    /// Where the selection ends (caret position)
    pub focus: usize,
}

impl Selection {
    /// Create a new selection
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed selection (caret only)
    pub fn collapsed(index: usize) -> Self {
        Self {
            anchor: index,
            focus: index,
        }
    }

    /// Create a selection from a start index and a length
    pub fn range(index: usize, length: usize) -> Self {
        Self {
            anchor: index,
            focus: index + length,
        }
    }

    /// Check if this selection is collapsed (just a caret)
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// First index covered by the selection
    pub fn index(&self) -> usize {
        self.anchor.min(self.focus)
    }

    /// Number of indices covered
    pub fn length(&self) -> usize {
        self.anchor.max(self.focus) - self.index()
    }

    /// Move the whole selection by a signed delta, saturating at zero
    pub fn shifted(&self, delta: isize) -> Self {
        let shift = |i: usize| i.saturating_add_signed(delta);
        Self {
            anchor: shift(self.anchor),
            focus: shift(self.focus),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_selection_normalizes() {
        let sel = Selection::new(9, 4);
        assert_eq!(sel.index(), 4);
        assert_eq!(sel.length(), 5);
        assert!(!sel.is_collapsed());
    }

    #[test]
    fn test_shifted_saturates() {
        let sel = Selection::collapsed(2).shifted(-5);
        assert_eq!(sel, Selection::collapsed(0));
        assert_eq!(Selection::range(3, 2).shifted(4), Selection::new(7, 9));
    }
}
