//! Undo/redo manager

use crate::{Command, EditError, Result};

/// An entry in the undo stack
#[derive(Debug)]
struct UndoEntry {
    /// The original command
    command: Box<dyn Command>,
    /// Restores the state before the command
    inverse: Box<dyn Command>,
    /// Restores the state after the command
    redo: Box<dyn Command>,
}

/// Manages undo and redo stacks.
///
/// Redo replays the recorded result rather than the command, so node ids
/// created by the command survive an undo/redo cycle.
#[derive(Debug)]
pub struct UndoManager {
    /// Stack of commands that can be undone
    undo_stack: Vec<UndoEntry>,
    /// Stack of commands that can be redone
    redo_stack: Vec<UndoEntry>,
    /// Maximum number of undo entries
    max_entries: usize,
}

impl UndoManager {
    /// Create a new undo manager
    pub fn new() -> Self {
        Self::with_limit(100)
    }

    /// Create with a custom depth
    pub fn with_limit(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record a new command; clears the redo stack
    pub fn push(
        &mut self,
        command: Box<dyn Command>,
        inverse: Box<dyn Command>,
        redo: Box<dyn Command>,
    ) {
        self.redo_stack.clear();
        self.record(UndoEntry {
            command,
            inverse,
            redo,
        });
    }

    fn record(&mut self, entry: UndoEntry) {
        self.undo_stack.push(entry);

        // Enforce max entries
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.remove(0);
        }
    }

    /// The command that reverts the last entry
    pub fn peek_undo(&self) -> Result<&dyn Command> {
        self.undo_stack
            .last()
            .map(|entry| entry.inverse.as_ref())
            .ok_or(EditError::UndoStackEmpty)
    }

    /// Move the last entry to the redo stack once its inverse has been applied
    pub fn commit_undo(&mut self) {
        if let Some(entry) = self.undo_stack.pop() {
            self.redo_stack.push(entry);
        }
    }

    /// The command that replays the last undone entry
    pub fn peek_redo(&self) -> Result<&dyn Command> {
        self.redo_stack
            .last()
            .map(|entry| entry.redo.as_ref())
            .ok_or(EditError::RedoStackEmpty)
    }

    /// Move the last undone entry back once it has been replayed.
    ///
    /// `inverse` restores the state the replay started from.
    pub fn commit_redo(&mut self, inverse: Box<dyn Command>) {
        if let Some(mut entry) = self.redo_stack.pop() {
            entry.inverse = inverse;
            self.record(entry);
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Display name of the command undo would revert
    pub fn undo_name(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.command.display_name())
    }

    /// Display name of the command redo would replay
    pub fn redo_name(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.command.display_name())
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}
