//! Document tree storage and linear index addressing
//!
//! Every node lives in a flat [`NodeStorage`] keyed by [`NodeId`]; the
//! document body lists the top-level blocks in order. Positions are plain
//! document indices: one per text char, one per inline embed, one per
//! paragraph break, one per table and one for the notes area.

use crate::{
    DocModelError, Document, FootnoteId, FootnoteIndicator, Node, NodeId, NodeType, NotesArea,
    Paragraph, Result, Run, Table, TableCell, TableRow,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage for different node types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStorage {
    pub paragraphs: HashMap<NodeId, Paragraph>,
    pub runs: HashMap<NodeId, Run>,
    pub indicators: HashMap<NodeId, FootnoteIndicator>,
    pub tables: HashMap<NodeId, Table>,
    pub table_rows: HashMap<NodeId, TableRow>,
    pub table_cells: HashMap<NodeId, TableCell>,
}

/// The complete document tree structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    /// The root document
    pub document: Document,
    /// Storage for all nodes
    pub nodes: NodeStorage,
    /// Trailing notes area, created on first footnote insertion
    #[serde(default)]
    pub notes_area: Option<NotesArea>,
}

/// Where a document index falls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLocation {
    /// Block containing the index
    pub block_id: NodeId,
    /// Position of the block in the body
    pub body_index: usize,
    /// Document index of the block's first position
    pub block_start: usize,
    /// Offset of the index inside the block
    pub offset: usize,
}

/// What a range deletion took out of the document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    /// Footnotes whose indicator was inside the range
    pub removed_indicators: Vec<FootnoteId>,
    /// Tables removed as a whole
    pub removed_tables: Vec<NodeId>,
    /// Whether the notes area itself was deleted
    pub removed_notes_area: bool,
}

impl DocumentTree {
    /// Create a new empty document tree
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            nodes: NodeStorage::default(),
            notes_area: None,
        }
    }

    /// Create a document tree with a single empty paragraph
    pub fn with_empty_paragraph() -> Self {
        let mut tree = Self::new();
        let para = Paragraph::new();
        // Appending to an empty body cannot fail
        let _ = tree.insert_paragraph(para, None);
        tree
    }

    /// Create a document with one paragraph per line of text
    pub fn from_text(text: &str) -> Self {
        let mut tree = Self::new();
        for line in text.split('\n') {
            let para = Paragraph::new();
            if let Ok(para_id) = tree.insert_paragraph(para, None) {
                if !line.is_empty() {
                    let _ = tree.insert_run(Run::new(line), para_id, None);
                }
            }
        }
        tree
    }

    /// Get the document root ID
    pub fn root_id(&self) -> NodeId {
        self.document.id()
    }

    /// Top-level blocks in body order
    pub fn blocks(&self) -> &[NodeId] {
        self.document.children()
    }

    /// Get the node type for a given ID
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        if id == self.document.id() {
            return Some(NodeType::Document);
        }
        if self.nodes.paragraphs.contains_key(&id) {
            return Some(NodeType::Paragraph);
        }
        if self.nodes.runs.contains_key(&id) {
            return Some(NodeType::Run);
        }
        if self.nodes.indicators.contains_key(&id) {
            return Some(NodeType::FootnoteIndicator);
        }
        if self.nodes.tables.contains_key(&id) {
            return Some(NodeType::Table);
        }
        if self.nodes.table_rows.contains_key(&id) {
            return Some(NodeType::TableRow);
        }
        if self.nodes.table_cells.contains_key(&id) {
            return Some(NodeType::TableCell);
        }
        if self.notes_area.as_ref().map(|a| a.id()) == Some(id) {
            return Some(NodeType::NotesArea);
        }
        None
    }

    /// Get a paragraph by ID
    pub fn get_paragraph(&self, id: NodeId) -> Option<&Paragraph> {
        self.nodes.paragraphs.get(&id)
    }

    /// Get a mutable paragraph by ID
    pub fn get_paragraph_mut(&mut self, id: NodeId) -> Option<&mut Paragraph> {
        self.nodes.paragraphs.get_mut(&id)
    }

    /// Get a run by ID
    pub fn get_run(&self, id: NodeId) -> Option<&Run> {
        self.nodes.runs.get(&id)
    }

    /// Get a mutable run by ID
    pub fn get_run_mut(&mut self, id: NodeId) -> Option<&mut Run> {
        self.nodes.runs.get_mut(&id)
    }

    /// Get a footnote indicator by node ID
    pub fn get_indicator(&self, id: NodeId) -> Option<&FootnoteIndicator> {
        self.nodes.indicators.get(&id)
    }

    /// Paragraphs in body order
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.document
            .children()
            .iter()
            .filter_map(|id| self.nodes.paragraphs.get(id))
    }

    /// Tables in body order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.document
            .children()
            .iter()
            .filter_map(|id| self.nodes.tables.get(id))
    }

    // =========================================================================
    // Index arithmetic
    // =========================================================================

    /// Length of an inline node in document indices
    pub fn inline_len(&self, id: NodeId) -> usize {
        if let Some(run) = self.nodes.runs.get(&id) {
            return run.char_len();
        }
        match self.node_type(id) {
            Some(node_type) if node_type.is_inline() => 1,
            _ => 0,
        }
    }

    /// Length of a paragraph including its trailing break
    pub fn paragraph_len(&self, id: NodeId) -> usize {
        self.get_paragraph(id)
            .map(|para| {
                para.children()
                    .iter()
                    .map(|&child| self.inline_len(child))
                    .sum::<usize>()
                    + 1
            })
            .unwrap_or(0)
    }

    /// Length of a top-level block
    pub fn block_len(&self, id: NodeId) -> usize {
        match self.node_type(id) {
            Some(NodeType::Paragraph) => self.paragraph_len(id),
            Some(node_type) if node_type.is_block() => 1,
            _ => 0,
        }
    }

    /// Total document length
    pub fn length(&self) -> usize {
        self.document
            .children()
            .iter()
            .map(|&id| self.block_len(id))
            .sum()
    }

    /// Document index of a block's first position
    pub fn block_start(&self, block_id: NodeId) -> Option<usize> {
        let mut start = 0;
        for &id in self.document.children() {
            if id == block_id {
                return Some(start);
            }
            start += self.block_len(id);
        }
        None
    }

    /// Find the block containing a document index
    pub fn locate(&self, index: usize) -> Result<BlockLocation> {
        let mut start = 0;
        for (body_index, &id) in self.document.children().iter().enumerate() {
            let len = self.block_len(id);
            if index < start + len {
                return Ok(BlockLocation {
                    block_id: id,
                    body_index,
                    block_start: start,
                    offset: index - start,
                });
            }
            start += len;
        }
        Err(DocModelError::InvalidPosition {
            index,
            length: start,
        })
    }

    /// Index just before the break of the last paragraph preceding the notes area
    pub fn text_end_index(&self) -> Option<usize> {
        let mut start = 0;
        let mut end = None;
        for &id in self.document.children() {
            let len = self.block_len(id);
            match self.node_type(id) {
                Some(NodeType::Paragraph) => end = Some(start + len - 1),
                Some(NodeType::NotesArea) => break,
                _ => {}
            }
            start += len;
        }
        end
    }

    /// Document index of an inline node
    pub fn index_of_inline(&self, inline_id: NodeId) -> Option<usize> {
        let para_id = self.inline_parent(inline_id)?;
        let para = self.get_paragraph(para_id)?;
        let mut index = self.block_start(para_id)?;
        for &child in para.children() {
            if child == inline_id {
                return Some(index);
            }
            index += self.inline_len(child);
        }
        None
    }

    /// Paragraph owning an inline node
    pub fn inline_parent(&self, inline_id: NodeId) -> Option<NodeId> {
        self.nodes
            .runs
            .get(&inline_id)
            .and_then(|r| r.parent())
            .or_else(|| self.nodes.indicators.get(&inline_id).and_then(|i| i.parent()))
    }

    /// Text of a paragraph with indicators shown as their labels
    pub fn paragraph_text(&self, para_id: NodeId) -> String {
        let Some(para) = self.get_paragraph(para_id) else {
            return String::new();
        };
        let mut text = String::new();
        for &child in para.children() {
            if let Some(run) = self.nodes.runs.get(&child) {
                text.push_str(&run.text);
            } else if let Some(indicator) = self.nodes.indicators.get(&child) {
                text.push_str(&indicator.label());
            }
        }
        text
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Insert a paragraph into the body (None = append)
    pub fn insert_paragraph(&mut self, mut para: Paragraph, index: Option<usize>) -> Result<NodeId> {
        let para_id = para.id();
        para.set_parent(Some(self.root_id()));
        match index {
            Some(idx) => self.document.insert_body_child(idx, para_id),
            None => self.document.add_body_child(para_id),
        }
        self.nodes.paragraphs.insert(para_id, para);
        Ok(para_id)
    }

    /// Insert a run into a paragraph (None = append)
    pub fn insert_run(&mut self, mut run: Run, para_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let run_id = run.id();
        run.set_parent(Some(para_id));

        let para = self
            .nodes
            .paragraphs
            .get_mut(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;

        match index {
            Some(idx) => para.insert_child(idx.min(para.children().len()), run_id),
            None => para.add_child(run_id),
        }

        self.nodes.runs.insert(run_id, run);
        Ok(run_id)
    }

    /// Paragraph and in-paragraph offset for an inline insertion point
    pub fn resolve_inline(&self, index: usize) -> Result<(NodeId, usize)> {
        let loc = self.locate(index)?;
        match self.node_type(loc.block_id) {
            Some(NodeType::Paragraph) => Ok((loc.block_id, loc.offset)),
            _ => Err(DocModelError::InvalidOperation(format!(
                "index {} is not inside a paragraph",
                index
            ))),
        }
    }

    /// Insert text at a document index; `\n` starts a new paragraph
    pub fn insert_text(&mut self, index: usize, text: &str) -> Result<()> {
        let mut at = index;
        for (n, line) in text.split('\n').enumerate() {
            if n > 0 {
                self.insert_paragraph_break(at)?;
                at += 1;
            }
            self.insert_plain_text(at, line)?;
            at += line.chars().count();
        }
        Ok(())
    }

    fn insert_plain_text(&mut self, index: usize, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let (para_id, offset) = self.resolve_inline(index)?;
        let children = self
            .get_paragraph(para_id)
            .map(|p| p.children().to_vec())
            .unwrap_or_default();

        let mut acc = 0;
        for &child in &children {
            let len = self.inline_len(child);
            if let Some(run) = self.nodes.runs.get_mut(&child) {
                if offset >= acc && offset <= acc + len {
                    run.insert_text(offset - acc, text);
                    return Ok(());
                }
            }
            acc += len;
        }

        let at = self.split_inline_at(para_id, offset)?;
        self.insert_run(Run::new(text), para_id, Some(at))?;
        Ok(())
    }

    /// Child index at which an inline can be inserted at `offset`, splitting a run if needed
    pub fn split_inline_at(&mut self, para_id: NodeId, offset: usize) -> Result<usize> {
        let children = self
            .get_paragraph(para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?
            .children()
            .to_vec();

        let mut acc = 0;
        for (i, &child) in children.iter().enumerate() {
            if offset == acc {
                return Ok(i);
            }
            let len = self.inline_len(child);
            if offset < acc + len {
                // Only runs span more than one index
                let tail = match self.nodes.runs.get_mut(&child) {
                    Some(run) => run.split_off(offset - acc),
                    None => return Ok(i + 1),
                };
                self.insert_run(Run::new(tail), para_id, Some(i + 1))?;
                return Ok(i + 1);
            }
            acc += len;
        }
        Ok(children.len())
    }

    /// Split a paragraph at an offset, returning the new second half
    pub fn split_paragraph(&mut self, para_id: NodeId, offset: usize) -> Result<NodeId> {
        let body_index = self
            .document
            .body_index_of(para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;
        let split_at = self.split_inline_at(para_id, offset)?;
        let tail = self
            .get_paragraph_mut(para_id)
            .map(|p| p.split_children(split_at))
            .unwrap_or_default();

        let mut new_para = Paragraph::new();
        let new_id = new_para.id();
        for &child in &tail {
            new_para.add_child(child);
        }
        self.insert_paragraph(new_para, Some(body_index + 1))?;
        for child in tail {
            self.set_inline_parent(child, new_id);
        }
        Ok(new_id)
    }

    /// Split the paragraph containing `index`
    pub fn insert_paragraph_break(&mut self, index: usize) -> Result<NodeId> {
        let (para_id, offset) = self.resolve_inline(index)?;
        self.split_paragraph(para_id, offset)
    }

    /// Place an already-stored block (table) at a document index.
    ///
    /// An index inside a paragraph splits it; a paragraph is kept after the
    /// block so text can always follow it. Returns the block's body index.
    pub fn insert_block_at(&mut self, index: usize, block_id: NodeId) -> Result<usize> {
        let loc = self.locate(index)?;
        let body_index = match self.node_type(loc.block_id) {
            Some(NodeType::Paragraph) => {
                let len = self.paragraph_len(loc.block_id);
                if loc.offset == 0 {
                    loc.body_index
                } else if loc.offset >= len - 1 {
                    loc.body_index + 1
                } else {
                    self.split_paragraph(loc.block_id, loc.offset)?;
                    loc.body_index + 1
                }
            }
            _ => loc.body_index,
        };

        self.document.insert_body_child(body_index, block_id);

        let needs_paragraph = match self.document.children().get(body_index + 1) {
            Some(&next) => self.node_type(next) != Some(NodeType::Paragraph),
            None => true,
        };
        if needs_paragraph {
            self.insert_paragraph(Paragraph::new(), Some(body_index + 1))?;
        }
        Ok(body_index)
    }

    /// Delete `length` indices starting at `index`.
    ///
    /// Tables and the notes area are removed whole when touched; a deleted
    /// paragraph break merges the paragraph with a following paragraph.
    pub fn delete_range(&mut self, index: usize, length: usize) -> Result<DeleteSummary> {
        let mut summary = DeleteSummary::default();
        if length == 0 {
            return Ok(summary);
        }
        let total = self.length();
        if index >= total {
            return Err(DocModelError::InvalidPosition {
                index,
                length: total,
            });
        }
        let end = (index + length).min(total);

        let mut spans = Vec::with_capacity(self.document.children().len());
        let mut start = 0;
        for &id in self.document.children() {
            let len = self.block_len(id);
            spans.push((id, start, len));
            start += len;
        }

        // Back to front so earlier spans stay valid
        for &(id, start, len) in spans.iter().rev() {
            let block_end = start + len;
            if block_end <= index || start >= end {
                continue;
            }
            match self.node_type(id) {
                Some(NodeType::Paragraph) => {
                    let local_start = index.max(start) - start;
                    let local_end = end.min(block_end) - start;
                    let removed =
                        self.remove_paragraph_content(id, local_start, local_end.min(len - 1))?;
                    summary.removed_indicators.extend(removed);
                    if local_end == len {
                        self.merge_with_next_paragraph(id);
                    }
                }
                Some(NodeType::Table) => {
                    self.remove_block(id)?;
                    summary.removed_tables.push(id);
                }
                Some(NodeType::NotesArea) => {
                    self.remove_block(id)?;
                    summary.removed_notes_area = true;
                }
                _ => {}
            }
        }
        Ok(summary)
    }

    /// Remove inline content in `[start, end)` of a paragraph
    fn remove_paragraph_content(
        &mut self,
        para_id: NodeId,
        start: usize,
        end: usize,
    ) -> Result<Vec<FootnoteId>> {
        if start >= end {
            return Ok(Vec::new());
        }
        let children = self
            .get_paragraph(para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?
            .children()
            .to_vec();

        let mut removed_nodes = Vec::new();
        let mut removed_footnotes = Vec::new();
        let mut acc = 0;
        for child in children {
            let len = self.inline_len(child);
            let (child_start, child_end) = (acc, acc + len);
            acc = child_end;
            if child_end <= start || child_start >= end {
                continue;
            }
            if let Some(run) = self.nodes.runs.get_mut(&child) {
                run.remove_chars(start.max(child_start) - child_start, end.min(child_end) - child_start);
                if run.is_empty() {
                    removed_nodes.push(child);
                }
            } else if let Some(indicator) = self.nodes.indicators.get(&child) {
                removed_footnotes.push(indicator.footnote_id);
                removed_nodes.push(child);
            }
        }

        for id in removed_nodes {
            self.remove_inline(id);
        }
        self.normalize_runs(para_id);
        Ok(removed_footnotes)
    }

    /// Pull the next block's content into this paragraph if it is a paragraph
    fn merge_with_next_paragraph(&mut self, para_id: NodeId) -> bool {
        let Some(pos) = self.document.body_index_of(para_id) else {
            return false;
        };
        let Some(&next_id) = self.document.children().get(pos + 1) else {
            return false;
        };
        let Some(next) = self.nodes.paragraphs.remove(&next_id) else {
            return false;
        };
        self.document.remove_body_child(next_id);
        for &child in next.children() {
            if let Some(para) = self.nodes.paragraphs.get_mut(&para_id) {
                para.add_child(child);
            }
            self.set_inline_parent(child, para_id);
        }
        self.normalize_runs(para_id);
        true
    }

    /// Merge adjacent runs and drop empty ones
    pub fn normalize_runs(&mut self, para_id: NodeId) {
        let Some(children) = self.get_paragraph(para_id).map(|p| p.children().to_vec()) else {
            return;
        };

        let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            let is_run = self.nodes.runs.contains_key(&child);
            if is_run {
                let empty = self.nodes.runs.get(&child).map(|r| r.is_empty()).unwrap_or(true);
                if empty {
                    self.nodes.runs.remove(&child);
                    continue;
                }
                let prev_is_run = kept
                    .last()
                    .map(|prev| self.nodes.runs.contains_key(prev))
                    .unwrap_or(false);
                if prev_is_run {
                    let text = self.nodes.runs.remove(&child).map(|r| r.text).unwrap_or_default();
                    if let Some(prev) = kept.last().and_then(|prev| self.nodes.runs.get_mut(prev)) {
                        prev.text.push_str(&text);
                    }
                    continue;
                }
            }
            kept.push(child);
        }

        if let Some(para) = self.nodes.paragraphs.get_mut(&para_id) {
            para.set_children(kept);
        }
    }

    /// Detach and drop an inline node
    pub fn remove_inline(&mut self, inline_id: NodeId) -> Option<NodeId> {
        let parent = self.inline_parent(inline_id);
        self.nodes.runs.remove(&inline_id);
        self.nodes.indicators.remove(&inline_id);
        if let Some(para) = parent.and_then(|p| self.nodes.paragraphs.get_mut(&p)) {
            para.remove_child(inline_id);
        }
        parent
    }

    fn set_inline_parent(&mut self, inline_id: NodeId, parent: NodeId) {
        if let Some(run) = self.nodes.runs.get_mut(&inline_id) {
            run.set_parent(Some(parent));
        } else if let Some(indicator) = self.nodes.indicators.get_mut(&inline_id) {
            indicator.set_parent(Some(parent));
        }
    }

    /// Remove a top-level block and everything under it
    pub fn remove_block(&mut self, block_id: NodeId) -> Result<()> {
        match self.node_type(block_id) {
            Some(NodeType::Paragraph) => {
                if let Some(para) = self.nodes.paragraphs.remove(&block_id) {
                    for child in para.children() {
                        self.nodes.runs.remove(child);
                        self.nodes.indicators.remove(child);
                    }
                }
            }
            Some(NodeType::Table) => {
                if let Some(table) = self.nodes.tables.remove(&block_id) {
                    for row_id in table.children() {
                        if let Some(row) = self.nodes.table_rows.remove(row_id) {
                            for cell_id in row.children() {
                                self.nodes.table_cells.remove(cell_id);
                            }
                        }
                    }
                }
            }
            Some(NodeType::NotesArea) => {
                self.notes_area = None;
            }
            _ => return Err(DocModelError::NodeNotFound(block_id.as_uuid())),
        }
        self.document.remove_body_child(block_id);
        Ok(())
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::with_empty_paragraph()
    }
}
