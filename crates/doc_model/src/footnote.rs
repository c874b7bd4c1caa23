//! Footnote Model
//!
//! A footnote is a pair: an inline indicator in the text (rendered as
//! `•N`) and an entry in the notes area at the end of the document
//! (rendered as `N. content`). Both halves share a [`FootnoteId`].
//!
//! Numbering is derived, never stored authoritatively: after any edit the
//! indicators are numbered 1..N in document order and the entries are
//! reordered to follow them. [`DocumentTree::reconcile_footnotes`] repairs
//! the pairing after edits that bypass the footnote commands.

use crate::{DocModelError, DocumentTree, Node, NodeId, NodeType, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

// =============================================================================
// Footnote ID
// =============================================================================

/// Identity shared by an indicator and its entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FootnoteId(Uuid);

impl FootnoteId {
    /// Create a new random FootnoteId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a FootnoteId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Element id of the indicator, e.g. `footnote-indicator-1a2b`
    pub fn indicator_element_id(&self) -> String {
        format!("footnote-indicator-{}", crate::node_id::element_suffix(self.0))
    }

    /// Element id of the entry, e.g. `footnote-1a2b`
    pub fn entry_element_id(&self) -> String {
        format!("footnote-{}", crate::node_id::element_suffix(self.0))
    }
}

impl Default for FootnoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FootnoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for FootnoteId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// =============================================================================
// Indicator
// =============================================================================

/// Inline superscript marker referring to a footnote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootnoteIndicator {
    id: NodeId,
    parent: Option<NodeId>,
    /// Footnote this indicator belongs to
    pub footnote_id: FootnoteId,
    /// Display number, 1-based
    pub number: u32,
}

impl FootnoteIndicator {
    pub fn new(footnote_id: FootnoteId, number: u32) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            footnote_id,
            number,
        }
    }

    /// Visible label, e.g. `•3`
    pub fn label(&self) -> String {
        format!("•{}", self.number)
    }
}

impl Node for FootnoteIndicator {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::FootnoteIndicator
    }

    fn children(&self) -> &[NodeId] {
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
        None
    }
}

// =============================================================================
// Entry and notes area
// =============================================================================

/// Footnote text inside the notes area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteEntry {
    pub footnote_id: FootnoteId,
    pub number: u32,
    pub content: String,
}

impl FootnoteEntry {
    pub fn new(footnote_id: FootnoteId, number: u32, content: impl Into<String>) -> Self {
        Self {
            footnote_id,
            number,
            content: content.into(),
        }
    }

    /// Rendered line, e.g. `2. ibid.`
    pub fn display_text(&self) -> String {
        format!("{}. {}", self.number, self.content)
    }
}

/// Trailing block holding the footnote entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesArea {
    id: NodeId,
    entries: Vec<FootnoteEntry>,
}

impl NotesArea {
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            entries: Vec::new(),
        }
    }

    /// Entries in display order
    pub fn entries(&self) -> &[FootnoteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of a footnote's entry
    pub fn position_of(&self, footnote_id: FootnoteId) -> Option<usize> {
        self.entries.iter().position(|e| e.footnote_id == footnote_id)
    }

    pub fn entry(&self, footnote_id: FootnoteId) -> Option<&FootnoteEntry> {
        self.entries.iter().find(|e| e.footnote_id == footnote_id)
    }

    pub fn entry_mut(&mut self, footnote_id: FootnoteId) -> Option<&mut FootnoteEntry> {
        self.entries.iter_mut().find(|e| e.footnote_id == footnote_id)
    }

    /// Insert an entry at a position (clamped)
    pub fn insert_entry(&mut self, position: usize, entry: FootnoteEntry) -> usize {
        let at = position.min(self.entries.len());
        self.entries.insert(at, entry);
        at
    }

    pub fn push_entry(&mut self, entry: FootnoteEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub fn remove_entry(&mut self, footnote_id: FootnoteId) -> Option<FootnoteEntry> {
        let pos = self.position_of(footnote_id)?;
        Some(self.entries.remove(pos))
    }

    /// Drop entries whose footnote is not live, returning their ids
    fn retain_live(&mut self, live: &HashSet<FootnoteId>) -> Vec<FootnoteId> {
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            let keep = live.contains(&e.footnote_id);
            if !keep {
                removed.push(e.footnote_id);
            }
            keep
        });
        removed
    }

    /// Reorder entries to follow `order` and renumber them.
    ///
    /// Entries named in `order` take the paired number; the rest keep their
    /// relative order after them, numbered on from `order.len()`.
    fn align_to(&mut self, order: &[(FootnoteId, u32)]) -> bool {
        let before: Vec<(FootnoteId, u32)> =
            self.entries.iter().map(|e| (e.footnote_id, e.number)).collect();

        let mut remaining = std::mem::take(&mut self.entries);
        let mut aligned = Vec::with_capacity(remaining.len());
        for &(footnote_id, number) in order {
            if let Some(pos) = remaining.iter().position(|e| e.footnote_id == footnote_id) {
                let mut entry = remaining.remove(pos);
                entry.number = number;
                aligned.push(entry);
            }
        }
        let mut next = order.len() as u32;
        for mut entry in remaining {
            next += 1;
            entry.number = next;
            aligned.push(entry);
        }

        self.entries = aligned;
        let after: Vec<(FootnoteId, u32)> =
            self.entries.iter().map(|e| (e.footnote_id, e.number)).collect();
        before != after
    }
}

impl Default for NotesArea {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for NotesArea {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::NotesArea
    }

    fn children(&self) -> &[NodeId] {
        &[]
    }

    fn parent(&self) -> Option<NodeId> {
        None
    }

    fn set_parent(&mut self, _parent: Option<NodeId>) {}

    fn can_have_children(&self) -> bool {
        false
    }
}

// =============================================================================
// Pairing
// =============================================================================

/// Whether a footnote has both of its halves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Paired { indicator: NodeId, entry_position: usize },
    MissingEntry { indicator: NodeId },
    MissingIndicator { entry_position: usize },
    Absent,
}

impl PairState {
    pub fn is_paired(&self) -> bool {
        matches!(self, PairState::Paired { .. })
    }
}

/// Outcome of [`DocumentTree::reconcile_footnotes`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Entries dropped because their indicator was gone
    pub removed_entries: Vec<FootnoteId>,
    /// Indicators dropped because their entry was gone
    pub removed_indicators: Vec<FootnoteId>,
    /// Identities that appeared on more than one indicator
    pub duplicated: Vec<FootnoteId>,
    /// Whether any number or entry position changed
    pub renumbered: bool,
}

impl ReconcileReport {
    /// Nothing needed repair
    pub fn is_clean(&self) -> bool {
        self.removed_entries.is_empty()
            && self.removed_indicators.is_empty()
            && self.duplicated.is_empty()
            && !self.renumbered
    }
}

impl DocumentTree {
    /// Whether the notes area exists
    pub fn has_notes_area(&self) -> bool {
        self.notes_area.is_some()
    }

    /// Create the notes area at the end of the body if missing
    pub fn ensure_notes_area(&mut self) -> NodeId {
        if let Some(area) = &self.notes_area {
            return area.id();
        }
        let area = NotesArea::new();
        let area_id = area.id();
        self.document.add_body_child(area_id);
        self.notes_area = Some(area);
        area_id
    }

    /// Indicator node ids in document order
    pub fn indicators_in_order(&self) -> Vec<NodeId> {
        self.paragraphs()
            .flat_map(|para| para.children().iter().copied())
            .filter(|id| self.nodes.indicators.contains_key(id))
            .collect()
    }

    /// Number of indicators in the text
    pub fn footnote_count(&self) -> usize {
        self.nodes.indicators.len()
    }

    /// Node id of the first indicator carrying a footnote id
    pub fn find_indicator(&self, footnote_id: FootnoteId) -> Option<NodeId> {
        self.indicators_in_order()
            .into_iter()
            .find(|id| self.nodes.indicators.get(id).map(|i| i.footnote_id) == Some(footnote_id))
    }

    /// The entry of a footnote, if present
    pub fn footnote_entry(&self, footnote_id: FootnoteId) -> Option<&FootnoteEntry> {
        self.notes_area.as_ref()?.entry(footnote_id)
    }

    /// Place a new indicator at a document index
    pub fn insert_footnote_indicator(
        &mut self,
        index: usize,
        footnote_id: FootnoteId,
        number: u32,
    ) -> Result<NodeId> {
        let (para_id, offset) = self.resolve_inline(index)?;
        let at = self.split_inline_at(para_id, offset)?;

        let mut indicator = FootnoteIndicator::new(footnote_id, number);
        indicator.set_parent(Some(para_id));
        let indicator_id = indicator.id();

        let para = self
            .get_paragraph_mut(para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;
        para.insert_child(at, indicator_id);
        self.nodes.indicators.insert(indicator_id, indicator);
        Ok(indicator_id)
    }

    /// Footnote of the nearest following indicator that has an entry
    pub fn successor_footnote(&self, footnote_id: FootnoteId) -> Option<FootnoteId> {
        let area = self.notes_area.as_ref()?;
        self.indicators_in_order()
            .into_iter()
            .filter_map(|id| self.nodes.indicators.get(&id).map(|i| i.footnote_id))
            .skip_while(|&fid| fid != footnote_id)
            .skip(1)
            .find(|&fid| area.position_of(fid).is_some())
    }

    /// Insert an entry before its successor's entry, or at the end.
    ///
    /// The indicator must already be in the text. Returns the entry position.
    pub fn insert_footnote_entry(&mut self, entry: FootnoteEntry) -> Result<usize> {
        let successor = self.successor_footnote(entry.footnote_id);
        self.ensure_notes_area();
        let area = self
            .notes_area
            .as_mut()
            .ok_or_else(|| DocModelError::InvalidOperation("notes area missing".into()))?;
        let position = match successor.and_then(|fid| area.position_of(fid)) {
            Some(pos) => area.insert_entry(pos, entry),
            None => area.push_entry(entry),
        };
        Ok(position)
    }

    /// Replace the text of a footnote's entry
    pub fn set_footnote_content(&mut self, footnote_id: FootnoteId, content: &str) -> Result<()> {
        let entry = self
            .notes_area
            .as_mut()
            .and_then(|area| area.entry_mut(footnote_id))
            .ok_or(DocModelError::NodeNotFound(footnote_id.as_uuid()))?;
        entry.content = content.to_string();
        Ok(())
    }

    /// Remove every indicator and the entry of a footnote
    pub fn remove_footnote(&mut self, footnote_id: FootnoteId) -> bool {
        let indicators: Vec<NodeId> = self
            .nodes
            .indicators
            .iter()
            .filter(|(_, i)| i.footnote_id == footnote_id)
            .map(|(&id, _)| id)
            .collect();
        let mut removed = !indicators.is_empty();
        for id in indicators {
            if let Some(para_id) = self.remove_inline(id) {
                self.normalize_runs(para_id);
            }
        }
        if let Some(area) = self.notes_area.as_mut() {
            removed |= area.remove_entry(footnote_id).is_some();
        }
        removed
    }

    /// Pairing state of one footnote
    pub fn pair_state(&self, footnote_id: FootnoteId) -> PairState {
        let indicator = self.find_indicator(footnote_id);
        let entry_position = self
            .notes_area
            .as_ref()
            .and_then(|area| area.position_of(footnote_id));
        match (indicator, entry_position) {
            (Some(indicator), Some(entry_position)) => PairState::Paired {
                indicator,
                entry_position,
            },
            (Some(indicator), None) => PairState::MissingEntry { indicator },
            (None, Some(entry_position)) => PairState::MissingIndicator { entry_position },
            (None, None) => PairState::Absent,
        }
    }

    /// Number indicators 1..N in document order and make the entries follow.
    ///
    /// Returns whether anything changed.
    pub fn renumber_footnotes(&mut self) -> bool {
        let indicators = self.indicators_in_order();
        let mut changed = false;
        let mut order: Vec<(FootnoteId, u32)> = Vec::with_capacity(indicators.len());

        for (i, id) in indicators.iter().enumerate() {
            let number = i as u32 + 1;
            if let Some(indicator) = self.nodes.indicators.get_mut(id) {
                if indicator.number != number {
                    indicator.number = number;
                    changed = true;
                }
                order.push((indicator.footnote_id, number));
            }
        }

        if let Some(area) = self.notes_area.as_mut() {
            changed |= area.align_to(&order);
        }
        changed
    }

    /// Repair footnote pairing after arbitrary edits.
    ///
    /// Repeated indicator identities get a fresh identity and a copy of the
    /// entry; entries without an indicator and indicators without an entry
    /// are removed; everything is then renumbered.
    pub fn reconcile_footnotes(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let mut seen = HashSet::new();
        for indicator_id in self.indicators_in_order() {
            let Some(footnote_id) = self.nodes.indicators.get(&indicator_id).map(|i| i.footnote_id)
            else {
                continue;
            };
            if seen.insert(footnote_id) {
                continue;
            }
            let fresh = FootnoteId::new();
            let content = self.footnote_entry(footnote_id).map(|e| e.content.clone());
            if let (Some(content), Some(area)) = (content, self.notes_area.as_mut()) {
                area.push_entry(FootnoteEntry::new(fresh, 0, content));
            }
            if let Some(indicator) = self.nodes.indicators.get_mut(&indicator_id) {
                indicator.footnote_id = fresh;
            }
            seen.insert(fresh);
            report.duplicated.push(footnote_id);
        }

        if let Some(area) = self.notes_area.as_mut() {
            report.removed_entries = area.retain_live(&seen);
        }

        let with_entry: HashSet<FootnoteId> = self
            .notes_area
            .as_ref()
            .map(|area| area.entries().iter().map(|e| e.footnote_id).collect())
            .unwrap_or_default();
        for indicator_id in self.indicators_in_order() {
            let Some(footnote_id) = self.nodes.indicators.get(&indicator_id).map(|i| i.footnote_id)
            else {
                continue;
            };
            if !with_entry.contains(&footnote_id) {
                if let Some(para_id) = self.remove_inline(indicator_id) {
                    self.normalize_runs(para_id);
                }
                report.removed_indicators.push(footnote_id);
            }
        }

        report.renumbered = self.renumber_footnotes();
        report
    }

    /// Every indicator paired one-to-one with an entry, numbered 1..N in order
    pub fn footnotes_consistent(&self) -> bool {
        let indicators = self.indicators_in_order();
        let Some(area) = self.notes_area.as_ref() else {
            return indicators.is_empty();
        };
        if area.len() != indicators.len() {
            return false;
        }
        let mut numbers: HashMap<FootnoteId, u32> = HashMap::new();
        for (i, id) in indicators.iter().enumerate() {
            let Some(indicator) = self.nodes.indicators.get(id) else {
                return false;
            };
            if indicator.number != i as u32 + 1
                || numbers.insert(indicator.footnote_id, indicator.number).is_some()
            {
                return false;
            }
        }
        area.entries()
            .iter()
            .enumerate()
            .all(|(i, e)| numbers.get(&e.footnote_id) == Some(&e.number) && e.number == i as u32 + 1)
    }
}
