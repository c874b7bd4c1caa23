//! Invariant repair pass
//!
//! Run after any edit that may have removed or duplicated an indicator or
//! entry, or left a table ragged.

use doc_model::{DocumentTree, ReconcileReport};

/// What the invariant pass had to fix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvariantReport {
    pub footnotes: ReconcileReport,
    pub cells_added: usize,
}

impl InvariantReport {
    pub fn is_clean(&self) -> bool {
        self.footnotes.is_clean() && self.cells_added == 0
    }
}

/// Reconcile footnote pairs and balance every table
pub fn restore_invariants(tree: &mut DocumentTree) -> InvariantReport {
    let footnotes = tree.reconcile_footnotes();
    if !footnotes.removed_entries.is_empty()
        || !footnotes.removed_indicators.is_empty()
        || !footnotes.duplicated.is_empty()
    {
        tracing::warn!(
            orphan_entries = footnotes.removed_entries.len(),
            orphan_indicators = footnotes.removed_indicators.len(),
            duplicated = footnotes.duplicated.len(),
            "repaired footnote pairing"
        );
    }

    let cells_added = tree.balance_all_tables();
    if cells_added > 0 {
        tracing::warn!(cells_added, "padded ragged table rows");
    }

    InvariantReport {
        footnotes,
        cells_added,
    }
}
