//! Property tests for footnote numbering and table shape at the tree level

use doc_model::{DocumentTree, FootnoteEntry, FootnoteId, Node};
use proptest::prelude::*;

/// Insert a paired footnote the way the insert command does
fn add_footnote(tree: &mut DocumentTree, index: usize, content: &str) -> Option<FootnoteId> {
    let fid = FootnoteId::new();
    tree.ensure_notes_area();
    tree.insert_footnote_indicator(index, fid, 0).ok()?;
    tree.insert_footnote_entry(FootnoteEntry::new(fid, 0, content)).ok()?;
    tree.renumber_footnotes();
    Some(fid)
}

fn text_positions(tree: &DocumentTree) -> usize {
    tree.text_end_index().map(|end| end + 1).unwrap_or(1)
}

proptest! {
    #[test]
    fn numbering_follows_document_order(positions in prop::collection::vec(any::<u16>(), 1..12)) {
        let mut tree = DocumentTree::from_text("arma virumque cano troiae qui primus ab oris");
        let mut inserted = Vec::new();
        for (i, pos) in positions.iter().enumerate() {
            let index = *pos as usize % text_positions(&tree);
            if let Some(fid) = add_footnote(&mut tree, index, &format!("note {}", i)) {
                inserted.push(fid);
            }
        }

        prop_assert!(tree.footnotes_consistent());
        let order: Vec<FootnoteId> = tree
            .indicators_in_order()
            .iter()
            .map(|id| tree.get_indicator(*id).unwrap().footnote_id)
            .collect();
        let entries: Vec<FootnoteId> = tree
            .notes_area
            .as_ref()
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.footnote_id)
            .collect();
        prop_assert_eq!(order, entries);
        prop_assert_eq!(tree.footnote_count(), inserted.len());
    }

    #[test]
    fn reconcile_after_deletions_leaves_no_gaps(
        positions in prop::collection::vec(any::<u16>(), 1..10),
        deletions in prop::collection::vec((any::<u16>(), 1usize..6), 0..6),
    ) {
        let mut tree = DocumentTree::from_text("lorem ipsum dolor\nsit amet consectetur");
        for pos in positions {
            let index = pos as usize % text_positions(&tree);
            add_footnote(&mut tree, index, "n");
        }
        for (pos, len) in deletions {
            let index = pos as usize % tree.length();
            let _ = tree.delete_range(index, len);
        }

        tree.reconcile_footnotes();
        prop_assert!(tree.footnotes_consistent());
        prop_assert!(tree.reconcile_footnotes().is_clean());
    }

    #[test]
    fn balance_makes_tables_rectangular(extra in prop::collection::vec((0usize..4, 0usize..3), 0..10)) {
        let mut tree = DocumentTree::from_text("x");
        let table_id = tree.insert_table_at(1, 4, 3).unwrap();
        let rows = tree.get_table(table_id).unwrap().children().to_vec();
        for (row, count) in extra {
            for _ in 0..count {
                tree.append_cell_to_row(rows[row]).unwrap();
            }
        }

        let widest = tree.row_cell_counts(table_id).into_iter().max().unwrap();
        tree.balance_table(table_id).unwrap();
        prop_assert!(tree.is_rectangular(table_id));
        prop_assert_eq!(tree.row_cell_counts(table_id)[0], widest);
        prop_assert_eq!(tree.balance_table(table_id).unwrap(), 0);
    }
}
