//! Footnote plugin

use super::{ContentPrompt, PromptRequest};
use crate::{EditFootnote, EditingEngine, EnsureNotesArea, InsertFootnote, Result};
use doc_model::{DocumentTree, FootnoteId, NodeId, PairState};

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTarget {
    /// An indicator node in the text
    Indicator(NodeId),
    /// An entry in the notes area
    Entry(FootnoteId),
}

/// Highlight to show for a hover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Both halves exist; highlight the indicator and the entry
    Paired {
        footnote_id: FootnoteId,
        indicator: NodeId,
        entry_position: usize,
    },
    /// One half is missing
    MissingPair { footnote_id: FootnoteId },
}

/// Inserts, edits and highlights footnotes
pub struct FootnotePlugin<P: ContentPrompt> {
    prompt: P,
}

impl<P: ContentPrompt> FootnotePlugin<P> {
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Prompt for a note and insert it at the selection.
    ///
    /// The notes area is created before prompting and stays even if the
    /// prompt is cancelled. Returns the new footnote's id.
    pub async fn insert_footnote(&self, engine: &mut EditingEngine) -> Result<Option<FootnoteId>> {
        let requested = engine.selection().map(|s| s.index());
        let Some(index) = InsertFootnote::resolve_index(engine.tree(), requested) else {
            tracing::debug!("no text to attach a footnote to");
            return Ok(None);
        };
        engine.execute_quietly(Box::new(EnsureNotesArea))?;

        let number = engine.tree().footnote_count() + 1;
        let Some(content) = self.prompt.prompt(PromptRequest::new_footnote(number)).await else {
            tracing::debug!("footnote prompt cancelled");
            return Ok(None);
        };

        let command = InsertFootnote::new(Some(index), content);
        let footnote_id = command.footnote_id;
        if engine.execute_quietly(Box::new(command))? {
            Ok(Some(footnote_id))
        } else {
            Ok(None)
        }
    }

    /// Prompt with the entry's text and apply the answer.
    ///
    /// Cancel leaves the footnote alone; a blank answer deletes it.
    /// Returns whether the document changed.
    pub async fn edit_footnote(
        &self,
        engine: &mut EditingEngine,
        footnote_id: FootnoteId,
    ) -> Result<bool> {
        let Some(entry) = engine.tree().footnote_entry(footnote_id).cloned() else {
            tracing::debug!(%footnote_id, "no entry to edit");
            return Ok(false);
        };

        let request = PromptRequest::edit_footnote(entry.number, entry.content);
        let Some(content) = self.prompt.prompt(request).await else {
            return Ok(false);
        };
        engine.execute_quietly(Box::new(EditFootnote::new(footnote_id, content)))
    }

    /// Highlight for a hovered indicator or entry
    pub fn hover(&self, tree: &DocumentTree, target: HoverTarget) -> Option<Highlight> {
        let footnote_id = match target {
            HoverTarget::Indicator(node_id) => tree.get_indicator(node_id)?.footnote_id,
            HoverTarget::Entry(footnote_id) => footnote_id,
        };
        match tree.pair_state(footnote_id) {
            PairState::Paired {
                indicator,
                entry_position,
            } => Some(Highlight::Paired {
                footnote_id,
                indicator,
                entry_position,
            }),
            PairState::Absent => None,
            PairState::MissingEntry { .. } | PairState::MissingIndicator { .. } => {
                Some(Highlight::MissingPair { footnote_id })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::ScriptedPrompt;
    use doc_model::Selection;

    fn engine(text: &str) -> EditingEngine {
        EditingEngine::with_tree(DocumentTree::from_text(text))
    }

    #[tokio::test]
    async fn test_insert_footnote_at_selection() {
        let plugin = FootnotePlugin::new(ScriptedPrompt::answering([Some("ibid.")]));
        let mut engine = engine("lorem ipsum");
        engine.set_selection(Some(Selection::collapsed(5)));

        let fid = plugin.insert_footnote(&mut engine).await.unwrap().unwrap();
        let tree = engine.tree();
        assert_eq!(tree.paragraph_text(tree.blocks()[0]), "lorem•1 ipsum");
        assert_eq!(tree.footnote_entry(fid).unwrap().display_text(), "1. ibid.");
        assert_eq!(engine.selection(), Some(Selection::collapsed(6)));

        let requests = plugin.prompt().requests.lock().unwrap();
        assert_eq!(requests[0], PromptRequest::new_footnote(1));
    }

    #[tokio::test]
    async fn test_insert_without_selection_goes_to_end_of_text() {
        let plugin = FootnotePlugin::new(ScriptedPrompt::answering([Some("a"), Some("b")]));
        let mut engine = engine("text");
        plugin.insert_footnote(&mut engine).await.unwrap();
        engine.set_selection(None);
        plugin.insert_footnote(&mut engine).await.unwrap();

        let tree = engine.tree();
        assert_eq!(tree.paragraph_text(tree.blocks()[0]), "text•1•2");
        assert!(tree.footnotes_consistent());
    }

    #[tokio::test]
    async fn test_caret_on_notes_area_inserts_at_end_of_text() {
        let plugin = FootnotePlugin::new(ScriptedPrompt::answering([Some("a"), Some("b")]));
        let mut engine = engine("text");
        engine.set_selection(Some(Selection::collapsed(2)));
        plugin.insert_footnote(&mut engine).await.unwrap();

        let notes_index = engine.tree().length() - 1;
        engine.set_selection(Some(Selection::collapsed(notes_index)));
        let fid = plugin.insert_footnote(&mut engine).await.unwrap();

        assert!(fid.is_some());
        let tree = engine.tree();
        assert_eq!(tree.paragraph_text(tree.blocks()[0]), "te•1xt•2");
        assert_eq!(tree.footnote_entry(fid.unwrap()).unwrap().content, "b");
        assert!(tree.footnotes_consistent());
    }

    #[tokio::test]
    async fn test_cancelled_prompt_keeps_notes_area() {
        let plugin = FootnotePlugin::new(ScriptedPrompt::answering([None]));
        let mut engine = engine("text");

        assert_eq!(plugin.insert_footnote(&mut engine).await.unwrap(), None);
        assert!(engine.tree().has_notes_area());
        assert_eq!(engine.tree().footnote_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_answer_inserts_nothing() {
        let plugin = FootnotePlugin::new(ScriptedPrompt::answering([Some("")]));
        let mut engine = engine("text");
        assert_eq!(plugin.insert_footnote(&mut engine).await.unwrap(), None);
        assert_eq!(engine.tree().footnote_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_prefills_and_cancel_keeps() {
        let plugin = FootnotePlugin::new(ScriptedPrompt::answering([Some("first"), None]));
        let mut engine = engine("text");
        let fid = plugin.insert_footnote(&mut engine).await.unwrap().unwrap();

        assert!(!plugin.edit_footnote(&mut engine, fid).await.unwrap());
        assert_eq!(engine.tree().footnote_entry(fid).unwrap().content, "first");
        let requests = plugin.prompt().requests.lock().unwrap();
        assert_eq!(requests[1].initial, "first");
    }

    #[tokio::test]
    async fn test_edit_to_blank_removes_pair() {
        let plugin = FootnotePlugin::new(ScriptedPrompt::answering([Some("x"), Some("  ")]));
        let mut engine = engine("text");
        let fid = plugin.insert_footnote(&mut engine).await.unwrap().unwrap();

        assert!(plugin.edit_footnote(&mut engine, fid).await.unwrap());
        assert_eq!(engine.tree().footnote_count(), 0);
        assert!(engine.tree().notes_area.as_ref().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hover_paired_and_missing() {
        let plugin = FootnotePlugin::new(ScriptedPrompt::answering([Some("x")]));
        let mut engine = engine("text");
        let fid = plugin.insert_footnote(&mut engine).await.unwrap().unwrap();
        let indicator = engine.tree().find_indicator(fid).unwrap();

        let highlight = plugin.hover(engine.tree(), HoverTarget::Indicator(indicator));
        assert_eq!(
            highlight,
            Some(Highlight::Paired {
                footnote_id: fid,
                indicator,
                entry_position: 0
            })
        );

        engine.tree_mut().notes_area.as_mut().unwrap().remove_entry(fid);
        let highlight = plugin.hover(engine.tree(), HoverTarget::Indicator(indicator));
        assert_eq!(highlight, Some(Highlight::MissingPair { footnote_id: fid }));
    }
}
