//! HTML writer
//!
//! Produces the markup the editor stores: `<p>` paragraphs, superscript
//! footnote indicators, `ql-table` tables and a trailing `footnote-area`.

use crate::{DocumentTree, FootnoteIndicator, Node, NodeId, NodeType, NotesArea, Table};

/// Render the whole document as an HTML fragment
pub fn render_html(tree: &DocumentTree) -> String {
    let mut html = String::new();
    HtmlWriter::new().write_document(&mut html, tree);
    html
}

/// Writer for document markup
pub struct HtmlWriter;

impl HtmlWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write every body block in order
    pub fn write_document(&self, html: &mut String, tree: &DocumentTree) {
        for &block_id in tree.blocks() {
            match tree.node_type(block_id) {
                Some(NodeType::Paragraph) => self.write_paragraph(html, tree, block_id),
                Some(NodeType::Table) => {
                    if let Some(table) = tree.get_table(block_id) {
                        self.write_table(html, tree, table);
                    }
                }
                Some(NodeType::NotesArea) => {
                    if let Some(area) = tree.notes_area.as_ref() {
                        self.write_notes_area(html, area);
                    }
                }
                _ => {}
            }
        }
    }

    fn write_paragraph(&self, html: &mut String, tree: &DocumentTree, para_id: NodeId) {
        let Some(para) = tree.get_paragraph(para_id) else {
            return;
        };
        html.push_str("<p>");
        if para.children().is_empty() {
            html.push_str("<br>");
        }
        for child in para.children() {
            if let Some(run) = tree.get_run(*child) {
                html.push_str(&escape_html(&run.text));
            } else if let Some(indicator) = tree.get_indicator(*child) {
                self.write_indicator(html, indicator);
            }
        }
        html.push_str("</p>");
    }

    fn write_indicator(&self, html: &mut String, indicator: &FootnoteIndicator) {
        html.push_str(&format!(
            r#"<sup class="footnote-indicator" id="{}">{}</sup>"#,
            indicator.footnote_id.indicator_element_id(),
            indicator.label()
        ));
    }

    fn write_table(&self, html: &mut String, tree: &DocumentTree, table: &Table) {
        html.push_str(&format!(
            r#"<table class="ql-table" id="{}"><tbody>"#,
            table.element_id()
        ));
        for row_id in table.children() {
            let Some(row) = tree.get_table_row(*row_id) else {
                continue;
            };
            html.push_str(r#"<tr class="ql-table">"#);
            for cell_id in row.children() {
                if let Some(cell) = tree.get_table_cell(*cell_id) {
                    html.push_str(&format!(
                        r#"<td class="ql-table" data-row="{}">{}</td>"#,
                        escape_html(cell.row_format.as_str()),
                        escape_html(&cell.content)
                    ));
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
    }

    fn write_notes_area(&self, html: &mut String, area: &NotesArea) {
        html.push_str(r#"<div id="footnote-area"><hr>"#);
        for entry in area.entries() {
            // Entry content is a stored markup fragment
            html.push_str(&format!(
                r#"<p class="footnote" id="{}">{}. {}</p>"#,
                entry.footnote_id.entry_element_id(),
                entry.number,
                entry.content
            ));
        }
        html.push_str("</div>");
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape special HTML characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
