//! Core node trait and types

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Enumeration of all node types in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Document,
    Paragraph,
    Run,
    FootnoteIndicator,
    NotesArea,
    Table,
    TableRow,
    TableCell,
}

impl NodeType {
    /// Whether nodes of this type sit directly in the document body
    pub fn is_block(&self) -> bool {
        matches!(self, NodeType::Paragraph | NodeType::Table | NodeType::NotesArea)
    }

    /// Whether nodes of this type live inside a paragraph
    pub fn is_inline(&self) -> bool {
        matches!(self, NodeType::Run | NodeType::FootnoteIndicator)
    }
}

/// Common interface for all document nodes
pub trait Node: std::fmt::Debug {
    /// Get the unique ID of this node
    fn id(&self) -> NodeId;

    /// Get the type of this node
    fn node_type(&self) -> NodeType;

    /// Get the IDs of child nodes
    fn children(&self) -> &[NodeId];

    /// Get the ID of the parent node (None for root)
    fn parent(&self) -> Option<NodeId>;

    /// Set the parent node ID
    fn set_parent(&mut self, parent: Option<NodeId>);

    /// Check if this node can have children
    fn can_have_children(&self) -> bool;

    /// Get the text content of this node (if any)
    fn text_content(&self) -> Option<&str> {
        None
    }
}
