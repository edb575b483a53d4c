// Node - one classified line of a requirement document, and a borrowed view
// of it with its derived position and relationships.

use crate::domain::{ItemId, Kind};

/// The stored content of one document line.
///
/// Position, parent and children are not part of a node: they are derived
/// from the node's place in the [`Document`](crate::Document) sequence and
/// the indents around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// What the line represents.
    pub kind: Kind,
    /// Hierarchy depth. Always `0` for [`Kind::Title`].
    pub indent: usize,
    /// Numeric id, present exactly when [`Kind::has_id`] holds.
    pub id: Option<ItemId>,
    /// The description, stripped of markdown decoration.
    pub text: String,
}

impl Node {
    /// Creates a node.
    #[must_use]
    pub fn new(kind: Kind, indent: usize, id: Option<ItemId>, text: impl Into<String>) -> Self {
        Self {
            kind,
            indent,
            id,
            text: text.into(),
        }
    }

    /// A title node at indent 0.
    #[must_use]
    pub fn title(text: impl Into<String>) -> Self {
        Self::new(Kind::Title, 0, None, text)
    }
}

/// A borrowed view of a node at its current position.
///
/// Positions are 1-based and only valid until the next mutation of the
/// document they were read from.
#[derive(Debug, Clone)]
pub struct NodeView<'a> {
    /// The 1-based position of the node.
    pub position: usize,
    /// The node content.
    pub node: &'a Node,
    /// Position of the parent node, if any.
    pub parent: Option<usize>,
    /// Positions of the direct children, in document order.
    pub children: &'a [usize],
}

impl NodeView<'_> {
    /// The node kind.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.node.kind
    }

    /// The node indent.
    #[must_use]
    pub const fn indent(&self) -> usize {
        self.node.indent
    }

    /// The node id.
    #[must_use]
    pub const fn id(&self) -> Option<ItemId> {
        self.node.id
    }

    /// The node text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.node.text
    }

    /// Whether the node is a root (has no parent).
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
