use crate::domain::{ItemId, Kind, Placement};

/// Errors returned by the [`Document`](crate::Document) editing API.
///
/// Every failing operation leaves the document exactly as it was.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    /// The position does not address a node.
    #[error("line {position} not found (document has {len} lines)")]
    NotFound {
        /// The requested position.
        position: usize,
        /// Number of nodes in the document.
        len: usize,
    },

    /// The node's text is system-managed and cannot be edited directly.
    #[error("line {position} is a {kind} entry and is read-only")]
    ReadOnly {
        /// Position of the protected node.
        position: usize,
        /// Its kind.
        kind: Kind,
    },

    /// The move target lies inside the block being moved.
    #[error("cannot move line {source_position} {placement} line {target}: the target is part of the moved block")]
    InvalidTarget {
        /// Root of the block being moved.
        source_position: usize,
        /// The requested target.
        target: usize,
        /// The requested placement.
        placement: Placement,
    },

    /// An explicit id is already carried by another node.
    #[error("id {id} is already used at line {position}")]
    InvalidId {
        /// The requested id.
        id: ItemId,
        /// Where it is already in use.
        position: usize,
    },

    /// An id was supplied for a kind that does not carry one.
    #[error("{kind} entries do not carry an id")]
    IdNotAllowed {
        /// The kind that was requested.
        kind: Kind,
    },

    /// The operation would put a title below indent 0.
    #[error("a TITLE must stay at indent 0 (line {position} would be at indent {indent})")]
    TitleNotRoot {
        /// Position the title would end up at (or currently has).
        position: usize,
        /// The indent it would get.
        indent: usize,
    },

    /// The kind change is not permitted.
    #[error("cannot change line {position} from {from} to {to}: data attributes are system-managed")]
    KindChange {
        /// Position of the node.
        position: usize,
        /// Its current kind.
        from: Kind,
        /// The requested kind.
        to: Kind,
    },

    /// The text contains a line break, which the markdown dialect cannot hold.
    #[error("text for line {position} must be a single line")]
    MultilineText {
        /// Position the text was destined for.
        position: usize,
    },
}
