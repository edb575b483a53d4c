//! Domain model for indented requirement documents.
//!
//! This module contains the core types: line kinds, numeric item ids, nodes,
//! the derived hierarchy and the editable [`Document`].

mod kind;
pub use kind::{InvalidKindError, Kind};

mod item_id;
pub use item_id::ItemId;

mod node;
pub use node::{Node, NodeView};

/// Parent/child derivation from indents.
pub mod hierarchy;
pub use hierarchy::Hierarchy;

/// The document and its editing operations.
pub mod document;
pub use document::{DEFAULT_TITLE, DeleteMode, Document, InvalidPlacementError, Placement};

mod error;
pub use error::EditError;
