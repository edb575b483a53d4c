//! Editing indented requirement documents.
//!
//! Requirement documents are plain markdown files in a small dialect: a `#`
//! title followed by subtitles, numbered requirements, comments and data
//! attributes, nested by runs of `&nbsp;` entities. This crate parses such
//! files into a [`Document`], edits them structurally by line position, writes
//! them back, and exports them to interactive HTML.

pub mod domain;
pub use domain::{DeleteMode, Document, EditError, ItemId, Kind, Node, NodeView, Placement};

/// Markdown and project file persistence.
pub mod storage;
pub use storage::{DisplayMode, LoadError, ProjectConfig, ProjectError};

pub mod render;
pub use render::HtmlPage;
