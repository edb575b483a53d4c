/// Markdown dialect parsing and serialization.
pub mod markdown;
pub use markdown::LoadError;

/// Project configuration persistence.
pub mod project;
pub use project::{DisplayMode, ProjectConfig, ProjectError};
