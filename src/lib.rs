// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. post::PostStore)
    clippy::module_name_repetitions
)]

//! # Twinmark
//!
//! The core of a dual-mode markdown editor: the same document is edited
//! either as markdown source or as a formatted view, and the two are kept
//! in step.
//!
//! Twinmark provides:
//! - A restricted markdown renderer whose output is always escaped
//! - A view → markdown serializer that round-trips the renderer's output
//! - Selection mapping that survives re-rendering the view
//! - A frontmatter codec that updates only the keys it is given
//!
//! ## Modules
//!
//! - [`markdown`]: Rendering and serializing markdown
//! - [`view`]: In-memory formatted view and its native commands
//! - [`selection`]: View ranges ↔ plain-text offsets
//! - [`frontmatter`]: Metadata block parsing and selective updates
//! - [`document`]: The document held in both forms, formatting commands
//! - [`editor`]: Markdown source buffer
//! - [`session`]: Mode switching and command application
//! - [`post`]: Saving and creating blog posts
//! - [`config`]: rc-file defaults for the command-line tool

pub mod config;
pub mod document;
pub mod editor;
pub mod frontmatter;
pub mod markdown;
pub mod post;
pub mod selection;
pub mod session;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{Document, EditorMode, FormattingCommand};
    pub use crate::post::{PostStore, SaveRequest, SaveResponse};
    pub use crate::session::{CommandOutcome, EditorSession};
    pub use crate::view::{ViewSurface, ViewTree};
}
