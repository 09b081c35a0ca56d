//! The edited document and the commands that format it.
//!
//! This module handles:
//! - Holding a document in both markdown and formatted-view form
//! - Tracking which of the two is being edited
//! - Describing toolbar formatting commands for either mode

mod command;
mod types;

pub use command::{BlockStyle, FormattingCommand, InlineStyle};
pub use types::{Document, EditorMode};
