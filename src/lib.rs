// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. search::SearchEngine)
    clippy::module_name_repetitions
)]

//! # mdlens
//!
//! A terminal markdown viewer built around a small content pipeline.
//!
//! mdlens shows markdown files in the terminal with:
//! - Rendered and raw views, with mermaid blocks shown as text placeholders
//! - Case-insensitive literal search with match highlighting
//! - A header outline sidebar and a file browser
//! - HTML and plain text export, and an open-in-browser preview
//! - File watching for live reload
//!
//! ## Architecture
//!
//! mdlens uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`document`]: Loading markdown files
//! - [`diagram`]: Mermaid block detection and placeholders
//! - [`search`]: Literal search over the source
//! - [`outline`]: Header tree
//! - [`pipeline`]: What the document area shows
//! - [`export`]: HTML and text export
//! - [`ui`]: Terminal UI components
//! - [`watcher`]: File watching
//! - [`config`]: Saved default flags

pub mod app;
pub mod config;
pub mod diagram;
pub mod document;
pub mod export;
pub mod outline;
pub mod pipeline;
pub mod search;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::Document;
    pub use crate::pipeline::{ContentPipeline, DisplayContent, ViewMode};
    pub use crate::search::SearchEngine;
    pub use crate::ui::viewport::Viewport;
}
