//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - [`style`]: Theming, colors and line classification
//! - [`render`]: Sidebar, document area and footer bars

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use overlays::centered_popup_rect;
pub use render::{document_content_width, render, split_main_columns};
pub use status::{search_bar_text, status_bar_text};

pub const DOCUMENT_LEFT_PADDING: u16 = 2;
pub const TOC_WIDTH_PERCENT: u16 = 30;
pub const DOC_WIDTH_PERCENT: u16 = 70;

#[cfg(test)]
mod tests;
