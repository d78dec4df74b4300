//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{DirEntry, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::config::ThemeMode;
use crate::export::DEFAULT_EXPORT_DIR;
use crate::pipeline::ViewMode;

/// Main application struct that owns the terminal and runs the event loop.
#[derive(Debug, Clone)]
pub struct App {
    file_path: Option<PathBuf>,
    mode: ViewMode,
    watch_enabled: bool,
    toc_visible: bool,
    browse_mode: bool,
    theme: ThemeMode,
    export_dir: PathBuf,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application for `file_path`, or the welcome page when `None`.
    ///
    /// A directory path opens the file browser in that directory.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            mode: ViewMode::Rendered,
            watch_enabled: true,
            toc_visible: false,
            browse_mode: false,
            theme: ThemeMode::default(),
            export_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Set the initial view mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable file watching.
    #[must_use]
    pub const fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Set initial TOC visibility.
    #[must_use]
    pub const fn with_toc_visible(mut self, visible: bool) -> Self {
        self.toc_visible = visible;
        self
    }

    /// Start with the file browser open.
    #[must_use]
    pub const fn with_browse_mode(mut self, enabled: bool) -> Self {
        self.browse_mode = enabled;
        self
    }

    #[must_use]
    pub const fn with_theme(mut self, theme: ThemeMode) -> Self {
        self.theme = theme;
        self
    }

    /// Directory export artifacts are written to.
    #[must_use]
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}
