use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::ThemeMode;
use crate::document::{self, Document};
use crate::export::{ExportArtifact, Exporter};
use crate::outline::Outline;
use crate::pipeline::{ContentPipeline, DisplayContent, ViewMode};
use crate::search::{self, SearchEngine};
use crate::ui::viewport::Viewport;
use crate::watcher::WatchSettings;

const TOAST_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// A directory entry shown in the file browser sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Display name (filename or "..")
    pub name: String,
    /// Full path to the entry
    pub path: PathBuf,
    /// Whether this entry is a directory
    pub is_dir: bool,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The loaded markdown document
    pub document: Document,
    /// Rendered or raw presentation
    pub mode: ViewMode,
    /// Search term, matches and cursor
    pub search: SearchEngine,
    /// Text in the search bar while it is open
    pub search_input: Option<String>,
    /// Header tree of the current document
    pub outline: Outline,
    pipeline: ContentPipeline,
    /// Output of the last pipeline pass
    pub display: DisplayContent,
    /// Viewport over `display`
    pub viewport: Viewport,
    /// Whether the sidebar is visible
    pub toc_visible: bool,
    /// Selected sidebar entry index
    pub toc_selected: Option<usize>,
    /// Scroll offset for the sidebar
    pub toc_scroll_offset: usize,
    /// Focus: true = sidebar, false = document
    pub toc_focused: bool,
    /// Whether the sidebar lists files instead of headers
    pub browse_mode: bool,
    /// Directory shown in the file browser
    pub browse_dir: PathBuf,
    /// Entries of `browse_dir`
    pub browse_entries: Vec<DirEntry>,
    /// Whether the loaded file is reloaded on change
    pub watch_enabled: bool,
    /// Poll interval and debounce for the watcher
    pub watch_settings: WatchSettings,
    /// Writes export artifacts
    pub exporter: Exporter,
    /// Files written by the most recent export
    pub last_export: Option<ExportArtifact>,
    /// Colour palette
    pub theme: ThemeMode,
    /// Whether help overlay is visible
    pub help_visible: bool,
    /// Global config path shown in help
    pub config_global_path: Option<PathBuf>,
    /// Local override path shown in help
    pub config_local_path: Option<PathBuf>,
    /// Whether the app should quit
    pub should_quit: bool,
    toast: Option<Toast>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("path", &self.document.path())
            .field("mode", &self.mode)
            .field("search", &self.search.term())
            .field("toc_visible", &self.toc_visible)
            .field("watch_enabled", &self.watch_enabled)
            .finish_non_exhaustive()
    }
}

impl Model {
    /// Create a model showing `document` in a terminal of `terminal_size`.
    pub fn new(document: Document, terminal_size: (u16, u16)) -> Self {
        let browse_dir = document
            .path()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let mut model = Self {
            outline: Outline::from_document(document.source()),
            document,
            viewport: Viewport::new(terminal_size.0, terminal_size.1.saturating_sub(1), 0),
            browse_dir,
            ..Self::default()
        };
        model.refresh_display();
        model
    }

    /// Start in `mode`.
    #[must_use]
    pub fn with_mode(mut self, mode: ViewMode) -> Self {
        self.mode = mode;
        self.refresh_display();
        self
    }

    /// Re-run the content pipeline for the current document, mode and search.
    pub(super) fn refresh_display(&mut self) {
        self.display = self
            .pipeline
            .process(self.document.source(), self.mode, &self.search);
        self.viewport.set_total_lines(self.display.line_count());
        self.toc_scroll_offset = self.toc_scroll_offset.min(self.max_toc_scroll_offset());
    }

    /// Diagram blocks found by the last pipeline pass.
    pub fn diagram_blocks(&self) -> &[crate::diagram::DiagramBlock] {
        self.pipeline.last_blocks()
    }

    /// Swap in new content, keeping the search term and scroll offset.
    pub(super) fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.outline = Outline::from_document(self.document.source());
        self.search.refresh(self.document.source());
        self.refresh_display();
        if self.toc_visible && !self.browse_mode {
            self.toc_selected = self.toc_selected.map(|sel| sel.min(self.outline.len().saturating_sub(1)));
        }
    }

    /// Load `path` into the document area.
    ///
    /// A failed load shows the error document. An open search is closed.
    pub fn load_file(&mut self, path: &Path) {
        self.search.clear();
        self.search_input = None;
        self.last_export = None;
        self.replace_document(Document::load(path));
        self.viewport.go_to_top();
    }

    /// Re-read the current file from disk.
    ///
    /// Returns `Ok(false)` when the content on disk is unchanged. The scroll
    /// offset is kept, clamped to the new length.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no backing file or it can no
    /// longer be read.
    pub(super) fn reload_from_disk(&mut self) -> Result<bool> {
        let path = self
            .document
            .path()
            .map(Path::to_path_buf)
            .context("Document has no backing file")?;
        let fresh = Document::try_load(&path)
            .with_context(|| format!("Failed to reload {}", path.display()))?;
        if fresh.source() == self.document.source() {
            return Ok(false);
        }
        let offset = self.viewport.offset();
        self.replace_document(fresh);
        self.viewport.go_to_line(offset);
        if self.toc_visible && !self.toc_focused && !self.browse_mode {
            self.sync_toc_to_viewport();
        }
        tracing::info!(path = %path.display(), "reloaded document");
        Ok(true)
    }

    /// Scroll so original line `line` sits `rows_above` rows below the top.
    pub(super) fn jump_to_original_line(&mut self, line: usize, rows_above: usize) {
        let display_line = self.display.display_line(line);
        self.viewport.show_line_at(display_line, rows_above);
    }

    /// Scroll to the header at outline index `idx`.
    pub(super) fn jump_to_header(&mut self, idx: usize) {
        if let Some(line) = self.outline.node(idx).map(|h| h.line_number) {
            let rows_above = usize::from(self.viewport.height()) / 3;
            self.jump_to_original_line(line, rows_above);
        }
    }

    /// Scroll to the match under the search cursor.
    pub(super) fn jump_to_current_match(&mut self) {
        if let Some(span) = self.search.current_result() {
            let line = search::line_number_for(self.document.source(), span.start);
            let rows_above = usize::from(self.viewport.height()) / 2;
            self.jump_to_original_line(line, rows_above);
        }
    }

    pub(super) const fn toc_visible_rows(&self) -> usize {
        // Sidebar uses full frame height with a 1-cell border at top/bottom.
        self.viewport.height().saturating_sub(1) as usize
    }

    /// Number of entries in the sidebar (browse entries or headers).
    pub fn toc_entry_count(&self) -> usize {
        if self.browse_mode {
            self.browse_entries.len()
        } else {
            self.outline.len()
        }
    }

    pub(super) fn max_toc_scroll_offset(&self) -> usize {
        self.toc_entry_count()
            .saturating_sub(self.toc_visible_rows())
    }

    /// Select the header closest to the top of the viewport.
    pub(super) fn sync_toc_to_viewport(&mut self) {
        let top = self.display.line_map.original_line(self.viewport.offset());
        let Some(selected) = self.outline.closest_to_line(top) else {
            self.toc_selected = None;
            self.toc_scroll_offset = 0;
            return;
        };
        self.toc_selected = Some(selected);
        self.toc_scroll_offset = selected.min(self.max_toc_scroll_offset());
    }

    /// Scan a directory and populate `browse_entries`.
    ///
    /// Only sub-directories and markdown files are listed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or an entry's
    /// file type cannot be determined.
    pub fn load_directory(&mut self, dir: &Path) -> Result<()> {
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let listing = std::fs::read_dir(&dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in listing {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            // Skip hidden files/dirs
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                dirs.push(DirEntry {
                    name,
                    path,
                    is_dir: true,
                });
            } else if document::is_markdown_file(&path) {
                files.push(DirEntry {
                    name,
                    path,
                    is_dir: false,
                });
            }
        }

        dirs.sort_by_key(|e| e.name.to_lowercase());
        files.sort_by_key(|e| e.name.to_lowercase());

        self.browse_entries.clear();
        self.browse_entries.push(DirEntry {
            name: "..".to_string(),
            path: dir.parent().unwrap_or(&dir).to_path_buf(),
            is_dir: true,
        });
        self.browse_entries.extend(dirs);
        self.browse_entries.extend(files);
        self.browse_dir = dir;
        self.toc_selected = Some(0);
        self.toc_scroll_offset = 0;
        Ok(())
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Whether the search bar is open.
    pub const fn search_bar_open(&self) -> bool {
        self.search_input.is_some()
    }
}

// Implement Default for Model to allow std::mem::take
impl Default for Model {
    fn default() -> Self {
        Self {
            document: Document::empty(),
            mode: ViewMode::default(),
            search: SearchEngine::new(),
            search_input: None,
            outline: Outline::default(),
            pipeline: ContentPipeline::new(),
            display: DisplayContent::default(),
            viewport: Viewport::new(80, 24, 0),
            toc_visible: false,
            toc_selected: None,
            toc_scroll_offset: 0,
            toc_focused: false,
            browse_mode: false,
            browse_dir: PathBuf::from("."),
            browse_entries: Vec::new(),
            watch_enabled: false,
            watch_settings: WatchSettings::default(),
            exporter: Exporter::default(),
            last_export: None,
            theme: ThemeMode::default(),
            help_visible: false,
            config_global_path: None,
            config_local_path: None,
            should_quit: false,
            toast: None,
        }
    }
}
