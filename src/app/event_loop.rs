use std::io::stdout;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::document::Document;
use crate::export::Exporter;
use crate::watcher::{FileWatcher, WatchPoll};

pub(super) struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<(u16, u16, u64)>,
}

impl ResizeDebouncer {
    pub(super) const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub(super) const fn queue(&mut self, width: u16, height: u16, now_ms: u64) {
        self.pending = Some((width, height, now_ms));
    }

    pub(super) fn take_ready(&mut self, now_ms: u64) -> Option<(u16, u16)> {
        let (width, height, queued_at) = self.pending?;
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            Some((width, height))
        } else {
            None
        }
    }

    pub(super) const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Owns the file watcher and keeps it pointed at the loaded document.
#[derive(Debug, Default)]
pub(super) struct WatchSlot {
    watcher: Option<FileWatcher>,
    path: Option<PathBuf>,
}

impl WatchSlot {
    /// Start, restart or stop watching so it matches `model`.
    ///
    /// Documents without a backing file (welcome text, load errors) are
    /// never watched.
    pub(super) fn sync(&mut self, model: &mut Model) {
        let wanted = model
            .document
            .path()
            .filter(|_| model.watch_enabled)
            .map(Path::to_path_buf);
        let Some(path) = wanted else {
            self.stop();
            return;
        };
        if self.watcher.is_some() && self.path.as_deref() == Some(path.as_path()) {
            return;
        }

        self.stop();
        match FileWatcher::new(&path, model.watch_settings) {
            Ok(watcher) => {
                self.watcher = Some(watcher);
                self.path = Some(path);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "watch unavailable");
                model.watch_enabled = false;
                model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
            }
        }
    }

    pub(super) fn poll(&mut self) -> WatchPoll {
        self.watcher
            .as_mut()
            .map_or(WatchPoll::Idle, FileWatcher::poll)
    }

    pub(super) fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
        self.path = None;
    }

    #[cfg(test)]
    pub(super) fn watched_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization or the event loop
    /// encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - mdlens requires an interactive terminal")?;
        let size = terminal.size()?;

        let mut model = self.initial_model((size.width, size.height));
        execute!(stdout(), EnableMouseCapture)?;

        // Main loop
        let result = Self::event_loop(&mut terminal, &mut model);

        // Restore terminal
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();

        result
    }

    /// Build the starting model from the command line settings.
    pub(super) fn initial_model(&self, terminal_size: (u16, u16)) -> Model {
        let browse_root = self.file_path.as_deref().filter(|p| p.is_dir());
        let document = match (&self.file_path, browse_root) {
            (Some(path), None) => Document::load(path),
            _ => Document::welcome(),
        };

        let mut model = Model::new(document, terminal_size).with_mode(self.mode);
        model.watch_enabled = self.watch_enabled;
        model.theme = self.theme;
        model.exporter = Exporter::new(self.export_dir.clone());
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);

        if self.toc_visible {
            model = update(model, Message::ToggleToc);
        }

        if self.browse_mode || browse_root.is_some() {
            if let Some(dir) = browse_root {
                model.browse_dir = dir.to_path_buf();
            }
            model = update(model, Message::ToggleFileBrowser);
            let dir = model.browse_dir.clone();
            if let Err(err) = model.load_directory(&dir) {
                model.show_toast(ToastLevel::Warning, format!("Browse failed: {err:#}"));
            } else if let Some(name) = model.document.file_name()
                && let Some(idx) = model.browse_entries.iter().position(|e| e.name == name)
            {
                model.toc_selected = Some(idx);
            }
        }
        model
    }

    fn dispatch(model: &mut Model, watch: &mut WatchSlot, msg: Message) {
        tracing::trace!(?msg, "message");
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        Self::handle_message_side_effects(model, watch, &side_msg);
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let start = Instant::now();
        let mut resize_debouncer = ResizeDebouncer::new(100);
        let mut watch = WatchSlot::default();
        watch.sync(model);
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some((width, height)) = resize_debouncer.take_ready(now_ms) {
                tracing::debug!(width, height, "resize");
                Self::dispatch(model, &mut watch, Message::Resize(width, height));
                needs_render = true;
            }

            match watch.poll() {
                WatchPoll::Idle => {}
                WatchPoll::Changed => {
                    Self::dispatch(model, &mut watch, Message::FileChanged);
                    needs_render = true;
                }
                WatchPoll::Failed(err) => {
                    Self::dispatch(model, &mut watch, Message::WatchFailed(err));
                    needs_render = true;
                }
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else if resize_debouncer.is_pending() {
                10
            } else {
                250
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Coalesce key repeat bursts into a single render.
                loop {
                    let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) =
                        Self::handle_event(&event::read()?, model, event_ms, &mut resize_debouncer)
                    {
                        Self::dispatch(model, &mut watch, msg);
                        needs_render = true;
                    }
                    if !event::poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }

            if needs_render {
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        watch.stop();
        Ok(())
    }
}
