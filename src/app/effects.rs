use std::path::Path;

use anyhow::{Context, Result};

use crate::app::{App, Message, Model, ToastLevel};
use crate::export;

use super::event_loop::WatchSlot;

impl App {
    pub(super) fn handle_message_side_effects(
        model: &mut Model,
        watch: &mut WatchSlot,
        msg: &Message,
    ) {
        match msg {
            Message::ToggleWatch => {
                if model.watch_enabled {
                    model.show_toast(ToastLevel::Info, "Watching file changes");
                } else {
                    model.show_toast(ToastLevel::Info, "Watch disabled");
                }
            }
            Message::FileChanged => match model.reload_from_disk() {
                Ok(true) => model.show_toast(ToastLevel::Info, "File reloaded (auto)"),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(err = format!("{err:#}"), "reload failed");
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err:#}"));
                }
            },
            Message::Export => Self::export_document(model),
            Message::OpenInBrowser => Self::open_in_browser(model),
            Message::TocSelect if model.browse_mode => {
                Self::browse_activate_selected(model);
            }
            Message::ToggleFileBrowser if model.browse_mode => {
                Self::enter_browse_mode(model);
            }
            _ => {}
        }
        watch.sync(model);
    }

    fn export_document(model: &mut Model) {
        let stem = model.document.export_stem();
        let result = model.exporter.export(
            model.document.source(),
            &stem,
            model.mode,
            model.diagram_blocks(),
        );
        match result {
            Ok(artifact) => {
                let summary = artifact.summary(model.exporter.dir());
                model.last_export = Some(artifact);
                model.show_toast(ToastLevel::Info, summary);
            }
            Err(err) => {
                tracing::warn!(err = format!("{err:#}"), "export failed");
                model.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"));
            }
        }
    }

    fn open_in_browser(model: &mut Model) {
        let target = match &model.last_export {
            Some(artifact) => Ok(artifact.html_path.clone()),
            None => export::write_preview(
                model.document.source(),
                &model.document.export_stem(),
                model.mode,
                model.diagram_blocks(),
            ),
        };
        match target.and_then(|path| open_path(&path).map(|()| path)) {
            Ok(path) => {
                let name = path
                    .file_name()
                    .map_or_else(String::new, |n| n.to_string_lossy().to_string());
                model.show_toast(ToastLevel::Info, format!("Opened {name} in browser"));
            }
            Err(err) => {
                tracing::warn!(err = format!("{err:#}"), "open in browser failed");
                model.show_toast(ToastLevel::Error, format!("Open failed: {err:#}"));
            }
        }
    }

    fn enter_browse_mode(model: &mut Model) {
        let dir = model.browse_dir.clone();
        if let Err(err) = model.load_directory(&dir) {
            model.show_toast(ToastLevel::Error, format!("Browse failed: {err:#}"));
            return;
        }
        // Highlight the current file in the listing (compare by name
        // since load_directory canonicalizes paths)
        if let Some(name) = model.document.file_name()
            && let Some(idx) = model.browse_entries.iter().position(|e| e.name == name)
        {
            model.toc_selected = Some(idx);
        }
    }

    fn browse_activate_selected(model: &mut Model) {
        let Some(entry) = model
            .toc_selected
            .and_then(|sel| model.browse_entries.get(sel).cloned())
        else {
            return;
        };
        if entry.is_dir {
            if let Err(err) = model.load_directory(&entry.path) {
                model.show_toast(ToastLevel::Error, format!("Browse failed: {err:#}"));
            }
        } else {
            model.load_file(&entry.path);
            if model.document.origin().is_none() {
                model.show_toast(ToastLevel::Error, format!("Could not open {}", entry.name));
            }
        }
    }
}

/// Hand `path` to the platform's default opener.
fn open_path(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(())
    }
    #[cfg(target_os = "windows")]
    {
        use std::process::Stdio;
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(())
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        use std::process::Stdio;
        std::process::Command::new("xdg-open")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(())
    }
}
