use crate::app::{Model, ToastLevel};

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Navigation
    /// Scroll up by n lines
    ScrollUp(usize),
    /// Scroll down by n lines
    ScrollDown(usize),
    /// Scroll up one page
    PageUp,
    /// Scroll down one page
    PageDown,
    /// Go to beginning of document
    GoToTop,
    /// Go to end of document
    GoToBottom,

    // Sidebar
    /// Show or hide the header outline
    ToggleToc,
    /// Show or hide the file browser
    ToggleFileBrowser,
    /// Move sidebar selection up
    TocUp,
    /// Move sidebar selection down
    TocDown,
    /// Activate the selected sidebar entry
    TocSelect,
    /// Switch focus between sidebar and document
    SwitchFocus,

    // View
    /// Switch between rendered and raw
    ToggleRaw,
    /// Switch between dark and light palettes
    ToggleTheme,
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,

    // File watching
    /// Toggle file watching
    ToggleWatch,
    /// File changed externally, reload
    FileChanged,
    /// The watcher stopped with an error
    WatchFailed(String),

    // Search
    /// Open the search bar
    StartSearch,
    /// Update search term
    SearchInput(String),
    /// Go to next search match
    NextMatch,
    /// Go to previous match
    PrevMatch,
    /// Close the search bar and clear the search
    CloseSearch,

    // Output
    /// Write HTML and text exports
    Export,
    /// Open the last export, or a fresh preview, in the browser
    OpenInBrowser,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// No side effects should occur in this function.
pub fn update(mut model: Model, msg: Message) -> Model {
    let should_sync_toc = !matches!(
        &msg,
        Message::TocUp | Message::TocDown | Message::TocSelect
    );

    match msg {
        // Navigation
        Message::ScrollUp(n) => model.viewport.scroll_up(n),
        Message::ScrollDown(n) => model.viewport.scroll_down(n),
        Message::PageUp => model.viewport.page_up(),
        Message::PageDown => model.viewport.page_down(),
        Message::GoToTop => model.viewport.go_to_top(),
        Message::GoToBottom => model.viewport.go_to_bottom(),

        // Sidebar
        Message::ToggleToc => {
            if model.toc_visible && model.browse_mode {
                model.browse_mode = false;
                model.toc_selected = None;
            } else {
                model.toc_visible = !model.toc_visible;
            }
            if !model.toc_visible {
                model.toc_focused = false;
            } else if model.toc_selected.is_none() && !model.outline.is_empty() {
                model.toc_selected = Some(0);
            }
        }
        Message::ToggleFileBrowser => {
            if model.toc_visible && model.browse_mode {
                model.toc_visible = false;
                model.browse_mode = false;
                model.toc_focused = false;
                model.toc_selected = None;
            } else {
                // Directory listing is loaded in effects
                model.toc_visible = true;
                model.browse_mode = true;
                model.toc_focused = true;
            }
        }
        Message::TocUp => {
            if let Some(sel) = model.toc_selected {
                let next = sel.saturating_sub(1);
                model.toc_selected = Some(next);
                if next < model.toc_scroll_offset {
                    model.toc_scroll_offset = next;
                }
            }
        }
        Message::TocDown => {
            if let Some(sel) = model.toc_selected {
                let max = model.toc_entry_count().saturating_sub(1);
                let next = (sel + 1).min(max);
                model.toc_selected = Some(next);
                let visible = model.toc_visible_rows();
                if visible > 0 {
                    let bottom = model.toc_scroll_offset + visible.saturating_sub(1);
                    if next > bottom {
                        model.toc_scroll_offset = (next + 1)
                            .saturating_sub(visible)
                            .min(model.max_toc_scroll_offset());
                    }
                }
            }
        }
        Message::TocSelect => {
            if !model.browse_mode
                && let Some(sel) = model.toc_selected
            {
                model.jump_to_header(sel);
            }
            // Browse mode selection handled in effects
        }
        Message::SwitchFocus => {
            if model.toc_visible {
                model.toc_focused = !model.toc_focused;
            }
        }

        // View
        Message::ToggleRaw => {
            let top = model
                .display
                .line_map
                .original_line(model.viewport.offset());
            model.mode = model.mode.toggled();
            model.refresh_display();
            model.jump_to_original_line(top, 0);
        }
        Message::ToggleTheme => {
            model.theme = model.theme.toggled();
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }

        // File watching
        Message::ToggleWatch => {
            model.watch_enabled = !model.watch_enabled;
        }
        Message::WatchFailed(err) => {
            model.watch_enabled = false;
            model.show_toast(ToastLevel::Warning, format!("Watch stopped: {err}"));
        }
        // Handled in effects
        Message::FileChanged | Message::Export | Message::OpenInBrowser => {}

        // Search
        Message::StartSearch => {
            model.search_input = Some(model.search.term().to_string());
        }
        Message::SearchInput(term) => {
            model.search.search(model.document.source(), &term);
            model.search_input = Some(term);
            model.refresh_display();
            model.jump_to_current_match();
        }
        Message::NextMatch => {
            if model.search.next().is_some() {
                model.refresh_display();
                model.jump_to_current_match();
            }
        }
        Message::PrevMatch => {
            if model.search.previous().is_some() {
                model.refresh_display();
                model.jump_to_current_match();
            }
        }
        Message::CloseSearch => {
            let top = model
                .display
                .line_map
                .original_line(model.viewport.offset());
            model.search_input = None;
            model.search.clear();
            model.refresh_display();
            model.jump_to_original_line(top, 0);
        }

        // Window
        Message::Resize(width, height) => {
            model.viewport.resize(width, height.saturating_sub(1));
            model.toc_scroll_offset = model.toc_scroll_offset.min(model.max_toc_scroll_offset());
        }

        // Application
        Message::Quit => {
            model.should_quit = true;
        }
    }
    if should_sync_toc && model.toc_visible && !model.browse_mode {
        model.sync_toc_to_viewport();
    }
    model
}
