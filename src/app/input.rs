use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, Message, Model};

use super::event_loop::ResizeDebouncer;

/// Lines scrolled per mouse wheel notch.
const WHEEL_STEP: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                if model.viewport.can_scroll_down() {
                    Some(Message::ScrollDown(WHEEL_STEP))
                } else {
                    None
                }
            }
            MouseEventKind::ScrollUp => {
                if model.viewport.can_scroll_up() {
                    Some(Message::ScrollUp(WHEEL_STEP))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }

        if let Some(input) = model.search_input.as_ref() {
            return Self::handle_search_key(key, input);
        }

        // Sidebar-focused navigation
        if model.toc_focused && model.toc_visible {
            return match key.code {
                KeyCode::Char('j') | KeyCode::Down => Some(Message::TocDown),
                KeyCode::Char('k') | KeyCode::Up => Some(Message::TocUp),
                KeyCode::Enter | KeyCode::Char(' ') => Some(Message::TocSelect),
                KeyCode::Tab | KeyCode::Esc => Some(Message::SwitchFocus),
                KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
                KeyCode::Char('t') => Some(Message::ToggleToc),
                KeyCode::Char('f') => Some(Message::ToggleFileBrowser),
                KeyCode::Char('q') => Some(Message::Quit),
                _ => None,
            };
        }

        // Normal key handling
        match key.code {
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => {
                if model.viewport.can_scroll_down() {
                    Some(Message::ScrollDown(1))
                } else {
                    None
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if model.viewport.can_scroll_up() {
                    Some(Message::ScrollUp(1))
                } else {
                    None
                }
            }
            KeyCode::Char(' ') | KeyCode::PageDown => {
                if model.viewport.can_scroll_down() {
                    Some(Message::PageDown)
                } else {
                    None
                }
            }
            KeyCode::PageUp => {
                if model.viewport.can_scroll_up() {
                    Some(Message::PageUp)
                } else {
                    None
                }
            }
            KeyCode::Char('g') | KeyCode::Home => Some(Message::GoToTop),
            KeyCode::Char('G') | KeyCode::End => Some(Message::GoToBottom),

            // Sidebar
            KeyCode::Char('t') => Some(Message::ToggleToc),
            KeyCode::Char('f') => Some(Message::ToggleFileBrowser),
            KeyCode::Tab if model.toc_visible => Some(Message::SwitchFocus),
            KeyCode::Enter if model.toc_visible => Some(Message::TocSelect),

            // View
            KeyCode::Char('r') => Some(Message::ToggleRaw),
            KeyCode::Char('d') => Some(Message::ToggleTheme),
            KeyCode::Char('w') => Some(Message::ToggleWatch),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),

            // Output
            KeyCode::Char('e') => Some(Message::Export),
            KeyCode::Char('o') => Some(Message::OpenInBrowser),

            // Search
            KeyCode::Char('s' | '/') => Some(Message::StartSearch),
            KeyCode::Char('n') if model.search.is_active() => Some(Message::NextMatch),
            KeyCode::Char('N') if model.search.is_active() => Some(Message::PrevMatch),
            KeyCode::Esc if model.search.is_active() => Some(Message::CloseSearch),

            // Quit
            KeyCode::Char('q') => Some(Message::Quit),

            _ => None,
        }
    }

    fn handle_search_key(key: KeyEvent, input: &str) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Some(Message::CloseSearch),
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                Some(Message::PrevMatch)
            }
            KeyCode::Enter => Some(Message::NextMatch),
            KeyCode::Char('p') if ctrl => Some(Message::PrevMatch),
            KeyCode::Char('n') if ctrl => Some(Message::NextMatch),
            KeyCode::Up => Some(Message::ScrollUp(1)),
            KeyCode::Down => Some(Message::ScrollDown(1)),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),
            KeyCode::Backspace => {
                let mut next = input.to_string();
                next.pop();
                Some(Message::SearchInput(next))
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                let mut next = input.to_string();
                next.push(c);
                Some(Message::SearchInput(next))
            }
            _ => None,
        }
    }
}
