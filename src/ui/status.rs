use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::pipeline;

use super::style::Theme;

/// Text of the search bar.
pub fn search_bar_text(model: &Model) -> String {
    let input = model.search_input.as_deref().unwrap_or_default();
    let match_info = if !model.search.is_active() {
        String::new()
    } else if model.search.result_count() == 0 {
        "  [no matches]".to_string()
    } else {
        format!("  [{}]", model.search.position_label())
    };
    format!("/{input}{match_info}  Enter: next  Shift+Enter: prev  Esc: close")
}

pub fn render_search_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let bar = Paragraph::new(search_bar_text(model))
        .style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(bar, area);
}

/// Text of the status bar.
pub fn status_bar_text(model: &Model) -> String {
    let filename = model
        .document
        .file_name()
        .unwrap_or_else(|| "untitled".to_string());

    let line_info = model.viewport.position_label();
    let percent = model.viewport.scroll_percent();

    let watch_indicator = if model.watch_enabled && model.document.path().is_some() {
        " [watching]"
    } else {
        ""
    };
    let toc_indicator = if model.toc_visible { " [TOC]" } else { "" };

    let search_status = pipeline::search_status(&model.search);
    let search_part = if search_status.is_empty() {
        String::new()
    } else {
        format!("  {search_status}")
    };

    format!(
        " {filename}  {}  {line_info} [{percent}%]{watch_indicator}{toc_indicator}{search_part}  ?:help",
        model.mode.label()
    )
}

pub fn render_status_bar(model: &Model, theme: &Theme, frame: &mut Frame, area: Rect) {
    let status_bar = Paragraph::new(status_bar_text(model))
        .style(Style::default().bg(theme.status_bg).fg(theme.status_fg));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
