use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::pipeline::Highlight;

use super::style::{LineKind, Theme, classify_lines};
use super::{DOC_WIDTH_PERCENT, DOCUMENT_LEFT_PADDING, TOC_WIDTH_PERCENT, overlays, status};

pub fn split_main_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(TOC_WIDTH_PERCENT),
            Constraint::Percentage(DOC_WIDTH_PERCENT),
        ])
        .split(area)
}

pub fn document_content_width(total_width: u16, toc_visible: bool) -> u16 {
    let area = Rect::new(0, 0, total_width, 1);
    let doc_width = if toc_visible {
        split_main_columns(area)[1].width
    } else {
        total_width
    };
    doc_width.saturating_sub(DOCUMENT_LEFT_PADDING).max(1)
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let theme = Theme::for_mode(model.theme);

    if model.toc_visible {
        // Split into sidebar and document
        let chunks = split_main_columns(area);
        render_toc(model, &theme, frame, chunks[0]);
        render_document(model, &theme, frame, chunks[1]);
    } else {
        render_document(model, &theme, frame, area);
    }

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_toc(model: &Model, theme: &Theme, frame: &mut Frame, area: Rect) {
    if model.browse_mode {
        render_browse_toc(model, theme, frame, area);
    } else {
        render_heading_toc(model, theme, frame, area);
    }
}

fn sidebar_block<'a>(title: String, model: &Model, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(theme.base)
        .border_style(if model.toc_focused {
            theme.focus_border
        } else {
            Style::default()
        })
}

/// First entry shown when `len` entries scroll in `visible_rows`.
fn sidebar_window(model: &Model, len: usize, visible_rows: usize) -> (usize, usize) {
    let max_start = len.saturating_sub(visible_rows);
    let start = model.toc_scroll_offset.min(max_start);
    let end = (start + visible_rows).min(len);
    (start, end)
}

fn render_heading_toc(model: &Model, theme: &Theme, frame: &mut Frame, area: Rect) {
    let toc_block = sidebar_block("Table of Contents".to_string(), model, theme);

    if model.outline.is_empty() {
        let empty = Paragraph::new(Line::styled(
            "No headers found",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .block(toc_block);
        frame.render_widget(empty, area);
        return;
    }

    let entries = model.outline.entries();
    let visible_rows = area.height.saturating_sub(2) as usize;
    let (start, end) = sidebar_window(model, entries.len(), visible_rows);

    let items: Vec<Line> = entries[start..end]
        .iter()
        .map(|entry| {
            let selected = model.toc_selected == Some(entry.id);
            let marker = if selected { ">" } else { " " };
            let indent = "  ".repeat(entry.depth);
            let base_style = theme.line_style(LineKind::Heading(entry.header.level));
            let style = if selected {
                base_style.reversed()
            } else {
                base_style
            };
            Line::styled(format!("{marker}{indent} {}", entry.header.title), style)
        })
        .collect();

    frame.render_widget(Paragraph::new(items).block(toc_block), area);
}

fn render_browse_toc(model: &Model, theme: &Theme, frame: &mut Frame, area: Rect) {
    let entries = &model.browse_entries;
    let visible_rows = area.height.saturating_sub(2) as usize;
    let (start, end) = sidebar_window(model, entries.len(), visible_rows);

    let items: Vec<Line> = entries
        .iter()
        .enumerate()
        .skip(start)
        .take(end.saturating_sub(start))
        .map(|(i, entry)| {
            let marker = if model.toc_selected == Some(i) {
                ">"
            } else {
                " "
            };
            let display_name = if entry.is_dir && entry.name != ".." {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            };
            let style = if entry.is_dir {
                theme.directory
            } else {
                Style::default()
            };
            let style = if model.toc_selected == Some(i) {
                style.reversed()
            } else {
                style
            };
            Line::styled(format!("{marker} {display_name}"), style)
        })
        .collect();

    let title = model.browse_dir.file_name().map_or_else(
        || model.browse_dir.display().to_string(),
        |n| n.to_string_lossy().to_string(),
    );

    let toc = Paragraph::new(items).block(sidebar_block(title, model, theme));
    frame.render_widget(toc, area);
}

fn render_document(model: &Model, theme: &Theme, frame: &mut Frame, area: Rect) {
    let search_active = model.search_bar_open();
    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(search_active) + u16::from(toast_active);
    // Reserve the bottom rows for the status bar, search bar and toast.
    let doc_outer_area = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let search_area = Rect {
        y: area.y + area.height.saturating_sub(1 + u16::from(search_active)),
        height: 1,
        ..area
    };
    let toast_area = Rect {
        y: area.y
            + area
                .height
                .saturating_sub(1 + u16::from(search_active) + u16::from(toast_active)),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    let content = document_lines(model, theme);

    let doc_block = Block::default()
        .borders(Borders::NONE)
        .style(theme.base)
        .padding(Padding::left(DOCUMENT_LEFT_PADDING));
    let doc = Paragraph::new(content).block(doc_block);
    // Clear first so styles from a previous frame do not leak.
    frame.render_widget(Clear, doc_outer_area);
    frame.render_widget(doc, doc_outer_area);

    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    if search_active {
        status::render_search_bar(model, frame, search_area);
    }
    status::render_status_bar(model, theme, frame, status_area);
}

/// Styled lines for the visible part of the display text.
fn document_lines(model: &Model, theme: &Theme) -> Vec<Line<'static>> {
    let range = model.viewport.visible_range();
    let styled = !model.mode.is_raw() && !model.search.is_active();
    let kinds = if styled {
        classify_lines(&model.display.text)
    } else {
        Vec::new()
    };
    let highlights = &model.display.highlights;

    let mut lines = Vec::with_capacity(range.len());
    let mut line_start = 0usize;
    for (idx, text) in model.display.text.split('\n').enumerate() {
        if idx >= range.end {
            break;
        }
        if idx >= range.start {
            let style = kinds
                .get(idx)
                .map_or_else(Style::default, |&kind| theme.line_style(kind));
            lines.push(styled_line(text, line_start, highlights, style, theme));
        }
        line_start += text.len() + 1;
    }
    lines
}

/// Split one line into spans, emphasising any highlight that overlaps it.
///
/// `line_start` is the byte offset of `text` in the display text.
fn styled_line(
    text: &str,
    line_start: usize,
    highlights: &[Highlight],
    style: Style,
    theme: &Theme,
) -> Line<'static> {
    let line_end = line_start + text.len();
    let first = highlights.partition_point(|h| h.span.end <= line_start);
    let mut spans = Vec::new();
    let mut cursor = 0usize;

    for highlight in highlights[first..]
        .iter()
        .take_while(|h| h.span.start < line_end)
    {
        let start = highlight.span.start.saturating_sub(line_start).max(cursor);
        let end = highlight.span.end.min(line_end) - line_start;
        let (Some(before), Some(matched)) = (text.get(cursor..start), text.get(start..end)) else {
            continue;
        };
        if !before.is_empty() {
            spans.push(Span::styled(before.to_string(), style));
        }
        spans.push(Span::styled(
            matched.to_string(),
            style.patch(theme.match_style(highlight.current)),
        ));
        cursor = end;
    }

    if let Some(rest) = text.get(cursor..)
        && !rest.is_empty()
    {
        spans.push(Span::styled(rest.to_string(), style));
    }
    Line::from(spans)
}
