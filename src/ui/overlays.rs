use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;

/// Key binding rows, grouped by section.
const HELP_SECTIONS: &[(&str, &[&str])] = &[
    (
        "Navigation",
        &[
            "  j/k or Up/Down      Scroll",
            "  Space/PageDown      Page down",
            "  PageUp              Page up",
            "  g / G               Top / bottom",
            "  Mouse wheel         Scroll",
        ],
    ),
    (
        "Search",
        &[
            "  s or /              Start search",
            "  Enter / n           Next match",
            "  Shift+Enter / N     Previous match",
            "  Ctrl+N / Ctrl+P     Next / previous while typing",
            "  Esc                 Close and clear search",
        ],
    ),
    (
        "Sidebar",
        &[
            "  t                   Table of contents",
            "  f                   File browser",
            "  Tab                 Switch focus",
            "  j/k, Enter/Space    Move / select",
        ],
    ),
    (
        "View",
        &[
            "  r                   Raw / rendered",
            "  d                   Dark / light theme",
            "  w                   Toggle watch",
        ],
    ),
    (
        "Output",
        &[
            "  e                   Export HTML + text",
            "  o                   Open in browser",
        ],
    ),
    (
        "Other",
        &[
            "  q / Ctrl-c          Quit",
            "  ? / F1              Toggle help",
        ],
    ),
];

/// Every line of the help overlay body.
pub fn help_lines(model: &Model) -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    for (section, rows) in HELP_SECTIONS {
        lines.push(Line::styled(*section, section_style));
        lines.extend(rows.iter().map(|row| Line::raw(*row)));
        lines.push(Line::raw(""));
    }

    let global_cfg = model
        .config_global_path
        .as_ref()
        .map_or_else(|| "<unknown>".to_string(), |p| p.display().to_string());
    let local_cfg = model
        .config_local_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());
    lines.push(Line::styled("Config", section_style));
    lines.push(Line::raw(format!("  Global: {global_cfg}")));
    lines.push(Line::raw(format!("  Local override: {local_cfg}")));
    lines.push(Line::raw(format!("  Export dir: {}", model.exporter.dir().display())));
    lines
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(6).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );

    // Reserve 1 row at bottom for footer hint
    let content_height = inner.height.saturating_sub(1);
    let lines: Vec<Line> = help_lines(model)
        .into_iter()
        .take(content_height as usize)
        .collect();
    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height);
    frame.render_widget(Paragraph::new(lines), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    let footer = Line::styled(
        "Any key closes",
        Style::default().fg(Color::Indexed(245)),
    );
    frame.render_widget(Paragraph::new(footer), footer_area);
}

pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
