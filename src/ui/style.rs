//! Theming and color definitions.
//!
//! Rendered mode gives each display line a light style based on what kind of
//! markdown line it is. Raw mode and search results are shown unstyled apart
//! from match highlights.

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeMode;

/// What a display line looks like to the styler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// ATX header with its level
    Heading(u8),
    /// Opening or closing code fence
    Fence,
    /// Line inside a code fence
    Code,
    /// Border or row of a diagram placeholder box
    Diagram,
    BlockQuote,
    ListItem,
    HorizontalRule,
    Paragraph,
    Empty,
}

/// Classify every line of `text`, tracking code fence state.
pub fn classify_lines(text: &str) -> Vec<LineKind> {
    let mut in_fence = false;
    text.split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("```") {
                in_fence = !in_fence;
                return LineKind::Fence;
            }
            if in_fence {
                return if trimmed.starts_with(['╔', '║', '╚']) {
                    LineKind::Diagram
                } else {
                    LineKind::Code
                };
            }
            classify_prose(trimmed)
        })
        .collect()
}

fn classify_prose(trimmed: &str) -> LineKind {
    if trimmed.is_empty() {
        return LineKind::Empty;
    }
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) && trimmed[hashes..].starts_with(char::is_whitespace) {
        // At most 6 by the range check above
        #[allow(clippy::cast_possible_truncation)]
        return LineKind::Heading(hashes as u8);
    }
    if trimmed.starts_with('>') {
        return LineKind::BlockQuote;
    }
    if ["---", "***", "___"].contains(&trimmed) {
        return LineKind::HorizontalRule;
    }
    let is_bullet = trimmed.starts_with(['-', '*', '+'])
        && trimmed[1..].starts_with(' ');
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    let is_numbered = digits > 0 && trimmed[digits..].starts_with(". ");
    if is_bullet || is_numbered {
        return LineKind::ListItem;
    }
    LineKind::Paragraph
}

/// Colors for one palette.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Document area base style
    pub base: Style,
    /// H1 style
    pub h1: Style,
    /// H2 style
    pub h2: Style,
    /// H3 style
    pub h3: Style,
    /// H4-H6 style
    pub h4: Style,
    /// Code block style
    pub code: Style,
    /// Code fence marker style
    pub fence: Style,
    /// Diagram placeholder box style
    pub diagram: Style,
    /// Block quote style
    pub quote: Style,
    /// List item style
    pub list_marker: Style,
    /// Horizontal rule style
    pub hr: Style,
    /// Search match under the cursor
    pub current_match: Style,
    /// Other search matches
    pub other_match: Style,
    /// Directory entries in the file browser
    pub directory: Style,
    /// Border of the focused pane
    pub focus_border: Style,
    /// Status bar background
    pub status_bg: Color,
    /// Status bar foreground
    pub status_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            base: Style::default(),
            h1: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            h4: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Indexed(245)),
            fence: Style::default()
                .fg(Color::Indexed(240))
                .add_modifier(Modifier::DIM),
            diagram: Style::default().fg(Color::Magenta),
            quote: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::ITALIC),
            list_marker: Style::default().fg(Color::Yellow),
            hr: Style::default().fg(Color::Indexed(240)),
            current_match: Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            other_match: Style::default().bg(Color::Indexed(58)).fg(Color::White),
            directory: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            focus_border: Style::default().fg(Color::Yellow),
            status_bg: Color::Indexed(236), // Dark gray that works on both
            status_fg: Color::Indexed(252), // Light gray
        }
    }
}

impl Theme {
    /// Palette for `mode`.
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Dark => Self::dark(),
            ThemeMode::Light => Self::light(),
        }
    }

    /// Create a theme optimized for dark terminals.
    pub fn dark() -> Self {
        Self::default()
    }

    /// Create a theme optimized for light terminals.
    pub fn light() -> Self {
        Self {
            base: Style::default()
                .bg(Color::Indexed(255))
                .fg(Color::Indexed(235)),
            h1: Style::default()
                .fg(Color::Indexed(31)) // Darker cyan
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            h2: Style::default()
                .fg(Color::Indexed(28)) // Darker green
                .add_modifier(Modifier::BOLD),
            h3: Style::default()
                .fg(Color::Indexed(136)) // Darker yellow/olive
                .add_modifier(Modifier::BOLD),
            h4: Style::default()
                .fg(Color::Indexed(25)) // Darker blue
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Indexed(240)),
            fence: Style::default().fg(Color::Indexed(245)),
            diagram: Style::default().fg(Color::Indexed(90)),
            quote: Style::default()
                .fg(Color::Indexed(25))
                .add_modifier(Modifier::ITALIC),
            list_marker: Style::default().fg(Color::Indexed(136)),
            hr: Style::default().fg(Color::Indexed(245)),
            current_match: Style::default()
                .bg(Color::Indexed(214))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            other_match: Style::default().bg(Color::Indexed(229)).fg(Color::Black),
            directory: Style::default()
                .fg(Color::Indexed(25))
                .add_modifier(Modifier::BOLD),
            focus_border: Style::default().fg(Color::Indexed(130)),
            status_bg: Color::Indexed(252),
            status_fg: Color::Indexed(235),
        }
    }

    /// Style for a line of rendered output.
    pub fn line_style(&self, kind: LineKind) -> Style {
        match kind {
            LineKind::Heading(1) => self.h1,
            LineKind::Heading(2) => self.h2,
            LineKind::Heading(3) => self.h3,
            LineKind::Heading(_) => self.h4,
            LineKind::Fence => self.fence,
            LineKind::Code => self.code,
            LineKind::Diagram => self.diagram,
            LineKind::BlockQuote => self.quote,
            LineKind::ListItem => self.list_marker,
            LineKind::HorizontalRule => self.hr,
            LineKind::Paragraph | LineKind::Empty => Style::default(),
        }
    }

    /// Style for a search match.
    pub const fn match_style(&self, current: bool) -> Style {
        if current {
            self.current_match
        } else {
            self.other_match
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_styles_are_bold() {
        let theme = Theme::default();
        for level in 1..=6 {
            let style = theme.line_style(LineKind::Heading(level));
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn test_h1_is_underlined() {
        let style = Theme::default().line_style(LineKind::Heading(1));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_light_theme_differs_from_dark() {
        let dark = Theme::for_mode(ThemeMode::Dark);
        let light = Theme::for_mode(ThemeMode::Light);
        assert_ne!(dark.status_bg, light.status_bg);
        assert_ne!(dark.base, light.base);
    }

    #[test]
    fn test_current_match_stands_out_from_others() {
        let theme = Theme::default();
        assert_ne!(theme.match_style(true), theme.match_style(false));
    }

    #[test]
    fn test_classify_tracks_fences_and_placeholder_rows() {
        let text = "# Title\n\n```\n╔══╗\n║  ║\n╚══╝\n```\n```rust\nlet x = 1;\n```\n- item\n1. first\n> quote\n---\nplain";
        assert_eq!(
            classify_lines(text),
            vec![
                LineKind::Heading(1),
                LineKind::Empty,
                LineKind::Fence,
                LineKind::Diagram,
                LineKind::Diagram,
                LineKind::Diagram,
                LineKind::Fence,
                LineKind::Fence,
                LineKind::Code,
                LineKind::Fence,
                LineKind::ListItem,
                LineKind::ListItem,
                LineKind::BlockQuote,
                LineKind::HorizontalRule,
                LineKind::Paragraph,
            ]
        );
    }

    #[test]
    fn test_hashes_without_space_are_not_headings() {
        assert_eq!(classify_lines("#hashtag"), vec![LineKind::Paragraph]);
        assert_eq!(classify_lines("####### seven"), vec![LineKind::Paragraph]);
        assert_eq!(classify_lines("### three"), vec![LineKind::Heading(3)]);
    }
}
