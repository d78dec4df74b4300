//! Fenced mermaid block detection and terminal placeholders.
//!
//! Terminals cannot draw diagrams, so in rendered mode each ```` ```mermaid ````
//! block is swapped for a framed box that previews its first few lines and
//! points the user at the browser preview.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const OPEN_FENCE_PREFIX: &str = "```mermaid";
const FENCE: &str = "```";

/// A fenced diagram block in the original document.
///
/// Line numbers are zero-based and inclusive: `start_line` is the opening
/// fence and `end_line` the closing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    pub start_line: usize,
    pub end_line: usize,
    /// Lines strictly between the fences, joined with `\n`
    pub content: String,
}

impl DiagramBlock {
    /// Number of original lines the block occupies, fences included.
    pub const fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Geometry and wording of the placeholder box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderStyle {
    /// Maximum content lines previewed inside the box
    pub preview_lines: usize,
    /// Display columns reserved for each preview line
    pub preview_width: usize,
    pub title: String,
    pub hint: String,
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self {
            preview_lines: 3,
            preview_width: 36,
            title: "MERMAID DIAGRAM".to_string(),
            hint: "[View in browser with \"o\" key]".to_string(),
        }
    }
}

impl PlaceholderStyle {
    /// Columns between the two vertical borders.
    pub const fn inner_width(&self) -> usize {
        self.preview_width + 4
    }
}

/// Find every terminated mermaid block in `document`.
///
/// A line whose trimmed text starts with ```` ```mermaid ```` opens a block
/// (restarting any block already open); a line that trims to exactly
/// ```` ``` ```` closes it. A block still open at the end is dropped.
pub fn detect(document: &str) -> Vec<DiagramBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<(usize, Vec<&str>)> = None;

    for (idx, line) in document.split('\n').enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with(OPEN_FENCE_PREFIX) {
            open = Some((idx, Vec::new()));
        } else if trimmed == FENCE {
            if let Some((start_line, body)) = open.take() {
                blocks.push(DiagramBlock {
                    start_line,
                    end_line: idx,
                    content: body.join("\n"),
                });
            }
        } else if let Some((_, body)) = open.as_mut() {
            body.push(line);
        }
    }

    if let Some((start_line, _)) = open {
        tracing::debug!(start_line, "dropping unterminated diagram block");
    }
    blocks
}

/// Build the placeholder lines for one block.
///
/// The box sits inside a plain code fence so markdown styling leaves it
/// alone. Every line between the fences starts with a border glyph.
pub fn render_placeholder(block: &DiagramBlock, style: &PlaceholderStyle) -> Vec<String> {
    let inner = style.inner_width();
    let horizontal = "═".repeat(inner);
    let row = |text: &str| format!("║{}║", pad_to_width(text, inner));

    let mut lines = vec![
        FENCE.to_string(),
        format!("╔{horizontal}╗"),
        row(&format!("  {}", style.title)),
        row(""),
        row(&format!("  {}", style.hint)),
        row(""),
    ];

    let content = block.content.trim();
    let total = if content.is_empty() {
        0
    } else {
        content.split('\n').count()
    };
    let shown = total.min(style.preview_lines);
    for preview in content.split('\n').take(shown) {
        let fitted = truncate_to_width(preview, style.preview_width);
        lines.push(row(&format!("  {fitted}")));
    }
    if total > shown {
        lines.push(row("  ..."));
    }

    lines.push(format!("╚{horizontal}╝"));
    lines.push(FENCE.to_string());
    lines
}

/// Maps original line numbers onto the lines of a substituted rendering.
///
/// Lines inside a replaced block map to the first line of its placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineMap {
    /// `(start_line, end_line, placeholder_len)` per replaced block, ascending
    spans: Vec<(usize, usize, usize)>,
}

impl LineMap {
    /// Identity mapping.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.spans.is_empty()
    }

    /// Display line for `original` line.
    pub fn display_line(&self, original: usize) -> usize {
        let mut shift: isize = 0;
        for &(start, end, replacement) in &self.spans {
            if original < start {
                break;
            }
            if original <= end {
                return offset(start, shift);
            }
            shift += signed(replacement) - signed(end - start + 1);
        }
        offset(original, shift)
    }

    /// Original line shown at `display` line.
    ///
    /// Lines inside a placeholder map to the block's opening fence.
    pub fn original_line(&self, display: usize) -> usize {
        let mut shift: isize = 0;
        for &(start, end, replacement) in &self.spans {
            let shown_start = offset(start, shift);
            if display < shown_start {
                break;
            }
            if display < shown_start + replacement {
                return start;
            }
            shift += signed(replacement) - signed(end - start + 1);
        }
        offset(display, -shift)
    }
}

/// Result of [`substitute`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub line_map: LineMap,
}

/// Replace each block's lines with its placeholder.
///
/// `blocks` must come from [`detect`] on the same `document`; splice points
/// are indices into the original line split.
pub fn substitute(document: &str, blocks: &[DiagramBlock], style: &PlaceholderStyle) -> Substitution {
    if blocks.is_empty() {
        return Substitution {
            text: document.to_string(),
            line_map: LineMap::identity(),
        };
    }

    let lines: Vec<&str> = document.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut spans = Vec::with_capacity(blocks.len());
    let mut cursor = 0;

    for block in blocks {
        let start = block.start_line.min(lines.len());
        let end = block.end_line.min(lines.len().saturating_sub(1));
        if start < cursor || start > end {
            continue;
        }
        out.extend(lines[cursor..start].iter().map(|s| (*s).to_string()));
        let placeholder = render_placeholder(block, style);
        spans.push((start, end, placeholder.len()));
        out.extend(placeholder);
        cursor = end + 1;
    }
    out.extend(lines[cursor.min(lines.len())..].iter().map(|s| (*s).to_string()));

    Substitution {
        text: out.join("\n"),
        line_map: LineMap { spans },
    }
}

fn pad_to_width(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        return text.to_string();
    }
    format!("{text}{}", " ".repeat(width - used))
}

fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str("...");
    out
}

#[allow(clippy::cast_possible_wrap)]
const fn signed(n: usize) -> isize {
    n as isize
}

#[allow(clippy::cast_sign_loss)]
const fn offset(line: usize, shift: isize) -> usize {
    let shifted = signed(line) + shift;
    if shifted < 0 { 0 } else { shifted as usize }
}
