//! Content pipeline: what the document view actually shows.
//!
//! One pass takes the current document, the view mode and the search state
//! and produces a [`DisplayContent`]. Search offsets always refer to the
//! original source, so while a search term is set the source is shown
//! as-is with highlights, even in rendered mode.

use crate::diagram::{self, DiagramBlock, LineMap, PlaceholderStyle};
use crate::search::{MatchSpan, SearchEngine};

/// How the document is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Diagram blocks replaced by placeholders, light markdown styling
    #[default]
    Rendered,
    /// Source text exactly as on disk
    Raw,
}

impl ViewMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Rendered => Self::Raw,
            Self::Raw => Self::Rendered,
        }
    }

    pub const fn is_raw(self) -> bool {
        matches!(self, Self::Raw)
    }

    /// Status bar tag.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rendered => "[Rendered]",
            Self::Raw => "[Raw]",
        }
    }
}

/// Textual delimiters used by [`apply_markers`] for plain-text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMarkers {
    pub current_open: String,
    pub current_close: String,
    pub other_open: String,
    pub other_close: String,
}

impl Default for HighlightMarkers {
    fn default() -> Self {
        Self {
            current_open: "【".to_string(),
            current_close: "】".to_string(),
            other_open: "〖".to_string(),
            other_close: "〗".to_string(),
        }
    }
}

/// A match to emphasise in the displayed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub span: MatchSpan,
    /// The match under the search cursor
    pub current: bool,
}

/// Output of one pipeline pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayContent {
    pub text: String,
    /// Byte ranges into `text`, ascending
    pub highlights: Vec<Highlight>,
    pub line_map: LineMap,
    /// Whether `text` has diagram placeholders spliced in
    pub substituted: bool,
}

impl DisplayContent {
    /// Display line corresponding to a line of the original document.
    pub fn display_line(&self, original_line: usize) -> usize {
        self.line_map.display_line(original_line)
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }
}

/// Composes detection, substitution and highlighting.
#[derive(Debug, Clone, Default)]
pub struct ContentPipeline {
    style: PlaceholderStyle,
    last_blocks: Vec<DiagramBlock>,
}

impl ContentPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: PlaceholderStyle) -> Self {
        Self {
            style,
            last_blocks: Vec::new(),
        }
    }

    pub const fn style(&self) -> &PlaceholderStyle {
        &self.style
    }

    /// Diagram blocks found by the most recent [`process`](Self::process).
    pub fn last_blocks(&self) -> &[DiagramBlock] {
        &self.last_blocks
    }

    /// Run one pass over `document`.
    ///
    /// Blocks are detected on every call so the cache never outlives a
    /// content swap.
    pub fn process(&mut self, document: &str, mode: ViewMode, search: &SearchEngine) -> DisplayContent {
        self.last_blocks = diagram::detect(document);

        if search.is_active() {
            let current = search.current_index();
            let highlights = search
                .results()
                .iter()
                .enumerate()
                .map(|(idx, &span)| Highlight {
                    span,
                    current: Some(idx) == current,
                })
                .collect::<Vec<_>>();
            tracing::debug!(?mode, highlights = highlights.len(), "pipeline pass (search)");
            return DisplayContent {
                text: document.to_string(),
                highlights,
                line_map: LineMap::identity(),
                substituted: false,
            };
        }

        match mode {
            ViewMode::Raw => DisplayContent {
                text: document.to_string(),
                ..DisplayContent::default()
            },
            ViewMode::Rendered => {
                let sub = diagram::substitute(document, &self.last_blocks, &self.style);
                tracing::debug!(blocks = self.last_blocks.len(), "pipeline pass (rendered)");
                DisplayContent {
                    text: sub.text,
                    highlights: Vec::new(),
                    substituted: !self.last_blocks.is_empty(),
                    line_map: sub.line_map,
                }
            }
        }
    }
}

/// Wrap each span of `text` in marker pairs.
///
/// This is the plain-text form of search highlighting, for library callers
/// that print text without styling. The terminal view does not use it: it
/// styles the byte ranges in [`DisplayContent::highlights`] instead.
///
/// Spans are applied from the highest start offset down so earlier offsets
/// stay valid while markers are inserted. Spans that fall outside `text` or
/// off a character boundary are skipped.
///
/// # Example
///
/// ```
/// use mdlens::pipeline::{HighlightMarkers, apply_markers};
/// use mdlens::search::SearchEngine;
///
/// let text = "the cat and the hat";
/// let mut search = SearchEngine::new();
/// search.search(text, "the");
///
/// let marked = apply_markers(
///     text,
///     search.results(),
///     search.current_index(),
///     &HighlightMarkers::default(),
/// );
/// assert_eq!(marked, "【the】 cat and 〖the〗 hat");
/// ```
pub fn apply_markers(
    text: &str,
    spans: &[MatchSpan],
    current: Option<usize>,
    markers: &HighlightMarkers,
) -> String {
    let mut ordered: Vec<(usize, MatchSpan)> = spans.iter().copied().enumerate().collect();
    ordered.sort_by(|a, b| b.1.start.cmp(&a.1.start));

    let mut out = text.to_string();
    for (idx, span) in ordered {
        if span.end > out.len() || !out.is_char_boundary(span.start) || !out.is_char_boundary(span.end) {
            continue;
        }
        let (open, close) = if Some(idx) == current {
            (&markers.current_open, &markers.current_close)
        } else {
            (&markers.other_open, &markers.other_close)
        };
        out.insert_str(span.end, close);
        out.insert_str(span.start, open);
    }
    out
}

/// Status line text for the search bar.
pub fn search_status(search: &SearchEngine) -> String {
    if !search.is_active() {
        return String::new();
    }
    if search.result_count() == 0 {
        format!("Search: {} (no matches)", search.term())
    } else {
        format!("Search: {} ({})", search.term(), search.position_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Title\n\n```mermaid\ngraph TD\nA-->B\n```\nthe end";

    #[test]
    fn test_rendered_without_search_substitutes_blocks() {
        let mut pipeline = ContentPipeline::new();
        let out = pipeline.process(DOC, ViewMode::Rendered, &SearchEngine::new());
        assert!(out.substituted);
        assert!(out.text.contains("MERMAID DIAGRAM"));
        assert!(out.highlights.is_empty());
        assert_eq!(pipeline.last_blocks().len(), 1);
    }

    #[test]
    fn test_raw_without_search_is_source() {
        let mut pipeline = ContentPipeline::new();
        let out = pipeline.process(DOC, ViewMode::Raw, &SearchEngine::new());
        assert_eq!(out.text, DOC);
        assert!(!out.substituted);
        assert_eq!(out.display_line(6), 6);
        assert_eq!(pipeline.last_blocks().len(), 1, "blocks are cached for export in raw mode too");
    }

    #[test]
    fn test_search_in_rendered_mode_shows_source_with_highlights() {
        let mut search = SearchEngine::new();
        search.search(DOC, "graph");
        let mut pipeline = ContentPipeline::new();
        let out = pipeline.process(DOC, ViewMode::Rendered, &search);

        assert_eq!(out.text, DOC);
        assert!(!out.substituted);
        assert_eq!(out.highlights.len(), 1);
        let span = out.highlights[0].span;
        assert_eq!(&out.text[span.start..span.end], "graph");
        assert!(out.highlights[0].current);
    }

    #[test]
    fn test_active_search_without_matches_still_shows_source() {
        let mut search = SearchEngine::new();
        search.search(DOC, "zebra");
        let mut pipeline = ContentPipeline::new();
        let out = pipeline.process(DOC, ViewMode::Rendered, &search);
        assert_eq!(out.text, DOC);
        assert!(out.highlights.is_empty());
    }

    #[test]
    fn test_only_cursor_highlight_is_current() {
        let doc = "a b a b a";
        let mut search = SearchEngine::new();
        search.search(doc, "a");
        search.next();
        let out = ContentPipeline::new().process(doc, ViewMode::Raw, &search);
        let flags: Vec<bool> = out.highlights.iter().map(|h| h.current).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn test_display_line_accounts_for_placeholder_height() {
        let mut pipeline = ContentPipeline::new();
        let out = pipeline.process(DOC, ViewMode::Rendered, &SearchEngine::new());
        let lines: Vec<&str> = out.text.split('\n').collect();
        assert_eq!(lines[out.display_line(6)], "the end");
        assert_eq!(lines[out.display_line(0)], "# Title");
    }

    #[test]
    fn test_apply_markers_wraps_current_and_others() {
        let doc = "the cat and the hat";
        let mut search = SearchEngine::new();
        search.search(doc, "the");
        let marked = apply_markers(
            doc,
            search.results(),
            search.current_index(),
            &HighlightMarkers::default(),
        );
        assert_eq!(marked, "【the】 cat and 〖the〗 hat");
    }

    #[test]
    fn test_apply_markers_handles_unsorted_input() {
        let spans = [MatchSpan::new(4, 5), MatchSpan::new(0, 1)];
        let marked = apply_markers("a b c", &spans, Some(1), &HighlightMarkers::default());
        assert_eq!(marked, "【a】 b 〖c〗");
    }

    #[test]
    fn test_apply_markers_skips_out_of_range_spans() {
        let spans = [MatchSpan::new(0, 1), MatchSpan::new(10, 12)];
        let marked = apply_markers("abc", &spans, None, &HighlightMarkers::default());
        assert_eq!(marked, "〖a〗bc");
    }

    #[test]
    fn test_search_status_formats() {
        let mut search = SearchEngine::new();
        assert_eq!(search_status(&search), "");

        search.search("x y x", "x");
        assert_eq!(search_status(&search), "Search: x (1/2)");

        search.search("x y x", "q");
        assert_eq!(search_status(&search), "Search: q (no matches)");
    }

    #[test]
    fn test_view_mode_toggles() {
        assert_eq!(ViewMode::Rendered.toggled(), ViewMode::Raw);
        assert_eq!(ViewMode::Raw.toggled(), ViewMode::Rendered);
        assert_eq!(ViewMode::Raw.label(), "[Raw]");
    }
}
