//! Search functionality.
//!
//! Provides text search within documents with:
//! - Case-insensitive literal matching (no regex syntax leaks through)
//! - A wrap-around cursor over the ordered match list
//! - The canonical byte-offset to line-number mapping
//!
//! Matches are byte ranges into the *original* document source. They are
//! never resolved against a placeholder-substituted rendering.

use regex::{Regex, RegexBuilder};

/// A half-open byte range `[start, end)` into the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Stateful search over a document snapshot.
///
/// The engine keeps the last term, its matches and a cursor. An empty term
/// means "no search active", which is distinct from an active search that
/// found nothing.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    term: String,
    results: Vec<MatchSpan>,
    current: Option<usize>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search `document` for `term`, replacing any previous results.
    ///
    /// Matching is case-insensitive and treats `term` as literal text. An
    /// empty term clears all state and returns no matches. The cursor is
    /// placed on the first match, or cleared when there are none.
    pub fn search(&mut self, document: &str, term: &str) -> &[MatchSpan] {
        if term.is_empty() {
            self.clear();
            return &self.results;
        }

        self.term = term.to_string();
        self.results = find_spans(document, term);
        self.current = if self.results.is_empty() { None } else { Some(0) };
        tracing::debug!(term, matches = self.results.len(), "search");
        &self.results
    }

    /// Advance to the next match, wrapping at the end.
    ///
    /// Returns the new cursor, or `None` when there are no matches.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<usize> {
        if self.results.is_empty() {
            return None;
        }
        let next = self
            .current
            .map_or(0, |idx| (idx + 1) % self.results.len());
        self.current = Some(next);
        self.current
    }

    /// Step back to the previous match, wrapping at the start.
    pub fn previous(&mut self) -> Option<usize> {
        if self.results.is_empty() {
            return None;
        }
        let len = self.results.len();
        let prev = match self.current {
            Some(0) | None => len - 1,
            Some(idx) => idx - 1,
        };
        self.current = Some(prev);
        self.current
    }

    /// The match under the cursor.
    pub fn current_result(&self) -> Option<MatchSpan> {
        self.current.and_then(|idx| self.results.get(idx).copied())
    }

    /// Index of the match under the cursor.
    pub const fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// `"i/n"` with a 1-based cursor, or `"0/0"` when there are no matches.
    pub fn position_label(&self) -> String {
        match self.current {
            Some(idx) if !self.results.is_empty() => {
                format!("{}/{}", idx + 1, self.results.len())
            }
            _ => "0/0".to_string(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Whether a search term is set (regardless of match count).
    pub const fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    pub fn results(&self) -> &[MatchSpan] {
        &self.results
    }

    pub const fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Re-run the current term against new content.
    ///
    /// Used after a content swap. The cursor is kept where it was, clamped to
    /// the new match count, so a reload doesn't throw the user back to the
    /// first hit.
    pub fn refresh(&mut self, document: &str) {
        if self.term.is_empty() {
            return;
        }
        let previous = self.current;
        self.results = find_spans(document, &self.term);
        self.current = if self.results.is_empty() {
            None
        } else {
            Some(previous.unwrap_or(0).min(self.results.len() - 1))
        };
    }

    /// Forget the term, the matches and the cursor.
    pub fn clear(&mut self) {
        self.term.clear();
        self.results.clear();
        self.current = None;
    }
}

/// Zero-based line number of the byte at `offset`.
///
/// Counts `\n` bytes in `document[..offset]`; offsets past the end are
/// clamped. Every offset-to-line conversion (search scrolling, outline
/// jumps) goes through here.
pub fn line_number_for(document: &str, offset: usize) -> usize {
    let end = offset.min(document.len());
    document.as_bytes()[..end]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
}

fn literal_pattern(term: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()
}

fn find_spans(document: &str, term: &str) -> Vec<MatchSpan> {
    // An escaped literal always compiles; a failure here could only come from
    // the size limit on absurdly long terms, which simply finds nothing.
    let Some(pattern) = literal_pattern(term) else {
        tracing::warn!(len = term.len(), "search term rejected by matcher");
        return Vec::new();
    };
    pattern
        .find_iter(document)
        .filter(|m| m.start() < m.end())
        .map(|m| MatchSpan::new(m.start(), m.end()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const THREE_THE: &str = "The cat sat on the mat.\nThen THE dog barked.";

    #[test]
    fn test_search_finds_case_insensitive_matches_in_order() {
        let mut engine = SearchEngine::new();
        let spans = engine.search(THREE_THE, "the").to_vec();
        assert_eq!(spans.len(), 4, "The, the, Then, THE");
        assert_eq!(&THREE_THE[spans[0].start..spans[0].end], "The");
        assert_eq!(&THREE_THE[spans[1].start..spans[1].end], "the");
        assert!(spans.windows(2).all(|w| w[0].end <= w[1].start));
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn test_next_twice_from_start_reaches_third_of_three() {
        let doc = "the first, the second, the third";
        let mut engine = SearchEngine::new();
        assert_eq!(engine.search(doc, "the").len(), 3);
        assert_eq!(engine.current_index(), Some(0));

        engine.next();
        assert_eq!(engine.next(), Some(2));
        assert_eq!(engine.position_label(), "3/3");
    }

    #[test]
    fn test_next_wraps_to_first_and_previous_wraps_to_last() {
        let mut engine = SearchEngine::new();
        engine.search("a a a", "a");
        assert_eq!(engine.previous(), Some(2));
        assert_eq!(engine.next(), Some(0));
    }

    #[test]
    fn test_empty_term_clears_prior_state() {
        let mut engine = SearchEngine::new();
        engine.search("alpha beta", "beta");
        assert!(engine.is_active());

        let spans = engine.search("alpha beta", "");
        assert!(spans.is_empty());
        assert_eq!(engine.term(), "");
        assert!(!engine.is_active());
        assert_eq!(engine.current_result(), None);
        assert_eq!(engine.position_label(), "0/0");
    }

    #[test]
    fn test_no_matches_is_active_but_empty() {
        let mut engine = SearchEngine::new();
        engine.search("alpha", "zeta");
        assert!(engine.is_active());
        assert_eq!(engine.result_count(), 0);
        assert_eq!(engine.next(), None);
        assert_eq!(engine.previous(), None);
        assert_eq!(engine.position_label(), "0/0");
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let doc = "cost is $5.00 (approx) or 5x00";
        let mut engine = SearchEngine::new();
        let spans = engine.search(doc, "5.00").to_vec();
        assert_eq!(spans.len(), 1, "the dot must not match 'x'");
        assert_eq!(engine.search(doc, "(approx)").len(), 1);
        assert_eq!(engine.search(doc, "[").len(), 0);
        assert_eq!(engine.search("a*b a*b", "a*b").len(), 2);
    }

    #[test]
    fn test_overlapping_occurrences_are_not_double_counted() {
        let mut engine = SearchEngine::new();
        let spans = engine.search("aaaa", "aa").to_vec();
        assert_eq!(spans, vec![MatchSpan::new(0, 2), MatchSpan::new(2, 4)]);
    }

    #[test]
    fn test_spans_are_byte_offsets_into_unicode_text() {
        let doc = "café — Café";
        let mut engine = SearchEngine::new();
        let spans = engine.search(doc, "CAFÉ").to_vec();
        assert_eq!(spans.len(), 2);
        for span in spans {
            assert_eq!(doc[span.start..span.end].to_lowercase(), "café");
        }
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut engine = SearchEngine::new();
        engine.search("x y x", "x");
        engine.next();
        engine.clear();
        assert_eq!(engine.term(), "");
        assert!(engine.results().is_empty());
        assert_eq!(engine.current_index(), None);
    }

    #[test]
    fn test_refresh_keeps_cursor_clamped_after_content_swap() {
        let mut engine = SearchEngine::new();
        engine.search("x x x x", "x");
        engine.next();
        engine.next();
        engine.next();
        assert_eq!(engine.current_index(), Some(3));

        engine.refresh("x x");
        assert_eq!(engine.result_count(), 2);
        assert_eq!(engine.current_index(), Some(1));

        engine.refresh("nothing here");
        assert_eq!(engine.current_index(), None);
        assert!(engine.is_active(), "term survives a refresh with no hits");
    }

    #[test]
    fn test_line_number_for_counts_newlines_before_offset() {
        let doc = "one\ntwo\nthree";
        assert_eq!(line_number_for(doc, 0), 0);
        assert_eq!(line_number_for(doc, 3), 0);
        assert_eq!(line_number_for(doc, 4), 1);
        assert_eq!(line_number_for(doc, doc.len()), 2);
        assert_eq!(line_number_for(doc, doc.len() + 50), 2);
    }

    proptest! {
        #[test]
        fn prop_spans_ascending_disjoint_and_equal_to_term(
            doc in "[a-cA-C \\n.*]{0,80}",
            term in "[a-cA-C.*]{1,3}",
        ) {
            let mut engine = SearchEngine::new();
            let spans = engine.search(&doc, &term).to_vec();
            for w in spans.windows(2) {
                prop_assert!(w[0].start < w[1].start);
                prop_assert!(w[0].end <= w[1].start);
            }
            for span in &spans {
                prop_assert!(span.start < span.end && span.end <= doc.len());
                prop_assert!(doc[span.start..span.end].eq_ignore_ascii_case(&term));
            }
            prop_assert_eq!(engine.position_label() == "0/0", spans.is_empty());
        }

        #[test]
        fn prop_next_then_previous_is_identity(
            count in 1usize..12,
            steps in 0usize..30,
            forward_first in any::<bool>(),
        ) {
            let doc = "x ".repeat(count);
            let mut engine = SearchEngine::new();
            engine.search(&doc, "x");
            for _ in 0..steps {
                engine.next();
            }
            let start = engine.current_index();
            if forward_first {
                engine.next();
                engine.previous();
            } else {
                engine.previous();
                engine.next();
            }
            prop_assert_eq!(engine.current_index(), start);
        }

        #[test]
        fn prop_line_number_at_end_is_newline_count(doc in "[a\\n]{0,60}") {
            prop_assert_eq!(line_number_for(&doc, 0), 0);
            prop_assert_eq!(line_number_for(&doc, doc.len()), doc.matches('\n').count());
        }
    }
}
