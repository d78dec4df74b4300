//! Table of contents extraction.
//!
//! Headers are recognised line by line (ATX style only) and assembled into a
//! forest keyed by line number. The outline is rebuilt from scratch whenever
//! the document changes; it never mutates incrementally.

use std::sync::LazyLock;

use regex::Regex;

static ATX_HEADER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)").ok());

/// A header found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNode {
    /// Header level (1-6)
    pub level: u8,
    /// Header text with the marker and surrounding whitespace removed
    pub title: String,
    /// Zero-based line in the original document
    pub line_number: usize,
}

/// Index of a node inside an [`Outline`].
pub type NodeId = usize;

#[derive(Debug, Clone)]
struct Slot {
    header: HeaderNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Hierarchical table of contents.
///
/// Nodes are stored in document order; `NodeId` is the position of the
/// header in that order. Nodes without a qualifying ancestor hang off a
/// synthetic root and are returned by [`Outline::roots`].
#[derive(Debug, Clone, Default)]
pub struct Outline {
    slots: Vec<Slot>,
    roots: Vec<NodeId>,
}

/// One row of the flattened outline, as shown in the TOC sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineEntry<'a> {
    pub id: NodeId,
    /// Nesting depth below the synthetic root (roots are depth 0)
    pub depth: usize,
    pub header: &'a HeaderNode,
}

/// Scan `document` for ATX headers.
///
/// Each line is trimmed before matching `^#{1,6}\s+.+`. Fenced code is not
/// tracked, so a `#` line inside a code block still counts as a header.
pub fn parse_headers(document: &str) -> Vec<HeaderNode> {
    let Some(pattern) = ATX_HEADER.as_ref() else {
        return Vec::new();
    };
    document
        .split('\n')
        .enumerate()
        .filter_map(|(line_number, line)| {
            let caps = pattern.captures(line.trim())?;
            let marker = caps.get(1)?.as_str();
            let title = caps.get(2)?.as_str().trim();
            #[allow(clippy::cast_possible_truncation)]
            // marker is at most six '#' characters
            let level = marker.len() as u8;
            Some(HeaderNode {
                level,
                title: title.to_string(),
                line_number,
            })
        })
        .collect()
}

impl Outline {
    /// Parse and assemble the outline for `document`.
    pub fn from_document(document: &str) -> Self {
        let outline = Self::build(parse_headers(document));
        tracing::debug!(headers = outline.len(), roots = outline.roots.len(), "outline rebuilt");
        outline
    }

    /// Assemble headers (in document order) into a forest.
    ///
    /// A stack of open ancestors is seeded with the synthetic root at level 0.
    /// For each header, ancestors with a level greater than or equal to the
    /// header's are popped, the header is attached to whatever remains on top,
    /// and then it is pushed. Skipped levels (`#` then `###`) still nest.
    pub fn build(headers: Vec<HeaderNode>) -> Self {
        let mut slots: Vec<Slot> = Vec::with_capacity(headers.len());
        let mut roots = Vec::new();
        let mut stack: Vec<(u8, NodeId)> = Vec::new();

        for header in headers {
            let id = slots.len();
            let level = header.level;
            while stack.last().is_some_and(|&(top, _)| top >= level) {
                stack.pop();
            }
            let parent = stack.last().map(|&(_, parent)| parent);
            match parent {
                Some(parent_id) => slots[parent_id].children.push(id),
                None => roots.push(id),
            }
            slots.push(Slot {
                header,
                parent,
                children: Vec::new(),
            });
            stack.push((level, id));
        }

        Self { slots, roots }
    }

    /// Top-level nodes (children of the synthetic root).
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&HeaderNode> {
        self.slots.get(id).map(|slot| &slot.header)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id).and_then(|slot| slot.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots
            .get(id)
            .map_or(&[], |slot| slot.children.as_slice())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Headers in document order.
    pub fn headers(&self) -> impl Iterator<Item = &HeaderNode> {
        self.slots.iter().map(|slot| &slot.header)
    }

    /// Depth-first flattening for list display.
    ///
    /// Because children always follow their parent in the document, this is
    /// also document order.
    pub fn entries(&self) -> Vec<OutlineEntry<'_>> {
        let mut out = Vec::with_capacity(self.slots.len());
        let mut pending: Vec<(NodeId, usize)> =
            self.roots.iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = pending.pop() {
            let slot = &self.slots[id];
            out.push(OutlineEntry {
                id,
                depth,
                header: &slot.header,
            });
            pending.extend(slot.children.iter().rev().map(|&child| (child, depth + 1)));
        }
        out
    }

    /// Index of the header nearest to `line`, preferring the one above on a tie.
    pub fn closest_to_line(&self, line: usize) -> Option<NodeId> {
        if self.slots.is_empty() {
            return None;
        }
        let next = self
            .slots
            .partition_point(|slot| slot.header.line_number < line);
        if next == 0 {
            return Some(0);
        }
        if next >= self.slots.len() {
            return Some(self.slots.len() - 1);
        }
        let prev = next - 1;
        let prev_dist = line.saturating_sub(self.slots[prev].header.line_number);
        let next_dist = self.slots[next].header.line_number.saturating_sub(line);
        if prev_dist <= next_dist {
            Some(prev)
        } else {
            Some(next)
        }
    }
}
