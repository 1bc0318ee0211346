//! Query-driven syntax highlighting for the visible rows
//!
//! Runs the highlight query over the byte range of the visible rows and cuts
//! every capture into per-row column spans. Nothing is cached between draws.

use crate::error::Result;
use crate::structural::{run_query, StructuralIndex};
use crate::text_mirror::TextMirror;
use crate::theme::{ColorId, Theme};
use std::collections::{BTreeMap, HashMap};
use std::ops::ControlFlow;
use std::sync::Arc;
use tree_sitter::Query;

/// Half-open column range on one row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HighlightSpan {
    pub row: usize,
    pub start_col: usize,
    pub end_col: usize,
    pub color: ColorId,
}

impl HighlightSpan {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.row == row && (self.start_col..self.end_col).contains(&col)
    }
}

pub struct Highlighter {
    query: Arc<Query>,
    theme: Theme,
    /// Colors pre-resolved for every capture the query declares
    colors: HashMap<String, ColorId>,
}

impl Highlighter {
    /// Compile `query_source` through the index and resolve its captures against `theme`
    pub fn new(index: &mut StructuralIndex, query_source: &str, theme: Theme) -> Result<Self> {
        let query = index.compile("highlights", query_source)?;
        let colors = query
            .capture_names()
            .iter()
            .map(|name| (name.to_string(), theme.resolve(name)))
            .collect();

        Ok(Self {
            query,
            theme,
            colors,
        })
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Color for a capture name; unknown names are unstyled
    pub fn color_for_capture(&self, name: &str) -> ColorId {
        self.colors
            .get(name)
            .copied()
            .unwrap_or_else(|| self.theme.resolve(name))
    }

    /// Spans for rows `first_row..=last_row`, at most `limit` of them
    ///
    /// Rows clamp to the document. When two captures overlap on a row the one
    /// produced first by the query keeps the cells. Output is sorted by row and
    /// column, with touching spans of the same color merged.
    pub fn visible_spans(
        &self,
        mirror: &TextMirror,
        index: &StructuralIndex,
        first_row: usize,
        last_row: usize,
        limit: usize,
    ) -> Vec<HighlightSpan> {
        let Some(root) = index.root() else {
            return Vec::new();
        };
        if mirror.row_count() == 0 || limit == 0 {
            return Vec::new();
        }
        let last_row = last_row.min(mirror.row_count() - 1);
        if last_row < first_row {
            return Vec::new();
        }

        let start_byte = mirror.byte_offset(first_row, 0);
        let end_byte = mirror.byte_offset(last_row, usize::MAX);

        // (row, start_col) -> (end_col, color)
        let mut accepted: BTreeMap<(usize, usize), (usize, ColorId)> = BTreeMap::new();
        let mut captures = 0usize;

        run_query(
            &self.query,
            root,
            mirror.as_bytes(),
            Some(start_byte..end_byte),
            |name, node| {
                captures += 1;
                let color = self.color_for_capture(name);
                let (node_start, node_end) = (node.start_byte(), node.end_byte());

                let first = mirror.row_of(node_start).max(first_row);
                let last = mirror.row_of(node_end).min(last_row);
                for row in first..=last {
                    let bounds = mirror.row_range(row);
                    let seg_start = node_start.max(bounds.start);
                    let seg_end = node_end.min(bounds.end);
                    if seg_end <= seg_start {
                        continue;
                    }

                    let start_col = seg_start - bounds.start;
                    let end_col = seg_end - bounds.start;
                    if !overlaps(&accepted, row, start_col, end_col) {
                        accepted.insert((row, start_col), (end_col, color));
                        if accepted.len() >= limit {
                            return ControlFlow::Break(());
                        }
                    }
                }
                ControlFlow::Continue(())
            },
        );

        let spans = coalesce(accepted.into_iter().map(|((row, start_col), (end_col, color))| {
            HighlightSpan {
                row,
                start_col,
                end_col,
                color,
            }
        }));
        tracing::debug!(first_row, last_row, captures, spans = spans.len(), "highlighted");
        spans
    }
}

/// Does `start_col..end_col` on `row` intersect an accepted span?
fn overlaps(
    accepted: &BTreeMap<(usize, usize), (usize, ColorId)>,
    row: usize,
    start_col: usize,
    end_col: usize,
) -> bool {
    let before = accepted
        .range((row, 0)..=(row, start_col))
        .next_back()
        .is_some_and(|(_, &(end, _))| end > start_col);
    let after = accepted
        .range((row, start_col)..(row, end_col))
        .next()
        .is_some();
    before || after
}

/// Merge touching spans that share a row and color
pub fn coalesce(spans: impl IntoIterator<Item = HighlightSpan>) -> Vec<HighlightSpan> {
    let mut coalesced: Vec<HighlightSpan> = Vec::new();
    for span in spans {
        match coalesced.last_mut() {
            Some(curr)
                if curr.row == span.row
                    && curr.end_col == span.start_col
                    && curr.color == span.color =>
            {
                curr.end_col = span.end_col;
            }
            _ => coalesced.push(span),
        }
    }
    coalesced
}
