//! Flattened copy of the line buffer for the parser
//!
//! Rows joined by `\n` (no trailing newline) plus the starting byte of every
//! row. Rebuilt wholesale from the buffer; consistent with the last rebuild,
//! not necessarily with the buffer right now.

use crate::buffer::LineBuffer;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextMirror {
    text: String,
    /// Starting byte of each row, strictly increasing
    row_offsets: Vec<usize>,
    /// Bumped on every rebuild
    revision: u64,
}

impl TextMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mirror straight from rows
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mirror = Self::new();
        mirror.rebuild_from_rows(rows);
        mirror
    }

    /// Re-flatten the whole buffer. O(total size)
    pub fn rebuild(&mut self, buffer: &impl LineBuffer) {
        self.rebuild_from_rows((0..buffer.row_count()).map(|row| buffer.row_text(row)));
    }

    pub fn rebuild_from_rows<I, S>(&mut self, rows: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.text.clear();
        self.row_offsets.clear();

        for (i, row) in rows.into_iter().enumerate() {
            if i > 0 {
                self.text.push('\n');
            }
            self.row_offsets.push(self.text.len());
            self.text.push_str(row.as_ref());
        }
        self.revision += 1;
    }

    /// The flattened document
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    pub fn row_count(&self) -> usize {
        self.row_offsets.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Length in bytes of `row` as of the last rebuild, 0 past the end
    pub fn row_len(&self, row: usize) -> usize {
        let Some(&start) = self.row_offsets.get(row) else {
            return 0;
        };
        match self.row_offsets.get(row + 1) {
            Some(&next) => next - start - 1,
            None => self.text.len() - start,
        }
    }

    /// Byte range of `row` without its newline
    pub fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        let start = self.row_offsets.get(row).copied().unwrap_or(self.text.len());
        start..start + self.row_len(row)
    }

    /// Row text as of the last rebuild
    pub fn row_text(&self, row: usize) -> &str {
        &self.text[self.row_range(row)]
    }

    /// (row, col) to byte offset. Row clamps to the last row, col to the row length
    pub fn byte_offset(&self, row: usize, col: usize) -> usize {
        if self.row_offsets.is_empty() {
            return 0;
        }
        let row = row.min(self.row_offsets.len() - 1);
        self.row_offsets[row] + col.min(self.row_len(row))
    }

    /// Row containing `byte`, by binary search over the row offsets
    pub fn row_of(&self, byte: usize) -> usize {
        // Index of the last offset <= byte
        self.row_offsets
            .partition_point(|&offset| offset <= byte)
            .saturating_sub(1)
    }

    /// Byte offset to (row, col). Offsets past the end clamp to the end
    pub fn row_col_of(&self, byte: usize) -> (usize, usize) {
        if self.row_offsets.is_empty() {
            return (0, 0);
        }
        let byte = byte.min(self.text.len());
        let row = self.row_of(byte);
        let col = (byte - self.row_offsets[row]).min(self.row_len(row));
        (row, col)
    }
}
