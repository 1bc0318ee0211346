//! Line-array text buffer
//!
//! Rows are stored as `String`s without their newline. Columns are byte
//! offsets into the row.

use crate::error::{AssistError, Result};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// What the assistance engine needs from its host buffer
pub trait LineBuffer {
    fn row_count(&self) -> usize;

    /// Row text, empty past the end
    fn row_text(&self, row: usize) -> &str;

    fn row_len(&self, row: usize) -> usize {
        self.row_text(row).len()
    }

    /// Replace `range` of `row` with `text`. Range is already clamped to the row
    fn replace_range(&mut self, row: usize, range: Range<usize>, text: &str);

    fn cursor(&self) -> Position;

    fn set_cursor(&mut self, pos: Position);

    fn mark_modified(&mut self);
}

/// Row/column in document space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Cursor motions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

pub struct Buffer {
    rows: Vec<String>,
    cursor: Position,
    dirty: bool,
    path: Option<PathBuf>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    /// Empty buffer with one empty row
    pub fn new() -> Self {
        Self {
            rows: vec![String::new()],
            cursor: Position::default(),
            dirty: false,
            path: None,
        }
    }

    /// Split text into rows, stripping `\n` and `\r\n`
    pub fn from_str(text: &str) -> Self {
        let mut rows = Vec::with_capacity(bytecount::count(text.as_bytes(), b'\n') + 1);
        let mut start = 0;
        for nl in memchr::memchr_iter(b'\n', text.as_bytes()) {
            rows.push(text[start..nl].trim_end_matches('\r').to_string());
            start = nl + 1;
        }
        if start < text.len() {
            rows.push(text[start..].trim_end_matches('\r').to_string());
        }
        if rows.is_empty() {
            rows.push(String::new());
        }

        Self {
            rows,
            cursor: Position::default(),
            dirty: false,
            path: None,
        }
    }

    /// Load a file. Invalid UTF-8 is replaced rather than rejected
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssistError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut buffer = match simdutf8::basic::from_utf8(&bytes) {
            Ok(text) => Self::from_str(text),
            Err(_) => {
                tracing::warn!(path = %path.display(), "file is not valid UTF-8, replacing bad bytes");
                Self::from_str(&String::from_utf8_lossy(&bytes))
            }
        };
        buffer.path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), rows = buffer.rows.len(), "opened file");
        Ok(buffer)
    }

    /// Write rows joined by `\n`, clearing the dirty flag
    pub fn save(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        std::fs::write(&path, self.rows.join("\n")).map_err(|source| AssistError::Io {
            path: path.clone(),
            source,
        })?;
        self.dirty = false;
        tracing::info!(path = %path.display(), rows = self.rows.len(), "saved file");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clamp the cursor onto an existing row and column
    fn clamp_cursor(&mut self) {
        self.cursor.row = self.cursor.row.min(self.rows.len().saturating_sub(1));
        let row = &self.rows[self.cursor.row];
        self.cursor.col = floor_char_boundary(row, self.cursor.col.min(row.len()));
    }

    pub fn insert_char(&mut self, ch: char) {
        self.clamp_cursor();
        let Position { row, col } = self.cursor;
        self.rows[row].insert(col, ch);
        self.cursor.col = col + ch.len_utf8();
        self.dirty = true;
    }

    /// Backspace: delete left of the cursor, joining rows at column 0
    pub fn delete_char(&mut self) {
        self.clamp_cursor();
        let Position { row, col } = self.cursor;
        if col > 0 {
            let prev = floor_char_boundary(&self.rows[row], col - 1);
            self.rows[row].replace_range(prev..col, "");
            self.cursor.col = prev;
            self.dirty = true;
        } else if row > 0 {
            let current = self.rows.remove(row);
            let above = &mut self.rows[row - 1];
            let joined_at = above.len();
            above.push_str(&current);
            self.cursor = Position::new(row - 1, joined_at);
            self.dirty = true;
        }
    }

    /// Split the row at the cursor
    pub fn insert_newline(&mut self) {
        self.clamp_cursor();
        let Position { row, col } = self.cursor;
        let tail = self.rows[row].split_off(col);
        self.rows.insert(row + 1, tail);
        self.cursor = Position::new(row + 1, 0);
        self.dirty = true;
    }

    /// Ctrl-K: truncate at the cursor, or join the next row when already at the end
    pub fn kill_line(&mut self) {
        self.clamp_cursor();
        let Position { row, col } = self.cursor;
        if col < self.rows[row].len() {
            self.rows[row].truncate(col);
            self.dirty = true;
        } else if row + 1 < self.rows.len() {
            let next = self.rows.remove(row + 1);
            self.rows[row].push_str(&next);
            self.dirty = true;
        }
    }

    pub fn move_cursor(&mut self, motion: Motion) {
        self.clamp_cursor();
        let Position { row, col } = self.cursor;
        match motion {
            Motion::Left => {
                if col > 0 {
                    self.cursor.col = floor_char_boundary(&self.rows[row], col - 1);
                } else if row > 0 {
                    self.cursor = Position::new(row - 1, self.rows[row - 1].len());
                }
            }
            Motion::Right => {
                let text = &self.rows[row];
                if let Some(ch) = text[col..].chars().next() {
                    self.cursor.col = col + ch.len_utf8();
                }
            }
            Motion::Up => self.cursor.row = row.saturating_sub(1),
            Motion::Down => {
                if row + 1 < self.rows.len() {
                    self.cursor.row = row + 1;
                }
            }
            Motion::LineStart => self.cursor.col = 0,
            Motion::LineEnd => self.cursor.col = self.rows[row].len(),
        }
        self.clamp_cursor();
    }

    /// Identifier run (alphanumerics and `_`) ending at the cursor, with its start column
    pub fn word_before_cursor(&self) -> (usize, &str) {
        let row = self.row_text(self.cursor.row);
        let end = self.cursor.col.min(row.len());
        let start = row.as_bytes()[..end]
            .iter()
            .rposition(|&b| !(b.is_ascii_alphanumeric() || b == b'_'))
            .map_or(0, |i| i + 1);
        (start, &row[start..end])
    }

    /// First row containing `query`, with the match column
    pub fn find(&self, query: &str) -> Option<Position> {
        if query.is_empty() {
            return None;
        }
        self.rows
            .iter()
            .enumerate()
            .find_map(|(row, text)| text.find(query).map(|col| Position::new(row, col)))
    }
}

impl LineBuffer for Buffer {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_text(&self, row: usize) -> &str {
        self.rows.get(row).map_or("", String::as_str)
    }

    fn replace_range(&mut self, row: usize, range: Range<usize>, text: &str) {
        if let Some(line) = self.rows.get_mut(row) {
            line.replace_range(range, text);
        }
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
        self.clamp_cursor();
    }

    fn mark_modified(&mut self) {
        self.dirty = true;
    }
}

/// Largest char boundary in `s` at or below `index`
pub(crate) fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_rows() {
        let buffer = Buffer::from_str("a\r\nb\n\nc");
        assert_eq!(buffer.rows(), &["a", "b", "", "c"]);

        let trailing = Buffer::from_str("x\n");
        assert_eq!(trailing.rows(), &["x"]);

        assert_eq!(Buffer::from_str("").rows(), &[""]);
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut buffer = Buffer::new();
        for ch in "ab".chars() {
            buffer.insert_char(ch);
        }
        buffer.insert_newline();
        buffer.insert_char('c');
        assert_eq!(buffer.rows(), &["ab", "c"]);
        assert!(buffer.is_dirty());

        buffer.delete_char();
        buffer.delete_char();
        assert_eq!(buffer.rows(), &["ab"]);
        assert_eq!(buffer.cursor(), Position::new(0, 2));
    }

    #[test]
    fn test_kill_line_joins_at_end() {
        let mut buffer = Buffer::from_str("hello world\nnext");
        buffer.set_cursor(Position::new(0, 5));
        buffer.kill_line();
        assert_eq!(buffer.rows(), &["hello", "next"]);
        buffer.kill_line();
        assert_eq!(buffer.rows(), &["hellonext"]);
    }

    #[test]
    fn test_motions_clamp() {
        let mut buffer = Buffer::from_str("long line\nab");
        buffer.set_cursor(Position::new(0, 9));
        buffer.move_cursor(Motion::Down);
        assert_eq!(buffer.cursor(), Position::new(1, 2));
        buffer.move_cursor(Motion::LineStart);
        buffer.move_cursor(Motion::Left);
        assert_eq!(buffer.cursor(), Position::new(0, 9));
    }

    #[test]
    fn test_word_before_cursor() {
        let mut buffer = Buffer::from_str("  x = my_var");
        buffer.set_cursor(Position::new(0, 12));
        assert_eq!(buffer.word_before_cursor(), (6, "my_var"));

        buffer.set_cursor(Position::new(0, 5));
        assert_eq!(buffer.word_before_cursor(), (5, ""));
    }

    #[test]
    fn test_find() {
        let buffer = Buffer::from_str("int a;\nreturn a;");
        assert_eq!(buffer.find("return"), Some(Position::new(1, 0)));
        assert_eq!(buffer.find("missing"), None);
        assert_eq!(buffer.find(""), None);
    }
}
