//! Screen drawing
//!
//! Everything is queued onto a writer and flushed once per frame, so the
//! terminal never shows a half-drawn screen.

use crate::buffer::{floor_char_boundary, LineBuffer};
use crate::editor::Editor;
use crate::syntax::HighlightSpan;
use crate::theme::ColorId;
use crossterm::{
    cursor, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::ops::Range;

const SEARCH_BACKGROUND: Color = Color::AnsiValue(238);
const HELP: &str = "Ctrl-S save | Ctrl-Q quit | Ctrl-L find | Tab complete";

pub fn terminal_color(color: ColorId) -> Color {
    match color {
        ColorId::Default => Color::Reset,
        ColorId::Gray => Color::DarkGrey,
        ColorId::Red => Color::DarkRed,
        ColorId::Green => Color::DarkGreen,
        ColorId::Yellow => Color::DarkYellow,
        ColorId::Blue => Color::DarkBlue,
        ColorId::Magenta => Color::DarkMagenta,
        ColorId::Cyan => Color::DarkCyan,
        ColorId::White => Color::Grey,
        ColorId::Indexed(n) => Color::AnsiValue(n),
    }
}

fn printable(ch: char) -> char {
    match ch {
        '\t' => ' ',
        c if c.is_control() => '?',
        c => c,
    }
}

impl Editor {
    /// Draw a full frame and flush it
    pub fn draw(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::Hide, cursor::MoveTo(0, 0))?;

        let last_row = self.row_off + self.screen_rows - 1;
        let spans = self.engine.visible_spans(self.row_off, last_row);

        for screen_row in 0..self.screen_rows {
            let row = self.row_off + screen_row;
            queue!(out, cursor::MoveTo(0, screen_row as u16))?;
            if row < self.buffer.row_count() {
                let first = spans.partition_point(|span| span.row < row);
                let end = spans.partition_point(|span| span.row <= row);
                self.draw_row(out, row, &spans[first..end])?;
            } else {
                queue!(out, SetForegroundColor(Color::DarkBlue), Print('~'), ResetColor)?;
            }
            queue!(out, Clear(ClearType::UntilNewLine))?;
        }

        self.draw_status(out)?;
        self.draw_popup(out)?;

        let cursor = self.buffer.cursor();
        let text = self.buffer.row_text(cursor.row);
        let from = floor_char_boundary(text, self.col_off.min(text.len()));
        let to = floor_char_boundary(text, cursor.col.clamp(from, text.len()));
        let x = text[from..to].chars().count();
        let y = cursor.row.saturating_sub(self.row_off);
        queue!(out, cursor::MoveTo(x as u16, y as u16), cursor::Show)?;

        out.flush()
    }

    fn search_match(&self, row: usize) -> Option<Range<usize>> {
        let (pos, len) = self.search.as_ref()?.matched?;
        (pos.row == row).then(|| pos.col..pos.col + len)
    }

    fn draw_row(&self, out: &mut impl Write, row: usize, spans: &[HighlightSpan]) -> io::Result<()> {
        let text = self.buffer.row_text(row);
        let start = floor_char_boundary(text, self.col_off.min(text.len()));
        let matched = self.search_match(row);

        let mut current = (ColorId::Default, false);
        for (offset, ch) in text[start..].char_indices().take(self.screen_cols) {
            let col = start + offset;
            let color = spans
                .iter()
                .find(|span| span.contains(row, col))
                .map_or(ColorId::Default, |span| span.color);
            let in_match = matched.as_ref().is_some_and(|m| m.contains(&col));

            if (color, in_match) != current {
                let background = if in_match { SEARCH_BACKGROUND } else { Color::Reset };
                queue!(
                    out,
                    SetForegroundColor(terminal_color(color)),
                    SetBackgroundColor(background)
                )?;
                current = (color, in_match);
            }
            queue!(out, Print(printable(ch)))?;
        }
        queue!(out, ResetColor)
    }

    fn draw_status(&self, out: &mut impl Write) -> io::Result<()> {
        let name = self
            .buffer
            .path()
            .and_then(|path| path.file_name())
            .map_or_else(|| "[No Name]".into(), |name| name.to_string_lossy());

        let cursor = self.buffer.cursor();
        let left = match &self.search {
            Some(search) => format!("Search: {} (Esc cancel, Enter confirm)", search.query),
            None => format!(
                "L{} {name} - {} lines{}",
                cursor.row + 1,
                self.buffer.row_count(),
                if self.buffer.is_dirty() { " (modified)" } else { "" }
            ),
        };
        let right = HELP;

        let width = self.screen_cols;
        let mut line: String = left.chars().take(width).collect();
        let used = line.chars().count();
        if used + right.len() < width {
            line.extend(std::iter::repeat(' ').take(width - used - right.len()));
            line.push_str(&right);
        } else {
            line.extend(std::iter::repeat(' ').take(width - used));
        }

        queue!(
            out,
            cursor::MoveTo(0, self.screen_rows as u16),
            SetAttribute(Attribute::Reverse),
            Print(line),
            SetAttribute(Attribute::Reset)
        )
    }

    /// Suggestion list under the anchored word, above it if there's no room
    fn draw_popup(&self, out: &mut impl Write) -> io::Result<()> {
        if !self.engine.is_active() {
            return Ok(());
        }
        let state = self.engine.autocomplete();
        let anchor = state.anchor;
        if anchor.row < self.row_off || anchor.row >= self.row_off + self.screen_rows {
            return Ok(());
        }

        let count = state.suggestions.len();
        let anchor_y = anchor.row - self.row_off;
        let top = if anchor_y + 1 + count <= self.screen_rows {
            anchor_y + 1
        } else {
            anchor_y.saturating_sub(count)
        };
        let x = anchor.col.saturating_sub(self.col_off).min(self.screen_cols - 1);
        let room = self.screen_cols - x;
        let width = state
            .suggestions
            .iter()
            .map(|s| s.chars().count() + 2)
            .max()
            .unwrap_or(0)
            .min(room);

        for (i, suggestion) in state.suggestions.iter().enumerate().take(self.screen_rows) {
            let label: String = format!(" {suggestion} ").chars().take(width).collect();
            let label = format!("{label:<width$}");
            queue!(out, cursor::MoveTo(x as u16, (top + i) as u16))?;
            if i == state.selected {
                queue!(out, SetAttribute(Attribute::Reverse))?;
            } else {
                queue!(out, SetBackgroundColor(Color::DarkGrey))?;
            }
            queue!(out, Print(label), SetAttribute(Attribute::Reset), ResetColor)?;
        }
        Ok(())
    }
}
