//! Editor state and key handling
//!
//! One key is fully processed (edit, resync, suggestion update) before the
//! next one is read.

use crate::buffer::{Buffer, LineBuffer, Motion, Position};
use crate::engine::AssistEngine;
use crate::error::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Incremental search prompt state
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    pub query: String,
    /// Cursor to restore on cancel
    pub saved: Position,
    /// Match start and length
    pub matched: Option<(Position, usize)>,
}

pub struct Editor {
    pub(crate) buffer: Buffer,
    pub(crate) engine: AssistEngine,
    /// Text rows on screen (status bar excluded)
    pub(crate) screen_rows: usize,
    pub(crate) screen_cols: usize,
    pub(crate) row_off: usize,
    pub(crate) col_off: usize,
    pub(crate) search: Option<SearchState>,
    quit: bool,
}

impl Editor {
    /// Take ownership of the buffer and engine and run the first sync
    pub fn new(buffer: Buffer, mut engine: AssistEngine, cols: u16, rows: u16) -> Self {
        if let Err(err) = engine.sync(&buffer) {
            tracing::warn!("initial parse failed: {err}");
        }
        let mut editor = Self {
            buffer,
            engine,
            screen_rows: 0,
            screen_cols: 0,
            row_off: 0,
            col_off: 0,
            search: None,
            quit: false,
        };
        editor.resize(cols, rows);
        editor
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn engine(&self) -> &AssistEngine {
        &self.engine
    }

    pub fn search(&self) -> Option<&SearchState> {
        self.search.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.screen_cols = cols.max(1) as usize;
        self.screen_rows = rows.saturating_sub(1).max(1) as usize;
        self.scroll();
    }

    /// Keep the cursor inside the viewport
    pub fn scroll(&mut self) {
        let Position { row, col } = self.buffer.cursor();
        if row < self.row_off {
            self.row_off = row;
        }
        if row >= self.row_off + self.screen_rows {
            self.row_off = row + 1 - self.screen_rows;
        }
        if col < self.col_off {
            self.col_off = col;
        }
        if col >= self.col_off + self.screen_cols {
            self.col_off = col + 1 - self.screen_cols;
        }
    }

    fn resync(&mut self) {
        if let Err(err) = self.engine.sync(&self.buffer) {
            tracing::warn!("reparse failed: {err}");
        }
    }

    /// Recompute suggestions for the identifier left of the cursor
    fn trigger(&mut self, min_len: usize) {
        let cursor = self.buffer.cursor();
        let (_, word) = self.buffer.word_before_cursor();
        if word.len() < min_len || word.is_empty() {
            self.engine.dismiss();
            return;
        }
        let word = word.to_string();
        self.engine.update(&word, cursor.row, cursor.col);
    }

    fn after_edit(&mut self) {
        self.resync();
        self.trigger(2);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.search.is_some() {
            self.handle_search_key(key);
            return Ok(());
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let active = self.engine.is_active();

        match key.code {
            KeyCode::Char(c) if ctrl => self.handle_ctrl(c)?,
            KeyCode::Up if active => self.engine.select_prev(),
            KeyCode::Down if active => self.engine.select_next(),
            KeyCode::Left | KeyCode::Right if active => {}
            KeyCode::Tab if active => {
                if self.engine.accept(&mut self.buffer) {
                    self.resync();
                }
            }
            KeyCode::Tab => {
                self.resync();
                self.trigger(1);
            }
            KeyCode::Esc => self.engine.dismiss(),
            KeyCode::Enter => {
                self.engine.dismiss();
                self.buffer.insert_newline();
                self.resync();
            }
            KeyCode::Backspace => {
                self.buffer.delete_char();
                self.after_edit();
            }
            KeyCode::Up => self.motion(Motion::Up),
            KeyCode::Down => self.motion(Motion::Down),
            KeyCode::Left => self.motion(Motion::Left),
            KeyCode::Right => self.motion(Motion::Right),
            KeyCode::Home => self.motion(Motion::LineStart),
            KeyCode::End => self.motion(Motion::LineEnd),
            KeyCode::PageUp | KeyCode::PageDown => {
                let motion = if key.code == KeyCode::PageUp {
                    Motion::Up
                } else {
                    Motion::Down
                };
                for _ in 0..self.screen_rows {
                    self.buffer.move_cursor(motion);
                }
                self.engine.follow_cursor(self.buffer.cursor());
            }
            KeyCode::Char(c) if !c.is_control() => {
                self.buffer.insert_char(c);
                self.after_edit();
            }
            _ => {}
        }

        self.scroll();
        Ok(())
    }

    fn motion(&mut self, motion: Motion) {
        self.buffer.move_cursor(motion);
        self.engine.follow_cursor(self.buffer.cursor());
    }

    fn handle_ctrl(&mut self, c: char) -> Result<()> {
        match c.to_ascii_lowercase() {
            's' => self.buffer.save()?,
            'l' => self.start_search(),
            'q' | 'c' => {
                self.buffer.save()?;
                self.quit = true;
            }
            'a' => self.motion(Motion::LineStart),
            'e' => self.motion(Motion::LineEnd),
            'b' => self.motion(Motion::Left),
            'f' => self.motion(Motion::Right),
            'p' => self.motion(Motion::Up),
            'n' => self.motion(Motion::Down),
            'k' => {
                self.engine.dismiss();
                self.buffer.kill_line();
                self.resync();
            }
            _ => {}
        }
        Ok(())
    }

    fn start_search(&mut self) {
        self.engine.dismiss();
        self.search = Some(SearchState {
            saved: self.buffer.cursor(),
            ..SearchState::default()
        });
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => {
                let saved = search.saved;
                self.search = None;
                self.buffer.set_cursor(saved);
            }
            KeyCode::Enter => self.search = None,
            KeyCode::Backspace => {
                if search.query.pop().is_some() {
                    self.update_search();
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                search.query.push(c);
                self.update_search();
            }
            _ => {}
        }
        self.scroll();
    }

    /// Jump to the first row containing the query
    fn update_search(&mut self) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        if search.query.is_empty() {
            return;
        }
        search.matched = self
            .buffer
            .find(&search.query)
            .map(|pos| (pos, search.query.len()));
        if let Some((pos, len)) = search.matched {
            self.buffer.set_cursor(Position::new(pos.row, pos.col + len));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::theme::Theme;
    use crate::trie::Trie;

    fn editor(text: &str, words: &[&str]) -> Editor {
        let engine = AssistEngine::with_parts(
            &EngineConfig::default(),
            Some(Trie::from_words(words)),
            Some(tree_sitter_c::HIGHLIGHT_QUERY),
            Theme::c(),
        );
        Editor::new(Buffer::from_str(text), engine, 80, 24)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(editor: &mut Editor, text: &str) {
        for c in text.chars() {
            editor.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_typing_triggers_and_tab_accepts() {
        let mut editor = editor("", &["printf", "puts"]);
        type_str(&mut editor, "p");
        assert!(!editor.engine().is_active());

        type_str(&mut editor, "ri");
        assert_eq!(editor.engine().current_suggestions(), &["printf"]);

        editor.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(editor.buffer().rows(), &["printf"]);
        assert_eq!(editor.buffer().cursor(), Position::new(0, 6));
        assert!(!editor.engine().is_active());
        assert_eq!(editor.engine().mirror().text(), "printf");
    }

    #[test]
    fn test_backspace_below_minimum_dismisses() {
        let mut editor = editor("", &["while"]);
        type_str(&mut editor, "wh");
        assert!(editor.engine().is_active());

        editor.handle_key(key(KeyCode::Backspace)).unwrap();
        assert!(!editor.engine().is_active());
    }

    #[test]
    fn test_arrows_cycle_while_active() {
        let mut editor = editor("", &["sizeof", "size"]);
        type_str(&mut editor, "si");
        assert_eq!(editor.engine().current_suggestions(), &["size", "sizeof"]);

        editor.handle_key(key(KeyCode::Down)).unwrap();
        editor.handle_key(key(KeyCode::Left)).unwrap();
        assert_eq!(editor.buffer().cursor(), Position::new(0, 2));
        editor.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(editor.buffer().rows(), &["sizeof"]);
    }

    #[test]
    fn test_esc_dismisses_and_enter_splits() {
        let mut editor = editor("", &["return"]);
        type_str(&mut editor, "re");
        editor.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(!editor.engine().is_active());

        editor.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(editor.buffer().rows(), &["re", ""]);
    }

    #[test]
    fn test_search_moves_and_cancel_restores() {
        let mut editor = editor("int a;\nreturn a;", &[]);
        editor.handle_key(ctrl('l')).unwrap();
        type_str(&mut editor, "ret");
        assert_eq!(editor.buffer().cursor(), Position::new(1, 3));
        assert_eq!(
            editor.search().unwrap().matched,
            Some((Position::new(1, 0), 3))
        );

        editor.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(editor.search().is_none());
        assert_eq!(editor.buffer().cursor(), Position::new(0, 0));
    }

    #[test]
    fn test_kill_line_resyncs_mirror() {
        let mut editor = editor("int a;\nint b;", &[]);
        editor.handle_key(ctrl('k')).unwrap();
        assert_eq!(editor.engine().mirror().text(), "\nint b;");
    }
}
