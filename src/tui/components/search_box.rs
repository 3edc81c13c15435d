//! # SearchBox Component
//!
//! Single-line text input for the query. Holds the buffer and cursor as
//! persistent state; every key the key map did not claim while the search
//! stage is active lands here for default editing behaviour.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;

pub struct SearchBox {
    buffer: String,
    /// Byte offset of the cursor within `buffer`, always on a char boundary.
    cursor: usize,
}

impl SearchBox {
    pub fn new(initial: Option<String>) -> Self {
        let buffer = initial.unwrap_or_default();
        let cursor = buffer.len();
        Self { buffer, cursor }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Default editing for keys the key map did not claim.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            KeyCode::Backspace => {
                if let Some(prev) = self.prev_boundary() {
                    self.buffer.remove(prev);
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.buffer.len() {
                    self.buffer.remove(self.cursor);
                }
            }
            KeyCode::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.buffer.len(),
            _ => {}
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.buffer[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

impl Component for SearchBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(ratatui::widgets::BorderType::Rounded)
            .title("Search");

        let input = Paragraph::new(self.buffer.as_str())
            .block(block)
            .style(Style::default().fg(Color::Green));

        frame.render_widget(input, area);

        // Cursor sits after the border, offset by the display width of the
        // text left of it.
        let before = &self.buffer[..self.cursor];
        let x = area.x + 1 + UnicodeWidthStr::width(before) as u16;
        let x = x.min(area.x + area.width.saturating_sub(2));
        frame.set_cursor_position((x, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn typed(text: &str) -> SearchBox {
        let mut input = SearchBox::new(None);
        for c in text.chars() {
            input.handle_key(&press(KeyCode::Char(c)));
        }
        input
    }

    #[test]
    fn test_typing_appends_at_cursor() {
        let input = typed("naruto");
        assert_eq!(input.text(), "naruto");
    }

    #[test]
    fn test_backspace_removes_before_cursor() {
        let mut input = typed("abc");
        input.handle_key(&press(KeyCode::Backspace));
        assert_eq!(input.text(), "ab");
    }

    #[test]
    fn test_cursor_movement_and_mid_insert() {
        let mut input = typed("ac");
        input.handle_key(&press(KeyCode::Left));
        input.handle_key(&press(KeyCode::Char('b')));
        assert_eq!(input.text(), "abc");
    }

    #[test]
    fn test_multibyte_editing_stays_on_boundaries() {
        let mut input = typed("日本語");
        input.handle_key(&press(KeyCode::Backspace));
        assert_eq!(input.text(), "日本");
        input.handle_key(&press(KeyCode::Home));
        input.handle_key(&press(KeyCode::Delete));
        assert_eq!(input.text(), "本");
    }

    #[test]
    fn test_control_chords_do_not_type() {
        let mut input = typed("x");
        input.handle_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(input.text(), "x");
    }

    #[test]
    fn test_prefill_places_cursor_at_end() {
        let mut input = SearchBox::new(Some("berserk".into()));
        input.handle_key(&press(KeyCode::Char('!')));
        assert_eq!(input.text(), "berserk!");
    }
}
