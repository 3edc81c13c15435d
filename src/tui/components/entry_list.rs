//! # EntryList Component
//!
//! Selectable list over catalog entries, used for both the series results
//! and the chapter list. Follows the persistent state + transient wrapper
//! pattern:
//! - `EntryListState` lives in the widget set across frames
//! - `EntryList` is created each frame with borrowed state and props
//!
//! The chapter variant renders a selection mark per row; marks are derived
//! from the workflow's selection set every frame, so they can never drift
//! out of step with it.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::catalog::Entry;

/// Persistent cursor state for one list.
pub struct EntryListState {
    pub cursor: usize,
    pub list_state: ListState,
}

impl EntryListState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            cursor: 0,
            list_state,
        }
    }

    /// Reset the cursor to the first row.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.list_state.select(Some(0));
    }

    /// The cursor position, if it points at a real row.
    pub fn selected(&self, len: usize) -> Option<usize> {
        (self.cursor < len).then_some(self.cursor)
    }

    /// Default navigation for keys the key map did not claim.
    pub fn handle_key(&mut self, key: &KeyEvent, len: usize) {
        if len == 0 {
            return;
        }
        match key.code {
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => self.cursor = (self.cursor + 1).min(len - 1),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len - 1,
            _ => return,
        }
        self.list_state.select(Some(self.cursor));
    }
}

impl Default for EntryListState {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient render wrapper.
pub struct EntryList<'a> {
    state: &'a mut EntryListState,
    entries: &'a [Entry],
    title: String,
    marks: Option<&'a HashSet<usize>>,
    status: Option<&'a str>,
}

impl<'a> EntryList<'a> {
    pub fn new(state: &'a mut EntryListState, entries: &'a [Entry], title: String) -> Self {
        Self {
            state,
            entries,
            title,
            marks: None,
            status: None,
        }
    }

    /// Render a `[x]` mark column driven by the given selection set.
    pub fn with_marks(mut self, marks: &'a HashSet<usize>) -> Self {
        self.marks = Some(marks);
        self
    }

    /// Show a transient status (e.g. a loading spinner) in the title row.
    pub fn with_status(mut self, status: &'a str) -> Self {
        self.status = Some(status);
        self
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        // Keep the cursor inside the list even after the entries shrank.
        if !self.entries.is_empty() && self.state.cursor >= self.entries.len() {
            self.state.cursor = self.entries.len() - 1;
            self.state.list_state.select(Some(self.state.cursor));
        }

        let mut title = format!(" {} ", self.title);
        if let Some(status) = self.status {
            if !status.is_empty() {
                title.push_str(&format!("· {status} "));
            }
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title);

        if self.entries.is_empty() {
            let empty = List::new([ListItem::new(Line::from(Span::styled(
                "Nothing here",
                Style::default().fg(Color::DarkGray),
            )))])
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == self.state.cursor {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };

                let mut spans = Vec::new();
                if let Some(marks) = self.marks {
                    let mark = if marks.contains(&i) { "[x] " } else { "[ ] " };
                    let mark_style = if i == self.state.cursor {
                        style
                    } else if marks.contains(&i) {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    spans.push(Span::styled(mark, mark_style));
                }
                spans.push(Span::styled(entry.title.clone(), style));
                if !entry.detail.is_empty() {
                    let detail_style = if i == self.state.cursor {
                        style
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    spans.push(Span::styled(format!("  {}", entry.detail), detail_style));
                }

                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
