//! # ProgressView Component
//!
//! Download-stage readout: outer gauge over the chapter batch plus the
//! per-chapter page counter. Purely presentational; all fields are props
//! copied from the workflow each frame.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::tui::component::Component;
use crate::tui::components::spinner;

pub struct ProgressView {
    pub fraction: f64,
    pub label: String,
    pub pages: usize,
    pub assembling: bool,
    pub spinner_tick: usize,
}

impl Component for ProgressView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [current_area, gauge_area, pages_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        let current = if self.label.is_empty() {
            Line::from(Span::styled(
                format!("{} Starting…", spinner::frame(self.spinner_tick)),
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from(vec![
                Span::styled(
                    format!("{} ", spinner::frame(self.spinner_tick)),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw("Downloading "),
                Span::styled(self.label.clone(), Style::default().fg(Color::Cyan)),
            ])
        };
        frame.render_widget(Paragraph::new(current), current_area);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(self.fraction.clamp(0.0, 1.0));
        frame.render_widget(gauge, gauge_area);

        let pages = if self.assembling {
            format!("{} pages fetched · assembling…", self.pages)
        } else {
            format!("{} pages fetched", self.pages)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(pages, Style::default().fg(Color::DarkGray))),
            pages_area,
        );
    }
}
