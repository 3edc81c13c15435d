//! Per-stage rendering. Pure presentation: reads the workflow and the
//! widget states, draws one frame, mutates nothing but widget cursors.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{Stage, Workflow};
use crate::tui::Widgets;
use crate::tui::component::Component;
use crate::tui::components::{EntryList, ProgressView, spinner};

pub fn draw_ui(frame: &mut Frame, wf: &Workflow, widgets: &mut Widgets, spinner_tick: usize) {
    let [header_area, body_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, wf, header_area);

    match wf.stage {
        Stage::Search => draw_search(frame, wf, widgets, body_area),
        Stage::Searching => draw_searching(frame, wf, body_area, spinner_tick),
        Stage::SeriesSelect => draw_series(frame, wf, widgets, body_area, spinner_tick),
        Stage::ChapterSelect => draw_chapters(frame, wf, widgets, body_area),
        Stage::Confirm => draw_confirm(frame, wf, body_area),
        Stage::Download => draw_download(frame, wf, body_area, spinner_tick),
        Stage::Done => draw_done(frame, body_area),
    }

    draw_help(frame, wf.stage, help_area);
}

fn draw_header(frame: &mut Frame, wf: &Workflow, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " tome ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(stage_title(wf.stage), Style::default().fg(Color::Gray)),
    ];
    if let Some(failure) = &wf.failure {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            truncate(failure, 60),
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Search => "Search",
        Stage::Searching => "Searching",
        Stage::SeriesSelect => "Pick a series",
        Stage::ChapterSelect => "Pick chapters",
        Stage::Confirm => "Confirm",
        Stage::Download => "Downloading",
        Stage::Done => "Done",
    }
}

fn draw_search(frame: &mut Frame, wf: &Workflow, widgets: &mut Widgets, area: Rect) {
    let [input_area, hint_area, _] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    widgets.input.render(frame, input_area);

    let hint = if wf.failure.is_some() {
        Span::styled(
            "Search failed; adjust the query and try again",
            Style::default().fg(Color::Red),
        )
    } else {
        Span::styled(
            "Type a series name and press Enter",
            Style::default().fg(Color::DarkGray),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), hint_area);
}

fn draw_searching(frame: &mut Frame, wf: &Workflow, area: Rect, spinner_tick: usize) {
    let line = Line::from(vec![
        Span::styled(
            format!("{} ", spinner::frame(spinner_tick)),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("Searching for "),
        Span::styled(
            format!("'{}'", truncate(&wf.query, 40)),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("…"),
    ]);
    frame.render_widget(
        Paragraph::new(line).alignment(Alignment::Center),
        vertical_slot(area, 1),
    );
}

fn draw_series(
    frame: &mut Frame,
    wf: &Workflow,
    widgets: &mut Widgets,
    area: Rect,
    spinner_tick: usize,
) {
    let title = format!("Series · {}", truncate(&wf.query, 30));
    let status = if wf.status.is_empty() {
        String::new()
    } else {
        format!("{} {}", spinner::frame(spinner_tick), wf.status)
    };
    EntryList::new(&mut widgets.series, &wf.results, title)
        .with_status(&status)
        .render(frame, area);
}

fn draw_chapters(frame: &mut Frame, wf: &Workflow, widgets: &mut Widgets, area: Rect) {
    let title = format!("Chapters · {}", truncate(&wf.series, 30));
    let status = if wf.status.is_empty() {
        format!("{} selected", wf.selected.len())
    } else {
        wf.status.clone()
    };
    EntryList::new(&mut widgets.chapters, &wf.chapters, title)
        .with_marks(&wf.selected)
        .with_status(&status)
        .render(frame, area);
}

fn draw_confirm(frame: &mut Frame, wf: &Workflow, area: Rect) {
    let question = format!(
        "Download {} chapter{} of '{}'?",
        wf.selected.len(),
        if wf.selected.len() == 1 { "" } else { "s" },
        truncate(&wf.series, 40),
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            question,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        vertical_slot(area, 1),
    );
}

fn draw_download(frame: &mut Frame, wf: &Workflow, area: Rect, spinner_tick: usize) {
    let slot = vertical_slot(area, 5);
    let [_, middle, _] = Layout::horizontal([
        Constraint::Percentage(10),
        Constraint::Percentage(80),
        Constraint::Percentage(10),
    ])
    .areas(slot);

    ProgressView {
        fraction: wf.fraction,
        label: wf.label.clone(),
        pages: wf.pages,
        assembling: wf.assembling,
        spinner_tick,
    }
    .render(frame, middle);
}

fn draw_done(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Download complete",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        vertical_slot(area, 1),
    );
}

fn draw_help(frame: &mut Frame, stage: Stage, area: Rect) {
    let help = match stage {
        Stage::Search => "Enter Search · Esc Quit",
        Stage::Searching => "Esc Back · Ctrl+C Quit",
        Stage::SeriesSelect => "↑↓ Navigate · Enter Select · Esc Back",
        Stage::ChapterSelect => "Space Mark · a Mark all · Enter Continue · Esc Back",
        Stage::Confirm => "Enter Download · Esc Back",
        Stage::Download => "Ctrl+C Quit",
        Stage::Done => "Esc Back to chapters · Ctrl+C Quit",
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            help,
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center),
        area,
    );
}

/// A horizontally full, vertically centered slot of the given height.
fn vertical_slot(area: Rect, height: u16) -> Rect {
    let [_, slot, _] = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(height),
        Constraint::Min(0),
    ])
    .areas(area);
    slot
}

/// Truncate a string to fit within `max_width` chars, adding "..." if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        ".".repeat(max_width)
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_strings_untouched() {
        assert_eq!(truncate("naruto", 30), "naruto");
    }

    #[test]
    fn test_truncate_long_strings_get_ellipsis() {
        assert_eq!(truncate("a very long series title", 10), "a very ...");
    }

    #[test]
    fn test_truncate_multibyte_respects_char_boundaries() {
        assert_eq!(truncate("日本語のタイトルです", 7), "日本語の...");
    }
}
