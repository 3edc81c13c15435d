//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core events.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! One cooperative loop owns every piece of visible state:
//!
//! 1. poll crossterm events, resolve keys through the configured key map,
//!    attach the focused widget's payload and feed the reducer;
//! 2. drain relay deliveries from the interface queue and feed those too;
//! 3. execute whatever commands the reducer returned (spawn tasks, arm
//!    relays, cancel, quit).
//!
//! Keys the key map does not claim fall through to the focused widget
//! (text editing in the search box, cursor movement in the lists), so the
//! loop never swallows input it does not understand.
//!
//! ## Redraw Strategy
//!
//! Conditional redraw to avoid unnecessary work: while a spinner or the
//! download gauge is animating the loop draws at ~12fps; otherwise it
//! sleeps up to 250ms and only redraws on events.

pub mod component;
pub mod components;
pub mod event;
pub mod tasks;
mod ui;

use std::io::{self, stdout};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::cursor::SetCursorStyle;
use crossterm::event::KeyEvent;
use crossterm::execute;
use log::{debug, info};

use crate::catalog::Source;
use crate::core::config::ResolvedConfig;
use crate::core::event::Event;
use crate::core::state::{Stage, Workflow};
use crate::core::update::update;
use crate::tui::components::{EntryListState, SearchBox};
use crate::tui::event::{
    KeyMap, SymbolicAction, TuiEvent, poll_event_immediate, poll_event_timeout,
};
use crate::tui::tasks::Launcher;

/// Persistent widget state: the search input and the two list cursors.
pub struct Widgets {
    pub input: SearchBox,
    pub series: EntryListState,
    pub chapters: EntryListState,
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Steady block cursor: avoids blink timer reset from continuous redraws
        execute!(stdout(), SetCursorStyle::SteadyBlock)?;
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), SetCursorStyle::DefaultUserShape);
    }
}

pub fn run(
    config: ResolvedConfig,
    sources: Vec<Arc<dyn Source>>,
    initial_query: Option<String>,
) -> io::Result<()> {
    let keymap = KeyMap::from_config(&config);
    let mut wf = Workflow::new();
    let mut widgets = Widgets {
        input: SearchBox::new(initial_query),
        series: EntryListState::new(),
        chapters: EntryListState::new(),
    };

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Interface queue: relays push here, the loop drains.
    let (tx, rx) = mpsc::channel::<Event>();
    let mut launcher = Launcher::new(tx, sources, config.library_dir.clone());

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut should_quit = false;

    loop {
        let animating = matches!(wf.stage, Stage::Searching | Stage::Download)
            || (wf.stage == Stage::SeriesSelect && !wf.status.is_empty());
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_tick = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &wf, &mut widgets, spinner_tick))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating, long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(250)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain all pending events before next draw
        for tui_event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let event = match tui_event {
                TuiEvent::Resize => Some(Event::Resize),
                TuiEvent::Key(key) => translate_key(&key, &keymap, &wf, &mut widgets),
            };
            if let Some(event) = event {
                if process(event, &mut wf, &mut widgets, &mut launcher) {
                    should_quit = true;
                }
            }
        }
        if should_quit {
            break;
        }

        // Handle deliveries from background relays
        while let Ok(event) = rx.try_recv() {
            needs_redraw = true;
            debug!("Relay delivered: {:?}", event);
            launcher.note_delivery(&event);
            if process(event, &mut wf, &mut widgets, &mut launcher) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }
    }

    ratatui::restore();
    info!("Tome exiting");
    Ok(())
}

/// Run one event through the reducer and execute the commands it returns.
/// Returns true when the program should terminate.
fn process(
    event: Event,
    wf: &mut Workflow,
    widgets: &mut Widgets,
    launcher: &mut Launcher,
) -> bool {
    let stage_before = wf.stage;
    let version_before = wf.chapters_version;
    let commands = update(wf, event);
    sync_widgets(stage_before, version_before, wf, widgets);
    launcher.execute(commands)
}

/// Cursor housekeeping the reducer cannot do itself: leaving a list stage
/// or replacing the chapter list puts the matching cursor back on row one.
fn sync_widgets(before: Stage, version_before: u64, wf: &Workflow, widgets: &mut Widgets) {
    if wf.stage != before
        && matches!(
            (before, wf.stage),
            (Stage::SeriesSelect, Stage::Search) | (Stage::Searching, Stage::SeriesSelect)
        )
    {
        widgets.series.reset();
    }
    if wf.chapters_version != version_before {
        widgets.chapters.reset();
    }
}

/// Resolve a key press into a core event, or hand it to the focused widget
/// when the key map does not claim it.
fn translate_key(
    key: &KeyEvent,
    keymap: &KeyMap,
    wf: &Workflow,
    widgets: &mut Widgets,
) -> Option<Event> {
    match keymap.resolve(wf.stage, key) {
        Some(SymbolicAction::Quit) => Some(Event::Quit),
        Some(SymbolicAction::Back) => Some(Event::Back),
        Some(SymbolicAction::Confirm) => match wf.stage {
            Stage::Search => Some(Event::Submit(widgets.input.text().to_string())),
            Stage::SeriesSelect => Some(Event::Choose(widgets.series.selected(wf.results.len()))),
            Stage::ChapterSelect | Stage::Confirm => Some(Event::Confirm),
            _ => None,
        },
        Some(SymbolicAction::Select) => match wf.stage {
            Stage::SeriesSelect => Some(Event::Choose(widgets.series.selected(wf.results.len()))),
            Stage::ChapterSelect => widgets
                .chapters
                .selected(wf.chapters.len())
                .map(Event::Toggle),
            _ => None,
        },
        Some(SymbolicAction::SelectAll) => {
            (wf.stage == Stage::ChapterSelect).then_some(Event::ToggleAll)
        }
        None => {
            // Unclaimed keys go to the focused widget for default handling.
            match wf.stage {
                Stage::Search => widgets.input.handle_key(key),
                Stage::SeriesSelect => widgets.series.handle_key(key, wf.results.len()),
                Stage::ChapterSelect => widgets.chapters.handle_key(key, wf.chapters.len()),
                _ => {}
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    use crate::core::config::{TomeConfig, resolve};
    use crate::test_support::series;

    fn fixture() -> (KeyMap, Workflow, Widgets) {
        let resolved = resolve(&TomeConfig::default(), None, &[]);
        let keymap = KeyMap::from_config(&resolved);
        let wf = Workflow::new();
        let widgets = Widgets {
            input: SearchBox::new(None),
            series: EntryListState::new(),
            chapters: EntryListState::new(),
        };
        (keymap, wf, widgets)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_confirm_in_search_carries_the_input_text() {
        let (keymap, wf, mut widgets) = fixture();
        for c in "berserk".chars() {
            widgets.input.handle_key(&press(KeyCode::Char(c)));
        }

        let event = translate_key(&press(KeyCode::Enter), &keymap, &wf, &mut widgets);
        assert_eq!(event, Some(Event::Submit("berserk".into())));
    }

    #[test]
    fn test_unclaimed_keys_fall_through_to_the_search_box() {
        let (keymap, wf, mut widgets) = fixture();

        let event = translate_key(&press(KeyCode::Char('q')), &keymap, &wf, &mut widgets);
        assert_eq!(event, None);
        assert_eq!(widgets.input.text(), "q");
    }

    #[test]
    fn test_confirm_in_series_select_carries_the_cursor() {
        let (keymap, mut wf, mut widgets) = fixture();
        wf.stage = Stage::SeriesSelect;
        wf.results = vec![series("A"), series("B")];
        widgets.series.handle_key(&press(KeyCode::Down), 2);

        let event = translate_key(&press(KeyCode::Enter), &keymap, &wf, &mut widgets);
        assert_eq!(event, Some(Event::Choose(Some(1))));
    }

    #[test]
    fn test_confirm_on_an_empty_series_list_chooses_nothing() {
        let (keymap, mut wf, mut widgets) = fixture();
        wf.stage = Stage::SeriesSelect;

        let event = translate_key(&press(KeyCode::Enter), &keymap, &wf, &mut widgets);
        assert_eq!(event, Some(Event::Choose(None)));
    }

    #[test]
    fn test_select_all_only_applies_to_the_chapter_list() {
        let (keymap, mut wf, mut widgets) = fixture();
        wf.stage = Stage::SeriesSelect;
        assert_eq!(
            translate_key(&press(KeyCode::Char('a')), &keymap, &wf, &mut widgets),
            None
        );

        wf.stage = Stage::ChapterSelect;
        assert_eq!(
            translate_key(&press(KeyCode::Char('a')), &keymap, &wf, &mut widgets),
            Some(Event::ToggleAll)
        );
    }
}
