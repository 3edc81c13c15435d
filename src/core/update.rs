//! # The Reducer
//!
//! `update(workflow, event)` is the single entry point for state change.
//! It dispatches to one private handler per stage; each handler pattern
//! matches on the event, mutates the workflow, and returns the background
//! commands the platform layer must run.
//!
//! Events a stage does not recognize are returned to the caller untouched
//! (as an empty command list); the widget layer gives them to the focused
//! widget for default handling, so nothing is ever swallowed here.

use log::debug;

use crate::core::event::{CatalogAction, CatalogPayload, Command, Event};
use crate::core::state::{Stage, Workflow};

pub fn update(wf: &mut Workflow, event: Event) -> Vec<Command> {
    // Quit terminates from every stage, whatever else is going on.
    if event == Event::Quit {
        return vec![Command::Quit];
    }

    debug!("update: stage={:?} event={:?}", wf.stage, event);

    match wf.stage {
        Stage::Search => search(wf, event),
        Stage::Searching => searching(wf, event),
        Stage::SeriesSelect => series_select(wf, event),
        Stage::ChapterSelect => chapter_select(wf, event),
        Stage::Confirm => confirm(wf, event),
        Stage::Download => download(wf, event),
        Stage::Done => done(wf, event),
    }
}

fn search(wf: &mut Workflow, event: Event) -> Vec<Command> {
    match event {
        // From the search box, going back means leaving the program.
        Event::Back => vec![Command::Quit],
        Event::Submit(text) => {
            wf.query = text.trim().to_string();
            wf.failure = None;
            wf.stage = Stage::Searching;
            vec![
                Command::Search {
                    query: wf.query.clone(),
                },
                Command::AwaitCatalog,
            ]
        }
        _ => Vec::new(),
    }
}

fn searching(wf: &mut Workflow, event: Event) -> Vec<Command> {
    match event {
        Event::Back => {
            wf.stage = Stage::Search;
            vec![Command::CancelCatalog]
        }
        Event::Catalog(CatalogPayload::SearchResults(entries)) => {
            wf.results = entries;
            wf.stage = Stage::SeriesSelect;
            Vec::new()
        }
        Event::Catalog(CatalogPayload::Failed {
            action: CatalogAction::Search,
            reason,
        }) => {
            wf.failure = Some(reason);
            wf.stage = Stage::Search;
            Vec::new()
        }
        // A chapter payload here is a leftover from a series we already
        // navigated away from. Drop it and listen again for the search.
        Event::Catalog(_) => vec![Command::AwaitCatalog],
        _ => Vec::new(),
    }
}

fn series_select(wf: &mut Workflow, event: Event) -> Vec<Command> {
    match event {
        Event::Catalog(CatalogPayload::Chapters(entries)) => {
            wf.replace_chapters(entries);
            wf.status.clear();
            wf.stage = Stage::ChapterSelect;
            Vec::new()
        }
        Event::Catalog(CatalogPayload::Failed {
            action: CatalogAction::Chapters,
            reason,
        }) => {
            wf.status.clear();
            wf.failure = Some(reason);
            Vec::new()
        }
        // Stale search payload; keep listening in case chapters are coming.
        Event::Catalog(_) => vec![Command::AwaitCatalog],
        Event::Back => {
            wf.stage = Stage::Search;
            Vec::new()
        }
        Event::Choose(None) => Vec::new(),
        Event::Choose(Some(index)) => match wf.results.get(index) {
            Some(entry) => {
                wf.series = entry.title.clone();
                wf.status = String::from("Loading...");
                wf.failure = None;
                vec![
                    Command::FetchChapters {
                        entry: entry.clone(),
                    },
                    Command::AwaitCatalog,
                ]
            }
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn chapter_select(wf: &mut Workflow, event: Event) -> Vec<Command> {
    match event {
        Event::Back => {
            wf.stage = Stage::SeriesSelect;
            wf.selected.clear();
            Vec::new()
        }
        Event::Confirm => {
            if wf.selected.is_empty() {
                wf.status = String::from("Nothing selected");
                return Vec::new();
            }
            wf.status.clear();
            wf.stage = Stage::Confirm;
            Vec::new()
        }
        Event::ToggleAll => {
            wf.toggle_all();
            Vec::new()
        }
        Event::Toggle(index) => {
            wf.toggle(index);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn confirm(wf: &mut Workflow, event: Event) -> Vec<Command> {
    match event {
        Event::Back => {
            wf.stage = Stage::ChapterSelect;
            Vec::new()
        }
        Event::Confirm => {
            wf.fraction = 0.0;
            wf.label.clear();
            wf.pages = 0;
            wf.assembling = false;
            wf.stage = Stage::Download;
            vec![
                Command::Download {
                    series: wf.series.clone(),
                    chapters: wf.selected_chapters(),
                },
                Command::AwaitProgress,
                Command::AwaitPages,
            ]
        }
        _ => Vec::new(),
    }
}

fn download(wf: &mut Workflow, event: Event) -> Vec<Command> {
    match event {
        Event::Progress(info) => {
            if info.fraction >= 1.0 {
                wf.fraction = 1.0;
                wf.label = info.label;
                wf.stage = Stage::Done;
                return Vec::new();
            }
            wf.fraction = info.fraction;
            wf.label = info.label;
            vec![Command::AwaitProgress, Command::AwaitPages]
        }
        Event::Pages(info) => {
            wf.pages = info.pages;
            wf.assembling = info.assembling;
            vec![Command::AwaitProgress, Command::AwaitPages]
        }
        _ => Vec::new(),
    }
}

fn done(wf: &mut Workflow, event: Event) -> Vec<Command> {
    match event {
        Event::Back => {
            wf.stage = Stage::ChapterSelect;
            Vec::new()
        }
        _ => Vec::new(),
    }
}
