//! # Events and Commands
//!
//! Everything that can happen in the workflow becomes an [`Event`].
//! User confirms the search box? That's `Event::Submit(text)`.
//! The search fan-out reports back? That's `Event::Catalog(..)`.
//!
//! The `update()` function in update.rs takes the current workflow and an
//! event, mutates the workflow, and returns the [`Command`]s the platform
//! layer must execute. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! Workflow + Event  →  update()  →  Vec<Command>
//! ```
//!
//! The interface layer resolves raw key presses through the configured key
//! map and attaches whatever payload the focused widget exposes (input
//! text, list cursor), so the reducer only ever sees symbolic events.

use crate::catalog::Entry;
use crate::download::PageInfo;

/// Which catalog request a payload answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAction {
    Search,
    Chapters,
}

/// A delivery on the catalog channel. The tag travels with the payload, so
/// a late search response can never be mistaken for a chapter list no
/// matter which stage happens to be listening.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogPayload {
    SearchResults(Vec<Entry>),
    Chapters(Vec<Entry>),
    Failed {
        action: CatalogAction,
        reason: String,
    },
}

/// Outer download-loop progress: fraction of chapters completed plus the
/// label of the chapter the loop is currently on.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    pub fraction: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Terminal resized. Layout is the widget layer's job; the reducer
    /// treats this as a no-op everywhere.
    Resize,
    Quit,
    Back,
    /// Search box confirmed with its current text.
    Submit(String),
    /// A series picked from the results list (`None` when the list is empty).
    Choose(Option<usize>),
    /// Toggle one chapter at the given list position.
    Toggle(usize),
    /// Toggle every chapter.
    ToggleAll,
    /// Stage-level confirmation (chapter list → prompt, prompt → download).
    Confirm,
    Catalog(CatalogPayload),
    Progress(ProgressInfo),
    Pages(PageInfo),
}

/// Background work the reducer asks the platform layer to run. Commands
/// never carry results back; results arrive later as [`Event`]s through
/// the workflow channels.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    /// Fan a search out across every configured source.
    Search { query: String },
    /// Fetch the chapter list of one chosen series.
    FetchChapters { entry: Entry },
    /// Run the download batch over the selected chapters.
    Download {
        series: String,
        chapters: Vec<Entry>,
    },
    /// Arm the one-shot relay on the catalog channel.
    AwaitCatalog,
    /// Arm the one-shot relay on the progress channel.
    AwaitProgress,
    /// Arm the one-shot relay on the page channel.
    AwaitPages,
    /// Cancel the in-flight catalog task; its relay stays armed for reuse.
    CancelCatalog,
}
