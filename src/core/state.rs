//! # Workflow State
//!
//! All mutable state the interactive workflow carries between stages.
//! Presentation state (cursors, scroll offsets) lives in the `tui` module;
//! this struct is what the reducer reads and writes.
//!
//! ```text
//! Workflow
//! ├── stage: Stage                 // which screen is active
//! ├── query: String                // trimmed search text
//! ├── series: String               // chosen series display title
//! ├── results: Vec<Entry>          // search results
//! ├── chapters: Vec<Entry>         // chapter list of the chosen series
//! ├── chapters_version: u64        // bumped on every chapter list swap
//! ├── selected: HashSet<usize>     // chapter indices marked for download
//! ├── fraction / label             // outer download progress
//! ├── pages / assembling           // per-chapter download progress
//! ├── status: String               // transient status line ("Loading…")
//! └── failure: Option<String>      // last background failure, if any
//! ```
//!
//! State changes only happen through `update(workflow, event)` in update.rs.

use std::collections::HashSet;

use crate::catalog::Entry;

/// One discrete mode of the workflow, with its own input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Typing a query into the search box.
    Search,
    /// Waiting for the search fan-out to report back.
    Searching,
    /// Picking a series from the search results.
    SeriesSelect,
    /// Marking chapters of the chosen series.
    ChapterSelect,
    /// Confirming the selection before the batch starts.
    Confirm,
    /// Watching the download batch run.
    Download,
    /// Batch finished; offering a way back.
    Done,
}

pub struct Workflow {
    pub stage: Stage,
    pub query: String,
    pub series: String,
    pub results: Vec<Entry>,
    pub chapters: Vec<Entry>,
    /// Incremented whenever `chapters` is replaced. Selection indices are
    /// only meaningful for the version they were recorded against.
    pub chapters_version: u64,
    pub selected: HashSet<usize>,
    pub fraction: f64,
    pub label: String,
    pub pages: usize,
    pub assembling: bool,
    pub status: String,
    pub failure: Option<String>,
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            stage: Stage::Search,
            query: String::new(),
            series: String::new(),
            results: Vec::new(),
            chapters: Vec::new(),
            chapters_version: 0,
            selected: HashSet::new(),
            fraction: 0.0,
            label: String::new(),
            pages: 0,
            assembling: false,
            status: String::new(),
            failure: None,
        }
    }

    /// Replace the chapter list. Invalidates the selection: old indices
    /// pointed into a list that no longer exists.
    pub fn replace_chapters(&mut self, chapters: Vec<Entry>) {
        self.chapters = chapters;
        self.chapters_version += 1;
        self.selected.clear();
    }

    /// Toggle one chapter in or out of the selection. Indices outside the
    /// current list are rejected rather than trusted.
    pub fn toggle(&mut self, index: usize) {
        if index >= self.chapters.len() {
            return;
        }
        if !self.selected.remove(&index) {
            self.selected.insert(index);
        }
    }

    /// Toggle every chapter index in or out of the selection.
    pub fn toggle_all(&mut self) {
        for index in 0..self.chapters.len() {
            if !self.selected.remove(&index) {
                self.selected.insert(index);
            }
        }
    }

    /// Selected chapters in display order.
    pub fn selected_chapters(&self) -> Vec<Entry> {
        let mut indices: Vec<usize> = self.selected.iter().copied().collect();
        indices.sort_unstable();
        indices
            .into_iter()
            .filter_map(|i| self.chapters.get(i).cloned())
            .collect()
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}
