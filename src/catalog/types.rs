//! Data types shared across the catalog boundary.

/// One row in a catalog listing: a series when it came from a search, a
/// chapter when it came from a series feed. Plain data: the originating
/// source is carried by name so entries can cross channels freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Name of the source this entry came from (e.g. "mangadex").
    pub source: String,
    /// Source-side identifier, opaque to the rest of the crate.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Secondary display line (year and status for a series, page count
    /// for a chapter). Purely informational.
    pub detail: String,
}

/// One downloadable page of a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRef {
    pub url: String,
    /// Filename the page should be stored under; prefixed so lexical
    /// order matches reading order.
    pub filename: String,
}
