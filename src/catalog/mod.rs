//! Catalog sources: where series and chapters come from.
//!
//! The rest of the crate only ever talks to the [`Source`] trait; concrete
//! implementations live under `sources/` and are constructed by name from
//! the configured source list.

pub mod source;
pub mod sources;
pub mod types;

pub use source::{Source, SourceError};
pub use sources::MangaDex;
pub use types::{Entry, PageRef};
