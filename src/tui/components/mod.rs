//! # TUI Components
//!
//! Each component file contains everything related to that component:
//! state types, rendering logic, event handling, and tests.
//!
//! ```text
//! components/
//! ├── mod.rs            (this file)
//! ├── search_box.rs     (single-line query input)
//! ├── entry_list.rs     (selectable list, optionally with marks)
//! ├── spinner.rs        (inline frame-cycling spinner)
//! └── progress_view.rs  (download gauge + page readout)
//! ```
//!
//! `search_box` and `entry_list` hold persistent state (buffer, cursor)
//! that survives across frames; `spinner` and `progress_view` are purely
//! presentational and receive everything as props.

pub mod entry_list;
pub mod progress_view;
pub mod search_box;
pub mod spinner;

pub use entry_list::{EntryList, EntryListState};
pub use progress_view::ProgressView;
pub use search_box::SearchBox;
