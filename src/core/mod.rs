//! # Core Workflow Logic
//!
//! This module contains Tome's workflow logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Workflow (state)     │
//!                    │  • Event (inputs)       │
//!                    │  • update() (reducer)   │
//!                    │  • Command (outputs)    │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │  catalog   │      │  download  │
//!     │  adapter   │      │  sources   │      │   tasks    │
//!     │ (ratatui)  │      │ (reqwest)  │      │ (reqwest)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! The reducer never performs I/O itself: it mutates the [`state::Workflow`]
//! and hands back [`event::Command`]s describing the background work the
//! platform layer must launch. Results of that work come back as
//! [`event::Event`]s through the same reducer.
//!
//! ## Modules
//!
//! - [`state`]: the `Workflow` struct and the `Stage` enum
//! - [`event`]: everything that can happen, and everything we can ask for
//! - [`update`]: the reducer, one handler per stage
//! - [`config`]: file/env/CLI configuration, including key bindings

pub mod config;
pub mod event;
pub mod state;
pub mod update;
