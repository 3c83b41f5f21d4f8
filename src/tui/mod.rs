//! TUI module for the interactive card.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: Pure data types (Card, Action, Transition)
//! - `book`: Book view logic (gestures, stacking, the evasive button)
//! - `update`: Pure transitions (the root controller)
//! - `layout`, `view`: Pure geometry and rendering
//! - `run`: Effects (terminal, timers, audio)

pub mod book;
pub mod layout;
pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;
