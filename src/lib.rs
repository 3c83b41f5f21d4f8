//! paper-heart: a flipbook greeting card for the terminal.

pub mod audio;
pub mod content;
pub mod hearts;
pub mod report;
pub mod timer;
pub mod tui;
