//! Terminal User Interface module for Trackwise
//!
//! Keyboard-driven browser over the hierarchy. Resolutions run in the
//! background while the UI stays responsive; the terminal width picks the
//! desktop, tablet or mobile layout.

#[cfg(feature = "tui")]
mod app;
#[cfg(feature = "tui")]
mod views;

#[cfg(feature = "tui")]
pub use app::{BrowseApp, BrowseOptions, run_tui};
