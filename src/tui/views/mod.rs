//! TUI Views module
//!
//! Widgets composed by the browser: the breadcrumb bar, entity panes,
//! the children list, the mobile tab bar and the error banner.

mod entity_list;
mod hierarchy;

pub use entity_list::EntityListView;
pub use hierarchy::{render_breadcrumb, render_entity_pane, render_error, render_tabs};
