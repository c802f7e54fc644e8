//! Navigation through the hierarchy.
//!
//! - `route` - The `(type, id)` key the session watches, and its path form
//! - `state` - What the display panes show
//! - `session` - Request sequencing, load status, history and error presentation
//! - `controller` - Turns parent/child/breadcrumb clicks into navigation

mod controller;
mod route;
mod session;
mod state;

pub use controller::NavigationController;
pub use route::{ROUTE_PREFIX, Route, RouteKey};
pub use session::{
    ApplyOutcome, ErrorView, LoadStatus, NavigationSession, RecoveryAction, Resolution, Ticket,
};
pub use state::HierarchyViewState;
