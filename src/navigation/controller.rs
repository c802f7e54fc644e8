//! Translates clicks on the parent, a child or a breadcrumb item into navigation.
//!
//! Navigating only changes the route the session watches. The view state is
//! updated later, when the resulting resolution is applied.

use crate::models::{BreadcrumbItem, Entity};

use super::route::{Route, RouteKey};
use super::session::{NavigationSession, Ticket};

/// Stateless click handlers over a [`NavigationSession`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationController;

impl NavigationController {
    /// Go to the displayed parent.
    ///
    /// No-op when there is no parent entity or the current type has no parent type.
    pub fn on_parent_click(&self, session: &mut NavigationSession) -> Option<Ticket> {
        let state = session.state();
        let parent = state.parent_entity()?;
        let parent_type = state.current_type()?.parent_type()?;
        let key = RouteKey::new(parent_type, parent.id()).ok()?;
        session.navigate(Route::Entity(key))
    }

    /// Go to a child of the displayed entity (or a root from the top-level view).
    ///
    /// No-op when the displayed entity has no child type.
    pub fn on_child_click(
        &self,
        session: &mut NavigationSession,
        child: &Entity,
    ) -> Option<Ticket> {
        let child_type = session.state().child_type()?;
        let key = RouteKey::new(child_type, child.id()).ok()?;
        session.navigate(Route::Entity(key))
    }

    /// Go directly to any breadcrumb entry.
    pub fn on_breadcrumb_click(
        &self,
        session: &mut NavigationSession,
        item: &BreadcrumbItem,
    ) -> Option<Ticket> {
        session.navigate(Route::Entity(RouteKey::from(item)))
    }
}
