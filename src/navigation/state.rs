//! The view state read by the display panes.

use crate::models::hierarchy::ROOT_TYPE;
use crate::models::{BreadcrumbItem, Entity, EntityContext, EntityType};

use super::route::{Route, RouteKey};

/// Last successfully resolved hierarchy context.
///
/// Each setter replaces its slot wholesale. A resolution goes through
/// [`apply_context`](Self::apply_context) or [`apply_top_level`](Self::apply_top_level),
/// which replace every slot in one `&mut` borrow so no reader observes a mix
/// of two resolutions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HierarchyViewState {
    current_entity: Option<Entity>,
    current_type: Option<EntityType>,
    parent_entity: Option<Entity>,
    parent_type: Option<EntityType>,
    child_entities: Vec<Entity>,
    child_type: Option<EntityType>,
    breadcrumb: Vec<BreadcrumbItem>,
    /// Which route these slots were resolved for
    route: Option<Route>,
}

impl HierarchyViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_current_entity(&mut self, entity: Option<Entity>, entity_type: Option<EntityType>) {
        self.current_entity = entity;
        self.current_type = entity_type;
    }

    pub fn set_parent_entity(&mut self, entity: Option<Entity>, entity_type: Option<EntityType>) {
        self.parent_entity = entity;
        self.parent_type = entity_type;
    }

    pub fn set_child_entities(&mut self, entities: Vec<Entity>, entity_type: Option<EntityType>) {
        self.child_entities = entities;
        self.child_type = entity_type;
    }

    pub fn set_breadcrumb(&mut self, items: Vec<BreadcrumbItem>) {
        self.breadcrumb = items;
    }

    /// Replace every slot with a resolved entity context.
    pub fn apply_context(&mut self, context: EntityContext) {
        let entity_type = context.entity.entity_type();
        let route = Route::Entity(RouteKey::of(&context.entity));
        self.set_current_entity(Some(context.entity), Some(entity_type));
        self.set_parent_entity(context.parent, entity_type.parent_type());
        self.set_child_entities(context.children, entity_type.child_type());
        self.set_breadcrumb(context.breadcrumb);
        self.route = Some(route);
    }

    /// Replace every slot with the top-level listing: no current entity, roots as children.
    pub fn apply_top_level(&mut self, roots: Vec<Entity>) {
        self.set_current_entity(None, None);
        self.set_parent_entity(None, None);
        self.set_child_entities(roots, Some(ROOT_TYPE));
        self.set_breadcrumb(Vec::new());
        self.route = Some(Route::TopLevel);
    }

    /// True until the first successful resolution.
    pub fn is_empty(&self) -> bool {
        self.route.is_none()
    }

    pub fn current_entity(&self) -> Option<&Entity> {
        self.current_entity.as_ref()
    }

    pub fn current_type(&self) -> Option<EntityType> {
        self.current_type
    }

    pub fn parent_entity(&self) -> Option<&Entity> {
        self.parent_entity.as_ref()
    }

    pub fn parent_type(&self) -> Option<EntityType> {
        self.parent_type
    }

    pub fn child_entities(&self) -> &[Entity] {
        &self.child_entities
    }

    pub fn child_type(&self) -> Option<EntityType> {
        self.child_type
    }

    pub fn breadcrumb(&self) -> &[BreadcrumbItem] {
        &self.breadcrumb
    }

    /// The route the displayed slots belong to.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_context(task: &str, subtasks: &[&str]) -> EntityContext {
        let entity = Entity::named(EntityType::Task, task, task, Some("S1"));
        EntityContext {
            breadcrumb: vec![entity.breadcrumb_item()],
            parent: Some(Entity::named(EntityType::UserStory, "S1", "Story", Some("U1"))),
            children: subtasks
                .iter()
                .map(|id| Entity::named(EntityType::Subtask, *id, *id, Some(task)))
                .collect(),
            entity,
        }
    }

    #[test]
    fn test_new_state_is_empty() {
        let state = HierarchyViewState::new();
        assert!(state.is_empty());
        assert!(state.current_entity().is_none());
        assert!(state.child_entities().is_empty());
    }

    #[test]
    fn test_apply_context_sets_all_slots_and_derived_types() {
        let mut state = HierarchyViewState::new();
        state.apply_context(task_context("T1", &["ST1", "ST2"]));

        assert_eq!(state.current_entity().map(|e| e.id()), Some("T1"));
        assert_eq!(state.current_type(), Some(EntityType::Task));
        assert_eq!(state.parent_type(), Some(EntityType::UserStory));
        assert_eq!(state.child_type(), Some(EntityType::Subtask));
        assert_eq!(state.child_entities().len(), 2);
        assert_eq!(state.breadcrumb().len(), 1);
        assert_eq!(
            state.route(),
            Some(&Route::entity(EntityType::Task, "T1").unwrap())
        );
    }

    #[test]
    fn test_apply_context_replaces_rather_than_merges() {
        let mut state = HierarchyViewState::new();
        state.apply_context(task_context("T1", &["ST1", "ST2"]));
        state.apply_context(task_context("T2", &[]));

        assert_eq!(state.current_entity().map(|e| e.id()), Some("T2"));
        assert!(state.child_entities().is_empty());
    }

    #[test]
    fn test_apply_top_level_lists_roots_as_children() {
        let mut state = HierarchyViewState::new();
        state.apply_context(task_context("T1", &["ST1"]));
        state.apply_top_level(vec![Entity::named(EntityType::Client, "C1", "Acme", None)]);

        assert!(state.current_entity().is_none());
        assert!(state.parent_entity().is_none());
        assert_eq!(state.parent_type(), None);
        assert_eq!(state.child_type(), Some(EntityType::Client));
        assert!(state.breadcrumb().is_empty());
        assert_eq!(state.route(), Some(&Route::TopLevel));
    }
}
