//! In-memory entity service backed by a JSON fixture.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::EntityService;
use crate::models::hierarchy::{self, ROOT_TYPE};
use crate::models::{BreadcrumbItem, Entity, EntityContext, EntityType};
use crate::{Error, Result};

/// On-disk fixture format: a flat list of entities linked by `parent_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    pub entities: Vec<Entity>,
}

type Key = (EntityType, String);

/// Entity service answering from memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityService {
    entities: HashMap<Key, Entity>,
    /// Insertion order, so listings are stable
    order: Vec<Key>,
}

impl InMemoryEntityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a service from a fixture, validating its links.
    pub fn from_fixture(fixture: Fixture) -> Result<Self> {
        let mut service = Self::new();
        for entity in fixture.entities {
            service.insert(entity)?;
        }
        service.validate_links()?;
        Ok(service)
    }

    /// Load and validate a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        let service = Self::from_fixture(fixture)?;
        tracing::info!(path = %path.display(), entities = service.len(), "loaded fixture");
        Ok(service)
    }

    /// Add an entity. Duplicate `(type, id)` pairs are rejected.
    pub fn insert(&mut self, entity: Entity) -> Result<()> {
        let key = (entity.entity_type(), entity.id().to_string());
        if self.entities.contains_key(&key) {
            return Err(Error::Validation(format!(
                "duplicate entity {} {}",
                key.0, key.1
            )));
        }
        self.order.push(key.clone());
        self.entities.insert(key, entity);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, entity_type: EntityType, id: &str) -> Option<&Entity> {
        self.entities.get(&(entity_type, id.to_string()))
    }

    fn parent_of(&self, entity: &Entity) -> Option<&Entity> {
        let parent_type = entity.entity_type().parent_type()?;
        let parent_id = entity.parent_id()?;
        self.get(parent_type, parent_id)
    }

    fn children_of(&self, entity: &Entity) -> Vec<Entity> {
        let Some(child_type) = entity.entity_type().child_type() else {
            return Vec::new();
        };
        self.order
            .iter()
            .filter(|(t, _)| *t == child_type)
            .filter_map(|key| self.entities.get(key))
            .filter(|child| child.parent_id() == Some(entity.id()))
            .cloned()
            .collect()
    }

    fn breadcrumb_of(&self, entity: &Entity) -> Vec<BreadcrumbItem> {
        let mut trail = vec![entity.breadcrumb_item()];
        let mut current = entity;
        // Each step moves one level up the chain, so this terminates at the root.
        while let Some(parent) = self.parent_of(current) {
            trail.push(parent.breadcrumb_item());
            current = parent;
        }
        trail.reverse();
        trail
    }

    /// Every chain entity below the root must point at an existing parent of the right type.
    fn validate_links(&self) -> Result<()> {
        for key in &self.order {
            let entity = &self.entities[key];
            let entity_type = entity.entity_type();
            match (entity_type.parent_type(), entity.parent_id()) {
                (Some(parent_type), Some(parent_id)) => {
                    if self.get(parent_type, parent_id).is_none() {
                        return Err(Error::Validation(format!(
                            "{} {} references missing {} {}",
                            entity_type,
                            entity.id(),
                            parent_type,
                            parent_id
                        )));
                    }
                }
                (Some(parent_type), None) => {
                    return Err(Error::Validation(format!(
                        "{} {} needs a parent {}",
                        entity_type,
                        entity.id(),
                        parent_type
                    )));
                }
                (None, _) => {}
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntityService for InMemoryEntityService {
    async fn fetch_context(&self, entity_type: EntityType, id: &str) -> Result<EntityContext> {
        let entity = self
            .get(entity_type, id)
            .ok_or_else(|| Error::NotFound(format!("{} {}", entity_type, id)))?;

        let parent = if hierarchy::is_hierarchical(entity_type) {
            self.parent_of(entity).cloned()
        } else {
            None
        };

        Ok(EntityContext {
            entity: entity.clone(),
            parent,
            children: self.children_of(entity),
            breadcrumb: self.breadcrumb_of(entity),
        })
    }

    async fn list_roots(&self) -> Result<Vec<Entity>> {
        Ok(self
            .order
            .iter()
            .filter(|(t, _)| *t == ROOT_TYPE)
            .filter_map(|key| self.entities.get(key))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InMemoryEntityService {
        let fixture = Fixture {
            entities: vec![
                Entity::named(EntityType::Client, "C1", "Acme", None),
                Entity::named(EntityType::Program, "P1", "Retail", Some("C1")),
                Entity::named(EntityType::Project, "PR1", "Portal", Some("P1")),
                Entity::named(EntityType::UseCase, "U1", "Login", Some("PR1")),
                Entity::named(EntityType::UseCase, "U2", "Checkout", Some("PR1")),
                Entity::named(EntityType::Bug, "B1", "Crash", None),
            ],
        };
        InMemoryEntityService::from_fixture(fixture).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_context_builds_breadcrumb_root_first() {
        let svc = sample();
        let ctx = svc.fetch_context(EntityType::UseCase, "U1").await.unwrap();
        let ids: Vec<_> = ctx.breadcrumb.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "P1", "PR1", "U1"]);
        assert_eq!(ctx.parent.as_ref().map(|p| p.id()), Some("PR1"));
        assert!(ctx.children.is_empty());
        assert_eq!(ctx.check_consistency(), Ok(()));
    }

    #[tokio::test]
    async fn test_fetch_context_lists_children_in_insertion_order() {
        let svc = sample();
        let ctx = svc.fetch_context(EntityType::Project, "PR1").await.unwrap();
        let ids: Vec<_> = ctx.children.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["U1", "U2"]);
    }

    #[tokio::test]
    async fn test_fetch_context_unknown_id_is_not_found() {
        let svc = sample();
        let err = svc.fetch_context(EntityType::Task, "T404").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_detached_entity_has_only_itself_in_breadcrumb() {
        let svc = sample();
        let ctx = svc.fetch_context(EntityType::Bug, "B1").await.unwrap();
        assert!(ctx.parent.is_none());
        assert!(ctx.children.is_empty());
        assert_eq!(ctx.breadcrumb.len(), 1);
    }

    #[tokio::test]
    async fn test_list_roots_returns_clients() {
        let svc = sample();
        let roots = svc.list_roots().await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].id(), "C1");
    }

    #[test]
    fn test_rejects_duplicate_entities() {
        let mut svc = InMemoryEntityService::new();
        svc.insert(Entity::named(EntityType::Client, "C1", "Acme", None))
            .unwrap();
        let err = svc
            .insert(Entity::named(EntityType::Client, "C1", "Again", None))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_rejects_dangling_parent() {
        let fixture = Fixture {
            entities: vec![Entity::named(EntityType::Program, "P1", "Retail", Some("C9"))],
        };
        let err = InMemoryEntityService::from_fixture(fixture).unwrap_err();
        assert!(err.to_string().contains("C9"));
    }

    #[test]
    fn test_rejects_orphan_below_root() {
        let fixture = Fixture {
            entities: vec![Entity::named(EntityType::Task, "T1", "Orphan", None)],
        };
        assert!(InMemoryEntityService::from_fixture(fixture).is_err());
    }

    #[test]
    fn test_load_reads_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(
            &path,
            r#"{"entities":[{"type":"client","id":"C1","name":"Acme"}]}"#,
        )
        .unwrap();
        let svc = InMemoryEntityService::load(&path).unwrap();
        assert_eq!(svc.len(), 1);
        assert!(svc.get(EntityType::Client, "C1").is_some());
    }
}
