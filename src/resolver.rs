//! Entity-context resolution.
//!
//! A resolution fetches an entity together with its parent, children and
//! breadcrumb in one logical read, then checks the result against the
//! hierarchy type map before handing it to the caller. The resolver never
//! touches view state; applying results is the session's job.

use std::sync::Arc;

use crate::models::{Entity, EntityContext, EntityType};
use crate::navigation::{Resolution, Route, RouteKey};
use crate::service::EntityService;
use crate::{Error, Result};

/// Resolves routes against an [`EntityService`]. Cheap to clone.
#[derive(Clone)]
pub struct EntityContextResolver {
    service: Arc<dyn EntityService>,
}

impl std::fmt::Debug for EntityContextResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityContextResolver").finish_non_exhaustive()
    }
}

impl EntityContextResolver {
    pub fn new(service: Arc<dyn EntityService>) -> Self {
        Self { service }
    }

    /// Resolve `(entity_type, id)` into a checked [`EntityContext`].
    ///
    /// Malformed ids fail with a validation error before any request is made.
    pub async fn resolve(&self, entity_type: EntityType, id: &str) -> Result<EntityContext> {
        let key = RouteKey::new(entity_type, id)?;
        self.resolve_key(&key).await
    }

    pub async fn resolve_key(&self, key: &RouteKey) -> Result<EntityContext> {
        tracing::debug!(route = %key, "resolving");
        let context = self.service.fetch_context(key.entity_type, &key.id).await?;

        if context.entity.entity_type() != key.entity_type || context.entity.id() != key.id {
            return Err(Error::Server(format!(
                "inconsistent context: asked for {}, got {} {}",
                key,
                context.entity.entity_type(),
                context.entity.id()
            )));
        }
        context
            .check_consistency()
            .map_err(|reason| Error::Server(format!("inconsistent context: {}", reason)))?;

        tracing::debug!(
            route = %key,
            children = context.children.len(),
            depth = context.breadcrumb.len(),
            "resolved"
        );
        Ok(context)
    }

    /// List the root entities shown by the top-level view.
    pub async fn resolve_top_level(&self) -> Result<Vec<Entity>> {
        let roots = self.service.list_roots().await?;
        if let Some(stray) = roots
            .iter()
            .find(|e| e.entity_type() != crate::models::hierarchy::ROOT_TYPE)
        {
            return Err(Error::Server(format!(
                "inconsistent top level: got {} {}",
                stray.entity_type(),
                stray.id()
            )));
        }
        Ok(roots)
    }

    /// Resolve whatever a route points at.
    pub async fn resolve_route(&self, route: &Route) -> Result<Resolution> {
        match route {
            Route::TopLevel => self.resolve_top_level().await.map(Resolution::TopLevel),
            Route::Entity(key) => self.resolve_key(key).await.map(Resolution::Context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BreadcrumbItem;
    use crate::service::{Fixture, InMemoryEntityService};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fixture() -> InMemoryEntityService {
        InMemoryEntityService::from_fixture(Fixture {
            entities: vec![
                Entity::named(EntityType::Client, "C1", "Acme", None),
                Entity::named(EntityType::Program, "P1", "Retail", Some("C1")),
                Entity::named(EntityType::Project, "PR1", "Portal", Some("P1")),
                Entity::named(EntityType::UseCase, "U1", "Login", Some("PR1")),
                Entity::named(EntityType::UseCase, "U2", "Checkout", Some("PR1")),
            ],
        })
        .unwrap()
    }

    fn resolver() -> EntityContextResolver {
        EntityContextResolver::new(Arc::new(fixture()))
    }

    /// Counts calls and returns a canned context.
    struct CannedService {
        context: EntityContext,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EntityService for CannedService {
        async fn fetch_context(&self, _: EntityType, _: &str) -> Result<EntityContext> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.context.clone())
        }

        async fn list_roots(&self) -> Result<Vec<Entity>> {
            Ok(vec![self.context.entity.clone()])
        }
    }

    #[tokio::test]
    async fn test_project_context_has_program_parent_and_usecase_children() {
        let ctx = resolver().resolve(EntityType::Project, "PR1").await.unwrap();
        assert_eq!(
            ctx.parent.as_ref().map(|p| p.entity_type()),
            Some(EntityType::Program)
        );
        assert!(!ctx.children.is_empty());
        assert!(
            ctx.children
                .iter()
                .all(|c| c.entity_type() == EntityType::UseCase)
        );
    }

    #[tokio::test]
    async fn test_usecase_breadcrumb_is_root_first() {
        let ctx = resolver().resolve(EntityType::UseCase, "U1").await.unwrap();
        let trail: Vec<_> = ctx
            .breadcrumb
            .iter()
            .map(|b| (b.entity_type, b.id.as_str()))
            .collect();
        assert_eq!(
            trail,
            vec![
                (EntityType::Client, "C1"),
                (EntityType::Program, "P1"),
                (EntityType::Project, "PR1"),
                (EntityType::UseCase, "U1"),
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let r = resolver();
        let first = r.resolve(EntityType::Project, "PR1").await.unwrap();
        let second = r.resolve(EntityType::Project, "PR1").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_client_has_no_parent() {
        let ctx = resolver().resolve(EntityType::Client, "C1").await.unwrap();
        assert!(ctx.parent.is_none());
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_found() {
        let err = resolver()
            .resolve(EntityType::Project, "PR404")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_id_fails_before_any_request() {
        let service = Arc::new(CannedService {
            context: fixture()
                .fetch_context(EntityType::Client, "C1")
                .await
                .unwrap(),
            calls: AtomicUsize::new(0),
        });
        let r = EntityContextResolver::new(service.clone());

        let err = r.resolve(EntityType::Client, "").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mismatched_entity_is_server_error() {
        let service = Arc::new(CannedService {
            context: fixture()
                .fetch_context(EntityType::Client, "C1")
                .await
                .unwrap(),
            calls: AtomicUsize::new(0),
        });
        let r = EntityContextResolver::new(service);
        let err = r.resolve(EntityType::Client, "C2").await.unwrap_err();
        assert!(matches!(err, Error::Server(ref m) if m.contains("inconsistent")));
    }

    #[tokio::test]
    async fn test_inconsistent_context_is_server_error() {
        let mut context = fixture()
            .fetch_context(EntityType::Project, "PR1")
            .await
            .unwrap();
        context.breadcrumb.insert(
            0,
            BreadcrumbItem {
                id: "X".into(),
                entity_type: EntityType::Task,
                name: "X".into(),
            },
        );
        let r = EntityContextResolver::new(Arc::new(CannedService {
            context,
            calls: AtomicUsize::new(0),
        }));
        let err = r.resolve(EntityType::Project, "PR1").await.unwrap_err();
        assert!(matches!(err, Error::Server(_)));
    }

    #[tokio::test]
    async fn test_top_level_lists_clients() {
        let resolution = resolver().resolve_route(&Route::TopLevel).await.unwrap();
        match resolution {
            Resolution::TopLevel(roots) => {
                assert_eq!(roots.len(), 1);
                assert_eq!(roots[0].id(), "C1");
            }
            other => panic!("expected top level, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_top_level_rejects_non_root_entities() {
        let context = fixture()
            .fetch_context(EntityType::Program, "P1")
            .await
            .unwrap();
        let r = EntityContextResolver::new(Arc::new(CannedService {
            context,
            calls: AtomicUsize::new(0),
        }));
        assert!(r.resolve_top_level().await.is_err());
    }
}
