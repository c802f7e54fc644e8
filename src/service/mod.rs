//! Access to the entity service.
//!
//! The entity service owns persistence; this crate only reads from it.
//! Two implementations are provided:
//! - [`HttpEntityService`] talks to the REST API
//! - [`InMemoryEntityService`] serves a fixture loaded from JSON

mod http;
mod memory;

pub use http::{CONTEXT_PATH_PREFIX, HttpEntityService};
pub use memory::{Fixture, InMemoryEntityService};

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::models::{Entity, EntityContext, EntityType};

/// Read access to entities and their hierarchical context.
#[async_trait]
pub trait EntityService: Send + Sync {
    /// Fetch an entity together with its parent, children and breadcrumb.
    async fn fetch_context(&self, entity_type: EntityType, id: &str) -> Result<EntityContext>;

    /// List the root entities of the hierarchy (the top-level view).
    async fn list_roots(&self) -> Result<Vec<Entity>>;
}

#[async_trait]
impl<S: EntityService + ?Sized> EntityService for Arc<S> {
    async fn fetch_context(&self, entity_type: EntityType, id: &str) -> Result<EntityContext> {
        (**self).fetch_context(entity_type, id).await
    }

    async fn list_roots(&self) -> Result<Vec<Entity>> {
        (**self).list_roots().await
    }
}
