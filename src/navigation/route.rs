//! Route keys and their `/hierarchy/{type}/{id}` path form.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{BreadcrumbItem, Entity, EntityType};
use crate::{Error, Result};

/// Path prefix of every hierarchy route.
pub const ROUTE_PREFIX: &str = "/hierarchy";

/// Identity of one entity in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RouteKey {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub id: String,
}

impl RouteKey {
    /// Build a key, rejecting empty or malformed ids.
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_id(&id)?;
        Ok(Self { entity_type, id })
    }

    /// Parse both halves from user input.
    pub fn parse(entity_type: &str, id: &str) -> Result<Self> {
        Self::new(entity_type.parse()?, id.trim())
    }

    pub fn of(entity: &Entity) -> Self {
        Self {
            entity_type: entity.entity_type(),
            id: entity.id().to_string(),
        }
    }

    pub fn path(&self) -> String {
        format!("{}/{}/{}", ROUTE_PREFIX, self.entity_type, self.id)
    }
}

impl From<&BreadcrumbItem> for RouteKey {
    fn from(item: &BreadcrumbItem) -> Self {
        Self {
            entity_type: item.entity_type,
            id: item.id.clone(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.entity_type, self.id)
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::Validation("entity id is required".to_string()));
    }
    if id != id.trim() || id.contains('/') || id.chars().any(char::is_control) {
        return Err(Error::Validation(format!("malformed entity id: {:?}", id)));
    }
    Ok(())
}

/// A navigable location: the top-level listing or one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Route {
    TopLevel,
    Entity(RouteKey),
}

impl Route {
    pub fn entity(entity_type: EntityType, id: impl Into<String>) -> Result<Self> {
        RouteKey::new(entity_type, id).map(Route::Entity)
    }

    pub fn key(&self) -> Option<&RouteKey> {
        match self {
            Route::TopLevel => None,
            Route::Entity(key) => Some(key),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::TopLevel => ROUTE_PREFIX.to_string(),
            Route::Entity(key) => key.path(),
        }
    }
}

impl From<RouteKey> for Route {
    fn from(key: RouteKey) -> Self {
        Route::Entity(key)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::TopLevel => write!(f, "top level"),
            Route::Entity(key) => write!(f, "{}", key),
        }
    }
}

impl FromStr for Route {
    type Err = Error;

    /// Parse `/hierarchy` or `/hierarchy/{type}/{id}`.
    fn from_str(path: &str) -> Result<Self> {
        let rest = path
            .trim()
            .strip_prefix(ROUTE_PREFIX)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
            .ok_or_else(|| Error::Validation(format!("not a hierarchy route: {}", path)))?;
        let rest = rest.trim_matches('/');
        if rest.is_empty() {
            return Ok(Route::TopLevel);
        }
        match rest.split('/').collect::<Vec<_>>().as_slice() {
            [entity_type, id] => Ok(Route::Entity(RouteKey::parse(entity_type, id)?)),
            _ => Err(Error::Validation(format!(
                "expected {}/{{type}}/{{id}}, got {}",
                ROUTE_PREFIX, path
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entity_route() {
        let route: Route = "/hierarchy/usecase/U1".parse().unwrap();
        assert_eq!(route, Route::entity(EntityType::UseCase, "U1").unwrap());
        assert_eq!(route.path(), "/hierarchy/usecase/U1");
    }

    #[test]
    fn test_parse_top_level_route() {
        assert_eq!("/hierarchy".parse::<Route>().unwrap(), Route::TopLevel);
        assert_eq!("/hierarchy/".parse::<Route>().unwrap(), Route::TopLevel);
    }

    #[test]
    fn test_parse_rejects_other_paths() {
        assert!("/projects/1".parse::<Route>().is_err());
        assert!("/hierarchy/task".parse::<Route>().is_err());
        assert!("/hierarchy/task/T1/extra".parse::<Route>().is_err());
        assert!("/hierarchy/epic/E1".parse::<Route>().is_err());
        assert!(matches!(
            "/hierarchytask/T1".parse::<Route>(),
            Err(Error::Validation(_))
        ));
        assert!("/hierarchyx".parse::<Route>().is_err());
    }

    #[test]
    fn test_key_rejects_empty_id() {
        let err = RouteKey::new(EntityType::Task, "").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(RouteKey::new(EntityType::Task, "   ").is_err());
    }

    #[test]
    fn test_key_rejects_malformed_id() {
        assert!(RouteKey::new(EntityType::Task, "a/b").is_err());
        assert!(RouteKey::new(EntityType::Task, " T1").is_err());
        assert!(RouteKey::new(EntityType::Task, "T\n1").is_err());
    }

    #[test]
    fn test_key_from_breadcrumb_item() {
        let item = BreadcrumbItem {
            id: "P1".to_string(),
            entity_type: EntityType::Program,
            name: "Retail".to_string(),
        };
        let key = RouteKey::from(&item);
        assert_eq!(key.entity_type, EntityType::Program);
        assert_eq!(key.id, "P1");
    }
}
