//! Command implementations for the `tw` CLI.
//!
//! Each command returns a result struct implementing [`Output`], so `main`
//! can print it as JSON (the default) or as human-readable text.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{self, ResolvedConfig, TrackwiseState, ValueSource};
use crate::layout::{LayoutPlan, LayoutSelector, ViewportClass};
use crate::models::{BreadcrumbItem, DisplayMode, Entity, EntityType, hierarchy};
use crate::navigation::{HierarchyViewState, Resolution, Route};
use crate::resolver::EntityContextResolver;
use crate::service::HttpEntityService;
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
}

/// Build a resolver talking to the configured entity service.
pub fn http_resolver(config: &ResolvedConfig) -> Result<EntityContextResolver> {
    let service = HttpEntityService::new(
        config.api_url(),
        config.request_timeout(),
        config.token().map(str::to_string),
    )?;
    Ok(EntityContextResolver::new(Arc::new(service)))
}

// === types ===

#[derive(Debug, Serialize)]
pub struct TypeRow {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub label: &'static str,
    /// Position in the chain, 0 for client; absent for detached types
    pub depth: Option<usize>,
    pub parent: Option<EntityType>,
    pub child: Option<EntityType>,
}

#[derive(Debug, Serialize)]
pub struct TypesResult {
    pub types: Vec<TypeRow>,
}

impl Output for TypesResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::from("Hierarchy:\n  ");
        let chain: Vec<&str> = hierarchy::HIERARCHY_CHAIN
            .iter()
            .map(|t| t.as_str())
            .collect();
        out.push_str(&chain.join(" → "));
        out.push_str("\n\nTypes:\n");
        for row in &self.types {
            let _ = writeln!(
                out,
                "  {:<10} parent: {:<10} child: {}",
                row.entity_type.as_str(),
                row.parent.map(|t| t.as_str()).unwrap_or("-"),
                row.child.map(|t| t.as_str()).unwrap_or("-"),
            );
        }
        out.trim_end().to_string()
    }
}

/// List every entity type with its position in the hierarchy.
pub fn types() -> TypesResult {
    TypesResult {
        types: EntityType::ALL
            .iter()
            .map(|&t| TypeRow {
                entity_type: t,
                label: t.label(),
                depth: hierarchy::depth_of(t),
                parent: t.parent_type(),
                child: t.child_type(),
            })
            .collect(),
    }
}

// === classify ===

#[derive(Debug, Serialize)]
pub struct ClassifyResult {
    pub width: u32,
    pub class: ViewportClass,
    /// Layout for an entity that has a parent and children
    pub layout: LayoutPlan,
}

impl Output for ClassifyResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let panes: Vec<&str> = self.layout.panes.iter().map(|s| s.pane.label()).collect();
        let mut out = format!("{}px is {}\n", self.width, self.class);
        if self.layout.tabs.is_empty() {
            let _ = write!(out, "Panes: {}", panes.join(" | "));
        } else {
            let tabs: Vec<&str> = self.layout.tabs.iter().map(|p| p.label()).collect();
            let _ = write!(
                out,
                "Tabs: {} (showing {})",
                tabs.join(" / "),
                panes.join("")
            );
        }
        out
    }
}

/// Classify a viewport width and plan the layout for a mid-hierarchy entity.
pub fn classify(width: u32) -> ClassifyResult {
    let selector = LayoutSelector::new(width);
    let mut state = HierarchyViewState::new();
    state.set_parent_entity(
        Some(Entity::named(EntityType::Program, "parent", "Parent", None)),
        Some(EntityType::Program),
    );
    state.set_current_entity(
        Some(Entity::named(EntityType::Project, "current", "Current", Some("parent"))),
        Some(EntityType::Project),
    );
    state.set_child_entities(
        vec![Entity::named(EntityType::UseCase, "child", "Child", Some("current"))],
        Some(EntityType::UseCase),
    );
    ClassifyResult {
        width,
        class: selector.class(),
        layout: selector.plan(&state),
    }
}

// === resolve ===

/// Parse a CLI route: either `TYPE ID` or a `/hierarchy/...` path.
pub fn parse_route(
    entity_type: Option<&str>,
    id: Option<&str>,
    path: Option<&str>,
) -> Result<Route> {
    match (entity_type, id, path) {
        (_, _, Some(path)) => path.parse(),
        (Some(t), Some(id), None) => Ok(Route::Entity(crate::navigation::RouteKey::parse(t, id)?)),
        _ => Err(Error::Validation(
            "give an entity type and id, or --path".to_string(),
        )),
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResolveResult {
    Context {
        route: String,
        entity: Entity,
        parent: Option<Entity>,
        children: Vec<Entity>,
        child_type: Option<EntityType>,
        breadcrumb: Vec<BreadcrumbItem>,
        #[serde(skip)]
        display_mode: DisplayMode,
    },
    TopLevel {
        route: String,
        entities: Vec<Entity>,
    },
}

fn breadcrumb_trail(items: &[BreadcrumbItem]) -> String {
    items
        .iter()
        .map(|b| b.name.as_str())
        .collect::<Vec<_>>()
        .join(" › ")
}

fn entity_line(entity: &Entity) -> String {
    match entity.status() {
        Some(status) => format!("{} ({}) [{}]", entity.display_name(), entity.id(), status),
        None => format!("{} ({})", entity.display_name(), entity.id()),
    }
}

impl Output for ResolveResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        match self {
            ResolveResult::TopLevel { entities, .. } => {
                let _ = writeln!(out, "Top level: {} client(s)", entities.len());
                for e in entities {
                    let _ = writeln!(out, "  {}", entity_line(e));
                }
            }
            ResolveResult::Context {
                entity,
                parent,
                children,
                child_type,
                breadcrumb,
                display_mode,
                ..
            } => {
                let _ = writeln!(out, "{}\n", breadcrumb_trail(breadcrumb));
                for line in entity.detail_lines(*display_mode) {
                    let _ = writeln!(out, "{:>14}: {}", line.label, line.value);
                }
                match parent {
                    Some(p) => {
                        let _ = writeln!(out, "\nParent {}: {}", p.entity_type(), entity_line(p));
                    }
                    None => out.push_str("\nParent: top level\n"),
                }
                match child_type {
                    None => out.push_str("Children: none (leaf type)\n"),
                    Some(t) if children.is_empty() => {
                        let _ = writeln!(out, "Children ({}): none yet", t.label());
                    }
                    Some(t) => {
                        let _ = writeln!(out, "Children ({}, {}):", t.label(), children.len());
                        for c in children {
                            let _ = writeln!(out, "  {}", entity_line(c));
                        }
                    }
                }
            }
        }
        out.trim_end().to_string()
    }
}

/// Resolve a route through `resolver`.
pub async fn resolve(
    resolver: &EntityContextResolver,
    route: &Route,
    display_mode: DisplayMode,
) -> Result<ResolveResult> {
    let result = match resolver.resolve_route(route).await? {
        Resolution::TopLevel(entities) => ResolveResult::TopLevel {
            route: route.path(),
            entities,
        },
        Resolution::Context(ctx) => ResolveResult::Context {
            route: route.path(),
            child_type: ctx.entity.entity_type().child_type(),
            entity: ctx.entity,
            parent: ctx.parent,
            children: ctx.children,
            breadcrumb: ctx.breadcrumb,
            display_mode,
        },
    };
    Ok(result)
}

// === config ===

#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    pub config_dir: String,
    #[serde(flatten)]
    pub settings: ResolvedConfig,
    pub token: Option<String>,
    pub token_source: Option<ValueSource>,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.settings;
        let mut out = format!("Config directory: {}\n\n", self.config_dir);
        let rows: [(&str, String, &ValueSource); 6] = [
            ("api-url", s.api_url.value.clone(), &s.api_url.source),
            (
                "request-timeout-ms",
                s.request_timeout_ms.value.to_string(),
                &s.request_timeout_ms.source,
            ),
            (
                "resize-debounce-ms",
                s.resize_debounce_ms.value.to_string(),
                &s.resize_debounce_ms.source,
            ),
            (
                "cell-width-px",
                s.cell_width_px.value.to_string(),
                &s.cell_width_px.source,
            ),
            ("log-level", s.log_level.value.clone(), &s.log_level.source),
            (
                "display-mode",
                s.display_mode.value.to_string(),
                &s.display_mode.source,
            ),
        ];
        for (key, value, source) in rows {
            let _ = writeln!(out, "  {:<20} {:<30} ({})", key, value, source);
        }
        match (&self.token, &self.token_source) {
            (Some(token), Some(source)) => {
                let _ = write!(out, "  {:<20} {:<30} ({})", "auth-token", token, source);
            }
            _ => out.push_str("  auth-token           (not set)"),
        }
        out
    }
}

pub fn config_show(dir: &Path, settings: ResolvedConfig) -> ConfigShowResult {
    ConfigShowResult {
        config_dir: dir.display().to_string(),
        token: settings.masked_token(),
        token_source: settings.token_source().cloned(),
        settings,
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {}", self.key, self.value)
    }
}

/// Set one key in config.kdl, validating the result before writing.
pub fn config_set(dir: &Path, key: &str, value: &str) -> Result<ConfigSetResult> {
    let mut file = config::read_config(dir)?;
    file.set(key, value).map_err(Error::Validation)?;
    config::write_config(dir, &file)?;
    tracing::info!(key, "config updated");
    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct TokenResult {
    pub stored: bool,
    pub token: Option<String>,
}

impl Output for TokenResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.token {
            Some(masked) => format!("Token stored ({})", masked),
            None => "Token removed".to_string(),
        }
    }
}

pub fn config_set_token(dir: &Path, token: &str) -> Result<TokenResult> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::Validation("token must not be empty".to_string()));
    }
    let mut state = config::read_state(dir)?;
    state.auth_token = Some(token.to_string());
    config::write_state(dir, &state)?;
    Ok(TokenResult {
        stored: true,
        token: Some(config::mask_token(token)),
    })
}

pub fn config_clear_token(dir: &Path) -> Result<TokenResult> {
    config::write_state(dir, &TrackwiseState::default())?;
    Ok(TokenResult {
        stored: false,
        token: None,
    })
}
