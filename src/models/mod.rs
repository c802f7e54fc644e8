//! Data models for Trackwise entities.
//!
//! This module defines the core data structures:
//! - `EntityType` - The closed set of entity kinds known to the tracker
//! - `Entity` - A record tagged by its type, each variant carrying its known fields
//! - `BreadcrumbItem` - One ancestor in a root-first breadcrumb
//! - `EntityContext` - An entity plus its parent, children and breadcrumb
//! - `DisplayMode` - Compact or full projection of an entity for display

pub mod hierarchy;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The kind of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "client")]
    Client,
    #[serde(rename = "program")]
    Program,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "usecase", alias = "use_case")]
    UseCase,
    #[serde(rename = "userstory", alias = "user_story")]
    UserStory,
    #[serde(rename = "task")]
    Task,
    #[serde(rename = "subtask")]
    Subtask,
    #[serde(rename = "bug")]
    Bug,
    #[serde(rename = "phase")]
    Phase,
    #[serde(rename = "user")]
    User,
}

impl EntityType {
    /// Every known type, hierarchy chain first.
    pub const ALL: [EntityType; 10] = [
        EntityType::Client,
        EntityType::Program,
        EntityType::Project,
        EntityType::UseCase,
        EntityType::UserStory,
        EntityType::Task,
        EntityType::Subtask,
        EntityType::Bug,
        EntityType::Phase,
        EntityType::User,
    ];

    /// Wire name, as used in routes and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Client => "client",
            EntityType::Program => "program",
            EntityType::Project => "project",
            EntityType::UseCase => "usecase",
            EntityType::UserStory => "userstory",
            EntityType::Task => "task",
            EntityType::Subtask => "subtask",
            EntityType::Bug => "bug",
            EntityType::Phase => "phase",
            EntityType::User => "user",
        }
    }

    /// Human label for headings and placeholders.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Client => "Client",
            EntityType::Program => "Program",
            EntityType::Project => "Project",
            EntityType::UseCase => "Use Case",
            EntityType::UserStory => "User Story",
            EntityType::Task => "Task",
            EntityType::Subtask => "Subtask",
            EntityType::Bug => "Bug",
            EntityType::Phase => "Phase",
            EntityType::User => "User",
        }
    }

    pub fn parent_type(&self) -> Option<EntityType> {
        hierarchy::parent_type_of(*self)
    }

    pub fn child_type(&self) -> Option<EntityType> {
        hierarchy::child_type_of(*self)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = Error;

    /// Parse a type name, case-insensitive. Unknown names are validation errors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(Error::Validation("entity type is required".to_string()));
        }
        match normalized.as_str() {
            "client" => Ok(EntityType::Client),
            "program" => Ok(EntityType::Program),
            "project" => Ok(EntityType::Project),
            "usecase" | "use_case" => Ok(EntityType::UseCase),
            "userstory" | "user_story" => Ok(EntityType::UserStory),
            "task" => Ok(EntityType::Task),
            "subtask" => Ok(EntityType::Subtask),
            "bug" => Ok(EntityType::Bug),
            "phase" => Ok(EntityType::Phase),
            "user" => Ok(EntityType::User),
            _ => Err(Error::Validation(format!("unknown entity type: {}", s))),
        }
    }
}

/// Fields every entity carries regardless of type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityCore {
    /// Backend identifier
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Some types are titled rather than named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Identifier of the hierarchical parent, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EntityCore {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UseCaseRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStoryRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtaskRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BugRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(flatten)]
    pub core: EntityCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// An entity as returned by the entity service, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Entity {
    #[serde(rename = "client")]
    Client(ClientRecord),
    #[serde(rename = "program")]
    Program(ProgramRecord),
    #[serde(rename = "project")]
    Project(ProjectRecord),
    #[serde(rename = "usecase", alias = "use_case")]
    UseCase(UseCaseRecord),
    #[serde(rename = "userstory", alias = "user_story")]
    UserStory(UserStoryRecord),
    #[serde(rename = "task")]
    Task(TaskRecord),
    #[serde(rename = "subtask")]
    Subtask(SubtaskRecord),
    #[serde(rename = "bug")]
    Bug(BugRecord),
    #[serde(rename = "phase")]
    Phase(PhaseRecord),
    #[serde(rename = "user")]
    User(UserRecord),
}

impl Entity {
    /// Build an entity of the given type with only core fields set.
    pub fn from_core(entity_type: EntityType, core: EntityCore) -> Self {
        match entity_type {
            EntityType::Client => Entity::Client(ClientRecord {
                core,
                ..Default::default()
            }),
            EntityType::Program => Entity::Program(ProgramRecord {
                core,
                ..Default::default()
            }),
            EntityType::Project => Entity::Project(ProjectRecord {
                core,
                ..Default::default()
            }),
            EntityType::UseCase => Entity::UseCase(UseCaseRecord {
                core,
                ..Default::default()
            }),
            EntityType::UserStory => Entity::UserStory(UserStoryRecord {
                core,
                ..Default::default()
            }),
            EntityType::Task => Entity::Task(TaskRecord {
                core,
                ..Default::default()
            }),
            EntityType::Subtask => Entity::Subtask(SubtaskRecord {
                core,
                ..Default::default()
            }),
            EntityType::Bug => Entity::Bug(BugRecord {
                core,
                ..Default::default()
            }),
            EntityType::Phase => Entity::Phase(PhaseRecord {
                core,
                ..Default::default()
            }),
            EntityType::User => Entity::User(UserRecord {
                core,
                ..Default::default()
            }),
        }
    }

    /// Shorthand for a named entity with an optional parent link.
    pub fn named(
        entity_type: EntityType,
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<&str>,
    ) -> Self {
        let mut core = EntityCore::new(id);
        core.name = Some(name.into());
        core.parent_id = parent_id.map(str::to_string);
        Self::from_core(entity_type, core)
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            Entity::Client(_) => EntityType::Client,
            Entity::Program(_) => EntityType::Program,
            Entity::Project(_) => EntityType::Project,
            Entity::UseCase(_) => EntityType::UseCase,
            Entity::UserStory(_) => EntityType::UserStory,
            Entity::Task(_) => EntityType::Task,
            Entity::Subtask(_) => EntityType::Subtask,
            Entity::Bug(_) => EntityType::Bug,
            Entity::Phase(_) => EntityType::Phase,
            Entity::User(_) => EntityType::User,
        }
    }

    pub fn core(&self) -> &EntityCore {
        match self {
            Entity::Client(r) => &r.core,
            Entity::Program(r) => &r.core,
            Entity::Project(r) => &r.core,
            Entity::UseCase(r) => &r.core,
            Entity::UserStory(r) => &r.core,
            Entity::Task(r) => &r.core,
            Entity::Subtask(r) => &r.core,
            Entity::Bug(r) => &r.core,
            Entity::Phase(r) => &r.core,
            Entity::User(r) => &r.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut EntityCore {
        match self {
            Entity::Client(r) => &mut r.core,
            Entity::Program(r) => &mut r.core,
            Entity::Project(r) => &mut r.core,
            Entity::UseCase(r) => &mut r.core,
            Entity::UserStory(r) => &mut r.core,
            Entity::Task(r) => &mut r.core,
            Entity::Subtask(r) => &mut r.core,
            Entity::Bug(r) => &mut r.core,
            Entity::Phase(r) => &mut r.core,
            Entity::User(r) => &mut r.core,
        }
    }

    pub fn id(&self) -> &str {
        &self.core().id
    }

    /// Display name: name, then title, then the id.
    pub fn display_name(&self) -> &str {
        let core = self.core();
        core.name
            .as_deref()
            .or(core.title.as_deref())
            .unwrap_or(&core.id)
    }

    pub fn status(&self) -> Option<&str> {
        self.core().status.as_deref()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.core().parent_id.as_deref()
    }

    pub fn breadcrumb_item(&self) -> BreadcrumbItem {
        BreadcrumbItem {
            id: self.id().to_string(),
            entity_type: self.entity_type(),
            name: self.display_name().to_string(),
        }
    }

    /// Labelled lines for display. Compact keeps the identity and status;
    /// full adds whatever fields this entity type carries.
    pub fn detail_lines(&self, mode: DisplayMode) -> Vec<DetailLine> {
        let core = self.core();
        let mut lines = vec![
            DetailLine::new("Name", self.display_name()),
            DetailLine::new("Type", self.entity_type().label()),
        ];
        if let Some(status) = &core.status {
            lines.push(DetailLine::new("Status", status));
        }
        if mode == DisplayMode::Compact {
            return lines;
        }

        lines.push(DetailLine::new("ID", &core.id));
        let mut push = |label: &'static str, value: &Option<String>| {
            if let Some(v) = value {
                lines.push(DetailLine::new(label, v));
            }
        };
        push("Summary", &core.short_description);

        match self {
            Entity::Client(r) => {
                push("Contact", &r.contact_name);
                push("Email", &r.contact_email);
                push("Industry", &r.industry);
            }
            Entity::Program(r) => {
                push("Start", &r.start_date);
                push("End", &r.end_date);
            }
            Entity::Project(r) => {
                push("Priority", &r.priority);
                push("Owner", &r.owner);
                push("Start", &r.start_date);
                push("End", &r.end_date);
            }
            Entity::UseCase(r) => {
                push("Priority", &r.priority);
                push("Actor", &r.actor);
            }
            Entity::UserStory(r) => {
                push("Priority", &r.priority);
                push("Story points", &r.story_points.map(|p| p.to_string()));
                push("Acceptance", &r.acceptance_criteria);
            }
            Entity::Task(r) => {
                push("Priority", &r.priority);
                push("Assignee", &r.assignee);
                push("Due", &r.due_date);
                push("Estimate", &r.estimated_hours.map(|h| format!("{h}h")));
            }
            Entity::Subtask(r) => {
                push("Assignee", &r.assignee);
                push("Due", &r.due_date);
                push("Estimate", &r.estimated_hours.map(|h| format!("{h}h")));
            }
            Entity::Bug(r) => {
                push("Severity", &r.severity);
                push("Priority", &r.priority);
                push("Reported by", &r.reported_by);
                push("Assignee", &r.assignee);
                push("Environment", &r.environment);
            }
            Entity::Phase(r) => {
                push("Sequence", &r.sequence.map(|s| s.to_string()));
                push("Start", &r.start_date);
                push("End", &r.end_date);
            }
            Entity::User(r) => {
                push("Email", &r.email);
                push("Role", &r.role);
            }
        }

        push("Description", &core.description);
        lines
    }
}

/// One labelled value in an entity's detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub label: &'static str,
    pub value: String,
}

impl DetailLine {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

/// How much of an entity to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Compact,
    #[default]
    Full,
}

impl DisplayMode {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Some(DisplayMode::Compact),
            "full" => Some(DisplayMode::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Compact => "compact",
            DisplayMode::Full => "full",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            DisplayMode::Compact => DisplayMode::Full,
            DisplayMode::Full => DisplayMode::Compact,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ancestor (or the current entity) in a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadcrumbItem {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub name: String,
}

/// An entity with its immediate hierarchical surroundings.
///
/// Produced by a single resolution and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityContext {
    pub entity: Entity,
    #[serde(default)]
    pub parent: Option<Entity>,
    #[serde(default)]
    pub children: Vec<Entity>,
    /// Root first, ending with `entity`
    #[serde(default)]
    pub breadcrumb: Vec<BreadcrumbItem>,
}

impl EntityContext {
    /// Check this context against the hierarchy type map.
    ///
    /// Returns a description of the first violation found.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let entity_type = self.entity.entity_type();
        let id = self.entity.id();

        match (entity_type.parent_type(), &self.parent) {
            (None, Some(parent)) => {
                return Err(format!(
                    "{} {} cannot have a parent, got {} {}",
                    entity_type,
                    id,
                    parent.entity_type(),
                    parent.id()
                ));
            }
            (Some(expected), None) => {
                return Err(format!("{} {} has no parent {}", entity_type, id, expected));
            }
            (Some(expected), Some(parent)) if parent.entity_type() != expected => {
                return Err(format!(
                    "parent of {} {} must be a {}, got {}",
                    entity_type,
                    id,
                    expected,
                    parent.entity_type()
                ));
            }
            _ => {}
        }

        match entity_type.child_type() {
            None => {
                if !self.children.is_empty() {
                    return Err(format!(
                        "{} {} cannot have children, got {}",
                        entity_type,
                        id,
                        self.children.len()
                    ));
                }
            }
            Some(expected) => {
                if let Some(child) = self.children.iter().find(|c| c.entity_type() != expected) {
                    return Err(format!(
                        "children of {} {} must be {}, got {} {}",
                        entity_type,
                        id,
                        expected,
                        child.entity_type(),
                        child.id()
                    ));
                }
            }
        }

        self.check_breadcrumb()
    }

    fn check_breadcrumb(&self) -> std::result::Result<(), String> {
        let entity_type = self.entity.entity_type();
        let Some(last) = self.breadcrumb.last() else {
            return Err("breadcrumb is empty".to_string());
        };
        if last.id != self.entity.id() || last.entity_type != entity_type {
            return Err(format!(
                "breadcrumb ends with {} {}, expected {} {}",
                last.entity_type,
                last.id,
                entity_type,
                self.entity.id()
            ));
        }

        if !hierarchy::is_hierarchical(entity_type) {
            if self.breadcrumb.len() != 1 {
                return Err(format!(
                    "{} has no ancestors, breadcrumb has {} items",
                    entity_type,
                    self.breadcrumb.len()
                ));
            }
            return Ok(());
        }

        let first = &self.breadcrumb[0];
        if first.entity_type != hierarchy::ROOT_TYPE {
            return Err(format!(
                "breadcrumb must start at {}, starts at {}",
                hierarchy::ROOT_TYPE,
                first.entity_type
            ));
        }
        for pair in self.breadcrumb.windows(2) {
            if pair[0].entity_type.child_type() != Some(pair[1].entity_type) {
                return Err(format!(
                    "breadcrumb out of order: {} followed by {}",
                    pair[0].entity_type, pair[1].entity_type
                ));
            }
        }

        if let Some(parent) = &self.parent {
            let crumb = &self.breadcrumb[self.breadcrumb.len() - 2];
            if crumb.id != parent.id() {
                return Err(format!(
                    "breadcrumb parent {} does not match parent {}",
                    crumb.id,
                    parent.id()
                ));
            }
        }
        Ok(())
    }
}
