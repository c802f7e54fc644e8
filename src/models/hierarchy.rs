//! Fixed parent/child type map for the work-tracking hierarchy.
//!
//! The hierarchical types form a strict linear chain:
//!
//! ```text
//! client → program → project → usecase → userstory → task → subtask
//! ```
//!
//! `bug`, `phase` and `user` are leaf types with no position in the chain.

use super::EntityType;

/// The hierarchy chain, root first.
pub const HIERARCHY_CHAIN: [EntityType; 7] = [
    EntityType::Client,
    EntityType::Program,
    EntityType::Project,
    EntityType::UseCase,
    EntityType::UserStory,
    EntityType::Task,
    EntityType::Subtask,
];

/// Types outside the chain. They have neither parent nor child.
pub const DETACHED_TYPES: [EntityType; 3] =
    [EntityType::Bug, EntityType::Phase, EntityType::User];

/// Root of the chain.
pub const ROOT_TYPE: EntityType = EntityType::Client;

/// Position of `t` in the chain, or `None` for detached types.
pub fn depth_of(t: EntityType) -> Option<usize> {
    HIERARCHY_CHAIN.iter().position(|&c| c == t)
}

/// Parent type of `t`, or `None` for the root and for detached types.
pub fn parent_type_of(t: EntityType) -> Option<EntityType> {
    match t {
        EntityType::Client => None,
        EntityType::Program => Some(EntityType::Client),
        EntityType::Project => Some(EntityType::Program),
        EntityType::UseCase => Some(EntityType::Project),
        EntityType::UserStory => Some(EntityType::UseCase),
        EntityType::Task => Some(EntityType::UserStory),
        EntityType::Subtask => Some(EntityType::Task),
        EntityType::Bug | EntityType::Phase | EntityType::User => None,
    }
}

/// Child type of `t`, or `None` for the leaf and for detached types.
pub fn child_type_of(t: EntityType) -> Option<EntityType> {
    match t {
        EntityType::Client => Some(EntityType::Program),
        EntityType::Program => Some(EntityType::Project),
        EntityType::Project => Some(EntityType::UseCase),
        EntityType::UseCase => Some(EntityType::UserStory),
        EntityType::UserStory => Some(EntityType::Task),
        EntityType::Task => Some(EntityType::Subtask),
        EntityType::Subtask => None,
        EntityType::Bug | EntityType::Phase | EntityType::User => None,
    }
}

/// Whether `t` is part of the hierarchy chain.
pub fn is_hierarchical(t: EntityType) -> bool {
    depth_of(t).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_consistent_in_both_directions() {
        for t in HIERARCHY_CHAIN {
            if let Some(parent) = parent_type_of(t) {
                assert_eq!(child_type_of(parent), Some(t), "child of parent of {t}");
            }
            if let Some(child) = child_type_of(t) {
                assert_eq!(parent_type_of(child), Some(t), "parent of child of {t}");
            }
        }
    }

    #[test]
    fn test_chain_endpoints() {
        assert_eq!(parent_type_of(EntityType::Client), None);
        assert_eq!(child_type_of(EntityType::Subtask), None);
        assert_eq!(child_type_of(EntityType::Client), Some(EntityType::Program));
        assert_eq!(parent_type_of(EntityType::Subtask), Some(EntityType::Task));
    }

    #[test]
    fn test_detached_types_have_no_neighbours() {
        for t in DETACHED_TYPES {
            assert_eq!(parent_type_of(t), None);
            assert_eq!(child_type_of(t), None);
            assert!(!is_hierarchical(t));
        }
    }

    #[test]
    fn test_walking_children_from_root_visits_whole_chain() {
        let mut walked = vec![ROOT_TYPE];
        let mut current = ROOT_TYPE;
        while let Some(next) = child_type_of(current) {
            walked.push(next);
            current = next;
        }
        assert_eq!(walked, HIERARCHY_CHAIN.to_vec());
    }

    #[test]
    fn test_depth_matches_chain_position() {
        assert_eq!(depth_of(EntityType::Client), Some(0));
        assert_eq!(depth_of(EntityType::UseCase), Some(3));
        assert_eq!(depth_of(EntityType::Subtask), Some(6));
        assert_eq!(depth_of(EntityType::Bug), None);
    }
}
