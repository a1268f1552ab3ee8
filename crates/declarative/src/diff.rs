//! Diff computation for resources

use crate::resource::Resource;
use crate::types::{Action, ExistingPolicy, ResourceState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A resource's registered state and the action decided for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Whether the resource is already registered
    pub current: ResourceState,
    /// Decided action
    pub action: Action,
}

impl ResourceDiff {
    /// Decide the action for a resource against the registered names
    pub fn from_resource<T: ?Sized>(
        resource: &dyn Resource<T>,
        registered: &BTreeSet<String>,
    ) -> Self {
        let id = resource.id();
        let current = ResourceState::of(&id, registered);
        let action = decide(current, resource.existing_policy(), resource.unsupported());

        Self {
            resource_id: id,
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            action,
        }
    }

    /// Check if this diff issues mutating calls
    pub fn is_change(&self) -> bool {
        self.action.is_change()
    }
}

/// Decide an action from the registered state and the resource's policies
///
/// A registered resource is never reported as unsupported: it is skipped or
/// recreated according to its policy.
pub fn decide(
    current: ResourceState,
    policy: ExistingPolicy,
    unsupported: Option<String>,
) -> Action {
    match (current, policy) {
        (ResourceState::Present, ExistingPolicy::Skip) => Action::Skip,
        (ResourceState::Present, ExistingPolicy::Recreate) => Action::Recreate,
        (ResourceState::Absent, _) => match unsupported {
            Some(reason) => Action::Unsupported { reason },
            None => Action::Create,
        },
    }
}

/// Compute diffs for a list of resources, preserving order
pub fn compute_diffs<T: ?Sized>(
    resources: &[Box<dyn Resource<T>>],
    registered: &BTreeSet<String>,
) -> Vec<ResourceDiff> {
    resources
        .iter()
        .map(|r| ResourceDiff::from_resource(r.as_ref(), registered))
        .collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to create
    pub creations: usize,
    /// Number of resources to delete and create again
    pub recreations: usize,
    /// Number of resources already registered and left alone
    pub unchanged: usize,
    /// Number of resources that cannot be applied
    pub unsupported: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs<'a>(diffs: impl IntoIterator<Item = &'a ResourceDiff>) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.action {
                Action::Skip => summary.unchanged += 1,
                Action::Create => summary.creations += 1,
                Action::Recreate => summary.recreations += 1,
                Action::Unsupported { .. } => summary.unsupported += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.creations + self.recreations
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_matrix() {
        use ExistingPolicy::{Recreate, Skip};
        use ResourceState::{Absent, Present};

        assert_eq!(decide(Present, Skip, None), Action::Skip);
        assert_eq!(decide(Present, Recreate, None), Action::Recreate);
        assert_eq!(decide(Absent, Skip, None), Action::Create);
        assert_eq!(decide(Absent, Recreate, None), Action::Create);
        assert_eq!(
            decide(Absent, Skip, Some("no driver".into())),
            Action::Unsupported {
                reason: "no driver".into()
            }
        );
        assert_eq!(decide(Present, Skip, Some("no driver".into())), Action::Skip);
    }

    #[test]
    fn test_diff_summary() {
        let diff = |action| ResourceDiff {
            resource_id: "x".into(),
            resource_type: "view".into(),
            description: String::new(),
            current: ResourceState::Absent,
            action,
        };
        let diffs = vec![
            diff(Action::Create),
            diff(Action::Skip),
            diff(Action::Recreate),
            diff(Action::Unsupported {
                reason: "nope".into(),
            }),
        ];

        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.creations, 1);
        assert_eq!(summary.recreations, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.unsupported, 1);
        assert_eq!(summary.total(), 2);
        assert!(summary.has_changes());
    }
}
