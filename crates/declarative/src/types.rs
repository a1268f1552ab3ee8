//! Core types for declarative reconciliation

use serde::{Deserialize, Serialize};

/// Whether a declared resource is already registered on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// A resource with the same name is registered
    Present,
    /// No resource with this name is registered
    Absent,
}

impl ResourceState {
    /// State of `id` given the set of registered names
    pub fn of(id: &str, registered: &std::collections::BTreeSet<String>) -> Self {
        if registered.contains(id) {
            Self::Present
        } else {
            Self::Absent
        }
    }

    /// Check if state represents presence
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

/// What to do with a resource that is already registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingPolicy {
    /// Leave it alone
    #[default]
    Skip,
    /// Delete it, then create it again from the declaration
    Recreate,
}

/// The action decided for one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Already registered, nothing to do
    Skip,
    /// Not registered, create it
    Create,
    /// Registered, delete and create again
    Recreate,
    /// Not registered and cannot be created by this target
    Unsupported { reason: String },
}

impl Action {
    /// Check if the action issues mutating calls
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Create | Self::Recreate)
    }
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was deleted and created again
    Recreated,
    /// Resource cannot be applied; reported as a warning
    Unsupported { reason: String },
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Recreated)
    }
}

/// One resource's decided action and the result of carrying it out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub resource_id: String,
    pub action: Action,
    pub result: ApplyResult,
}

/// Outcomes of one stage, in apply order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    /// Resource kind handled by the stage
    pub kind: String,
    /// Number of names registered on the target before the stage ran
    pub registered: usize,
    pub outcomes: Vec<Outcome>,
}

impl StageReport {
    pub fn new(kind: &str, registered: usize) -> Self {
        Self {
            kind: kind.to_string(),
            registered,
            outcomes: Vec::new(),
        }
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub recreated: usize,
    pub skipped: usize,
    pub unsupported: usize,
    pub failed: usize,
    pub no_change: usize,
    /// Non-fatal conditions worth surfacing (overwrites, unsupported resources)
    pub warnings: Vec<String>,
    pub stages: Vec<StageReport>,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.recreated
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created + self.recreated + self.skipped + self.unsupported + self.failed + self.no_change
    }

    /// Add a result to the counters
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Recreated => self.recreated += 1,
            ApplyResult::Unsupported { .. } => self.unsupported += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }

    /// Record a finished stage, counting its outcomes and collecting warnings
    pub fn push_stage(&mut self, stage: StageReport) {
        for outcome in &stage.outcomes {
            self.add_result(&outcome.result);
            match &outcome.result {
                ApplyResult::Unsupported { reason } => self
                    .warnings
                    .push(format!("{} '{}' skipped: {}", stage.kind, outcome.resource_id, reason)),
                ApplyResult::Recreated => self
                    .warnings
                    .push(format!("{} '{}' was overwritten", stage.kind, outcome.resource_id)),
                _ => {}
            }
        }
        self.stages.push(stage);
    }

    /// Outcome of a resource by kind and id
    pub fn outcome(&self, kind: &str, id: &str) -> Option<&Outcome> {
        self.stages
            .iter()
            .filter(|s| s.kind == kind)
            .flat_map(|s| s.outcomes.iter())
            .find(|o| o.resource_id == id)
    }
}

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Inspect and decide, but don't issue mutating calls
    pub dry_run: bool,
}
