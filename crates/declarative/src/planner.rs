//! Execution planner - builds ordered, staged execution plans

use crate::resource::{BoxedResource, Resource};

/// Resources of one kind, applied together in declaration order
pub struct Stage<T: ?Sized> {
    /// Resource kind, passed to the state inspector
    pub kind: &'static str,
    pub resources: Vec<BoxedResource<T>>,
}

/// An execution plan: stages run strictly in order, one resource at a time
pub struct ExecutionPlan<T: ?Sized> {
    pub stages: Vec<Stage<T>>,
}

impl<T: ?Sized> ExecutionPlan<T> {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage; later stages may depend on earlier ones
    pub fn push_stage(&mut self, kind: &'static str, resources: Vec<BoxedResource<T>>) {
        self.stages.push(Stage { kind, resources });
    }

    /// Filter plan to only include resources matching a predicate
    ///
    /// Stage order is kept; stages left empty are kept too and skipped at
    /// execution time.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&str, &dyn Resource<T>) -> bool,
    {
        Self {
            stages: self
                .stages
                .into_iter()
                .map(|stage| Stage {
                    kind: stage.kind,
                    resources: stage
                        .resources
                        .into_iter()
                        .filter(|r| predicate(stage.kind, r.as_ref()))
                        .collect(),
                })
                .collect(),
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "kind" or "kind.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (kind, name) = parse_target(t);
                self.filter(|stage_kind, r| {
                    matches_filter(stage_kind, r, kind.as_deref(), name.as_deref())
                })
            }
        }
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.stages.iter().map(|s| s.resources.len()).sum()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.total_resources() == 0
    }
}

impl<T: ?Sized> Default for ExecutionPlan<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a target string like "kind.name" into (kind, name)
///
/// Only the first dot separates kind from name, so names may contain dots.
pub fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        None => (Some(target.to_string()), None),
        Some((kind, name)) => (Some(kind.to_string()), Some(name.to_string())),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter<T: ?Sized>(
    stage_kind: &str,
    resource: &dyn Resource<T>,
    kind: Option<&str>,
    name: Option<&str>,
) -> bool {
    if let Some(k) = kind
        && stage_kind != k
    {
        return false;
    }

    if let Some(n) = name
        && resource.id() != n
    {
        return false;
    }

    true
}
