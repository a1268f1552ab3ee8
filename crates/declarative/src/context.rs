//! Apply context and provider traits
//!
//! These traits keep the executor independent of any particular target:
//! how registered names are fetched, which failures stop a run, and how
//! progress is shown are all supplied by the caller.

use crate::diff::ResourceDiff;
use crate::types::ApplyResult;
use anyhow::Result;
use std::collections::BTreeSet;

/// Context passed to resource apply operations
pub struct ApplyContext<'a, T: ?Sized> {
    /// Target the resource is applied to
    pub target: &'a T,
}

impl<'a, T: ?Sized> ApplyContext<'a, T> {
    /// Create a new apply context
    pub fn new(target: &'a T) -> Self {
        Self { target }
    }
}

/// Provider of the names currently registered on a target
///
/// Called once per stage, right before the stage runs, so each stage sees
/// the effects of earlier stages.
pub trait StateInspector<T: ?Sized> {
    /// Names registered for `resource_type`
    fn registered(&self, target: &T, resource_type: &str) -> Result<BTreeSet<String>>;
}

/// Classifier for apply failures
///
/// Implement this trait to decide which failures stop the whole run
/// instead of being recorded against a single resource.
pub trait FailureClassifier {
    /// Check if an apply error must abort execution
    fn is_fatal(&self, error: &anyhow::Error) -> bool;
}

/// Default classifier: every failure is local to its resource
pub struct NeverFatal;

impl FailureClassifier for NeverFatal {
    fn is_fatal(&self, _error: &anyhow::Error) -> bool {
        false
    }
}

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback {
    /// Called before a stage inspects the target
    fn on_stage_start(&mut self, kind: &str, count: usize);

    /// Called when starting to apply a single resource
    fn on_resource_start(&mut self, diff: &ResourceDiff);

    /// Called when a resource application completes
    fn on_resource_complete(&mut self, diff: &ResourceDiff, result: &ApplyResult);

    /// Called when a stage completes
    fn on_stage_complete(&mut self, kind: &str);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_stage_start(&mut self, _kind: &str, _count: usize) {}
    fn on_resource_start(&mut self, _diff: &ResourceDiff) {}
    fn on_resource_complete(&mut self, _diff: &ResourceDiff, _result: &ApplyResult) {}
    fn on_stage_complete(&mut self, _kind: &str) {}
}
