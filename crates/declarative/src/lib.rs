//! # Declarative
//!
//! A framework for reconciling declared resources against a target that
//! only supports listing names and creating (sometimes deleting) entries.
//!
//! ## Core Concepts
//!
//! - **Resource**: One declared entry that can be created on a target
//! - **ResourceState**: Whether a name is already registered on the target
//! - **ExecutionPlan**: Ordered stages, one per resource kind
//! - **Executor**: Lists each stage's registered names, decides an action per
//!   resource, and applies resources one at a time
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     execute, ApplyContext, ExecuteOptions, ExecutionPlan, NeverFatal, NoProgress, Resource,
//! };
//!
//! let mut plan = ExecutionPlan::new();
//! plan.push_stage("topic", vec![Box::new(Topic { name: "events".into() })]);
//!
//! let summary = execute(
//!     &plan,
//!     &broker,
//!     &ExecuteOptions::default(),
//!     &BrokerInspector,
//!     &NeverFatal,
//!     &mut NoProgress,
//! )?;
//! println!("{} created", summary.created);
//! ```
//!
//! ## Provider Traits
//!
//! - [`StateInspector`]: Lists registered names per kind
//! - [`FailureClassifier`]: Determines which failures abort the run
//! - [`ProgressCallback`]: Receives progress updates

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, FailureClassifier, NeverFatal, NoProgress, ProgressCallback, StateInspector,
};
pub use diff::{compute_diffs, decide, DiffSummary, ResourceDiff};
pub use executor::{execute, ExecuteError};
pub use planner::{parse_target, ExecutionPlan, Stage};
pub use resource::{BoxedResource, Resource};
pub use types::{
    Action, ApplyResult, ExecuteOptions, ExecuteSummary, ExistingPolicy, Outcome, ResourceState,
    StageReport,
};
