//! Execution engine - applies staged plans sequentially against a target

use crate::context::{ApplyContext, FailureClassifier, ProgressCallback, StateInspector};
use crate::diff::compute_diffs;
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{Action, ApplyResult, ExecuteOptions, ExecuteSummary, Outcome, StageReport};

/// Errors that stop execution before the plan completes
///
/// Both variants carry the summary of everything done so far, including the
/// stage that was interrupted.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    /// The registered names of a kind could not be fetched
    #[error("failed to list registered {kind} resources: {error:#}")]
    Inspect {
        kind: String,
        error: anyhow::Error,
        summary: Box<ExecuteSummary>,
    },

    /// A resource failed in a way the classifier marked as fatal
    #[error("aborted at {kind} '{id}': {error:#}")]
    Aborted {
        kind: String,
        id: String,
        error: anyhow::Error,
        summary: Box<ExecuteSummary>,
    },
}

impl ExecuteError {
    /// Summary of the work completed before execution stopped
    pub fn summary(&self) -> &ExecuteSummary {
        match self {
            Self::Inspect { summary, .. } | Self::Aborted { summary, .. } => summary,
        }
    }

    /// Resource kind of the stage that stopped
    pub fn stage(&self) -> &str {
        match self {
            Self::Inspect { kind, .. } | Self::Aborted { kind, .. } => kind,
        }
    }

    /// Underlying error
    pub fn error(&self) -> &anyhow::Error {
        match self {
            Self::Inspect { error, .. } | Self::Aborted { error, .. } => error,
        }
    }

    /// Take the partial summary out of the error
    pub fn into_summary(self) -> ExecuteSummary {
        match self {
            Self::Inspect { summary, .. } | Self::Aborted { summary, .. } => *summary,
        }
    }
}

/// Execute a plan against a target
///
/// Stages run in plan order. Before a non-empty stage runs, `inspector`
/// lists the names registered for its kind; stages with no resources are
/// skipped without touching the target. Within a stage, resources are
/// applied one at a time in declaration order.
///
/// A failed resource is recorded and execution continues, unless
/// `classifier` reports the failure as fatal.
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `target` - Target the resources are applied to
/// * `opts` - Execution options (dry_run)
/// * `inspector` - Source of the registered names per kind
/// * `classifier` - Decides which failures abort the run
/// * `progress` - Progress callback
pub fn execute<T, I, C, P>(
    plan: &ExecutionPlan<T>,
    target: &T,
    opts: &ExecuteOptions,
    inspector: &I,
    classifier: &C,
    progress: &mut P,
) -> Result<ExecuteSummary, ExecuteError>
where
    T: ?Sized,
    I: StateInspector<T> + ?Sized,
    C: FailureClassifier + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let mut summary = ExecuteSummary::default();

    for stage in &plan.stages {
        if stage.resources.is_empty() {
            continue;
        }

        progress.on_stage_start(stage.kind, stage.resources.len());

        let registered = match inspector.registered(target, stage.kind) {
            Ok(names) => names,
            Err(error) => {
                return Err(ExecuteError::Inspect {
                    kind: stage.kind.to_string(),
                    error,
                    summary: Box::new(summary),
                });
            }
        };

        let diffs = compute_diffs(&stage.resources, &registered);
        let mut report = StageReport::new(stage.kind, registered.len());

        for (resource, diff) in stage.resources.iter().zip(diffs) {
            progress.on_resource_start(&diff);

            let (result, fatal) = match apply_resource(resource.as_ref(), &diff.action, target, opts)
            {
                Ok(result) => (result, None),
                Err(error) => {
                    let result = ApplyResult::Failed {
                        error: format!("{error:#}"),
                    };
                    let fatal = classifier.is_fatal(&error).then_some(error);
                    (result, fatal)
                }
            };

            progress.on_resource_complete(&diff, &result);
            report.outcomes.push(Outcome {
                resource_id: diff.resource_id.clone(),
                action: diff.action,
                result,
            });

            if let Some(error) = fatal {
                summary.push_stage(report);
                return Err(ExecuteError::Aborted {
                    kind: stage.kind.to_string(),
                    id: diff.resource_id,
                    error,
                    summary: Box::new(summary),
                });
            }
        }

        summary.push_stage(report);
        progress.on_stage_complete(stage.kind);
    }

    Ok(summary)
}

/// Carry out the decided action for a single resource
fn apply_resource<T: ?Sized>(
    resource: &dyn Resource<T>,
    action: &Action,
    target: &T,
    opts: &ExecuteOptions,
) -> anyhow::Result<ApplyResult> {
    match action {
        Action::Skip => return Ok(ApplyResult::NoChange),
        Action::Unsupported { reason } => {
            return Ok(ApplyResult::Unsupported {
                reason: reason.clone(),
            });
        }
        Action::Create | Action::Recreate if opts.dry_run => {
            return Ok(ApplyResult::Skipped {
                reason: "dry run".to_string(),
            });
        }
        Action::Create | Action::Recreate => {}
    }

    let mut ctx = ApplyContext::new(target);
    if *action == Action::Recreate {
        resource.delete(&mut ctx)?;
        resource.create(&mut ctx)?;
        Ok(ApplyResult::Recreated)
    } else {
        resource.create(&mut ctx)?;
        Ok(ApplyResult::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{NeverFatal, NoProgress};
    use crate::types::ExistingPolicy;
    use anyhow::bail;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};

    /// Target recording every call in order
    #[derive(Default)]
    struct Recorder {
        registered: RefCell<BTreeMap<&'static str, BTreeSet<String>>>,
        calls: RefCell<Vec<String>>,
        listing_fails: Option<&'static str>,
    }

    impl Recorder {
        fn with(kind: &'static str, names: &[&str]) -> Self {
            let recorder = Self::default();
            recorder
                .registered
                .borrow_mut()
                .insert(kind, names.iter().map(|s| s.to_string()).collect());
            recorder
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    struct Inspector;

    impl StateInspector<Recorder> for Inspector {
        fn registered(
            &self,
            target: &Recorder,
            resource_type: &str,
        ) -> anyhow::Result<BTreeSet<String>> {
            target.calls.borrow_mut().push(format!("list {resource_type}"));
            if target.listing_fails == Some(resource_type) {
                bail!("connection refused");
            }
            Ok(target
                .registered
                .borrow()
                .get(resource_type)
                .cloned()
                .unwrap_or_default())
        }
    }

    struct FatalOnUnreachable;

    impl FailureClassifier for FatalOnUnreachable {
        fn is_fatal(&self, error: &anyhow::Error) -> bool {
            error.to_string().contains("unreachable")
        }
    }

    #[derive(Debug)]
    struct Item {
        kind: &'static str,
        name: &'static str,
        policy: ExistingPolicy,
        unsupported: Option<&'static str>,
        fails_with: Option<&'static str>,
    }

    impl Item {
        fn new(kind: &'static str, name: &'static str) -> Self {
            Self {
                kind,
                name,
                policy: ExistingPolicy::Skip,
                unsupported: None,
                fails_with: None,
            }
        }
    }

    impl Resource<Recorder> for Item {
        fn id(&self) -> String {
            self.name.to_string()
        }

        fn description(&self) -> String {
            format!("{} {}", self.kind, self.name)
        }

        fn resource_type(&self) -> &'static str {
            self.kind
        }

        fn existing_policy(&self) -> ExistingPolicy {
            self.policy
        }

        fn unsupported(&self) -> Option<String> {
            self.unsupported.map(String::from)
        }

        fn create(&self, ctx: &mut ApplyContext<'_, Recorder>) -> anyhow::Result<()> {
            ctx.target
                .calls
                .borrow_mut()
                .push(format!("create {}", self.name));
            if let Some(msg) = self.fails_with {
                bail!("{msg}");
            }
            Ok(())
        }

        fn delete(&self, ctx: &mut ApplyContext<'_, Recorder>) -> anyhow::Result<()> {
            ctx.target
                .calls
                .borrow_mut()
                .push(format!("delete {}", self.name));
            Ok(())
        }
    }

    fn run(
        plan: &ExecutionPlan<Recorder>,
        target: &Recorder,
        opts: &ExecuteOptions,
    ) -> Result<ExecuteSummary, ExecuteError> {
        execute(plan, target, opts, &Inspector, &FatalOnUnreachable, &mut NoProgress)
    }

    #[test]
    fn test_stages_run_in_order_and_list_before_apply() {
        let mut plan = ExecutionPlan::new();
        plan.push_stage("bucket", vec![Box::new(Item::new("bucket", "b1"))]);
        plan.push_stage("view", vec![Box::new(Item::new("view", "v1"))]);

        let target = Recorder::default();
        let summary = run(&plan, &target, &ExecuteOptions::default()).unwrap();

        assert_eq!(
            target.calls(),
            vec!["list bucket", "create b1", "list view", "create v1"]
        );
        assert_eq!(summary.created, 2);
        assert!(summary.is_success());
    }

    #[test]
    fn test_empty_stage_is_not_inspected() {
        let mut plan = ExecutionPlan::new();
        plan.push_stage("bucket", Vec::new());
        plan.push_stage("view", vec![Box::new(Item::new("view", "v1"))]);

        let target = Recorder::default();
        let summary = run(&plan, &target, &ExecuteOptions::default()).unwrap();

        assert_eq!(target.calls(), vec!["list view", "create v1"]);
        assert_eq!(summary.stages.len(), 1);
    }

    #[test]
    fn test_registered_resource_is_skipped() {
        let mut plan = ExecutionPlan::new();
        plan.push_stage(
            "view",
            vec![
                Box::new(Item::new("view", "v1")),
                Box::new(Item::new("view", "v2")),
            ],
        );

        let target = Recorder::with("view", &["v1"]);
        let summary = run(&plan, &target, &ExecuteOptions::default()).unwrap();

        assert_eq!(target.calls(), vec!["list view", "create v2"]);
        assert_eq!(summary.no_change, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.stages[0].registered, 1);
    }

    #[test]
    fn test_recreate_deletes_then_creates() {
        let mut item = Item::new("package", "utils");
        item.policy = ExistingPolicy::Recreate;
        let mut plan = ExecutionPlan::new();
        plan.push_stage("package", vec![Box::new(item)]);

        let target = Recorder::with("package", &["utils"]);
        let summary = run(&plan, &target, &ExecuteOptions::default()).unwrap();

        assert_eq!(
            target.calls(),
            vec!["list package", "delete utils", "create utils"]
        );
        assert_eq!(summary.recreated, 1);
        assert_eq!(summary.warnings, vec!["package 'utils' was overwritten"]);
    }

    #[test]
    fn test_unsupported_is_reported_without_calls() {
        let mut item = Item::new("rdbms", "legacy");
        item.unsupported = Some("unsupported database type 'db2'");
        let mut plan = ExecutionPlan::new();
        plan.push_stage("rdbms", vec![Box::new(item)]);

        let target = Recorder::default();
        let summary = run(&plan, &target, &ExecuteOptions::default()).unwrap();

        assert_eq!(target.calls(), vec!["list rdbms"]);
        assert_eq!(summary.unsupported, 1);
        assert!(summary.is_success());
        assert_eq!(summary.warnings.len(), 1);
    }

    #[test]
    fn test_local_failure_continues() {
        let mut broken = Item::new("view", "broken");
        broken.fails_with = Some("HTTP 400: syntax error");
        let mut plan = ExecutionPlan::new();
        plan.push_stage(
            "view",
            vec![Box::new(broken), Box::new(Item::new("view", "ok"))],
        );

        let target = Recorder::default();
        let summary = run(&plan, &target, &ExecuteOptions::default()).unwrap();

        assert_eq!(target.calls(), vec!["list view", "create broken", "create ok"]);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.created, 1);
        assert!(matches!(
            summary.outcome("view", "broken").unwrap().result,
            ApplyResult::Failed { .. }
        ));
    }

    #[test]
    fn test_fatal_failure_aborts_with_partial_summary() {
        let mut down = Item::new("view", "v1");
        down.fails_with = Some("service unreachable");
        let mut plan = ExecutionPlan::new();
        plan.push_stage("bucket", vec![Box::new(Item::new("bucket", "b1"))]);
        plan.push_stage(
            "view",
            vec![Box::new(down), Box::new(Item::new("view", "v2"))],
        );
        plan.push_stage("package", vec![Box::new(Item::new("package", "p1"))]);

        let target = Recorder::default();
        let err = run(&plan, &target, &ExecuteOptions::default()).unwrap_err();

        assert!(matches!(err, ExecuteError::Aborted { .. }));
        assert_eq!(err.stage(), "view");
        assert_eq!(err.summary().created, 1);
        assert_eq!(err.summary().failed, 1);
        assert_eq!(
            target.calls(),
            vec!["list bucket", "create b1", "list view", "create v1"]
        );
    }

    #[test]
    fn test_never_fatal_records_everything() {
        let mut down = Item::new("view", "v1");
        down.fails_with = Some("service unreachable");
        let mut plan = ExecutionPlan::new();
        plan.push_stage("view", vec![Box::new(down)]);

        let target = Recorder::default();
        let summary = execute(
            &plan,
            &target,
            &ExecuteOptions::default(),
            &Inspector,
            &NeverFatal,
            &mut NoProgress,
        )
        .unwrap();
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_inspect_failure_stops_before_stage() {
        let mut plan = ExecutionPlan::new();
        plan.push_stage("bucket", vec![Box::new(Item::new("bucket", "b1"))]);
        plan.push_stage("view", vec![Box::new(Item::new("view", "v1"))]);

        let target = Recorder {
            listing_fails: Some("view"),
            ..Default::default()
        };
        let err = run(&plan, &target, &ExecuteOptions::default()).unwrap_err();

        assert!(matches!(err, ExecuteError::Inspect { .. }));
        assert_eq!(err.stage(), "view");
        assert_eq!(err.summary().created, 1);
        assert_eq!(target.calls(), vec!["list bucket", "create b1", "list view"]);
    }

    #[test]
    fn test_dry_run_issues_no_mutations() {
        let mut plan = ExecutionPlan::new();
        plan.push_stage(
            "view",
            vec![
                Box::new(Item::new("view", "v1")),
                Box::new(Item::new("view", "v2")),
            ],
        );

        let target = Recorder::with("view", &["v1"]);
        let opts = ExecuteOptions { dry_run: true };
        let summary = run(&plan, &target, &opts).unwrap();

        assert_eq!(target.calls(), vec!["list view"]);
        assert_eq!(summary.no_change, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_progress_callbacks() {
        #[derive(Default)]
        struct Events(Vec<String>);

        impl ProgressCallback for Events {
            fn on_stage_start(&mut self, kind: &str, count: usize) {
                self.0.push(format!("start {kind} {count}"));
            }
            fn on_resource_start(&mut self, diff: &crate::diff::ResourceDiff) {
                self.0.push(format!("begin {}", diff.resource_id));
            }
            fn on_resource_complete(
                &mut self,
                diff: &crate::diff::ResourceDiff,
                result: &ApplyResult,
            ) {
                self.0.push(format!("end {} {:?}", diff.resource_id, result));
            }
            fn on_stage_complete(&mut self, kind: &str) {
                self.0.push(format!("done {kind}"));
            }
        }

        let mut plan = ExecutionPlan::new();
        plan.push_stage("view", vec![Box::new(Item::new("view", "v1"))]);

        let target = Recorder::default();
        let mut events = Events::default();
        execute(
            &plan,
            &target,
            &ExecuteOptions::default(),
            &Inspector,
            &NeverFatal,
            &mut events,
        )
        .unwrap();

        assert_eq!(
            events.0,
            vec!["start view 1", "begin v1", "end v1 Created", "done view"]
        );
    }
}
