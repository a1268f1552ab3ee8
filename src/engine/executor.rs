//! Reconciler - one full pass from definition tree to remote service

use declarative::{
    ApplyResult, ExecuteError, ExecuteOptions, ExecuteSummary, FailureClassifier,
    ProgressCallback, ResourceDiff, StageReport, execute,
};
use serde::Serialize;
use std::path::PathBuf;

use super::inspector::RemoteInspector;
use super::planner::build_filtered;
use super::{Kind, PackagePolicy};
use crate::definitions::{self, LoadError};
use crate::resource::Target;

/// Options for a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub package_policy: PackagePolicy,
    /// Inspect and decide, but issue no mutating call
    pub dry_run: bool,
    /// Restrict the pass to `kind` or `kind.name`
    pub target: Option<String>,
}

/// Outcome of a reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub dry_run: bool,
    #[serde(flatten)]
    pub summary: ExecuteSummary,
}

impl ReconcileReport {
    pub fn created(&self) -> usize {
        self.summary.created
    }

    pub fn recreated(&self) -> usize {
        self.summary.recreated
    }

    /// Resources already registered and left alone
    pub fn unchanged(&self) -> usize {
        self.summary.no_change
    }

    /// Resources not applied: unsupported, or skipped by a dry run
    pub fn skipped(&self) -> usize {
        self.summary.skipped + self.summary.unsupported
    }

    pub fn failed(&self) -> usize {
        self.summary.failed
    }

    pub fn warnings(&self) -> &[String] {
        &self.summary.warnings
    }

    pub fn stages(&self) -> &[StageReport] {
        &self.summary.stages
    }

    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    /// Ids of the resources that failed, as `kind.name`
    pub fn failures(&self) -> Vec<String> {
        self.stages()
            .iter()
            .flat_map(|s| {
                s.outcomes
                    .iter()
                    .filter(|o| !o.result.is_success())
                    .map(move |o| format!("{}.{}", s.kind, o.resource_id))
            })
            .collect()
    }
}

/// Errors that end a pass early
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The definition tree could not be loaded; nothing was sent
    #[error("failed to load definitions")]
    Load(#[from] LoadError),

    #[error("{0}")]
    InvalidTarget(String),

    /// The service could not be reached or refused our credentials
    ///
    /// Resources applied before the failure stay applied.
    #[error("remote service unavailable while reconciling {kind}: {error:#}")]
    RemoteUnavailable {
        kind: String,
        error: anyhow::Error,
        report: Box<ReconcileReport>,
    },
}

impl ReconcileError {
    /// Report of the work done before the pass stopped, if any was attempted
    pub fn partial_report(&self) -> Option<&ReconcileReport> {
        match self {
            Self::RemoteUnavailable { report, .. } => Some(report),
            _ => None,
        }
    }
}

/// Only transport and authentication failures stop a pass
///
/// Anything else (a rejected script, a name conflict) is specific to one
/// resource and recorded against it.
pub struct UnavailableIsFatal;

impl FailureClassifier for UnavailableIsFatal {
    fn is_fatal(&self, error: &anyhow::Error) -> bool {
        error
            .downcast_ref::<rawkit::Error>()
            .is_some_and(rawkit::Error::is_unavailable)
    }
}

/// Progress callback that reports through the `log` facade
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_stage_start(&mut self, kind: &str, count: usize) {
        log::debug!("reconciling {count} {kind}(s)");
    }

    fn on_resource_start(&mut self, diff: &ResourceDiff) {
        log::trace!("{}: {:?}", diff.description, diff.action);
    }

    fn on_resource_complete(&mut self, diff: &ResourceDiff, result: &ApplyResult) {
        let (kind, id) = (&diff.resource_type, &diff.resource_id);
        match result {
            ApplyResult::NoChange => log::debug!("{kind} '{id}' already registered, skipping"),
            ApplyResult::Created | ApplyResult::Recreated => {}
            ApplyResult::Unsupported { reason } => log::warn!("skipping {kind} '{id}': {reason}"),
            ApplyResult::Failed { error } => log::error!("failed to apply {kind} '{id}': {error}"),
            ApplyResult::Skipped { reason } => log::debug!("{kind} '{id}' not applied: {reason}"),
        }
    }

    fn on_stage_complete(&mut self, kind: &str) {
        log::debug!("{kind} stage complete");
    }
}

/// Brings the remote service in line with a definition tree
///
/// The backend is borrowed for the duration of the reconciler; every pass
/// loads the tree and lists remote state afresh.
pub struct Reconciler<'a> {
    backend: &'a Target,
    root: PathBuf,
    options: ReconcileOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(backend: &'a Target, root: impl Into<PathBuf>, options: ReconcileOptions) -> Self {
        Self {
            backend,
            root: root.into(),
            options,
        }
    }

    /// Run one pass, reporting progress through the log
    pub fn run(&self) -> Result<ReconcileReport, ReconcileError> {
        self.run_with(&mut LogProgress)
    }

    /// Run one pass with a custom progress callback
    pub fn run_with<P: ProgressCallback + ?Sized>(
        &self,
        progress: &mut P,
    ) -> Result<ReconcileReport, ReconcileError> {
        let defs = definitions::load(&self.root)?;

        let plan = build_filtered(
            &defs,
            self.options.package_policy,
            self.options.target.as_deref(),
        )
        .map_err(|e| ReconcileError::InvalidTarget(e.to_string()))?;

        if plan.is_empty() {
            log::info!("nothing declared under {}", self.root.display());
        }

        let opts = ExecuteOptions {
            dry_run: self.options.dry_run,
        };
        let dry_run = self.options.dry_run;

        match execute(
            &plan,
            self.backend,
            &opts,
            &RemoteInspector,
            &UnavailableIsFatal,
            progress,
        ) {
            Ok(summary) => Ok(ReconcileReport { dry_run, summary }),
            Err(err) => {
                let kind = Kind::from_alias(err.stage()).map_or_else(
                    || err.stage().to_string(),
                    |k| k.label().to_lowercase(),
                );
                let (error, summary) = match err {
                    ExecuteError::Inspect { error, summary, .. }
                    | ExecuteError::Aborted { error, summary, .. } => (error, *summary),
                };
                Err(ReconcileError::RemoteUnavailable {
                    kind,
                    error,
                    report: Box::new(ReconcileReport { dry_run, summary }),
                })
            }
        }
    }
}
