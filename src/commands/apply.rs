//! `rawinit apply` - one reconciliation pass

use anyhow::{Result, bail};
use colored::Colorize;
use declarative::{ApplyResult, ProgressCallback, ResourceDiff};

use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::executor::LogProgress;
use crate::engine::{Kind, ReconcileError, ReconcileOptions, ReconcileReport, Reconciler};
use crate::ui;

/// Prints one line per resource as the pass goes
#[derive(Default)]
struct ConsoleProgress {
    log: LogProgress,
}

impl ProgressCallback for ConsoleProgress {
    fn on_stage_start(&mut self, kind: &str, count: usize) {
        self.log.on_stage_start(kind, count);
        let label = Kind::from_alias(kind).map_or(kind, |k| k.label());
        ui::section(&format!("{label} ({count})"));
    }

    fn on_resource_start(&mut self, diff: &ResourceDiff) {
        self.log.on_resource_start(diff);
    }

    fn on_resource_complete(&mut self, diff: &ResourceDiff, result: &ApplyResult) {
        self.log.on_resource_complete(diff, result);
        let detail = match result {
            ApplyResult::NoChange => "already registered".dimmed().to_string(),
            ApplyResult::Created => diff.description.clone(),
            ApplyResult::Recreated => format!("{} (replaced)", diff.description),
            ApplyResult::Unsupported { reason } => reason.yellow().to_string(),
            ApplyResult::Failed { error } => error.red().to_string(),
            ApplyResult::Skipped { reason } => format!("{} ({reason})", diff.description),
        };
        println!("  {} {:<30} {}", ui::result_symbol(result), diff.resource_id, detail);
    }

    fn on_stage_complete(&mut self, kind: &str) {
        self.log.on_stage_complete(kind);
    }
}

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let config = super::load_config(ctx, &args.overrides())?;
    let backend = super::connect(&config)?;
    let root = config.source_root();

    let options = ReconcileOptions {
        package_policy: config.reconcile.package_policy,
        dry_run: args.dry_run,
        target: args.target.clone(),
    };
    let reconciler = Reconciler::new(&backend, &root, options);

    if !ctx.quiet && !args.json {
        ui::info(&format!(
            "Reconciling {} against {}",
            root.display(),
            backend.executor_url()
        ));
    }

    let result = if ctx.quiet || args.json {
        reconciler.run()
    } else {
        reconciler.run_with(&mut ConsoleProgress::default())
    };

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            if let Some(partial) = err.partial_report() {
                emit_report(ctx, &args, partial)?;
            }
            if let ReconcileError::RemoteUnavailable { error, .. } = &err
                && let Some(remote) = error.downcast_ref::<rawkit::Error>()
            {
                ui::dim(remote.category().advice());
            }
            return Err(err.into());
        }
    };

    emit_report(ctx, &args, &report)?;

    if !report.is_success() {
        bail!(
            "{} failed: {}",
            ui::plural(report.failed(), "resource"),
            report.failures().join(", ")
        );
    }

    if args.dry_run && !ctx.quiet && !args.json {
        println!();
        ui::info("Dry run - no changes made");
    } else if !ctx.quiet && !args.json {
        println!();
        ui::success("Remote service is in sync with the definition tree");
    }

    Ok(())
}

/// Print a report, complete or partial, in the format asked for
fn emit_report(ctx: &Context, args: &ApplyArgs, report: &ReconcileReport) -> Result<()> {
    if args.json {
        println!("{}", report_json(report)?);
    } else if !ctx.quiet {
        super::print_report(report);
    }
    Ok(())
}

fn report_json(report: &ReconcileReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::tests::tree;
    use rawkit::{Failure, MemoryBackend};

    #[test]
    fn test_partial_report_json() {
        let dir = tree(Some("b1\n"), None, Some(&[("01_a.rql", "a")]), Some(&[]));
        let backend = MemoryBackend::new();
        backend.fail("list_views", None, Failure::Status(500));

        let err = Reconciler::new(&backend, dir.path(), ReconcileOptions::default())
            .run()
            .unwrap_err();
        let partial = err.partial_report().unwrap();

        let text = report_json(partial).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["dry_run"], false);
        assert_eq!(json["created"], 1);
        assert_eq!(json["stages"][0]["kind"], "bucket");
    }
}
