//! Diff collection and display - what a pass would do, grouped by kind

use colored::{ColoredString, Colorize};
use declarative::{Action, ApplyResult, DiffSummary, ProgressCallback, ResourceDiff};

use super::Kind;
use super::executor::LogProgress;

/// Progress callback that keeps every decided diff, in apply order
#[derive(Debug, Default)]
pub struct DiffCollector {
    pub diffs: Vec<ResourceDiff>,
    log: LogProgress,
}

impl ProgressCallback for DiffCollector {
    fn on_stage_start(&mut self, kind: &str, count: usize) {
        self.log.on_stage_start(kind, count);
    }

    fn on_resource_start(&mut self, diff: &ResourceDiff) {
        self.diffs.push(diff.clone());
    }

    fn on_resource_complete(&mut self, diff: &ResourceDiff, result: &ApplyResult) {
        self.log.on_resource_complete(diff, result);
    }

    fn on_stage_complete(&mut self, kind: &str) {
        self.log.on_stage_complete(kind);
    }
}

fn symbol(action: &Action) -> ColoredString {
    match action {
        Action::Create => "+".green(),
        Action::Recreate => "~".yellow(),
        Action::Skip => "=".dimmed(),
        Action::Unsupported { .. } => "!".red(),
    }
}

fn note(action: &Action) -> String {
    match action {
        Action::Create => "(not registered)".to_string(),
        Action::Recreate => "(registered, will be replaced)".to_string(),
        Action::Skip => "(registered)".to_string(),
        Action::Unsupported { reason } => format!("({reason})"),
    }
}

/// Display diffs grouped by kind, in stage order
///
/// Unchanged resources are listed only when `show_unchanged` is set.
pub fn display_diff(diffs: &[ResourceDiff], show_unchanged: bool) {
    let summary = DiffSummary::from_diffs(diffs);

    if !summary.has_changes() && summary.unsupported == 0 && !show_unchanged {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Reconciliation Diff".bold()
    );
    println!("│");

    for kind in Kind::ALL {
        let kind_diffs: Vec<&ResourceDiff> = diffs
            .iter()
            .filter(|d| d.resource_type == kind.as_str())
            .filter(|d| show_unchanged || d.action != Action::Skip)
            .collect();
        if kind_diffs.is_empty() {
            continue;
        }

        println!("│ {}", kind.label().bold());
        for diff in kind_diffs {
            println!(
                "│   {} {:<30} {}",
                symbol(&diff.action),
                diff.resource_id,
                note(&diff.action).dimmed()
            );
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} create, {} replace), {} unchanged, {} unsupported",
        summary.total().to_string().bold(),
        summary.creations.to_string().green(),
        summary.recreations.to_string().yellow(),
        summary.unchanged,
        summary.unsupported.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}
