//! Command implementations
//!
//! - `apply` - Run one reconciliation pass
//! - `diff` - Preview what a pass would change
//! - `check` - Validate a definition tree offline

pub mod apply;
pub mod check;
pub mod diff;

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use rawkit::HttpBackend;

use crate::Context;
use crate::config::{Config, Overrides};
use crate::engine::{Kind, ReconcileReport};
use crate::ui;

/// Load the config file and apply command-line overrides
pub fn load_config(ctx: &Context, overrides: &Overrides) -> Result<Config> {
    Config::load(ctx.config.as_deref())?.with_overrides(overrides)
}

/// Build the HTTP backend described by `config`
pub fn connect(config: &Config) -> Result<HttpBackend> {
    let http = config.http_config();
    log::debug!(
        "executor at {}, credentials service at {}",
        http.executor_url,
        http.creds_url
    );
    HttpBackend::new(&http).context("Invalid service configuration")
}

/// Print per-kind counts, warnings and failures of a pass
pub fn print_report(report: &ReconcileReport) {
    ui::header(if report.dry_run {
        "Reconciliation preview"
    } else {
        "Reconciliation summary"
    });

    for stage in report.stages() {
        let label = Kind::from_alias(&stage.kind).map_or(stage.kind.as_str(), |k| k.label());
        let changed = stage.outcomes.iter().filter(|o| o.result.is_change()).count();
        ui::kv(
            label,
            &format!(
                "{} declared, {} registered before, {} changed",
                stage.outcomes.len(),
                stage.registered,
                changed
            ),
        );
    }

    for warning in report.warnings() {
        ui::warn(warning);
    }

    println!();
    println!(
        "  {} created, {} replaced, {} unchanged, {} skipped, {} failed",
        report.created().to_string().green(),
        report.recreated().to_string().yellow(),
        report.unchanged(),
        report.skipped(),
        if report.failed() > 0 {
            report.failed().to_string().red()
        } else {
            report.failed().to_string().normal()
        }
    );
}
