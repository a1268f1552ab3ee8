//! `rawinit check` - validate a definition tree without contacting the service

use anyhow::{Context as AnyhowContext, Result};

use crate::Context;
use crate::cli::CheckArgs;
use crate::definitions::{self, Definitions};
use crate::engine::Kind;
use crate::ui;

pub fn run(ctx: &Context, args: CheckArgs) -> Result<()> {
    let config = super::load_config(ctx, &args.overrides())?;
    let root = config.source_root();

    let defs = match definitions::load(&root) {
        Ok(defs) => defs,
        Err(err) => {
            ui::error(&format!("{} in {}", err.kind(), err.path().display()));
            return Err(err)
                .with_context(|| format!("Definition tree {} is invalid", root.display()));
        }
    };

    if ctx.quiet {
        return Ok(());
    }
    if defs.is_empty() {
        ui::warn("Nothing is declared; a pass would make no calls");
    }

    ui::header(&format!("Definitions in {}", root.display()));
    for kind in Kind::ALL {
        ui::kv(kind.label(), &describe(&defs, kind));
    }

    for (db, reason) in defs.skipped_databases() {
        ui::warn(&format!("database '{}' will be skipped: {reason}", db.name));
    }

    println!();
    ui::success(&format!(
        "{} declared",
        ui::plural(defs.total(), "resource")
    ));
    Ok(())
}

/// Count and names of one kind, e.g. "2 (a, b)"
fn describe(defs: &Definitions, kind: Kind) -> String {
    let names: Vec<&str> = match kind {
        Kind::Bucket => defs.buckets.iter().map(|b| b.name.as_str()).collect(),
        Kind::Database => defs.databases.iter().map(|d| d.name.as_str()).collect(),
        Kind::View => defs.views.iter().map(|v| v.name.as_str()).collect(),
        Kind::Package => defs.packages.iter().map(|p| p.name.as_str()).collect(),
    };
    if names.is_empty() {
        "0".to_string()
    } else {
        format!("{} ({})", names.len(), names.join(", "))
    }
}
