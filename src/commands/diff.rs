//! `rawinit diff` - preview a pass

use anyhow::Result;

use crate::Context;
use crate::cli::DiffArgs;
use crate::engine::differ::{DiffCollector, display_diff};
use crate::engine::{ReconcileOptions, Reconciler};
use crate::ui;

pub fn run(ctx: &Context, args: DiffArgs) -> Result<()> {
    let config = super::load_config(ctx, &args.overrides())?;
    let backend = super::connect(&config)?;
    let root = config.source_root();

    let options = ReconcileOptions {
        package_policy: config.reconcile.package_policy,
        dry_run: true,
        target: args.target.clone(),
    };
    let reconciler = Reconciler::new(&backend, &root, options);

    let mut collector = DiffCollector::default();
    reconciler.run_with(&mut collector)?;

    if !ctx.quiet {
        ui::dim(&format!(
            "{} against {}",
            root.display(),
            backend.executor_url()
        ));
    }
    display_diff(&collector.diffs, args.all);
    Ok(())
}
