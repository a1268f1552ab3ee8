//! Execution planner - turns loaded definitions into staged plans

use anyhow::{Result, bail};
use declarative::{ExecutionPlan, parse_target};

use super::{Kind, PackagePolicy};
use crate::definitions::Definitions;
use crate::resource::{
    BoxedResource, BucketResource, DatabaseResource, PackageResource, Target, ViewResource,
};

/// Build the plan for a pass: one stage per kind in [`Kind::ALL`] order
///
/// Resources keep their declaration order within a stage.
pub fn build_plan(defs: &Definitions, policy: PackagePolicy) -> ExecutionPlan<Target> {
    let mut plan = ExecutionPlan::new();

    for kind in Kind::ALL {
        let resources: Vec<BoxedResource> = match kind {
            Kind::Bucket => defs
                .buckets
                .iter()
                .map(|d| Box::new(BucketResource::new(d.clone())) as BoxedResource)
                .collect(),
            Kind::Database => defs
                .databases
                .iter()
                .map(|d| Box::new(DatabaseResource::new(d.clone())) as BoxedResource)
                .collect(),
            Kind::View => defs
                .views
                .iter()
                .map(|d| Box::new(ViewResource::new(d.clone())) as BoxedResource)
                .collect(),
            Kind::Package => defs
                .packages
                .iter()
                .map(|d| Box::new(PackageResource::new(d.clone(), policy)) as BoxedResource)
                .collect(),
        };
        plan.push_stage(kind.as_str(), resources);
    }

    plan
}

/// Normalize a `kind` or `kind.name` target to canonical kind names
///
/// Accepts the aliases of [`Kind::from_alias`], e.g. `views.sales` becomes
/// `view.sales`.
pub fn resolve_target(target: &str) -> Result<String> {
    let (kind, name) = parse_target(target.trim());
    let Some(kind) = kind.as_deref().and_then(Kind::from_alias) else {
        bail!(
            "unknown target '{target}' (expected buckets, rdbms, views or packages, optionally followed by .name)"
        );
    };

    match name {
        Some(name) if name.is_empty() => bail!("target '{target}' has an empty name"),
        Some(name) => Ok(format!("{kind}.{name}")),
        None => Ok(kind.as_str().to_string()),
    }
}

/// Build a plan restricted to `target`, if given
///
/// Filtering only drops resources; stage order is unchanged.
pub fn build_filtered(
    defs: &Definitions,
    policy: PackagePolicy,
    target: Option<&str>,
) -> Result<ExecutionPlan<Target>> {
    let plan = build_plan(defs, policy);
    match target {
        None => Ok(plan),
        Some(t) => {
            let resolved = resolve_target(t)?;
            log::debug!("restricting pass to {resolved}");
            Ok(plan.filter_by_target(Some(&resolved)))
        }
    }
}
