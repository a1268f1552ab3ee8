//! Package resource

use anyhow::Result;
use declarative::{ApplyContext, ExistingPolicy, Resource};

use super::Target;
use crate::definitions::PackageDefinition;
use crate::engine::{Kind, PackagePolicy};

/// A package created from a local script
///
/// Unlike other kinds, a registered package may be replaced: under
/// [`PackagePolicy::Recreate`] it is deleted and created again so the
/// remote copy always matches the local script.
#[derive(Debug, Clone)]
pub struct PackageResource {
    pub def: PackageDefinition,
    pub policy: PackagePolicy,
}

impl PackageResource {
    pub fn new(def: PackageDefinition, policy: PackagePolicy) -> Self {
        Self { def, policy }
    }
}

impl Resource<Target> for PackageResource {
    fn id(&self) -> String {
        self.def.name.clone()
    }

    fn description(&self) -> String {
        format!("Create package {}", self.def.name)
    }

    fn resource_type(&self) -> &'static str {
        Kind::Package.as_str()
    }

    fn existing_policy(&self) -> ExistingPolicy {
        self.policy.existing_policy()
    }

    fn create(&self, ctx: &mut ApplyContext<'_, Target>) -> Result<()> {
        log::info!("registering package {}", self.def.name);
        ctx.target.create_package(&self.def.name, &self.def.script)?;
        Ok(())
    }

    fn delete(&self, ctx: &mut ApplyContext<'_, Target>) -> Result<()> {
        log::warn!("overwriting package {}", self.def.name);
        ctx.target.delete_package(&self.def.name)?;
        Ok(())
    }
}
