//! Remote state inspection - what is registered right now, per kind

use anyhow::{Result, anyhow};
use declarative::StateInspector;
use std::collections::BTreeSet;

use super::Kind;
use crate::resource::Target;

/// Lists registered names through the backend's list calls
///
/// Every call is a fresh round trip; nothing is cached between stages or
/// passes.
pub struct RemoteInspector;

impl StateInspector<Target> for RemoteInspector {
    fn registered(&self, target: &Target, resource_type: &str) -> Result<BTreeSet<String>> {
        let kind = Kind::from_alias(resource_type)
            .ok_or_else(|| anyhow!("unknown resource kind '{resource_type}'"))?;

        let names = match kind {
            Kind::Bucket => target.list_buckets(),
            Kind::Database => target.list_rdbms(),
            Kind::View => target.list_views(),
            Kind::Package => target.list_packages(),
        }?;

        log::debug!("{} {kind}(s) registered remotely", names.len());
        Ok(names.into_iter().collect())
    }
}
