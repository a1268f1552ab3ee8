//! Reconciliation engine for rawinit
//!
//! The engine orchestrates one pass:
//! 1. Loading - Parse the definition tree, failing before any remote call
//! 2. Planning - One stage per kind, in dependency order
//! 3. Executing - Per stage, list what is registered, then create what is missing

pub mod differ;
pub mod executor;
pub mod inspector;
pub mod planner;

pub use executor::{ReconcileError, ReconcileOptions, ReconcileReport, Reconciler};

use declarative::ExistingPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of remote resources, in the order a pass applies them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bucket,
    Database,
    View,
    Package,
}

impl Kind {
    /// All kinds in stage order: views may read buckets and databases,
    /// packages may use views.
    pub const ALL: [Self; 4] = [Self::Bucket, Self::Database, Self::View, Self::Package];

    /// Canonical name, used as the stage name and in targets
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::Database => "rdbms",
            Self::View => "view",
            Self::Package => "package",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bucket => "Buckets",
            Self::Database => "Databases",
            Self::View => "Views",
            Self::Package => "Packages",
        }
    }

    /// Resolve a kind from its canonical name or an accepted alias
    pub fn from_alias(s: &str) -> Option<Self> {
        match s {
            "bucket" | "buckets" => Some(Self::Bucket),
            "rdbms" | "database" | "databases" => Some(Self::Database),
            "view" | "views" => Some(Self::View),
            "package" | "packages" => Some(Self::Package),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with a package that is already registered
///
/// Exactly one mode is in effect for a pass.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PackagePolicy {
    /// Delete and create again from the local script
    #[default]
    Recreate,
    /// Leave the registered package alone
    Skip,
}

impl PackagePolicy {
    pub fn existing_policy(self) -> ExistingPolicy {
        match self {
            Self::Recreate => ExistingPolicy::Recreate,
            Self::Skip => ExistingPolicy::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_aliases() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_alias(kind.as_str()), Some(kind));
        }
        assert_eq!(Kind::from_alias("buckets"), Some(Kind::Bucket));
        assert_eq!(Kind::from_alias("databases"), Some(Kind::Database));
        assert_eq!(Kind::from_alias("views"), Some(Kind::View));
        assert_eq!(Kind::from_alias("packages"), Some(Kind::Package));
        assert_eq!(Kind::from_alias("Views"), None);
        assert_eq!(Kind::from_alias("tables"), None);
    }

    #[test]
    fn test_package_policy() {
        assert_eq!(PackagePolicy::default(), PackagePolicy::Recreate);
        assert_eq!(
            PackagePolicy::Recreate.existing_policy(),
            ExistingPolicy::Recreate
        );
        assert_eq!(PackagePolicy::Skip.existing_policy(), ExistingPolicy::Skip);
    }

    #[test]
    fn test_package_policy_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: PackagePolicy,
        }
        let w: Wrapper = toml::from_str(r#"policy = "skip""#).unwrap();
        assert_eq!(w.policy, PackagePolicy::Skip);
    }
}
