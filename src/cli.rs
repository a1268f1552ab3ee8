use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::Overrides;
use crate::engine::PackagePolicy;

#[derive(Parser)]
#[command(name = "rawinit")]
#[command(version)]
#[command(
    about = "Register buckets, databases, views and packages on a RAW service from a definition tree",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ./rawinit.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one reconciliation pass against the service
    Apply(ApplyArgs),

    /// Show what a pass would change, without changing anything
    Diff(DiffArgs),

    /// Load and validate the definition tree; no remote calls
    Check(CheckArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared arguments
// ============================================================================

/// Remote service connection
#[derive(Args, Debug, Clone, Default)]
pub struct ServiceArgs {
    /// Query executor base URL
    #[arg(long, env = "RAWINIT_EXECUTOR_URL", value_name = "URL")]
    pub executor_url: Option<String>,

    /// Credentials service base URL
    #[arg(long, env = "RAWINIT_CREDS_URL", value_name = "URL")]
    pub creds_url: Option<String>,

    /// Bearer token for both services
    #[arg(long, env = "RAWINIT_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Definition tree root (default: raw_ini)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Only reconcile a kind or one resource: buckets, rdbms, views,
    /// packages, or e.g. views.monthly_sales
    pub target: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Inspect and report, but issue no mutating call
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// What to do with packages that are already registered
    #[arg(long, value_enum, value_name = "POLICY")]
    pub package_policy: Option<PackagePolicy>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// Only diff a kind or one resource
    pub target: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// What to do with packages that are already registered
    #[arg(long, value_enum, value_name = "POLICY")]
    pub package_policy: Option<PackagePolicy>,

    /// Also list resources that are already registered
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl ApplyArgs {
    pub fn overrides(&self) -> Overrides {
        overrides(&self.source, &self.service, self.package_policy)
    }
}

impl DiffArgs {
    pub fn overrides(&self) -> Overrides {
        overrides(&self.source, &self.service, self.package_policy)
    }
}

impl CheckArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            source_root: self.source.root.clone(),
            ..Default::default()
        }
    }
}

fn overrides(
    source: &SourceArgs,
    service: &ServiceArgs,
    package_policy: Option<PackagePolicy>,
) -> Overrides {
    Overrides {
        source_root: source.root.clone(),
        executor_url: service.executor_url.clone(),
        creds_url: service.creds_url.clone(),
        access_token: service.access_token.clone(),
        package_policy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_args() {
        let cli = Cli::try_parse_from([
            "rawinit",
            "-vv",
            "apply",
            "views.sales",
            "--root",
            "/srv/raw_ini",
            "--dry-run",
            "--package-policy",
            "skip",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.target.as_deref(), Some("views.sales"));
        assert!(args.dry_run);

        let overrides = args.overrides();
        assert_eq!(overrides.source_root, Some(PathBuf::from("/srv/raw_ini")));
        assert_eq!(overrides.package_policy, Some(PackagePolicy::Skip));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        assert!(Cli::try_parse_from(["rawinit", "apply", "--package-policy", "merge"]).is_err());
    }

    #[test]
    fn test_check_takes_no_service_flags() {
        assert!(Cli::try_parse_from(["rawinit", "check", "--executor-url", "http://x"]).is_err());
        assert!(Cli::try_parse_from(["rawinit", "check", "--root", "defs"]).is_ok());
    }
}
