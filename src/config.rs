//! rawinit configuration (`rawinit.toml`)
//!
//! ```toml
//! source_root = "raw_ini"
//!
//! [service]
//! executor_url = "http://localhost:54321"
//! creds_url = "http://localhost:54322"
//! access_token = "..."
//! timeout_secs = 30
//!
//! [reconcile]
//! package_policy = "recreate"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use anyhow::{Context, Result, bail};
use rawkit::HttpConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::PackagePolicy;
use crate::paths;

pub const DEFAULT_SOURCE_ROOT: &str = "raw_ini";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the definition tree
    pub source_root: String,
    pub service: ServiceConfig,
    pub reconcile: ReconcileConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_root: DEFAULT_SOURCE_ROOT.to_string(),
            service: ServiceConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

/// Where the remote service lives and how to authenticate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub executor_url: String,
    pub creds_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let http = HttpConfig::default();
        Self {
            executor_url: http.executor_url,
            creds_url: http.creds_url,
            access_token: None,
            timeout_secs: http.timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    pub package_policy: PackagePolicy,
}

/// Values given on the command line, taking precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source_root: Option<PathBuf>,
    pub executor_url: Option<String>,
    pub creds_url: Option<String>,
    pub access_token: Option<String>,
    pub package_policy: Option<PackagePolicy>,
}

impl Config {
    /// Load the config file found by [`paths::find_config`], or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match paths::find_config(explicit)? {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line values; the result is validated again
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self> {
        if let Some(root) = &overrides.source_root {
            self.source_root = root.to_string_lossy().into_owned();
        }
        if let Some(url) = &overrides.executor_url {
            self.service.executor_url.clone_from(url);
        }
        if let Some(url) = &overrides.creds_url {
            self.service.creds_url.clone_from(url);
        }
        if let Some(token) = &overrides.access_token {
            self.service.access_token = Some(token.clone());
        }
        if let Some(policy) = overrides.package_policy {
            self.reconcile.package_policy = policy;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_root.trim().is_empty() {
            bail!("source_root must not be empty");
        }
        if self.service.executor_url.trim().is_empty() {
            bail!("service.executor_url must not be empty");
        }
        if self.service.creds_url.trim().is_empty() {
            bail!("service.creds_url must not be empty");
        }
        if self.service.timeout_secs == 0 {
            bail!("service.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Definition tree root, with `~` and variables expanded
    pub fn source_root(&self) -> PathBuf {
        paths::expand(&self.source_root)
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            executor_url: self.service.executor_url.clone(),
            creds_url: self.service.creds_url.clone(),
            access_token: self
                .service
                .access_token
                .clone()
                .filter(|t| !t.trim().is_empty()),
            timeout: Duration::from_secs(self.service.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.source_root, "raw_ini");
        assert_eq!(config.service.executor_url, "http://localhost:54321");
        assert_eq!(config.service.creds_url, "http://localhost:54322");
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.reconcile.package_policy, PackagePolicy::Recreate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(
            r#"
source_root = "~/demo/raw_ini"

[service]
executor_url = "https://raw.example.com"
creds_url = "https://creds.example.com"
access_token = "tok"
timeout_secs = 5

[reconcile]
package_policy = "skip"
"#,
        )
        .unwrap();

        assert_eq!(config.reconcile.package_policy, PackagePolicy::Skip);
        let http = config.http_config();
        assert_eq!(http.executor_url, "https://raw.example.com");
        assert_eq!(http.access_token.as_deref(), Some("tok"));
        assert_eq!(http.timeout, Duration::from_secs(5));

        let home = dirs::home_dir().unwrap();
        assert_eq!(config.source_root(), home.join("demo").join("raw_ini"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml("[service]\nurl = \"x\"").is_err());
        assert!(Config::from_toml("[reconcile]\npackage_policy = \"merge\"").is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.service.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.creds_url = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let overrides = Overrides {
            source_root: Some(PathBuf::from("/srv/raw_ini")),
            executor_url: Some("http://executor:8080".into()),
            package_policy: Some(PackagePolicy::Skip),
            ..Default::default()
        };
        let config = Config::default().with_overrides(&overrides).unwrap();
        assert_eq!(config.source_root(), PathBuf::from("/srv/raw_ini"));
        assert_eq!(config.service.executor_url, "http://executor:8080");
        assert_eq!(config.service.creds_url, "http://localhost:54322");
        assert_eq!(config.reconcile.package_policy, PackagePolicy::Skip);

        let empty = Overrides {
            executor_url: Some(String::new()),
            ..Default::default()
        };
        assert!(Config::default().with_overrides(&empty).is_err());
    }

    #[test]
    fn test_blank_token_not_sent() {
        let mut config = Config::default();
        config.service.access_token = Some(" ".into());
        assert_eq!(config.http_config().access_token, None);
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "source_root = \"defs\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.source_root, "defs");

        assert!(Config::load(Some(Path::new("/nonexistent/rawinit.toml"))).is_err());
    }
}
