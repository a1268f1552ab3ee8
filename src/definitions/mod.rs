//! Definition loader
//!
//! Reads a source tree into typed, immutable descriptors:
//!
//! ```text
//! <root>/
//!   buckets.txt         required
//!   rdbms.txt           optional
//!   views/NN_name.rql   required directory
//!   packages/name.rql   required directory
//! ```
//!
//! Everything is parsed before anything is applied; a tree either loads
//! completely or fails with a [`LoadError`].

pub mod bucket;
pub mod error;
pub mod rdbms;
pub mod script;

pub use bucket::BucketDefinition;
pub use error::{LoadError, LoadErrorKind};
pub use rdbms::{DatabaseDefinition, EngineType};
pub use script::{PackageDefinition, ViewDefinition};

use std::collections::BTreeSet;
use std::io;
use std::path::Path;

pub const BUCKETS_FILE: &str = "buckets.txt";
pub const RDBMS_FILE: &str = "rdbms.txt";
pub const VIEWS_DIR: &str = "views";
pub const PACKAGES_DIR: &str = "packages";

/// All declared resources of a source tree
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    pub buckets: Vec<BucketDefinition>,
    pub databases: Vec<DatabaseDefinition>,
    pub views: Vec<ViewDefinition>,
    pub packages: Vec<PackageDefinition>,
}

impl Definitions {
    pub fn total(&self) -> usize {
        self.buckets.len() + self.databases.len() + self.views.len() + self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Databases a pass will skip, with the reason
    pub fn skipped_databases(&self) -> impl Iterator<Item = (&DatabaseDefinition, String)> {
        self.databases
            .iter()
            .filter_map(|d| d.skip_reason().map(|reason| (d, reason)))
    }
}

/// Load every definition under `root`
pub fn load(root: &Path) -> Result<Definitions, LoadError> {
    log::debug!("loading definitions from {}", root.display());

    let buckets_path = root.join(BUCKETS_FILE);
    let buckets = match read_text(&buckets_path)? {
        Some(content) => bucket::parse(&content, &buckets_path)?,
        None => return Err(missing(&buckets_path)),
    };

    let rdbms_path = root.join(RDBMS_FILE);
    let databases = match read_text(&rdbms_path)? {
        Some(content) => rdbms::parse(&content, &rdbms_path)?,
        None => {
            log::debug!("no {RDBMS_FILE}, skipping databases");
            Vec::new()
        }
    };

    let views_dir = root.join(VIEWS_DIR);
    if !views_dir.is_dir() {
        return Err(missing(&views_dir));
    }
    let views = script::load_views(&views_dir)?;

    let packages_dir = root.join(PACKAGES_DIR);
    if !packages_dir.is_dir() {
        return Err(missing(&packages_dir));
    }
    let packages = script::load_packages(&packages_dir)?;

    let defs = Definitions {
        buckets,
        databases,
        views,
        packages,
    };
    log::info!(
        "loaded {} bucket(s), {} database(s), {} view(s), {} package(s)",
        defs.buckets.len(),
        defs.databases.len(),
        defs.views.len(),
        defs.packages.len()
    );
    Ok(defs)
}

/// Read a UTF-8 text file; `None` if it does not exist
fn read_text(path: &Path) -> Result<Option<String>, LoadError> {
    match std::fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| LoadError::malformed_file(path, "file is not valid UTF-8")),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(LoadError::io(path, e)),
    }
}

fn missing(path: &Path) -> LoadError {
    LoadError::MissingRequiredSource {
        path: path.to_path_buf(),
    }
}

/// Non-empty, non-comment lines as (1-based line number, tokens)
///
/// A line whose first token starts with `#` is a comment.
pub(crate) fn records<'a>(
    content: &'a str,
    path: &'a Path,
) -> impl Iterator<Item = (usize, Vec<&'a str>)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<_>>()))
        .filter(move |(line, tokens)| match tokens.first() {
            None => false,
            Some(first) if first.starts_with('#') => {
                log::debug!("{}:{line}: skipping comment", path.display());
                false
            }
            Some(_) => true,
        })
}

/// Fail on the first name seen twice
pub(crate) fn ensure_unique<'a>(
    kind: &'static str,
    names: impl IntoIterator<Item = &'a str>,
    path: &Path,
) -> Result<(), LoadError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(LoadError::DuplicateName {
                kind,
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Build a source tree; `None` leaves the file or directory out
    pub(crate) fn tree(
        buckets: Option<&str>,
        rdbms: Option<&str>,
        views: Option<&[(&str, &str)]>,
        packages: Option<&[(&str, &str)]>,
    ) -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        if let Some(content) = buckets {
            fs::write(root.join(BUCKETS_FILE), content).unwrap();
        }
        if let Some(content) = rdbms {
            fs::write(root.join(RDBMS_FILE), content).unwrap();
        }
        for (sub, files) in [(VIEWS_DIR, views), (PACKAGES_DIR, packages)] {
            if let Some(files) = files {
                fs::create_dir(root.join(sub)).unwrap();
                for (name, content) in files {
                    fs::write(root.join(sub).join(name), content).unwrap();
                }
            }
        }
        dir
    }

    #[test]
    fn test_load_full_tree() {
        let dir = tree(
            Some("raw-tutorial\ns3bucket us-east-1\n"),
            Some("sales postgresql db 5432 sales u p\nlegacy db2 h 50000 d u p\nshort mysql\n"),
            Some(&[("02_b.rql", "b"), ("01_a.rql", "a")]),
            Some(&[("utils.rql", "fn")]),
        );

        let defs = load(dir.path()).unwrap();
        assert_eq!(defs.buckets.len(), 2);
        assert_eq!(defs.databases.len(), 3);
        assert_eq!(defs.views[0].name, "a");
        assert_eq!(defs.packages[0].name, "utils");
        assert_eq!(defs.total(), 8);
        let skipped: Vec<_> = defs.skipped_databases().map(|(d, _)| d.name.as_str()).collect();
        assert_eq!(skipped, vec!["legacy", "short"]);
    }

    #[test]
    fn test_missing_rdbms_is_fine() {
        let dir = tree(Some("b"), None, Some(&[]), Some(&[]));
        let defs = load(dir.path()).unwrap();
        assert!(defs.databases.is_empty());
        assert_eq!(defs.buckets.len(), 1);
    }

    #[test]
    fn test_missing_buckets_is_an_error() {
        let dir = tree(None, Some(""), Some(&[]), Some(&[]));
        let err = load(dir.path()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::MissingRequiredSource);
        assert!(err.path().ends_with(BUCKETS_FILE));
    }

    #[test]
    fn test_missing_script_dirs_are_errors() {
        let dir = tree(Some(""), None, None, Some(&[]));
        assert!(load(dir.path()).unwrap_err().path().ends_with(VIEWS_DIR));

        let dir = tree(Some(""), None, Some(&[]), None);
        assert!(load(dir.path()).unwrap_err().path().ends_with(PACKAGES_DIR));
    }

    #[test]
    fn test_empty_tree_loads() {
        let dir = tree(Some(""), None, Some(&[]), Some(&[]));
        assert!(load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_short_rdbms_record_loads() {
        let dir = tree(Some("b"), Some("sales postgresql db\n"), Some(&[]), Some(&[]));
        let defs = load(dir.path()).unwrap();
        assert_eq!(defs.databases[0].port, None);
        assert_eq!(defs.buckets.len(), 1);
    }

    #[test]
    fn test_malformed_rdbms_fails_whole_load() {
        let dir = tree(Some("b"), Some("sales mysql h not-a-port\n"), Some(&[]), Some(&[]));
        let err = load(dir.path()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::MalformedRecord);
    }

    #[test]
    fn test_records_skips_blank_and_comments() {
        let path = Path::new("buckets.txt");
        let lines: Vec<_> = records("a b\n\n  # note\n#x y\n  c\n", path).collect();
        assert_eq!(lines, vec![(1, vec!["a", "b"]), (5, vec!["c"])]);
    }

    #[test]
    fn test_records_hash_after_first_token_is_data() {
        let path = Path::new("rdbms.txt");
        let lines: Vec<_> = records("a #b\n", path).collect();
        assert_eq!(lines, vec![(1, vec!["a", "#b"])]);
    }
}
