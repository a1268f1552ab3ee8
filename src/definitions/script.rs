//! Script definitions (`views/NN_name.rql`, `packages/name.rql`)

use super::error::LoadError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

/// Extension of script files; anything else in a script directory is ignored
pub const SCRIPT_EXTENSION: &str = "rql";

static VIEW_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})_(.+)$").expect("Invalid view name regex"));

/// A view created from a numbered script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    pub name: String,
    /// Creation order only; not part of the view's identity
    pub ordinal: u8,
    pub script: String,
    pub path: PathBuf,
}

/// A package created from a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDefinition {
    pub name: String,
    pub script: String,
    pub path: PathBuf,
}

/// Load views, ordered by ordinal then file name
pub fn load_views(dir: &Path) -> Result<Vec<ViewDefinition>, LoadError> {
    let mut views = Vec::new();
    for (path, stem) in script_files(dir)? {
        let Some(caps) = VIEW_NAME.captures(&stem) else {
            return Err(LoadError::malformed_file(
                &path,
                format!("view file name must look like NN_name.{SCRIPT_EXTENSION}"),
            ));
        };
        let ordinal: u8 = caps[1]
            .parse()
            .map_err(|_| LoadError::malformed_file(&path, "invalid view ordinal"))?;
        views.push(ViewDefinition {
            name: caps[2].to_string(),
            ordinal,
            script: read_script(&path)?,
            path,
        });
    }

    views.sort_by(|a, b| (a.ordinal, &a.path).cmp(&(b.ordinal, &b.path)));
    super::ensure_unique("view", views.iter().map(|v| v.name.as_str()), dir)?;
    Ok(views)
}

/// Load packages, ordered by file name
pub fn load_packages(dir: &Path) -> Result<Vec<PackageDefinition>, LoadError> {
    let mut packages = Vec::new();
    for (path, stem) in script_files(dir)? {
        packages.push(PackageDefinition {
            name: stem,
            script: read_script(&path)?,
            path,
        });
    }
    Ok(packages)
}

/// `*.rql` files directly inside `dir`, sorted by file name, with their stems
fn script_files(dir: &Path) -> Result<Vec<(PathBuf, String)>, LoadError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            match e.into_io_error() {
                Some(io) => LoadError::io(&path, io),
                None => LoadError::malformed_file(&path, "filesystem loop"),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SCRIPT_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Err(LoadError::malformed_file(path, "file name is not valid UTF-8"));
        };
        files.push((path.to_path_buf(), stem.to_string()));
    }

    log::debug!("found {} script(s) in {}", files.len(), dir.display());
    Ok(files)
}

fn read_script(path: &Path) -> Result<String, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    String::from_utf8(bytes).map_err(|_| LoadError::malformed_file(path, "script is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::error::LoadErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn dir_with(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_views_ordered_by_ordinal() {
        let dir = dir_with(&[
            ("02_b.rql", "select 2"),
            ("01_a.rql", "select 1"),
            ("10_z.rql", "select 10"),
        ]);
        let views = load_views(dir.path()).unwrap();
        let names: Vec<_> = views.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "z"]);
        assert_eq!(views[0].ordinal, 1);
        assert_eq!(views[0].script, "select 1");
    }

    #[test]
    fn test_same_ordinal_ordered_by_file_name() {
        let dir = dir_with(&[("01_b.rql", ""), ("01_a.rql", "")]);
        let views = load_views(dir.path()).unwrap();
        assert_eq!(views[0].name, "a");
        assert_eq!(views[1].name, "b");
    }

    #[test]
    fn test_view_name_keeps_underscores() {
        let dir = dir_with(&[("03_monthly_sales.rql", "")]);
        let views = load_views(dir.path()).unwrap();
        assert_eq!(views[0].name, "monthly_sales");
    }

    #[test]
    fn test_non_script_files_ignored() {
        let dir = dir_with(&[("01_a.rql", ""), ("README.md", "docs"), ("notes.txt", "")]);
        fs::create_dir(dir.path().join("02_nested.rql")).unwrap();
        assert_eq!(load_views(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_view_without_ordinal_is_malformed() {
        for name in ["a.rql", "1_a.rql", "001_a.rql", "01_.rql", "ab_c.rql"] {
            let dir = dir_with(&[(name, "")]);
            let err = load_views(dir.path()).unwrap_err();
            assert_eq!(err.kind(), LoadErrorKind::MalformedRecord, "{name}");
        }
    }

    #[test]
    fn test_duplicate_view_name() {
        let dir = dir_with(&[("01_a.rql", ""), ("02_a.rql", "")]);
        let err = load_views(dir.path()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::DuplicateName);
    }

    #[test]
    fn test_packages_sorted_and_verbatim() {
        let body = "  fn x() = 1\n\n-- trailing\n";
        let dir = dir_with(&[("zeta.rql", "z"), ("alpha.rql", body)]);
        let packages = load_packages(dir.path()).unwrap();
        assert_eq!(packages[0].name, "alpha");
        assert_eq!(packages[0].script, body);
        assert_eq!(packages[1].name, "zeta");
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.rql"), [0xff, 0xfe, 0x00]).unwrap();
        let err = load_packages(dir.path()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::MalformedRecord);
    }

    #[test]
    fn test_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(load_packages(dir.path()).unwrap().is_empty());
        assert!(load_views(dir.path()).unwrap().is_empty());
    }
}
