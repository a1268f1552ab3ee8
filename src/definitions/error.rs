//! Errors raised while loading a definition tree

use std::fmt;
use std::path::{Path, PathBuf};

/// Broad category of a load failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    MissingRequiredSource,
    MalformedRecord,
    DuplicateName,
    Io,
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingRequiredSource => "missing required source",
            Self::MalformedRecord => "malformed record",
            Self::DuplicateName => "duplicate name",
            Self::Io => "I/O error",
        };
        f.write_str(s)
    }
}

/// A definition tree that cannot be turned into a complete set of resources
///
/// Loading stops at the first error; no kind is ever returned partially.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("missing required source {}", .path.display())]
    MissingRequiredSource { path: PathBuf },

    #[error("{}: {detail}", location(.path, .line))]
    MalformedRecord {
        path: PathBuf,
        line: Option<usize>,
        detail: String,
    },

    #[error("duplicate {kind} name '{name}' in {}", .path.display())]
    DuplicateName {
        kind: &'static str,
        name: String,
        path: PathBuf,
    },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn malformed(path: &Path, line: usize, detail: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.to_path_buf(),
            line: Some(line),
            detail: detail.into(),
        }
    }

    pub fn malformed_file(path: &Path, detail: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.to_path_buf(),
            line: None,
            detail: detail.into(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> LoadErrorKind {
        match self {
            Self::MissingRequiredSource { .. } => LoadErrorKind::MissingRequiredSource,
            Self::MalformedRecord { .. } => LoadErrorKind::MalformedRecord,
            Self::DuplicateName { .. } => LoadErrorKind::DuplicateName,
            Self::Io { .. } => LoadErrorKind::Io,
        }
    }

    /// File or directory the error refers to
    pub fn path(&self) -> &Path {
        match self {
            Self::MissingRequiredSource { path }
            | Self::MalformedRecord { path, .. }
            | Self::DuplicateName { path, .. }
            | Self::Io { path, .. } => path,
        }
    }
}

fn location(path: &Path, line: &Option<usize>) -> String {
    match line {
        Some(n) => format!("{}:{n}", path.display()),
        None => path.display().to_string(),
    }
}
