//! Relational database definitions (`rdbms.txt`)
//!
//! One connection per line: `name [type [host [port [db [user [passwd]]]]]]`.
//! Fields after the name are positional and may be left off; a record
//! missing any of them is kept and skipped when the pass reaches it.

use super::error::LoadError;
use super::records;
use rawkit::{RdbmsConnection, RdbmsKind};
use std::fmt;
use std::path::Path;

/// Field names after the name, in file order
const FIELD_NAMES: [&str; 6] = ["type", "host", "port", "db", "user", "passwd"];

/// Engine named in a definition, supported or not
///
/// An unsupported engine is still a valid definition; it is reported when
/// the pass reaches it instead of being dropped while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineType {
    Supported(RdbmsKind),
    Unsupported(String),
}

impl EngineType {
    pub fn parse(s: &str) -> Self {
        s.parse()
            .map_or_else(|_| Self::Unsupported(s.to_string()), Self::Supported)
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supported(kind) => write!(f, "{kind}"),
            Self::Unsupported(raw) => f.write_str(raw),
        }
    }
}

/// A database connection to register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseDefinition {
    pub name: String,
    pub engine: Option<EngineType>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DatabaseDefinition {
    /// Names of the fields left off the record, in file order
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.engine.is_some(),
            self.host.is_some(),
            self.port.is_some(),
            self.database.is_some(),
            self.user.is_some(),
            self.password.is_some(),
        ];
        FIELD_NAMES
            .into_iter()
            .zip(present)
            .filter_map(|(field, present)| (!present).then_some(field))
            .collect()
    }

    /// Connection details, if every field is present
    pub fn connection(&self) -> Option<RdbmsConnection> {
        Some(RdbmsConnection {
            host: self.host.clone()?,
            port: self.port?,
            database: self.database.clone()?,
            user: self.user.clone()?,
            password: self.password.clone()?,
        })
    }

    /// Why this database cannot be registered, if it cannot
    pub fn skip_reason(&self) -> Option<String> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Some(format!(
                "incomplete database record, missing {}",
                missing.join(", ")
            ));
        }
        match &self.engine {
            Some(EngineType::Unsupported(raw)) => Some(format!("unsupported database type '{raw}'")),
            _ => None,
        }
    }
}

/// Parse the contents of a database file
///
/// Missing trailing fields are `None`; tokens past the password are ignored.
/// A port that is present but not a valid TCP port is malformed.
pub fn parse(content: &str, path: &Path) -> Result<Vec<DatabaseDefinition>, LoadError> {
    let mut databases = Vec::new();

    for (line, tokens) in records(content, path) {
        let field = |i: usize| tokens.get(i).map(|t| (*t).to_string());

        let port = tokens
            .get(3)
            .map(|raw| {
                raw.parse::<u16>()
                    .map_err(|_| LoadError::malformed(path, line, format!("invalid port '{raw}'")))
            })
            .transpose()?;

        let def = DatabaseDefinition {
            name: tokens[0].to_string(),
            engine: tokens.get(1).map(|t| EngineType::parse(t)),
            host: field(2),
            port,
            database: field(4),
            user: field(5),
            password: field(6),
        };
        let missing = def.missing_fields();
        if !missing.is_empty() {
            log::debug!(
                "{}:{line}: database '{}' is missing {}",
                path.display(),
                def.name,
                missing.join(", ")
            );
        }
        databases.push(def);
    }

    super::ensure_unique("database", databases.iter().map(|d| d.name.as_str()), path)?;
    Ok(databases)
}
