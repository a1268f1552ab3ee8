//! Request types shared by every backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relational database engines the credentials service can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RdbmsKind {
    /// PostgreSQL
    Postgresql,
    /// Microsoft SQL Server
    Sqlserver,
    /// Oracle Database
    Oracle,
    /// MySQL
    Mysql,
}

impl RdbmsKind {
    /// All supported engines, in documentation order.
    pub const ALL: [Self; 4] = [Self::Postgresql, Self::Sqlserver, Self::Oracle, Self::Mysql];

    /// The name used in definition files and API paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Sqlserver => "sqlserver",
            Self::Oracle => "oracle",
            Self::Mysql => "mysql",
        }
    }
}

impl fmt::Display for RdbmsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RdbmsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unsupported database type '{s}'"))
    }
}

/// Connection details for a relational database registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdbmsConnection {
    /// Hostname or address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Database name on the server
    pub database: String,
    /// Login user
    pub user: String,
    /// Login password
    pub password: String,
}

/// A bucket registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRegistration {
    /// Bucket name, without the `s3://` scheme
    pub name: String,
    /// Bucket region, if not the service default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Access key for private buckets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    /// Secret key for private buckets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}
