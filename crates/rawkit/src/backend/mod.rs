//! Backend abstraction for RAW service operations.
//!
//! The [`Backend`] trait is the whole capability a caller gets: list what
//! is registered, register or create what is missing, delete packages.
//! Implementations perform no existence checks and never retry.

pub mod http;
pub mod memory;

use crate::error::Result;
use crate::types::{BucketRegistration, RdbmsConnection};

/// Backend trait for RAW service operations.
///
/// This trait abstracts the underlying transport, enabling:
/// - Real HTTP calls via [`http::HttpBackend`]
/// - In-memory recording via [`memory::MemoryBackend`] for tests
pub trait Backend {
    /// Names of registered buckets.
    fn list_buckets(&self) -> Result<Vec<String>>;

    /// Names of registered relational database connections.
    fn list_rdbms(&self) -> Result<Vec<String>>;

    /// Names of existing views.
    fn list_views(&self) -> Result<Vec<String>>;

    /// Names of existing packages.
    fn list_packages(&self) -> Result<Vec<String>>;

    /// Register a storage bucket.
    fn register_bucket(&self, bucket: &BucketRegistration) -> Result<()>;

    /// Register a PostgreSQL connection.
    fn register_postgresql(&self, name: &str, conn: &RdbmsConnection) -> Result<()>;

    /// Register a SQL Server connection.
    fn register_sqlserver(&self, name: &str, conn: &RdbmsConnection) -> Result<()>;

    /// Register an Oracle connection.
    fn register_oracle(&self, name: &str, conn: &RdbmsConnection) -> Result<()>;

    /// Register a MySQL connection.
    fn register_mysql(&self, name: &str, conn: &RdbmsConnection) -> Result<()>;

    /// Create a view from query source.
    fn create_view(&self, name: &str, script: &str) -> Result<()>;

    /// Create a package from script source.
    fn create_package(&self, name: &str, script: &str) -> Result<()>;

    /// Delete a package.
    fn delete_package(&self, name: &str) -> Result<()>;
}
