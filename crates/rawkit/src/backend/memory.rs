//! In-memory backend.
//!
//! Keeps registrations in ordered maps and records every call, so callers
//! can assert on exactly which requests a run issued and in what order.
//! Failures can be injected per operation and optionally per name.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{BucketRegistration, RdbmsConnection, RdbmsKind};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// A list call, by operation name
    List(&'static str),
    /// `register_bucket`
    RegisterBucket(BucketRegistration),
    /// One of the `register_<engine>` calls
    RegisterRdbms {
        /// Engine-specific entry point that was called
        kind: RdbmsKind,
        /// Connection name
        name: String,
        /// Connection details
        conn: RdbmsConnection,
    },
    /// `create_view`
    CreateView {
        /// View name
        name: String,
        /// View source
        script: String,
    },
    /// `create_package`
    CreatePackage {
        /// Package name
        name: String,
        /// Package source
        script: String,
    },
    /// `delete_package`
    DeletePackage(String),
}

impl Call {
    /// Whether the call changes remote state.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::List(_))
    }
}

/// An injected failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Behave as if the service could not be reached
    Unreachable,
    /// Respond with the given HTTP status
    Status(u16),
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeSet<String>,
    rdbms: BTreeMap<String, RdbmsKind>,
    views: BTreeMap<String, String>,
    packages: BTreeMap<String, String>,
}

#[derive(Debug)]
struct Injected {
    operation: &'static str,
    name: Option<String>,
    failure: Failure,
}

/// Recording in-memory implementation of [`Backend`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RefCell<State>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<Vec<Injected>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed registered bucket names.
    pub fn with_buckets<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .borrow_mut()
            .buckets
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Seed registered database names (registered as PostgreSQL).
    pub fn with_rdbms<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.borrow_mut().rdbms.extend(
            names
                .into_iter()
                .map(|n| (n.into(), RdbmsKind::Postgresql)),
        );
        self
    }

    /// Seed existing view names with empty bodies.
    pub fn with_views<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .borrow_mut()
            .views
            .extend(names.into_iter().map(|n| (n.into(), String::new())));
        self
    }

    /// Seed existing package names with empty bodies.
    pub fn with_packages<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .borrow_mut()
            .packages
            .extend(names.into_iter().map(|n| (n.into(), String::new())));
        self
    }

    /// Make `operation` fail, for every name or only for `name`.
    ///
    /// Operation names match the [`Backend`] method names, e.g.
    /// `"list_views"` or `"create_package"`.
    pub fn fail(&self, operation: &'static str, name: Option<&str>, failure: Failure) {
        self.failures.borrow_mut().push(Injected {
            operation,
            name: name.map(str::to_string),
            failure,
        });
    }

    /// Every call issued so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Only the calls that change remote state.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    /// Forget recorded calls, keeping state.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Body of a stored package.
    pub fn package_script(&self, name: &str) -> Option<String> {
        self.state.borrow().packages.get(name).cloned()
    }

    /// Body of a stored view.
    pub fn view_script(&self, name: &str) -> Option<String> {
        self.state.borrow().views.get(name).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, operation: &'static str, name: Option<&str>) -> Result<()> {
        let failures = self.failures.borrow();
        let hit = failures.iter().find(|f| {
            f.operation == operation
                && match (&f.name, name) {
                    (None, _) => true,
                    (Some(expected), Some(actual)) => expected == actual,
                    (Some(_), None) => false,
                }
        });

        match hit.map(|f| f.failure) {
            None => Ok(()),
            Some(Failure::Unreachable) => Err(Error::network(operation, "connection refused")),
            Some(Failure::Status(status)) => {
                Err(Error::status(operation, status, "injected failure"))
            }
        }
    }

    fn register_rdbms(&self, kind: RdbmsKind, name: &str, conn: &RdbmsConnection) -> Result<()> {
        let operation = match kind {
            RdbmsKind::Postgresql => "register_postgresql",
            RdbmsKind::Sqlserver => "register_sqlserver",
            RdbmsKind::Oracle => "register_oracle",
            RdbmsKind::Mysql => "register_mysql",
        };
        self.check(operation, Some(name))?;
        self.record(Call::RegisterRdbms {
            kind,
            name: name.to_string(),
            conn: conn.clone(),
        });

        let mut state = self.state.borrow_mut();
        if state.rdbms.contains_key(name) {
            return Err(Error::status(operation, 409, format!("{name} exists")));
        }
        state.rdbms.insert(name.to_string(), kind);
        Ok(())
    }

    fn list(&self, operation: &'static str, names: Vec<String>) -> Result<Vec<String>> {
        self.check(operation, None)?;
        self.record(Call::List(operation));
        Ok(names)
    }
}

impl Backend for MemoryBackend {
    fn list_buckets(&self) -> Result<Vec<String>> {
        let names = self.state.borrow().buckets.iter().cloned().collect();
        self.list("list_buckets", names)
    }

    fn list_rdbms(&self) -> Result<Vec<String>> {
        let names = self.state.borrow().rdbms.keys().cloned().collect();
        self.list("list_rdbms", names)
    }

    fn list_views(&self) -> Result<Vec<String>> {
        let names = self.state.borrow().views.keys().cloned().collect();
        self.list("list_views", names)
    }

    fn list_packages(&self) -> Result<Vec<String>> {
        let names = self.state.borrow().packages.keys().cloned().collect();
        self.list("list_packages", names)
    }

    fn register_bucket(&self, bucket: &BucketRegistration) -> Result<()> {
        self.check("register_bucket", Some(&bucket.name))?;
        self.record(Call::RegisterBucket(bucket.clone()));

        if !self.state.borrow_mut().buckets.insert(bucket.name.clone()) {
            return Err(Error::status(
                "register_bucket",
                409,
                format!("{} exists", bucket.name),
            ));
        }
        Ok(())
    }

    fn register_postgresql(&self, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.register_rdbms(RdbmsKind::Postgresql, name, conn)
    }

    fn register_sqlserver(&self, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.register_rdbms(RdbmsKind::Sqlserver, name, conn)
    }

    fn register_oracle(&self, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.register_rdbms(RdbmsKind::Oracle, name, conn)
    }

    fn register_mysql(&self, name: &str, conn: &RdbmsConnection) -> Result<()> {
        self.register_rdbms(RdbmsKind::Mysql, name, conn)
    }

    fn create_view(&self, name: &str, script: &str) -> Result<()> {
        self.check("create_view", Some(name))?;
        self.record(Call::CreateView {
            name: name.to_string(),
            script: script.to_string(),
        });

        let mut state = self.state.borrow_mut();
        if state.views.contains_key(name) {
            return Err(Error::status("create_view", 409, format!("{name} exists")));
        }
        state.views.insert(name.to_string(), script.to_string());
        Ok(())
    }

    fn create_package(&self, name: &str, script: &str) -> Result<()> {
        self.check("create_package", Some(name))?;
        self.record(Call::CreatePackage {
            name: name.to_string(),
            script: script.to_string(),
        });

        let mut state = self.state.borrow_mut();
        if state.packages.contains_key(name) {
            return Err(Error::status(
                "create_package",
                409,
                format!("{name} exists"),
            ));
        }
        state.packages.insert(name.to_string(), script.to_string());
        Ok(())
    }

    fn delete_package(&self, name: &str) -> Result<()> {
        self.check("delete_package", Some(name))?;
        self.record(Call::DeletePackage(name.to_string()));

        if self.state.borrow_mut().packages.remove(name).is_none() {
            return Err(Error::status(
                "delete_package",
                404,
                format!("{name} not found"),
            ));
        }
        Ok(())
    }
}
