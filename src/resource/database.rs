//! Relational database connection resource

use anyhow::{Result, bail};
use declarative::{ApplyContext, Resource};
use rawkit::{Backend, RdbmsConnection, RdbmsKind};

use super::Target;
use crate::definitions::{DatabaseDefinition, EngineType};
use crate::engine::Kind;

/// A database connection to register, dispatched by engine
#[derive(Debug, Clone)]
pub struct DatabaseResource {
    pub def: DatabaseDefinition,
}

impl DatabaseResource {
    pub fn new(def: DatabaseDefinition) -> Self {
        Self { def }
    }
}

/// Call the engine-specific registration entry point
fn register(
    backend: &dyn Backend,
    kind: RdbmsKind,
    name: &str,
    conn: &RdbmsConnection,
) -> rawkit::Result<()> {
    match kind {
        RdbmsKind::Postgresql => backend.register_postgresql(name, conn),
        RdbmsKind::Sqlserver => backend.register_sqlserver(name, conn),
        RdbmsKind::Oracle => backend.register_oracle(name, conn),
        RdbmsKind::Mysql => backend.register_mysql(name, conn),
    }
}

impl Resource<Target> for DatabaseResource {
    fn id(&self) -> String {
        self.def.name.clone()
    }

    fn description(&self) -> String {
        match (&self.def.engine, self.def.connection()) {
            (Some(engine), Some(conn)) => format!(
                "Register {engine} database {} ({}:{}/{})",
                self.def.name, conn.host, conn.port, conn.database
            ),
            _ => format!("Register database {} (incomplete)", self.def.name),
        }
    }

    fn resource_type(&self) -> &'static str {
        Kind::Database.as_str()
    }

    fn unsupported(&self) -> Option<String> {
        self.def.skip_reason()
    }

    fn create(&self, ctx: &mut ApplyContext<'_, Target>) -> Result<()> {
        let (Some(EngineType::Supported(kind)), Some(conn)) =
            (&self.def.engine, self.def.connection())
        else {
            bail!(
                "database '{}' cannot be registered: {}",
                self.def.name,
                self.def.skip_reason().unwrap_or_default()
            );
        };
        log::info!("registering {kind} database {}", self.def.name);
        register(ctx.target, *kind, &self.def.name, &conn)?;
        Ok(())
    }
}
