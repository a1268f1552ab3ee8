//! View resource

use anyhow::Result;
use declarative::{ApplyContext, Resource};

use super::Target;
use crate::definitions::ViewDefinition;
use crate::engine::Kind;

#[derive(Debug, Clone)]
pub struct ViewResource {
    pub def: ViewDefinition,
}

impl ViewResource {
    pub fn new(def: ViewDefinition) -> Self {
        Self { def }
    }
}

impl Resource<Target> for ViewResource {
    fn id(&self) -> String {
        self.def.name.clone()
    }

    fn description(&self) -> String {
        format!("Create view {} (#{:02})", self.def.name, self.def.ordinal)
    }

    fn resource_type(&self) -> &'static str {
        Kind::View.as_str()
    }

    fn create(&self, ctx: &mut ApplyContext<'_, Target>) -> Result<()> {
        log::info!("creating view {}", self.def.name);
        ctx.target.create_view(&self.def.name, &self.def.script)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::BoxedResource;
    use crate::resource::tests::create;
    use rawkit::MemoryBackend;
    use std::path::PathBuf;

    #[test]
    fn test_create_sends_script_verbatim() {
        let script = "SELECT *\nFROM read(\"s3://raw-tutorial/sales.csv\")\n";
        let resource: BoxedResource = Box::new(ViewResource::new(ViewDefinition {
            name: "sales".into(),
            ordinal: 1,
            script: script.into(),
            path: PathBuf::from("views/01_sales.rql"),
        }));
        assert_eq!(resource.description(), "Create view sales (#01)");

        let backend = MemoryBackend::new();
        create(&resource, &backend).unwrap();
        assert_eq!(backend.view_script("sales").as_deref(), Some(script));
    }
}
