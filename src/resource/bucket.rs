//! Storage bucket resource

use anyhow::Result;
use declarative::{ApplyContext, Resource};

use super::Target;
use crate::definitions::BucketDefinition;
use crate::engine::Kind;

/// A bucket to register with the credentials service
#[derive(Debug, Clone)]
pub struct BucketResource {
    pub def: BucketDefinition,
}

impl BucketResource {
    pub fn new(def: BucketDefinition) -> Self {
        Self { def }
    }
}

impl Resource<Target> for BucketResource {
    fn id(&self) -> String {
        self.def.name.clone()
    }

    fn description(&self) -> String {
        match &self.def.region {
            Some(region) => format!("Register bucket {} ({region})", self.def.url()),
            None => format!("Register bucket {}", self.def.url()),
        }
    }

    fn resource_type(&self) -> &'static str {
        Kind::Bucket.as_str()
    }

    fn create(&self, ctx: &mut ApplyContext<'_, Target>) -> Result<()> {
        log::info!("registering bucket {}", self.def.url());
        ctx.target.register_bucket(&self.def.registration())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::BoxedResource;
    use crate::resource::tests::{create, delete};
    use rawkit::{BucketRegistration, Call, MemoryBackend};

    fn bucket(name: &str, region: Option<&str>) -> BucketResource {
        BucketResource::new(BucketDefinition {
            name: name.into(),
            region: region.map(String::from),
            access_key: None,
            secret_key: None,
        })
    }

    #[test]
    fn test_create_registers_bucket() {
        let backend = MemoryBackend::new();
        let resource: BoxedResource = Box::new(bucket("s3bucket", Some("us-east-1")));
        create(&resource, &backend).unwrap();

        assert_eq!(
            backend.mutations(),
            vec![Call::RegisterBucket(BucketRegistration {
                name: "s3bucket".into(),
                region: Some("us-east-1".into()),
                access_key: None,
                secret_key: None,
            })]
        );
    }

    #[test]
    fn test_description() {
        assert_eq!(
            bucket("raw-tutorial", None).description(),
            "Register bucket s3://raw-tutorial"
        );
        assert_eq!(
            bucket("b", Some("eu-west-1")).description(),
            "Register bucket s3://b (eu-west-1)"
        );
    }

    #[test]
    fn test_buckets_cannot_be_deleted() {
        let backend = MemoryBackend::new();
        let resource: BoxedResource = Box::new(bucket("b", None));
        assert!(delete(&resource, &backend).is_err());
        assert!(backend.calls().is_empty());
    }
}
