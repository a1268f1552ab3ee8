//! Bucket definitions (`buckets.txt`)
//!
//! One bucket per line: `name [region [access_key [secret_key]]]`.

use super::error::LoadError;
use super::records;
use rawkit::BucketRegistration;
use std::path::Path;

/// A storage bucket to register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDefinition {
    pub name: String,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl BucketDefinition {
    /// Display URL of the bucket
    pub fn url(&self) -> String {
        format!("s3://{}", self.name)
    }

    pub fn registration(&self) -> BucketRegistration {
        BucketRegistration {
            name: self.name.clone(),
            region: self.region.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
        }
    }
}

/// Parse the contents of a bucket file
///
/// Missing trailing fields are `None`; tokens past the secret key are ignored.
pub fn parse(content: &str, path: &Path) -> Result<Vec<BucketDefinition>, LoadError> {
    let mut buckets = Vec::new();

    for (_, tokens) in records(content, path) {
        let mut fields = tokens.into_iter().map(str::to_string);
        let Some(name) = fields.next() else {
            continue;
        };
        buckets.push(BucketDefinition {
            name,
            region: fields.next(),
            access_key: fields.next(),
            secret_key: fields.next(),
        });
    }

    super::ensure_unique("bucket", buckets.iter().map(|b| b.name.as_str()), path)?;
    Ok(buckets)
}
