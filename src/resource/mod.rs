//! Remote resources declared by a definition tree
//!
//! Each resource wraps one parsed definition and knows the single client
//! call that creates it. Whether it already exists is decided by the
//! engine from the stage's registered names.

pub mod bucket;
pub mod database;
pub mod package;
pub mod view;

pub use bucket::BucketResource;
pub use database::DatabaseResource;
pub use package::PackageResource;
pub use view::ViewResource;

/// Target every resource is applied to
pub type Target = dyn rawkit::Backend;

/// A boxed resource applied against the remote service
pub type BoxedResource = declarative::BoxedResource<Target>;
