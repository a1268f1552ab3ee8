//! Resource trait for declarative reconciliation
//!
//! A Resource is one declared entry (a bucket, a view, ...) that can be
//! created on a target, and sometimes deleted. Whether it exists is decided
//! by the executor from the target's registered names, not by the resource.

use crate::context::ApplyContext;
use crate::types::ExistingPolicy;
use anyhow::Result;
use std::fmt;

/// Core trait for declared resources
///
/// `T` is the target the resource is applied to, usually a client for a
/// remote service. It is passed in through [`ApplyContext`] so resources
/// hold only their declaration.
///
/// # Example
///
/// ```ignore
/// use declarative::{ApplyContext, Resource};
///
/// #[derive(Debug)]
/// struct Topic {
///     name: String,
/// }
///
/// impl Resource<Broker> for Topic {
///     fn id(&self) -> String {
///         self.name.clone()
///     }
///
///     fn description(&self) -> String {
///         format!("Create topic {}", self.name)
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "topic"
///     }
///
///     fn create(&self, ctx: &mut ApplyContext<'_, Broker>) -> anyhow::Result<()> {
///         ctx.target.create_topic(&self.name)
///     }
/// }
/// ```
pub trait Resource<T: ?Sized>: fmt::Debug {
    /// Unique identifier for this resource within its type
    ///
    /// Compared verbatim (case-sensitive) against the target's registered
    /// names.
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category, e.g. "bucket" or "view"
    fn resource_type(&self) -> &'static str;

    /// What to do when a resource with this id is already registered
    fn existing_policy(&self) -> ExistingPolicy {
        ExistingPolicy::Skip
    }

    /// Reason this resource can never be created on the target, if any
    ///
    /// Consulted only when the resource is absent. An unsupported resource
    /// is reported, never applied, and never aborts execution.
    fn unsupported(&self) -> Option<String> {
        None
    }

    /// Create the resource on the target
    fn create(&self, ctx: &mut ApplyContext<'_, T>) -> Result<()>;

    /// Delete the resource from the target
    ///
    /// Only called for resources whose policy is
    /// [`ExistingPolicy::Recreate`].
    fn delete(&self, _ctx: &mut ApplyContext<'_, T>) -> Result<()> {
        anyhow::bail!("{} '{}' cannot be deleted", self.resource_type(), self.id())
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource<T> = Box<dyn Resource<T>>;
