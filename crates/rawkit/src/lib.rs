//! # rawkit
//!
//! Blocking client for the registration surface of a RAW query executor.
//!
//! This crate provides:
//! - The [`Backend`] trait: list, register, create and delete calls for
//!   buckets, relational databases, views and packages
//! - [`HttpBackend`]: JSON over HTTP against the executor and the
//!   credentials service
//! - [`MemoryBackend`]: an in-memory recording backend for tests
//! - Categorized errors so callers can tell "unreachable" from "refused"
//!
//! ## Example
//!
//! ```no_run
//! use rawkit::{Backend, HttpBackend, HttpConfig};
//!
//! let backend = HttpBackend::new(&HttpConfig::default())?;
//! for name in backend.list_packages()? {
//!     println!("package: {name}");
//! }
//! backend.create_view("recent_sales", "select * from sales where year > 2020")?;
//! # Ok::<(), rawkit::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use backend::Backend;
pub use backend::http::{HttpBackend, HttpConfig};
pub use backend::memory::{Call, Failure, MemoryBackend};
pub use error::{Error, ErrorCategory, Result};
pub use types::{BucketRegistration, RdbmsConnection, RdbmsKind};
