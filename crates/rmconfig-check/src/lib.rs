//! Path-aware validation rules for configuration trees.
//!
//! This crate provides the generic machinery that configuration types are
//! checked through:
//!
//! - **[`Walk`]**: implemented by every node of a document so the engine can
//!   descend into it without knowing its concrete shape
//! - **[`Registry`]**: rules registered against a node type (their scope) and
//!   executed over a whole tree in one pass
//! - **[`Report`]**: every violation found, each qualified with the path to
//!   the node it was raised on
//! - **Check helpers**: small predicates such as [`not_empty`] and
//!   [`greater_than`] that produce consistently worded messages
//!
//! # Example
//!
//! ```
//! use rmconfig_check::{collect, not_empty, Registry, Segment, Walk};
//!
//! struct Pool {
//!     name: String,
//! }
//!
//! impl Walk for Pool {}
//!
//! struct Doc {
//!     pools: Vec<Pool>,
//! }
//!
//! impl Walk for Doc {
//!     fn walk_children<'a>(&'a self, visit: &mut dyn FnMut(Segment, &'a dyn Walk)) {
//!         for (i, pool) in self.pools.iter().enumerate() {
//!             visit(Segment::Element("pools", i), pool);
//!         }
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register(|pool: &Pool| collect([not_empty(&pool.name, "name is required")]));
//!
//! let doc = Doc { pools: vec![Pool { name: String::new() }] };
//! let report = registry.validate(&doc).unwrap_err();
//! assert_eq!(
//!     report.to_string(),
//!     "Check Failed! 1 errors found:\n\terror found at root.pools[0]: name is required:  must be non-empty"
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod checks;
pub mod error;
pub mod path;
pub mod registry;

pub use checks::{
    collect, greater_than, greater_than_or_equal_to, is_in, less_than_or_equal_to, not_empty,
};
pub use error::{CheckError, Report, Violation};
pub use path::{Path, Segment};
pub use registry::{AsAny, Registry, Walk};
