//! # Declarative
//!
//! Declarative host configuration: describe the files, packages and
//! services a host should have, and converge the live host toward them.
//!
//! ## Core Concepts
//!
//! - **Resource**: a declared unit of desired state (file, package, service)
//! - **Identity**: kind-prefixed unique name (`file:/etc/motd`, `package:vim`, `service:ssh`)
//! - **ResourceMap**: the validated resources of one run, in declaration order
//! - **Changed flag**: set when converging a resource mutated the host;
//!   services restart when a dependency's flag is set
//! - **Engine**: converges each resource once, in order, stopping at the first error
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{
//!     reconcile_simple, ApplyContext, FileResource, ResourceMap, ServiceResource,
//!     SystemAccounts,
//! };
//!
//! let map = ResourceMap::from_resources(vec![
//!     FileResource::new("/etc/app.conf", "port = 8080\n").into(),
//!     ServiceResource::running("app")
//!         .depends_on("file:/etc/app.conf")
//!         .into(),
//! ])?;
//!
//! // `apt` and `systemd` implement PackageManager and ServiceManager
//! let ctx = ApplyContext::new(&apt, &systemd, &SystemAccounts);
//! let summary = reconcile_simple(&map, &ctx)?;
//! ```
//!
//! ## Provider Traits
//!
//! Host operations go through traits so the engine can be driven without
//! a real package or service manager:
//!
//! - [`PackageManager`]: package queries, index refresh, install/remove
//! - [`ServiceManager`]: unit properties and state changes
//! - [`AccountDatabase`]: user/group name resolution
//! - [`ProgressCallback`]: receives progress updates

pub mod accounts;
pub mod context;
pub mod engine;
pub mod error;
pub mod map;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use accounts::SystemAccounts;
pub use context::{
    AccountDatabase, ApplyContext, NoProgress, PackageManager, ProgressCallback, ServiceManager,
};
pub use engine::{reconcile, reconcile_simple};
pub use error::{Error, ErrorCategory, Result};
pub use map::ResourceMap;
pub use resource::{FileResource, PackageResource, Resource, ResourceEntry, ServiceResource};
pub use types::{
    ApplyResult, CommandOutput, FileEnsure, PackageState, PackageStatus, ReconcileSummary,
    ServiceOnStart, ServiceState,
};
