//! Apply context and provider traits
//!
//! These traits allow the declarative crate to converge resources without
//! depending on a specific package manager, service manager or account
//! database. Implementations run their operations synchronously; a call
//! returns only once the host operation has finished.

use crate::error::Result;
use crate::types::{ApplyResult, PackageStatus, ReconcileSummary};

/// Provider for package database queries and package changes
pub trait PackageManager {
    /// Query the installation status of a package
    ///
    /// A package the database does not know about is
    /// `Ok(PackageStatus::NotFound)`; failing to run the query is an error.
    fn query(&self, name: &str) -> Result<PackageStatus>;

    /// Refresh the package index
    fn refresh_index(&self) -> Result<()>;

    /// Install a package
    fn install(&self, name: &str) -> Result<()>;

    /// Remove a package
    fn remove(&self, name: &str) -> Result<()>;
}

/// Provider for service unit queries and state changes
pub trait ServiceManager {
    /// Name shown in errors (e.g. "systemd")
    fn name(&self) -> &str;

    /// Check if the service manager can be reached
    fn is_available(&self) -> bool;

    /// Read a unit property (e.g. `UnitFileState`, `SubState`)
    fn unit_property(&self, unit: &str, property: &str) -> Result<String>;

    /// Register the unit to start on boot
    fn enable(&self, unit: &str) -> Result<()>;

    /// Remove the unit's start-on-boot registration
    fn disable(&self, unit: &str) -> Result<()>;

    /// Start the unit
    fn start(&self, unit: &str) -> Result<()>;

    /// Stop the unit
    fn stop(&self, unit: &str) -> Result<()>;

    /// Restart the unit if it is running; a stopped unit stays stopped
    fn restart(&self, unit: &str) -> Result<()>;
}

/// Resolves user and group names to numeric ids
pub trait AccountDatabase {
    /// Look up a user id, `Ok(None)` if no such user exists
    fn user_id(&self, name: &str) -> Result<Option<u32>>;

    /// Look up a group id, `Ok(None)` if no such group exists
    fn group_id(&self, name: &str) -> Result<Option<u32>>;
}

/// Progress callback for reconciliation runs
///
/// Implement this trait to receive progress updates during a run.
pub trait ProgressCallback {
    /// Called once before the first resource converges
    fn on_start(&mut self, count: usize);

    /// Called when starting to converge a single resource
    fn on_resource_start(&mut self, identity: &str);

    /// Called when a resource converged successfully
    fn on_resource_complete(&mut self, identity: &str, result: ApplyResult);

    /// Called once after every resource converged
    fn on_complete(&mut self, summary: &ReconcileSummary);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _count: usize) {}
    fn on_resource_start(&mut self, _identity: &str) {}
    fn on_resource_complete(&mut self, _identity: &str, _result: ApplyResult) {}
    fn on_complete(&mut self, _summary: &ReconcileSummary) {}
}

/// Context passed to resource converge operations
pub struct ApplyContext<'a> {
    pub packages: &'a dyn PackageManager,
    pub services: &'a dyn ServiceManager,
    pub accounts: &'a dyn AccountDatabase,
}

impl<'a> ApplyContext<'a> {
    /// Create a new apply context
    pub fn new(
        packages: &'a dyn PackageManager,
        services: &'a dyn ServiceManager,
        accounts: &'a dyn AccountDatabase,
    ) -> Self {
        Self {
            packages,
            services,
            accounts,
        }
    }
}
