//! Reconciliation engine - converges resources in declaration order
//!
//! The walk is linear: resources that depend on others are ordered by the
//! author of the declared list, not inferred. The first failure aborts the
//! run; changes applied by earlier resources stay applied.

use log::{debug, info};

use crate::context::{ApplyContext, NoProgress, ProgressCallback};
use crate::error::Result;
use crate::map::ResourceMap;
use crate::types::ReconcileSummary;

/// Converge every resource in `map`, in declaration order
///
/// # Arguments
/// * `map` - The validated resources of this run
/// * `ctx` - Providers for package, service and account operations
/// * `progress` - Progress callback
///
/// # Returns
/// Summary of the run, or the first error encountered
pub fn reconcile<P: ProgressCallback>(
    map: &ResourceMap,
    ctx: &ApplyContext,
    progress: &mut P,
) -> Result<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();
    progress.on_start(map.len());

    for resource in map {
        let identity = resource.identity();
        debug!("converging {identity}: {}", resource.description());
        progress.on_resource_start(&identity);

        let result = resource.converge(ctx, map)?;

        if resource.changed() {
            summary.changed.push(identity.clone());
        }
        summary.add_result(result);
        progress.on_resource_complete(&identity, result);
    }

    info!(
        "reconciled {} resources: {} created, {} modified, {} removed, {} unchanged",
        summary.total(),
        summary.created,
        summary.modified,
        summary.removed,
        summary.no_change
    );
    progress.on_complete(&summary);
    Ok(summary)
}

/// Reconcile without progress reporting
pub fn reconcile_simple(map: &ResourceMap, ctx: &ApplyContext) -> Result<ReconcileSummary> {
    reconcile(map, ctx, &mut NoProgress)
}
