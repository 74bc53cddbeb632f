//! Resource model for declarative host configuration
//!
//! A [`Resource`] is one declared unit of desired host state. The set of
//! kinds is closed, so every dispatch point matches exhaustively over the
//! variants.
//!
//! Each resource carries a `changed` flag that starts out false and is set
//! when converging it mutated the host. Later resources read the flag
//! through the [`ResourceMap`]; execution is strictly sequential, so the
//! flag lives in a [`Cell`](std::cell::Cell) and converge takes `&self`.

mod file;
mod package;
mod service;

pub use file::FileResource;
pub use package::PackageResource;
pub use service::ServiceResource;

use crate::context::ApplyContext;
use crate::error::{Error, Result};
use crate::map::ResourceMap;
use crate::types::ApplyResult;
use serde::Deserialize;

/// A declared resource, resolved to exactly one kind
#[derive(Debug)]
pub enum Resource {
    File(FileResource),
    Package(PackageResource),
    Service(ServiceResource),
}

impl Resource {
    /// Unique, kind-prefixed identifier (e.g. "file:/etc/motd")
    pub fn identity(&self) -> String {
        match self {
            Self::File(r) => r.identity(),
            Self::Package(r) => r.identity(),
            Self::Service(r) => r.identity(),
        }
    }

    /// Identity without the kind prefix (path, package or unit name)
    pub fn name(&self) -> String {
        match self {
            Self::File(r) => r.path.display().to_string(),
            Self::Package(r) => r.name.clone(),
            Self::Service(r) => r.name.clone(),
        }
    }

    /// Resource kind ("file", "package", "service")
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Package(_) => "package",
            Self::Service(_) => "service",
        }
    }

    /// Human-readable description of the desired state
    pub fn description(&self) -> String {
        match self {
            Self::File(r) => r.description(),
            Self::Package(r) => r.description(),
            Self::Service(r) => r.description(),
        }
    }

    /// Whether converging this resource mutated the host during this run
    pub fn changed(&self) -> bool {
        match self {
            Self::File(r) => r.changed(),
            Self::Package(r) => r.changed(),
            Self::Service(r) => r.changed(),
        }
    }

    /// Converge the host toward this resource's desired state
    pub fn converge(&self, ctx: &ApplyContext, map: &ResourceMap) -> Result<ApplyResult> {
        match self {
            Self::File(r) => r.converge(ctx),
            Self::Package(r) => r.converge(ctx),
            Self::Service(r) => r.converge(ctx, map),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_changed(&self, changed: bool) {
        match self {
            Self::File(r) => r.set_changed(changed),
            Self::Package(r) => r.set_changed(changed),
            Self::Service(r) => r.set_changed(changed),
        }
    }
}

impl From<FileResource> for Resource {
    fn from(resource: FileResource) -> Self {
        Self::File(resource)
    }
}

impl From<PackageResource> for Resource {
    fn from(resource: PackageResource) -> Self {
        Self::Package(resource)
    }
}

impl From<ServiceResource> for Resource {
    fn from(resource: ServiceResource) -> Self {
        Self::Service(resource)
    }
}

/// One entry of the declared resource list, as written by the author
///
/// Exactly one of the fields must be populated.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceEntry {
    #[serde(default)]
    pub file: Option<FileResource>,
    #[serde(default)]
    pub package: Option<PackageResource>,
    #[serde(default)]
    pub service: Option<ServiceResource>,
}

impl ResourceEntry {
    /// Resolve the entry to its single populated kind
    ///
    /// `index` is the entry's position in the declared list, used in errors.
    pub fn resolve(self, index: usize) -> Result<Resource> {
        match (self.file, self.package, self.service) {
            (Some(file), None, None) => Ok(Resource::File(file)),
            (None, Some(package), None) => Ok(Resource::Package(package)),
            (None, None, Some(service)) => Ok(Resource::Service(service)),
            (None, None, None) => Err(Error::NoResource { index }),
            (file, package, service) => {
                let kinds: Vec<&str> = [
                    file.map(|_| "file"),
                    package.map(|_| "package"),
                    service.map(|_| "service"),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(Error::AmbiguousResource {
                    index,
                    kinds: kinds.join(", "),
                })
            }
        }
    }
}
