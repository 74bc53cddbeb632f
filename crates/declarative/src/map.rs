//! Resource map - validated, ordered resources with an identity index

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::resource::{Resource, ResourceEntry};
use crate::types::FileEnsure;

/// The declared resources of one run
///
/// Keeps declaration order for the reconciliation walk and an identity
/// index for dependency lookups. A map can only be built from a list that
/// passes validation: every entry resolves to one kind, no identity is
/// empty, and no identity appears twice.
#[derive(Debug, Default)]
pub struct ResourceMap {
    resources: Vec<Resource>,
    index: HashMap<String, usize>,
}

impl ResourceMap {
    /// Validate declared entries and build the map
    pub fn from_entries(entries: Vec<ResourceEntry>) -> Result<Self> {
        let mut map = Self::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let resource = entry.resolve(index)?;
            map.insert(index, resource)?;
        }
        Ok(map)
    }

    /// Validate already-resolved resources and build the map
    pub fn from_resources(resources: Vec<Resource>) -> Result<Self> {
        let mut map = Self::with_capacity(resources.len());
        for (index, resource) in resources.into_iter().enumerate() {
            map.insert(index, resource)?;
        }
        Ok(map)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            resources: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    fn insert(&mut self, index: usize, resource: Resource) -> Result<()> {
        if resource.name().trim().is_empty() {
            return Err(Error::EmptyIdentity { index });
        }

        let identity = resource.identity();
        if self.index.contains_key(&identity) {
            return Err(Error::DuplicateIdentity { identity });
        }

        self.index.insert(identity, self.resources.len());
        self.resources.push(resource);
        Ok(())
    }

    /// Look up a resource by identity
    pub fn get(&self, identity: &str) -> Option<&Resource> {
        self.index.get(identity).map(|&i| &self.resources[i])
    }

    /// Resources in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Identities in declaration order
    pub fn identities(&self) -> Vec<String> {
        self.resources.iter().map(Resource::identity).collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Static checks that otherwise only fail once a resource converges
    ///
    /// Reports unresolved service dependencies and malformed file modes.
    /// Reconciliation does not call this; it fails at the point of use.
    pub fn check_references(&self) -> Vec<Error> {
        let mut problems = Vec::new();
        for resource in &self.resources {
            match resource {
                Resource::File(file) => {
                    if file.ensure == FileEnsure::Present
                        && let Err(e) = file.mode_bits()
                    {
                        problems.push(e);
                    }
                }
                Resource::Package(_) => {}
                Resource::Service(service) => {
                    problems.extend(
                        service
                            .depends_on
                            .iter()
                            .filter(|dependency| !self.index.contains_key(*dependency))
                            .map(|dependency| Error::UnresolvedDependency {
                                identity: service.identity(),
                                dependency: dependency.clone(),
                            }),
                    );
                }
            }
        }
        problems
    }
}

impl<'a> IntoIterator for &'a ResourceMap {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{FileResource, PackageResource, ServiceResource};
    use crate::types::PackageState;

    fn entries(json: &str) -> Vec<ResourceEntry> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_preserves_declaration_order() {
        let map = ResourceMap::from_entries(entries(
            r#"[
                {"package": {"name": "nginx", "state": "installed"}},
                {"file": {"path": "/etc/nginx/nginx.conf", "contents": "x"}},
                {"service": {"name": "nginx", "state": "running", "onStart": "enabled"}}
            ]"#,
        ))
        .unwrap();

        assert_eq!(
            map.identities(),
            vec![
                "package:nginx",
                "file:/etc/nginx/nginx.conf",
                "service:nginx"
            ]
        );
        assert_eq!(map.len(), 3);
        assert!(map.get("service:nginx").is_some());
        assert!(map.get("service:apache2").is_none());
    }

    #[test]
    fn test_same_name_different_kind_is_allowed() {
        let map = ResourceMap::from_resources(vec![
            PackageResource::new("nginx", PackageState::Installed).into(),
            ServiceResource::running("nginx").into(),
        ]);
        assert!(map.is_ok());
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let err = ResourceMap::from_resources(vec![
            FileResource::new("/etc/motd", "a").into(),
            PackageResource::new("vim", PackageState::Installed).into(),
            FileResource::new("/etc/motd", "b").into(),
        ])
        .unwrap_err();

        assert!(matches!(err, Error::DuplicateIdentity { identity } if identity == "file:/etc/motd"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ResourceMap::from_entries(entries(
            r#"[
                {"package": {"name": "vim", "state": "installed"}},
                {"package": {"name": "", "state": "installed"}}
            ]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::EmptyIdentity { index: 1 }));
    }

    #[test]
    fn test_entry_without_resource_rejected() {
        let err = ResourceMap::from_entries(entries(
            r#"[{"package": {"name": "vim", "state": "installed"}}, {}]"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::NoResource { index: 1 }));
    }

    #[test]
    fn test_check_references() {
        let map = ResourceMap::from_resources(vec![
            FileResource::new("/etc/app.conf", "x")
                .with_mode("rw")
                .into(),
            FileResource::absent("/etc/old.conf").with_mode("rw").into(),
            ServiceResource::running("app")
                .depends_on("file:/etc/app.conf")
                .depends_on("package:app")
                .into(),
        ])
        .unwrap();

        let problems = map.check_references();
        assert_eq!(problems.len(), 2);
        assert!(matches!(problems[0], Error::InvalidMode { .. }));
        assert!(matches!(
            &problems[1],
            Error::UnresolvedDependency { dependency, .. } if dependency == "package:app"
        ));
    }
}
