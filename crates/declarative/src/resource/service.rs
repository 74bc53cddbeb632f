//! Service resource - run state, boot registration and dependency restarts

use log::{debug, info};
use serde::Deserialize;
use std::cell::Cell;

use crate::context::ApplyContext;
use crate::error::{Error, Result};
use crate::map::ResourceMap;
use crate::types::{ApplyResult, ServiceOnStart, ServiceState};

/// Suffixes that mark a name as an explicit unit name
const UNIT_SUFFIXES: &[&str] = &[
    ".service", ".socket", ".timer", ".target", ".path", ".mount",
];

/// A service unit managed by the service manager
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResource {
    pub name: String,
    pub state: ServiceState,
    pub on_start: ServiceOnStart,
    /// Identities of resources whose changes require a restart
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(skip)]
    changed: Cell<bool>,
}

impl ServiceResource {
    pub fn new(name: &str, state: ServiceState, on_start: ServiceOnStart) -> Self {
        Self {
            name: name.to_string(),
            state,
            on_start,
            depends_on: Vec::new(),
            changed: Cell::new(false),
        }
    }

    /// A service that should be running and enabled
    pub fn running(name: &str) -> Self {
        Self::new(name, ServiceState::Running, ServiceOnStart::Enabled)
    }

    pub fn depends_on(mut self, identity: &str) -> Self {
        self.depends_on.push(identity.to_string());
        self
    }

    pub fn identity(&self) -> String {
        format!("service:{}", self.name)
    }

    pub fn description(&self) -> String {
        format!(
            "Ensure {} is {} and {}",
            self.unit(),
            self.state,
            self.on_start
        )
    }

    pub fn changed(&self) -> bool {
        self.changed.get()
    }

    /// Unit name as known to the service manager
    pub fn unit(&self) -> String {
        if UNIT_SUFFIXES.iter().any(|s| self.name.ends_with(s)) {
            self.name.clone()
        } else {
            format!("{}.service", self.name)
        }
    }

    pub(crate) fn converge(&self, ctx: &ApplyContext, map: &ResourceMap) -> Result<ApplyResult> {
        let services = ctx.services;
        if !services.is_available() {
            return Err(Error::ManagerUnavailable {
                manager: services.name().to_string(),
            });
        }

        let unit = self.unit();
        if services.unit_property(&unit, "LoadState")?.trim() == "not-found" {
            return Err(Error::UnitNotFound { unit });
        }

        let unit_file_state = services.unit_property(&unit, "UnitFileState")?;
        let sub_state = services.unit_property(&unit, "SubState")?;
        let actual_on_start = ServiceOnStart::from_unit_file_state(unit_file_state.trim());
        let actual_state = ServiceState::from_sub_state(sub_state.trim());
        debug!(
            "{}: UnitFileState={} SubState={}",
            self.identity(),
            unit_file_state.trim(),
            sub_state.trim()
        );

        let mut result = ApplyResult::NoChange;

        // Boot registration does not feed the changed flag.
        if actual_on_start != Some(self.on_start) {
            match self.on_start {
                ServiceOnStart::Enabled => services.enable(&unit)?,
                ServiceOnStart::Disabled => services.disable(&unit)?,
            }
            info!("{}: {}", self.identity(), self.on_start);
            result = ApplyResult::Modified;
        }

        if actual_state != Some(self.state) {
            match self.state {
                ServiceState::Running => {
                    services.start(&unit)?;
                    info!("{}: started", self.identity());
                    // A unit started in this pass already runs with its dependencies' changes.
                    return Ok(ApplyResult::Modified);
                }
                ServiceState::Stopped => {
                    services.stop(&unit)?;
                    info!("{}: stopped", self.identity());
                    result = ApplyResult::Modified;
                }
            }
        }

        // Dependencies are resolved even when no restart can follow.
        let changed_dependency = self.changed_dependency(map)?;
        if self.state == ServiceState::Stopped {
            return Ok(result);
        }

        if let Some(dependency) = changed_dependency {
            services.restart(&unit)?;
            info!("{}: restarted after {dependency} changed", self.identity());
            self.changed.set(true);
            result = ApplyResult::Modified;
        }

        Ok(result)
    }

    /// First dependency whose changed flag is set
    ///
    /// Every listed identity must exist in the map, whether or not an
    /// earlier one already changed.
    fn changed_dependency(&self, map: &ResourceMap) -> Result<Option<String>> {
        let mut changed = None;
        for dependency in &self.depends_on {
            let resource = map
                .get(dependency)
                .ok_or_else(|| Error::UnresolvedDependency {
                    identity: self.identity(),
                    dependency: dependency.clone(),
                })?;
            if changed.is_none() && resource.changed() {
                changed = Some(dependency.clone());
            }
        }
        Ok(changed)
    }

    #[cfg(test)]
    pub(crate) fn set_changed(&self, changed: bool) {
        self.changed.set(changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::{CurrentAccounts, MockPackages, MockServices};
    use crate::resource::{FileResource, Resource};

    /// Map holding a config file (changed or not) and the service under test
    fn map_with(service: ServiceResource, file_changed: bool) -> ResourceMap {
        let file = FileResource::new("/etc/app.conf", "v2");
        file.set_changed(file_changed);
        ResourceMap::from_resources(vec![Resource::File(file), Resource::Service(service)])
            .unwrap()
    }

    fn converge_last(map: &ResourceMap, services: &MockServices) -> Result<ApplyResult> {
        let packages = MockPackages::default();
        let accounts = CurrentAccounts::default();
        let ctx = ApplyContext::new(&packages, services, &accounts);
        let resource = map.iter().last().unwrap();
        resource.converge(&ctx, map)
    }

    fn app_service() -> ServiceResource {
        ServiceResource::running("app").depends_on("file:/etc/app.conf")
    }

    #[test]
    fn test_converged_service_makes_no_changes() {
        let services = MockServices::default().with_unit("app.service", "enabled", "running");
        let map = map_with(app_service(), false);

        assert_eq!(
            converge_last(&map, &services).unwrap(),
            ApplyResult::NoChange
        );
        assert!(services.actions().is_empty());
        assert!(!map.get("service:app").unwrap().changed());
    }

    #[test]
    fn test_restarts_when_dependency_changed() {
        let services = MockServices::default().with_unit("app.service", "enabled", "running");
        let map = map_with(app_service(), true);

        assert_eq!(
            converge_last(&map, &services).unwrap(),
            ApplyResult::Modified
        );
        assert_eq!(services.actions(), vec!["restart app.service"]);
        assert!(map.get("service:app").unwrap().changed());
    }

    #[test]
    fn test_start_supersedes_restart() {
        let services = MockServices::default().with_unit("app.service", "enabled", "dead");
        let map = map_with(app_service(), true);

        assert_eq!(
            converge_last(&map, &services).unwrap(),
            ApplyResult::Modified
        );
        assert_eq!(services.actions(), vec!["start app.service"]);
        assert!(!map.get("service:app").unwrap().changed());
    }

    #[test]
    fn test_failed_unit_is_started() {
        let services = MockServices::default().with_unit("app.service", "enabled", "failed");
        let map = map_with(app_service(), false);

        converge_last(&map, &services).unwrap();
        assert_eq!(services.actions(), vec!["start app.service"]);
    }

    #[test]
    fn test_unresolved_dependency_fails() {
        let services = MockServices::default().with_unit("app.service", "enabled", "running");
        let service = app_service().depends_on("package:missing");
        let map = map_with(service, true);

        match converge_last(&map, &services).unwrap_err() {
            Error::UnresolvedDependency {
                identity,
                dependency,
            } => {
                assert_eq!(identity, "service:app");
                assert_eq!(dependency, "package:missing");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(services.actions().is_empty());
    }

    #[test]
    fn test_enables_disabled_unit_without_flag() {
        let services = MockServices::default().with_unit("app.service", "disabled", "running");
        let map = map_with(app_service(), false);

        assert_eq!(
            converge_last(&map, &services).unwrap(),
            ApplyResult::Modified
        );
        assert_eq!(services.actions(), vec!["enable app.service"]);
        assert!(!map.get("service:app").unwrap().changed());
    }

    #[test]
    fn test_disables_and_stops() {
        let services = MockServices::default().with_unit("app.service", "enabled", "running");
        let service = ServiceResource::new("app", ServiceState::Stopped, ServiceOnStart::Disabled);
        let map = map_with(service, false);

        converge_last(&map, &services).unwrap();
        assert_eq!(
            services.actions(),
            vec!["disable app.service", "stop app.service"]
        );
        assert!(!map.get("service:app").unwrap().changed());
    }

    #[test]
    fn test_stopped_service_ignores_changed_dependency() {
        let services = MockServices::default().with_unit("app.service", "enabled", "running");
        let service = ServiceResource::new("app", ServiceState::Stopped, ServiceOnStart::Disabled)
            .depends_on("file:/etc/app.conf");
        let map = map_with(service, true);

        assert_eq!(
            converge_last(&map, &services).unwrap(),
            ApplyResult::Modified
        );
        assert_eq!(
            services.actions(),
            vec!["disable app.service", "stop app.service"]
        );
        assert!(!map.get("service:app").unwrap().changed());
    }

    #[test]
    fn test_stopped_service_still_resolves_dependencies() {
        let services = MockServices::default().with_unit("app.service", "disabled", "dead");
        let service = ServiceResource::new("app", ServiceState::Stopped, ServiceOnStart::Disabled)
            .depends_on("package:app");
        let map = map_with(service, false);

        assert!(matches!(
            converge_last(&map, &services).unwrap_err(),
            Error::UnresolvedDependency { dependency, .. } if dependency == "package:app"
        ));
    }

    #[test]
    fn test_exited_oneshot_restarts_on_changed_dependency() {
        let services = MockServices::default().with_unit("app.service", "enabled", "exited");
        let map = map_with(app_service(), true);

        assert_eq!(
            converge_last(&map, &services).unwrap(),
            ApplyResult::Modified
        );
        assert_eq!(services.actions(), vec!["restart app.service"]);
        assert!(map.get("service:app").unwrap().changed());
    }

    #[test]
    fn test_dead_counts_as_stopped() {
        let services = MockServices::default().with_unit("app.service", "disabled", "dead");
        let service = ServiceResource::new("app", ServiceState::Stopped, ServiceOnStart::Disabled);
        let map = map_with(service, false);

        assert_eq!(
            converge_last(&map, &services).unwrap(),
            ApplyResult::NoChange
        );
        assert!(services.actions().is_empty());
    }

    #[test]
    fn test_static_unit_is_enabled_toward_desired() {
        let services = MockServices::default().with_unit("app.service", "static", "running");
        let map = map_with(app_service(), false);

        converge_last(&map, &services).unwrap();
        assert_eq!(services.actions(), vec!["enable app.service"]);
    }

    #[test]
    fn test_unavailable_manager_fails_without_calls() {
        let services = MockServices {
            available: false,
            ..Default::default()
        };
        let map = map_with(app_service(), false);

        assert!(matches!(
            converge_last(&map, &services).unwrap_err(),
            Error::ManagerUnavailable { .. }
        ));
        assert!(services.calls().is_empty());
    }

    #[test]
    fn test_unknown_unit_fails() {
        let services = MockServices::default();
        let map = map_with(app_service(), false);

        assert!(matches!(
            converge_last(&map, &services).unwrap_err(),
            Error::UnitNotFound { unit } if unit == "app.service"
        ));
    }

    #[test]
    fn test_start_failure_propagates() {
        let mut services = MockServices::default().with_unit("app.service", "enabled", "dead");
        services.fail_on = Some("start");
        let map = map_with(app_service(), false);

        assert!(converge_last(&map, &services).is_err());
    }

    #[test]
    fn test_unit_names() {
        assert_eq!(ServiceResource::running("nginx").unit(), "nginx.service");
        assert_eq!(
            ServiceResource::running("php8.2-fpm").unit(),
            "php8.2-fpm.service"
        );
        assert_eq!(
            ServiceResource::running("docker.socket").unit(),
            "docker.socket"
        );
    }

    #[test]
    fn test_deserialize_camel_case() {
        let service: ServiceResource = serde_json::from_str(
            r#"{"name": "app", "state": "running", "onStart": "enabled",
                "dependsOn": ["file:/etc/app.conf"]}"#,
        )
        .unwrap();
        assert_eq!(service.on_start, ServiceOnStart::Enabled);
        assert_eq!(service.depends_on, vec!["file:/etc/app.conf"]);
    }
}
