//! Package resource

use log::debug;
use serde::Deserialize;
use std::cell::Cell;

use crate::context::ApplyContext;
use crate::error::Result;
use crate::types::{ApplyResult, PackageState, PackageStatus};

/// A system package
#[derive(Debug, Clone, Deserialize)]
pub struct PackageResource {
    pub name: String,
    pub state: PackageState,
    #[serde(skip)]
    changed: Cell<bool>,
}

impl PackageResource {
    pub fn new(name: &str, state: PackageState) -> Self {
        Self {
            name: name.to_string(),
            state,
            changed: Cell::new(false),
        }
    }

    pub fn identity(&self) -> String {
        format!("package:{}", self.name)
    }

    pub fn description(&self) -> String {
        format!("Ensure package {} is {}", self.name, self.state)
    }

    pub fn changed(&self) -> bool {
        self.changed.get()
    }

    pub(crate) fn converge(&self, ctx: &ApplyContext) -> Result<ApplyResult> {
        let status = ctx.packages.query(&self.name)?;
        if status == PackageStatus::NotFound {
            debug!("{}: not in package database", self.identity());
        }

        let actual = status.state();
        if actual == self.state {
            return Ok(ApplyResult::NoChange);
        }

        ctx.packages.refresh_index()?;

        let result = match self.state {
            PackageState::Installed => {
                ctx.packages.install(&self.name)?;
                ApplyResult::Created
            }
            PackageState::Absent => {
                ctx.packages.remove(&self.name)?;
                ApplyResult::Removed
            }
        };
        self.changed.set(true);
        Ok(result)
    }

    #[cfg(test)]
    pub(crate) fn set_changed(&self, changed: bool) {
        self.changed.set(changed);
    }
}
