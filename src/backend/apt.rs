//! Debian package backend using `dpkg-query` and `apt-get`.

use declarative::{CommandOutput, Error, PackageManager, PackageStatus, Result};
use log::{debug, info};

use crate::runner::{failure_message, run_checked, run_output};

/// Environment for every apt-get invocation
const APT_ENV: &[(&str, &str)] = &[("DEBIAN_FRONTEND", "noninteractive")];

/// dpkg-query's exit status when no package matches
const DPKG_QUERY_NOT_FOUND: i32 = 1;

/// Backend that executes real `dpkg-query` and `apt-get` commands.
pub struct Apt {
    dpkg_query: String,
    apt_get: String,
}

impl Default for Apt {
    fn default() -> Self {
        Self {
            dpkg_query: "/usr/bin/dpkg-query".to_string(),
            apt_get: "/usr/bin/apt-get".to_string(),
        }
    }
}

impl Apt {
    /// Use specific `dpkg-query` and `apt-get` executables.
    pub fn with_programs(dpkg_query: &str, apt_get: &str) -> Self {
        Self {
            dpkg_query: dpkg_query.to_string(),
            apt_get: apt_get.to_string(),
        }
    }

    fn apt_get(&self, args: &[&str], resource: &str, operation: &str) -> Result<()> {
        let mut full = vec!["-y", "-q"];
        full.extend_from_slice(args);
        run_checked(&self.apt_get, &full, APT_ENV, resource, operation)?;
        Ok(())
    }
}

impl PackageManager for Apt {
    fn query(&self, name: &str) -> Result<PackageStatus> {
        let output = run_output(&self.dpkg_query, &["-W", "-f=${Status}\\n", name], &[])?;
        let status = interpret_query(name, &output)?;
        debug!("dpkg-query {name}: {status:?}");
        Ok(status)
    }

    fn refresh_index(&self) -> Result<()> {
        info!("Updating package database");
        self.apt_get(&["update"], "apt", "update package database")
    }

    fn install(&self, name: &str) -> Result<()> {
        info!("Installing {name}");
        self.apt_get(&["install", name], name, "install package")
    }

    fn remove(&self, name: &str) -> Result<()> {
        info!("Removing {name}");
        self.apt_get(&["remove", name], name, "remove package")
    }
}

/// Map a `dpkg-query -W` run to a package status.
///
/// Exit status 1 is dpkg-query's "no packages found" answer. Any other
/// non-zero status means the query itself failed.
fn interpret_query(name: &str, output: &CommandOutput) -> Result<PackageStatus> {
    match output.code {
        Some(0) => Ok(parse_status(&output.stdout_str())),
        Some(DPKG_QUERY_NOT_FOUND) => Ok(PackageStatus::NotFound),
        _ => Err(Error::command_failed(
            name,
            "query package database",
            failure_message(output),
        )),
    }
}

/// Parse `${Status}` lines ("want flag status"), one per matching package.
fn parse_status(stdout: &str) -> PackageStatus {
    let installed = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .any(|status| status == "installed");

    if installed {
        PackageStatus::Installed
    } else {
        PackageStatus::NotInstalled
    }
}
