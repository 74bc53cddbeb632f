//! systemd backend using `systemctl`.

use declarative::{Result, ServiceManager};
use log::info;
use std::path::PathBuf;

use crate::runner::run_checked;

/// Backend that executes real `systemctl` commands.
pub struct Systemctl {
    program: String,
    /// Directory that exists only while systemd is the running init
    runtime_dir: PathBuf,
}

impl Default for Systemctl {
    fn default() -> Self {
        Self {
            program: "systemctl".to_string(),
            runtime_dir: PathBuf::from("/run/systemd/system"),
        }
    }
}

impl Systemctl {
    /// Use a specific `systemctl` executable and runtime directory.
    pub fn with_program(program: &str, runtime_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.to_string(),
            runtime_dir: runtime_dir.into(),
        }
    }

    fn unit_command(&self, verb: &str, unit: &str, operation: &str) -> Result<()> {
        run_checked(&self.program, &[verb, unit], &[], unit, operation)?;
        Ok(())
    }
}

impl ServiceManager for Systemctl {
    fn name(&self) -> &str {
        "systemd"
    }

    fn is_available(&self) -> bool {
        self.runtime_dir.is_dir()
    }

    fn unit_property(&self, unit: &str, property: &str) -> Result<String> {
        let flag = format!("--property={property}");
        let output = run_checked(
            &self.program,
            &["show", unit, &flag, "--value"],
            &[],
            unit,
            &format!("query {property}"),
        )?;
        Ok(output.stdout_str().trim().to_string())
    }

    fn enable(&self, unit: &str) -> Result<()> {
        info!("Enabling {unit}");
        self.unit_command("enable", unit, "enable unit")
    }

    fn disable(&self, unit: &str) -> Result<()> {
        info!("Disabling {unit}");
        self.unit_command("disable", unit, "disable unit")
    }

    fn start(&self, unit: &str) -> Result<()> {
        info!("Starting {unit}");
        self.unit_command("start", unit, "start unit")
    }

    fn stop(&self, unit: &str) -> Result<()> {
        info!("Stopping {unit}");
        self.unit_command("stop", unit, "stop unit")
    }

    fn restart(&self, unit: &str) -> Result<()> {
        info!("Restarting {unit}");
        self.unit_command("try-restart", unit, "restart unit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Error;
    use tempfile::TempDir;

    #[test]
    fn test_availability_follows_runtime_dir() {
        let dir = TempDir::new().unwrap();
        let systemd = Systemctl::with_program("systemctl", dir.path());
        assert!(systemd.is_available());

        let systemd = Systemctl::with_program("systemctl", dir.path().join("missing"));
        assert!(!systemd.is_available());
    }

    #[test]
    fn test_property_output_is_trimmed() {
        // `echo` stands in for systemctl and prints its arguments back
        let systemd = Systemctl::with_program("echo", "/");
        let value = systemd.unit_property("app.service", "SubState").unwrap();
        assert_eq!(value, "show app.service --property=SubState --value");
    }

    #[test]
    fn test_failed_command_names_unit_and_operation() {
        let systemd = Systemctl::with_program("false", "/");
        match systemd.start("app.service").unwrap_err() {
            Error::CommandFailed {
                resource,
                operation,
                ..
            } => {
                assert_eq!(resource, "app.service");
                assert_eq!(operation, "start unit");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_systemctl_is_invocation_error() {
        let systemd = Systemctl::with_program("/nonexistent/systemctl", "/");
        assert!(matches!(
            systemd.unit_property("app.service", "LoadState").unwrap_err(),
            Error::Invocation { .. }
        ));
    }
}
