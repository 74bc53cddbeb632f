//! Core types for declarative host resources

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Output;

/// Desired presence of a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileEnsure {
    /// File exists with the declared contents
    #[default]
    Present,
    /// File does not exist
    Absent,
}

impl fmt::Display for FileEnsure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Desired or actual state of a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageState {
    Installed,
    Absent,
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installed => write!(f, "installed"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

/// Raw answer of a package database query
///
/// `NotFound` is the query tool's own "no such package" signal. It is a
/// negative result, not a failure: anything that goes wrong while running
/// the query is reported as an error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    /// Package is installed
    Installed,
    /// Package is known to the database but not installed (e.g. only config files remain)
    NotInstalled,
    /// Package is unknown to the database
    NotFound,
}

impl PackageStatus {
    /// Collapse the query answer into an installed/absent state
    pub fn state(self) -> PackageState {
        match self {
            Self::Installed => PackageState::Installed,
            Self::NotInstalled | Self::NotFound => PackageState::Absent,
        }
    }
}

/// Desired run state of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Running,
    Stopped,
}

impl ServiceState {
    /// Normalize a service manager sub-state
    ///
    /// `exited` is an active oneshot unit (`RemainAfterExit=yes`). Returns
    /// `None` for transitional or failed sub-states, which never equal a
    /// desired state.
    pub fn from_sub_state(sub_state: &str) -> Option<Self> {
        match sub_state {
            "running" | "exited" => Some(Self::Running),
            "dead" | "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Desired start-on-boot state of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceOnStart {
    Enabled,
    Disabled,
}

impl ServiceOnStart {
    /// Parse a unit file state (`static`, `masked`, ... yield `None`)
    pub fn from_unit_file_state(state: &str) -> Option<Self> {
        match state {
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceOnStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Result of converging a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Resource was modified
    Modified,
    /// Resource was removed
    Removed,
}

impl ApplyResult {
    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified | Self::Removed)
    }
}

/// Summary of a successful reconciliation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub modified: usize,
    pub removed: usize,
    pub no_change: usize,
    /// Identities whose changed flag was set during the run
    pub changed: Vec<String>,
}

impl ReconcileSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.total_changes() + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Modified => self.modified += 1,
            ApplyResult::Removed => self.removed += 1,
        }
    }
}

/// Output from an external command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Whether the command exited with status zero
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}
