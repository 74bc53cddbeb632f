//! Error types for host reconciliation.
//!
//! Errors fall into two categories: problems with the declared resources
//! themselves, and failures of the host operations used to converge them.
//! Both abort a run. Negative answers such as "file does not exist" or
//! "package not found" are not errors and never appear here.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The declared resources are invalid or inconsistent
    Validation,
    /// A host operation (filesystem, command, service manager) failed
    External,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid resource declaration",
            Self::External => "Host operation failed",
        }
    }
}

/// Errors that can occur while validating or converging resources.
#[derive(Debug, Error)]
pub enum Error {
    /// Entry populates none of the resource kinds
    #[error("resource entry {index} does not declare a file, package or service")]
    NoResource {
        /// Position of the entry in the declared list
        index: usize,
    },

    /// Entry populates more than one resource kind
    #[error("resource entry {index} declares more than one resource kind ({kinds})")]
    AmbiguousResource {
        /// Position of the entry in the declared list
        index: usize,
        /// Comma separated kinds found on the entry
        kinds: String,
    },

    /// Entry resolved to an empty identity
    #[error("resource entry {index} has an empty name")]
    EmptyIdentity {
        /// Position of the entry in the declared list
        index: usize,
    },

    /// Two entries share an identity
    #[error("duplicate resource {identity}")]
    DuplicateIdentity {
        /// The repeated identity
        identity: String,
    },

    /// Permission mode is not an octal number within 0o7777
    #[error("could not parse desired file permissions for {}, {mode:?}", path.display())]
    InvalidMode {
        /// File the mode was declared on
        path: PathBuf,
        /// The mode as written
        mode: String,
    },

    /// Owning user does not exist
    #[error("could not find user {user} for {}", path.display())]
    UnknownUser {
        /// File the owner was declared on
        path: PathBuf,
        /// User name
        user: String,
    },

    /// Owning group does not exist
    #[error("could not find group {group} for {}", path.display())]
    UnknownGroup {
        /// File the group was declared on
        path: PathBuf,
        /// Group name
        group: String,
    },

    /// Service depends on an identity absent from the resource map
    #[error("{identity}: could not fetch dependency {dependency} from resource map")]
    UnresolvedDependency {
        /// Identity of the depending service
        identity: String,
        /// The missing identity
        dependency: String,
    },

    /// Filesystem operation failed
    #[error("could not {action} {}: {source}", path.display())]
    Io {
        /// What was being done ("open", "write", ...)
        action: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// chown failed
    #[error("could not modify ownership for file {}: {source}", path.display())]
    Ownership {
        /// Path involved
        path: PathBuf,
        /// Underlying errno
        #[source]
        source: nix::Error,
    },

    /// User or group database lookup failed (not merely "no such entry")
    #[error("could not look up account {name}: {source}")]
    AccountLookup {
        /// User or group name
        name: String,
        /// Underlying errno
        #[source]
        source: nix::Error,
    },

    /// External program could not be started
    #[error("failed to execute {program}: {source}")]
    Invocation {
        /// Program that failed to start
        program: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// External program ran and reported failure
    #[error("{resource}: could not {operation}: {message}")]
    CommandFailed {
        /// Package, unit or identity the command acted on
        resource: String,
        /// Operation attempted ("install package", "start unit", ...)
        operation: String,
        /// Diagnostic from the command
        message: String,
    },

    /// Service manager is not reachable on this host
    #[error("service manager {manager} is not available")]
    ManagerUnavailable {
        /// Name of the manager
        manager: String,
    },

    /// Unit is not known to the service manager
    #[error("unit {unit} not found")]
    UnitNotFound {
        /// Unit name
        unit: String,
    },
}

impl Error {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoResource { .. }
            | Self::AmbiguousResource { .. }
            | Self::EmptyIdentity { .. }
            | Self::DuplicateIdentity { .. }
            | Self::InvalidMode { .. }
            | Self::UnknownUser { .. }
            | Self::UnknownGroup { .. }
            | Self::UnresolvedDependency { .. } => ErrorCategory::Validation,
            Self::Io { .. }
            | Self::Ownership { .. }
            | Self::AccountLookup { .. }
            | Self::Invocation { .. }
            | Self::CommandFailed { .. }
            | Self::ManagerUnavailable { .. }
            | Self::UnitNotFound { .. } => ErrorCategory::External,
        }
    }

    /// Build an [`Error::Io`] for `path`.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Build an [`Error::CommandFailed`].
    pub fn command_failed(
        resource: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            resource: resource.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err = Error::DuplicateIdentity {
            identity: "file:/etc/motd".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);

        let err = Error::command_failed("nginx", "install package", "exit status 100");
        assert_eq!(err.category(), ErrorCategory::External);
    }

    #[test]
    fn test_command_failed_names_resource_and_operation() {
        let err = Error::command_failed("nginx.service", "start unit", "Job failed");
        let msg = err.to_string();
        assert!(msg.contains("nginx.service"));
        assert!(msg.contains("start unit"));
        assert!(msg.contains("Job failed"));
    }

    #[test]
    fn test_invalid_mode_message() {
        let err = Error::InvalidMode {
            path: "/etc/app.conf".into(),
            mode: "0999".into(),
        };
        assert_eq!(
            err.to_string(),
            "could not parse desired file permissions for /etc/app.conf, \"0999\""
        );
    }
}
