//! Host backends for package and service management
//!
//! Each backend implements one of the provider traits from the
//! `declarative` crate by running the host's own tools.

pub mod apt;
pub mod systemd;

pub use apt::Apt;
pub use systemd::Systemctl;
