//! User and group lookup through the system account database

use crate::context::AccountDatabase;
use crate::error::{Error, Result};
use nix::unistd::{Group, User};

/// Account database backed by the host's passwd/group sources (NSS)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAccounts;

impl AccountDatabase for SystemAccounts {
    fn user_id(&self, name: &str) -> Result<Option<u32>> {
        let user = User::from_name(name).map_err(|source| Error::AccountLookup {
            name: name.to_string(),
            source,
        })?;
        Ok(user.map(|u| u.uid.as_raw()))
    }

    fn group_id(&self, name: &str) -> Result<Option<u32>> {
        let group = Group::from_name(name).map_err(|source| Error::AccountLookup {
            name: name.to_string(),
            source,
        })?;
        Ok(group.map(|g| g.gid.as_raw()))
    }
}
