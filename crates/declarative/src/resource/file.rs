//! File resource - literal contents, ownership and permissions

use log::debug;
use serde::Deserialize;
use std::cell::Cell;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use crate::context::{AccountDatabase, ApplyContext};
use crate::error::{Error, Result};
use crate::types::{ApplyResult, FileEnsure};

/// A file with literal contents
#[derive(Debug, Clone, Deserialize)]
pub struct FileResource {
    #[serde(default)]
    pub ensure: FileEnsure,
    pub path: PathBuf,
    #[serde(default = "default_owner")]
    pub user: String,
    #[serde(default = "default_owner")]
    pub group: String,
    /// Permission bits as an octal string (e.g. "0644")
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub contents: String,
    #[serde(skip)]
    changed: Cell<bool>,
}

fn default_owner() -> String {
    "root".to_string()
}

fn default_mode() -> String {
    "0644".to_string()
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>, contents: &str) -> Self {
        Self {
            ensure: FileEnsure::Present,
            path: path.into(),
            user: default_owner(),
            group: default_owner(),
            mode: default_mode(),
            contents: contents.to_string(),
            changed: Cell::new(false),
        }
    }

    /// A file that must not exist
    pub fn absent(path: impl Into<PathBuf>) -> Self {
        Self {
            ensure: FileEnsure::Absent,
            ..Self::new(path, "")
        }
    }

    pub fn owned_by(mut self, user: &str, group: &str) -> Self {
        self.user = user.to_string();
        self.group = group.to_string();
        self
    }

    pub fn with_mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }

    pub fn identity(&self) -> String {
        format!("file:{}", self.path.display())
    }

    pub fn description(&self) -> String {
        match self.ensure {
            FileEnsure::Present => format!(
                "Ensure {} ({}:{} {})",
                self.path.display(),
                self.user,
                self.group,
                self.mode
            ),
            FileEnsure::Absent => format!("Remove {}", self.path.display()),
        }
    }

    pub fn changed(&self) -> bool {
        self.changed.get()
    }

    /// Parse the declared permission mode
    ///
    /// Only octal digits are accepted and the value must fit in 0o7777.
    pub fn mode_bits(&self) -> Result<u32> {
        let invalid = || Error::InvalidMode {
            path: self.path.clone(),
            mode: self.mode.clone(),
        };

        if self.mode.is_empty() || !self.mode.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(invalid());
        }
        let bits = u32::from_str_radix(&self.mode, 8).map_err(|_| invalid())?;
        if bits > 0o7777 {
            return Err(invalid());
        }
        Ok(bits)
    }

    pub(crate) fn converge(&self, ctx: &ApplyContext) -> Result<ApplyResult> {
        if self.ensure == FileEnsure::Absent {
            return self.remove();
        }

        // Everything that can be rejected is resolved before touching the file.
        let mode = self.mode_bits()?;
        let (uid, gid) = self.resolve_owner(ctx.accounts)?;

        let desired = blake3::hash(self.contents.as_bytes());
        let result = match self.current_digest()? {
            Some(actual) if actual == desired => {
                debug!("{}: contents up to date", self.identity());
                ApplyResult::NoChange
            }
            actual => {
                self.write_contents(mode)?;
                self.changed.set(true);
                if actual.is_some() {
                    ApplyResult::Modified
                } else {
                    ApplyResult::Created
                }
            }
        };

        // Ownership and permissions are re-asserted on every run.
        self.enforce_metadata(uid, gid, mode)?;

        Ok(result)
    }

    fn remove(&self) -> Result<ApplyResult> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                self.changed.set(true);
                Ok(ApplyResult::Removed)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ApplyResult::NoChange),
            Err(e) => Err(Error::io("remove", &self.path, e)),
        }
    }

    fn resolve_owner(&self, accounts: &dyn AccountDatabase) -> Result<(u32, u32)> {
        let uid = accounts
            .user_id(&self.user)?
            .ok_or_else(|| Error::UnknownUser {
                path: self.path.clone(),
                user: self.user.clone(),
            })?;
        let gid = accounts
            .group_id(&self.group)?
            .ok_or_else(|| Error::UnknownGroup {
                path: self.path.clone(),
                group: self.group.clone(),
            })?;
        Ok((uid, gid))
    }

    /// Digest of the file on disk, `None` if it does not exist
    fn current_digest(&self) -> Result<Option<blake3::Hash>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io("open file", &self.path, e)),
        };

        let mut hasher = blake3::Hasher::new();
        io::copy(&mut file, &mut hasher).map_err(|e| Error::io("read file", &self.path, e))?;
        Ok(Some(hasher.finalize()))
    }

    fn write_contents(&self, mode: u32) -> Result<()> {
        debug!("{}: writing {} bytes", self.identity(), self.contents.len());
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(mode)
            .open(&self.path)
            .map_err(|e| Error::io("create file", &self.path, e))?;

        file.write_all(self.contents.as_bytes())
            .map_err(|e| Error::io("write contents to file", &self.path, e))
    }

    fn enforce_metadata(&self, uid: u32, gid: u32, mode: u32) -> Result<()> {
        chown(&self.path, uid, gid)?;
        fs::set_permissions(&self.path, Permissions::from_mode(mode))
            .map_err(|e| Error::io("modify permissions for file", &self.path, e))
    }

    #[cfg(test)]
    pub(crate) fn set_changed(&self, changed: bool) {
        self.changed.set(changed);
    }
}

fn chown(path: &Path, uid: u32, gid: u32) -> Result<()> {
    use nix::unistd::{Gid, Uid};

    nix::unistd::chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid))).map_err(
        |source| Error::Ownership {
            path: path.to_path_buf(),
            source,
        },
    )
}
