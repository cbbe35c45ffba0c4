//! Audio output ownership
//!
//! Only one process may drive the music output at a time. Backends decide how
//! that ownership is negotiated; callers only see `request`/`abandon`.

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("Ownership backend unavailable: {0}")]
    Unavailable(String),

    #[error("Lock failed: {0}")]
    Lock(#[from] Errno),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of an ownership request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusGrant {
    Granted,
    Denied,
}

/// Exclusive, revocable ownership of the audio output.
///
/// `abandon` must be safe to call when nothing is held.
pub trait ResourceOwnership {
    fn request(&mut self) -> Result<FocusGrant, OwnershipError>;

    fn abandon(&mut self);
}

/// Backend for hosts where nothing competes for the output
#[derive(Debug, Default)]
pub struct UncontendedOwnership;

impl ResourceOwnership for UncontendedOwnership {
    fn request(&mut self) -> Result<FocusGrant, OwnershipError> {
        Ok(FocusGrant::Granted)
    }

    fn abandon(&mut self) {}
}

/// Ownership negotiated through an exclusive `flock` on a shared lock file.
///
/// Any other process holding the lock makes `request` return `Denied`.
pub struct LockFileOwnership {
    path: PathBuf,
    lock: Option<Flock<File>>,
}

impl LockFileOwnership {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: None,
        }
    }

    /// Check whether this process currently holds the lock
    pub fn is_held(&self) -> bool {
        self.lock.is_some()
    }
}

impl ResourceOwnership for LockFileOwnership {
    fn request(&mut self) -> Result<FocusGrant, OwnershipError> {
        if self.lock.is_some() {
            return Ok(FocusGrant::Granted);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.path)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => {
                tracing::debug!("Acquired audio lock {}", self.path.display());
                self.lock = Some(lock);
                Ok(FocusGrant::Granted)
            }
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                tracing::debug!("Audio lock {} held elsewhere", self.path.display());
                Ok(FocusGrant::Denied)
            }
            Err((_, errno)) => Err(OwnershipError::Lock(errno)),
        }
    }

    fn abandon(&mut self) {
        // Dropping the guard unlocks
        if self.lock.take().is_some() {
            tracing::debug!("Released audio lock {}", self.path.display());
        }
    }
}
