//! Per-job temporary directory management.
//!
//! Each pipeline job gets its own subdirectory under a configured root so
//! that two jobs can never collide on the fixed input/output filenames.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, WorkspaceError};

/// A job-scoped temporary directory plus the set of paths it handed out.
///
/// The workspace tracks every child path it allocated so `purge` can remove
/// exactly what this job created, tolerating files that were never written
/// or were already removed.
#[derive(Debug)]
pub struct Workspace {
    dir: PathBuf,
    job_id: Uuid,
    tracked: Vec<PathBuf>,
}

impl Workspace {
    /// Create a workspace directory for a fresh job under `root`.
    ///
    /// Creating an already-existing directory is treated as success, so
    /// re-running `create` against the same root is safe.
    pub fn create<P: AsRef<Path>>(root: P) -> Result<Self> {
        let job_id = Uuid::new_v4();
        let dir = root.as_ref().join(format!("job-{}", job_id));

        std::fs::create_dir_all(&dir).map_err(|e| WorkspaceError::CreateFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!("Created workspace {}", dir.display());
        Ok(Self {
            dir,
            job_id,
            tracked: Vec::new(),
        })
    }

    /// The job identifier this workspace was allocated for
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// The workspace directory itself
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return (and track) a child path. Does not touch the filesystem.
    pub fn path_for(&mut self, name: &str) -> PathBuf {
        let path = self.dir.join(name);
        if !self.tracked.contains(&path) {
            self.tracked.push(path.clone());
        }
        path
    }

    /// Paths handed out by this workspace that still exist on disk
    pub fn remaining_files(&self) -> Vec<PathBuf> {
        self.tracked.iter().filter(|p| p.exists()).cloned().collect()
    }

    /// Remove a single file, treating "already absent" as success
    pub fn remove(&self, path: &Path) -> Result<()> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WorkspaceError::RemoveFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// Remove every file this workspace created, then the directory itself.
    ///
    /// Partial absence is tolerated; calling purge twice is a no-op. The
    /// directory removal is best-effort since a collaborator may still hold
    /// a handle inside it.
    pub fn purge(&mut self) {
        // Paths that fail to delete stay tracked so remaining_files() can
        // report them in the failure report.
        self.tracked.retain(|path| match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Purged {}", path.display());
                false
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!("Could not purge {}: {}", path.display(), e);
                true
            }
        });

        match std::fs::remove_dir(&self.dir) {
            Ok(()) => debug!("Removed workspace {}", self.dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove workspace {}: {}", self.dir.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_allocates_unique_job_dirs() {
        let root = tempdir().unwrap();

        let a = Workspace::create(root.path()).unwrap();
        let b = Workspace::create(root.path()).unwrap();

        assert!(a.dir().exists());
        assert!(b.dir().exists());
        assert_ne!(a.dir(), b.dir());
    }

    #[test]
    fn test_path_for_does_not_touch_filesystem() {
        let root = tempdir().unwrap();
        let mut ws = Workspace::create(root.path()).unwrap();

        let path = ws.path_for("temp_video.mp4");
        assert!(!path.exists());
        assert_eq!(path.parent().unwrap(), ws.dir());
    }

    #[test]
    fn test_remove_tolerates_absent_file() {
        let root = tempdir().unwrap();
        let mut ws = Workspace::create(root.path()).unwrap();

        let path = ws.path_for("never_written.bin");
        assert!(ws.remove(&path).is_ok());
    }

    #[test]
    fn test_purge_removes_created_files_and_dir() {
        let root = tempdir().unwrap();
        let mut ws = Workspace::create(root.path()).unwrap();

        let a = ws.path_for("a.bin");
        let b = ws.path_for("b.bin");
        std::fs::write(&a, b"aaaa").unwrap();
        std::fs::write(&b, b"bbbb").unwrap();
        let dir = ws.dir().to_path_buf();

        ws.purge();

        assert!(!a.exists());
        assert!(!b.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_double_purge_is_noop() {
        let root = tempdir().unwrap();
        let mut ws = Workspace::create(root.path()).unwrap();

        let file = ws.path_for("a.bin");
        std::fs::write(&file, b"data").unwrap();

        ws.purge();
        ws.purge();
        assert!(!file.exists());
    }

    #[test]
    fn test_remaining_files_reports_only_existing() {
        let root = tempdir().unwrap();
        let mut ws = Workspace::create(root.path()).unwrap();

        let written = ws.path_for("written.bin");
        let _phantom = ws.path_for("phantom.bin");
        std::fs::write(&written, b"data").unwrap();

        let remaining = ws.remaining_files();
        assert_eq!(remaining, vec![written]);
    }
}
