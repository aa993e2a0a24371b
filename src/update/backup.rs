//! Backup of the distribution directory before an archive update.
//!
//! The backup is a zip of the full tree, written next to the
//! installation root. It is created before any destructive step and
//! never deleted by the updater; restoring from it is a manual
//! operation (unzip over the root).

use crate::utils::archive::zip_dir;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Creates zip backups of a directory tree.
///
/// # Examples
///
/// ```rust,no_run
/// use w3d_updater::update::backup::BackupManager;
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let manager = BackupManager::new(
///     PathBuf::from("/opt/Writing3D"),
///     PathBuf::from("/opt/last_good.zip"),
/// );
/// manager.create_backup().await?;
/// # Ok(())
/// # }
/// ```
pub struct BackupManager {
    /// The directory tree being backed up.
    source_dir: PathBuf,
    /// Where the zip archive is written.
    backup_path: PathBuf,
}

impl BackupManager {
    /// Create a manager for the given source tree and archive path.
    pub fn new(source_dir: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            backup_path: backup_path.into(),
        }
    }

    /// Compress the source tree into the backup archive.
    ///
    /// Replaces any previous backup at the same path. The zip work is
    /// blocking and runs on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Fails if the source tree is missing or unreadable, or the
    /// archive cannot be written. Callers in the archive pipeline treat
    /// this as a warning, not a fatal error.
    pub async fn create_backup(&self) -> Result<()> {
        if !self.source_dir.is_dir() {
            bail!(
                "Backup source does not exist: {}",
                self.source_dir.display()
            );
        }

        if self.backup_path.exists() {
            debug!(path = %self.backup_path.display(), "replacing previous backup");
            tokio::fs::remove_file(&self.backup_path)
                .await
                .context("Failed to remove previous backup")?;
        }

        info!(
            source = %self.source_dir.display(),
            backup = %self.backup_path.display(),
            "creating backup archive"
        );

        let source = self.source_dir.clone();
        let dest = self.backup_path.clone();
        tokio::task::spawn_blocking(move || zip_dir(&source, &dest))
            .await
            .context("Backup task panicked")??;

        Ok(())
    }

    /// Whether a backup archive currently exists.
    #[must_use]
    pub fn backup_exists(&self) -> bool {
        self.backup_path.exists()
    }

    /// The path the backup archive is written to.
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn backup_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("Writing3D");
        std::fs::create_dir_all(tree.join("pyw3d")).unwrap();
        std::fs::write(tree.join("pyw3d").join("core.py"), "print('w3d')").unwrap();

        let manager = BackupManager::new(&tree, dir.path().join("last_good.zip"));
        assert!(!manager.backup_exists());

        manager.create_backup().await.unwrap();
        assert!(manager.backup_exists());

        // A second backup replaces the first.
        manager.create_backup().await.unwrap();
        assert!(manager.backup_exists());
    }

    #[tokio::test]
    async fn backup_of_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let manager = BackupManager::new(dir.path().join("gone"), dir.path().join("b.zip"));
        assert!(manager.create_backup().await.is_err());
    }
}
