//! Global constants used throughout the updater.
//!
//! Fixed file names, remote locations, and timeout durations live here
//! so the on-disk contract of the updater is discoverable in one place.

use std::time::Duration;

/// Canonical name of the distribution directory being updated.
///
/// The directory sits directly under the installation root and must
/// exist before an update starts. Both strategies replace its contents
/// in place under this exact name.
pub const DIST_DIR_NAME: &str = "Writing3D";

/// File name of the rollback marker written before a git update.
///
/// Written one level above the updater's own directory. Contains a
/// single line: the pre-update commit hash. External rollback tooling
/// consumes it; this crate only ever writes it.
pub const ROLLBACK_MARKER_FILE: &str = "last_good.txt";

/// File name of the backup archive created before an archive update.
pub const BACKUP_ARCHIVE_FILE: &str = "last_good.zip";

/// File name of the transient snapshot download target.
pub const DOWNLOAD_FILE: &str = "Writing3D.zip";

/// Branch tracked on the remote when none is given on the command line.
pub const DEFAULT_BRANCH: &str = "master";

/// Name of the remote the git strategy fetches from.
pub const REMOTE_NAME: &str = "origin";

/// Upstream repository for the distribution.
pub const REMOTE_URL: &str = "https://github.com/wphicks/Writing3D.git";

/// URL of the zipped snapshot of `branch`, used by the archive strategy.
pub fn snapshot_url(branch: &str) -> String {
    format!("https://github.com/wphicks/Writing3D/archive/{branch}.zip")
}

/// Default timeout for git commands (5 minutes).
pub const GIT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for git fetch operations (60 seconds).
///
/// Prevents a hung network connection from blocking the update
/// indefinitely.
pub const GIT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Overall timeout for the snapshot download (10 minutes).
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Maximum symlink hops followed while resolving the updater's own path.
///
/// Mirrors the kernel's ELOOP limit; a chain longer than this is
/// treated as a cycle.
pub const SYMLINK_HOP_LIMIT: usize = 40;

/// Environment variable that disables progress bars when set.
pub const NO_PROGRESS_ENV: &str = "W3D_UPDATE_NO_PROGRESS";
