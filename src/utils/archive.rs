//! Zip creation and extraction helpers.
//!
//! Both operations are blocking; async callers wrap them in
//! `tokio::task::spawn_blocking`. Creation walks the tree with
//! `walkdir` and stores entries under the source directory's own name,
//! so extracting the archive reproduces the directory as a sibling of
//! the archive (the same shape `zip -r backup.zip Writing3D` would
//! produce).

use anyhow::{Context, Result};
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Recursively compress `source` into a zip archive at `dest`.
///
/// Entry names are prefixed with the final component of `source`.
/// Symlinks and other special files are skipped; on Unix, file modes
/// are preserved so executable scripts survive a restore.
///
/// # Errors
///
/// Fails if the tree cannot be read or the archive cannot be written.
pub fn zip_dir(source: &Path, dest: &Path) -> Result<()> {
    let prefix = source
        .file_name()
        .with_context(|| format!("Cannot archive a path with no name: {}", source.display()))?;

    let file = File::create(dest)
        .with_context(|| format!("Failed to create archive: {}", dest.display()))?;
    let mut writer = ZipWriter::new(file);

    for entry in WalkDir::new(source) {
        let entry = entry.context("Failed to walk directory tree")?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .expect("walkdir yields paths under its root");
        let name = Path::new(prefix).join(relative);
        let name = name.to_string_lossy().replace('\\', "/");

        let mut options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(entry.metadata()?.permissions().mode());
        }

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
        } else if entry.file_type().is_file() {
            writer.start_file(name, options)?;
            let mut contents = File::open(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            io::copy(&mut contents, &mut writer)?;
        }
        // symlinks and special files are not archived
    }

    writer.finish().context("Failed to finalize archive")?;
    Ok(())
}

/// Extract a zip archive into `target`, preserving its internal layout.
///
/// # Errors
///
/// Fails if the archive is unreadable, malformed, or cannot be written
/// out (the zip crate also rejects entries that would escape `target`).
pub fn extract_zip(archive_path: &Path, target: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Not a valid zip archive: {}", archive_path.display()))?;
    archive
        .extract(target)
        .with_context(|| format!("Failed to extract archive into {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn build_tree(root: &Path) {
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("top.txt"), "top contents").unwrap();
        fs::write(root.join("sub").join("nested.txt"), "nested contents").unwrap();
    }

    #[test]
    fn zip_dir_then_extract_reproduces_tree() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("payload");
        build_tree(&source);

        let archive = dir.path().join("payload.zip");
        zip_dir(&source, &archive).unwrap();
        assert!(archive.exists());

        let out = dir.path().join("out");
        extract_zip(&archive, &out).unwrap();

        // The archive carries the source directory name as its top entry.
        assert_eq!(
            fs::read_to_string(out.join("payload").join("top.txt")).unwrap(),
            "top contents"
        );
        assert_eq!(
            fs::read_to_string(out.join("payload").join("sub").join("nested.txt")).unwrap(),
            "nested contents"
        );
    }

    #[test]
    fn zip_dir_fails_for_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("x.zip");
        assert!(zip_dir(&dir.path().join("missing"), &archive).is_err());
    }

    #[test]
    fn extract_zip_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.zip");
        fs::write(&bogus, "not a zip").unwrap();
        assert!(extract_zip(&bogus, dir.path()).is_err());
    }
}
