//! End-to-end tests for the archive update strategy, served from a
//! loopback HTTP fixture.

mod common;

use assert_cmd::Command;
use common::{InstallFixture, refused_url, serve_file};
use predicates::prelude::*;
use tempfile::TempDir;
use w3d_updater::utils::archive::{extract_zip, zip_dir};

fn updater() -> Command {
    Command::cargo_bin("w3d-update").expect("binary builds")
}

/// Zip a fake snapshot tree named `Writing3D-master` and return the
/// temp dir holding it plus the archive path.
fn build_snapshot() -> (TempDir, std::path::PathBuf) {
    let staging = TempDir::new().unwrap();
    let tree = staging.path().join("Writing3D-master");
    std::fs::create_dir_all(tree.join("pyw3d")).unwrap();
    std::fs::write(tree.join("pyw3d").join("core.py"), "print('new')").unwrap();
    std::fs::write(tree.join("README.md"), "snapshot readme").unwrap();

    let archive = staging.path().join("snapshot.zip");
    zip_dir(&tree, &archive).unwrap();
    (staging, archive)
}

#[test]
fn snapshot_replaces_distribution_and_keeps_backup() {
    let fixture = InstallFixture::new(true).unwrap();
    std::fs::write(fixture.dist.join("old.txt"), "old contents").unwrap();

    let (_staging, archive) = build_snapshot();
    let url = serve_file(&archive).unwrap();

    updater()
        .args(["update", "--strategy", "archive", "--archive-url", &url])
        .arg("--script-path")
        .arg(&fixture.script_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("snapshot"));

    // New tree under the canonical name, old contents gone.
    assert_eq!(
        std::fs::read_to_string(fixture.dist.join("pyw3d").join("core.py")).unwrap(),
        "print('new')"
    );
    assert!(!fixture.dist.join("old.txt").exists());
    assert!(!fixture.root.join("Writing3D-master").exists());

    // The downloaded zip was cleaned up; the backup was not.
    assert!(!fixture.root.join("Writing3D.zip").exists());
    let backup = fixture.root.join("last_good.zip");
    assert!(backup.exists());

    // The backup archive restores the pre-update tree.
    let restore = TempDir::new().unwrap();
    extract_zip(&backup, restore.path()).unwrap();
    assert_eq!(
        std::fs::read_to_string(restore.path().join("Writing3D").join("old.txt")).unwrap(),
        "old contents"
    );
}

#[test]
fn no_backup_flag_skips_the_backup_archive() {
    let fixture = InstallFixture::new(true).unwrap();
    let (_staging, archive) = build_snapshot();
    let url = serve_file(&archive).unwrap();

    updater()
        .args([
            "update",
            "--strategy",
            "archive",
            "--no-backup",
            "--archive-url",
            &url,
        ])
        .arg("--script-path")
        .arg(&fixture.script_path)
        .assert()
        .success();

    assert!(!fixture.root.join("last_good.zip").exists());
    assert!(fixture.dist.join("README.md").exists());
}

#[test]
fn failed_download_leaves_distribution_untouched() {
    let fixture = InstallFixture::new(true).unwrap();
    std::fs::write(fixture.dist.join("old.txt"), "old contents").unwrap();

    updater()
        .args(["update", "--strategy", "archive", "--archive-url"])
        .arg(refused_url())
        .arg("--script-path")
        .arg(&fixture.script_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("download"));

    // The old tree is exactly as it was and no partial download remains.
    assert_eq!(
        std::fs::read_to_string(fixture.dist.join("old.txt")).unwrap(),
        "old contents"
    );
    assert!(fixture.script_path.exists());
    assert!(!fixture.root.join("Writing3D.zip").exists());
}

#[test]
fn garbage_snapshot_fails_before_touching_the_old_tree() {
    let fixture = InstallFixture::new(true).unwrap();
    std::fs::write(fixture.dist.join("old.txt"), "old contents").unwrap();

    // Serve something that is not a zip archive.
    let staging = TempDir::new().unwrap();
    let bogus = staging.path().join("bogus.zip");
    std::fs::write(&bogus, "this is not a zip").unwrap();
    let url = serve_file(&bogus).unwrap();

    updater()
        .args(["update", "--strategy", "archive", "--archive-url", &url])
        .arg("--script-path")
        .arg(&fixture.script_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("extracting"));

    // Extraction failed, so the removal step never ran.
    assert_eq!(
        std::fs::read_to_string(fixture.dist.join("old.txt")).unwrap(),
        "old contents"
    );
}
