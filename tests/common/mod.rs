//! Common fixtures for updater integration tests.
//!
//! Builds throwaway installation trees and local git origins so the
//! scenarios can drive the real binary end to end without network
//! access.

// Not every helper is used by every test file.
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Git command runner for building test repositories.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    /// Create a runner for the given repository path.
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| format!("Failed to run git {args:?}"))?;
        if !output.status.success() {
            anyhow::bail!(
                "git {:?} failed: {}",
                args,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Initialize a repository with a `master` branch and test identity.
    pub fn init(&self) -> Result<()> {
        self.run(&["init", "--initial-branch=master"])?;
        self.run(&["config", "user.email", "test@w3d.example"])?;
        self.run(&["config", "user.name", "Test User"])?;
        Ok(())
    }

    /// Stage everything and commit.
    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.run(&["add", "."])?;
        self.run(&["commit", "-m", message])?;
        Ok(())
    }

    /// Current HEAD commit hash.
    pub fn head(&self) -> Result<String> {
        self.run(&["rev-parse", "HEAD"])
    }

    /// Point the `origin` remote at a new location.
    pub fn set_origin(&self, url: &str) -> Result<()> {
        self.run(&["remote", "set-url", "origin", url])?;
        Ok(())
    }
}

/// Clone `source` into `target` with the test git binary.
pub fn git_clone(source: &Path, target: &Path) -> Result<()> {
    let output = Command::new("git")
        .arg("clone")
        .arg(source)
        .arg(target)
        .output()
        .context("Failed to run git clone")?;
    if !output.status.success() {
        anyhow::bail!(
            "git clone failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}

/// A throwaway installation tree.
///
/// Creates `<root>/Writing3D/extras/updater/update` so `--script-path`
/// resolves three levels below the distribution directory and the
/// derived root is the temp dir itself.
pub struct InstallFixture {
    pub temp: TempDir,
    pub root: PathBuf,
    pub dist: PathBuf,
    pub script_path: PathBuf,
    pub marker_path: PathBuf,
}

impl InstallFixture {
    /// Build the tree, optionally creating the distribution directory.
    pub fn new(create_dist: bool) -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        let root = temp.path().to_path_buf();
        let dist = root.join("Writing3D");
        let script_dir = dist.join("extras").join("updater");
        if create_dist {
            std::fs::create_dir_all(&script_dir)?;
            std::fs::write(script_dir.join("update"), "placeholder\n")?;
        }

        Ok(Self {
            marker_path: dist.join("extras").join("last_good.txt"),
            script_path: script_dir.join("update"),
            dist,
            root,
            temp,
        })
    }

    /// Populate the script directory after the distribution directory
    /// appeared some other way (e.g. via `git clone`).
    pub fn place_script(&self) -> Result<()> {
        let script_dir = self.script_path.parent().unwrap();
        std::fs::create_dir_all(script_dir)?;
        std::fs::write(&self.script_path, "placeholder\n")?;
        Ok(())
    }

    /// Contents of the rollback marker, if present.
    pub fn marker_contents(&self) -> Option<String> {
        std::fs::read_to_string(&self.marker_path).ok()
    }
}

/// Serve one file over loopback HTTP, answering every request with its
/// contents until the listener is dropped.
///
/// Returns the URL to fetch. The background thread exits when the
/// process does; tests do not need to join it.
pub fn serve_file(path: &Path) -> Result<String> {
    let body = std::fs::read(path).context("Failed to read file to serve")?;
    let listener = TcpListener::bind("127.0.0.1:0").context("Failed to bind loopback")?;
    let addr = listener.local_addr()?;

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            // Drain the request headers before responding.
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/zip\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(&body);
        }
    });

    Ok(format!("http://{addr}/master.zip"))
}

/// A URL that reliably refuses connections (nothing listens there).
pub fn refused_url() -> String {
    // Bind a port, learn its number, and drop the listener so a
    // connection attempt is refused.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/master.zip")
}
