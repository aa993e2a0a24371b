//! Writing3D self-updater.
//!
//! A small CLI that updates the Writing3D installation it lives inside.
//! The updater locates its own binary (following symlink chains to the
//! real file), derives the installation layout from that location, and
//! then updates the distribution directory with one of two strategies:
//!
//! - **git**: when a git client is on PATH, record the current revision
//!   to a rollback marker, fetch `origin`, and hard-reset the working
//!   copy to `origin/<branch>`.
//! - **archive**: otherwise, zip the current tree as a backup, download
//!   a zip snapshot of the upstream branch, extract it, and swap it
//!   into place.
//!
//! Strategy selection is purely a question of tool availability; the
//! absence of git is the fallback signal, not an error.
//!
//! # On-disk contract
//!
//! With the updater resolved to `<dist>/extras/updater/w3d-update`
//! inside an installation rooted at `<root>`:
//!
//! - `<root>/Writing3D` - the distribution directory being updated
//! - `<dist>/extras/last_good.txt` - rollback marker (git strategy)
//! - `<root>/last_good.zip` - backup archive (archive strategy)
//! - `<root>/Writing3D.zip` - transient snapshot download, removed
//!   after a successful update
//!
//! # Usage constraint
//!
//! The distribution directory is shared mutable state with no locking.
//! Concurrent updater runs against the same installation interleave
//! resets and directory swaps unpredictably and are unsupported.
//!
//! # Modules
//!
//! - [`cli`] - clap command definitions and orchestration
//! - [`location`] - self-location and layout derivation
//! - [`update`] - the dual-strategy update engine
//! - [`git`] - wrapper over the system git command
//! - [`core`] - error taxonomy and user-facing error display
//! - [`utils`] - platform probes and zip helpers
//! - [`constants`] - fixed names, URLs, and timeouts

pub mod cli;
pub mod constants;
pub mod core;
pub mod git;
pub mod location;
pub mod update;
pub mod utils;
