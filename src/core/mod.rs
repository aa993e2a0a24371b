//! Core types shared across the updater.
//!
//! Currently this is the error module: the [`UpdaterError`] taxonomy,
//! the [`ErrorContext`] wrapper used for terminal display, and the
//! [`user_friendly_error`] conversion applied at the binary boundary.

pub mod error;

pub use error::{ErrorContext, UpdaterError, user_friendly_error};
