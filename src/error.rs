//! # Error Handling
//!
//! This module defines the centralized error type for the `submanifest`
//! library. It uses the `thiserror` library to create an `Error` enum that
//! covers every anticipated failure mode, with enough context (entry name,
//! working-copy path, target reference) to report a failure without consulting
//! any other state.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The first group of variants are the domain
//!   failures of the resolver and synchronizer (`UnresolvableEntry`,
//!   `NotInitialized`, `CheckoutFailed`, `TagAlreadyExists`, `ManifestParse`,
//!   `BackendUnavailable`). The rest are wrappers around lower level failures.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Batch operations (`sync::synchronize_all`, `sync::capture_state`) do not
//! return these errors directly: they record one per failed entry in their
//! report and carry on with the next entry.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for submanifest operations
#[derive(Error, Debug)]
pub enum Error {
    /// The entry declares none of `tag`, `branch` or `commit`.
    #[error("Submodule '{name}' has no tag, branch or commit to check out")]
    UnresolvableEntry { name: String },

    /// The working copy does not exist or is not a git repository.
    #[error("Submodule working copy at {} is not initialized", path.display())]
    NotInitialized { path: PathBuf },

    /// A fetch or checkout against the working copy failed.
    #[error("Checkout of '{target}' failed in {}: {message}", path.display())]
    CheckoutFailed {
        path: PathBuf,
        target: String,
        message: String,
    },

    /// The tag a bump would create is already present in the working copy.
    #[error("Tag {tag} already exists in {}", path.display())]
    TagAlreadyExists { tag: String, path: PathBuf },

    /// The manifest could not be parsed or failed validation.
    #[error("Manifest parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestParse {
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// Two manifest entries point at the same working copy.
    #[error("Submodules '{first}' and '{second}' share the path {path}")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    /// A name given on the command line is not present in the manifest.
    #[error("No submodule named '{name}' in the manifest")]
    UnknownEntry { name: String },

    /// An entry with this name is already tracked.
    #[error("Submodule '{name}' is already in the manifest")]
    EntryExists { name: String },

    /// The version-control tool could not be executed at all.
    #[error("Version-control backend unavailable: {tool} - {message}")]
    BackendUnavailable { tool: String, message: String },

    /// A git invocation ran but exited unsuccessfully.
    #[error("Git command failed in {}: {command} - {stderr}", path.display())]
    GitCommand {
        command: String,
        path: PathBuf,
        stderr: String,
    },

    /// A version could not be computed, e.g. a bump past the largest value.
    #[error("Invalid version '{value}': {message}")]
    InvalidVersion { value: String, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short, stable label for the error kind, used in failure summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnresolvableEntry { .. } => "unresolvable",
            Error::NotInitialized { .. } => "not-initialized",
            Error::CheckoutFailed { .. } => "checkout-failed",
            Error::TagAlreadyExists { .. } => "tag-exists",
            Error::ManifestParse { .. } => "manifest-parse",
            Error::DuplicatePath { .. } => "duplicate-path",
            Error::UnknownEntry { .. } => "unknown-entry",
            Error::EntryExists { .. } => "entry-exists",
            Error::BackendUnavailable { .. } => "backend-unavailable",
            Error::GitCommand { .. } => "git",
            Error::InvalidVersion { .. } => "invalid-version",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
