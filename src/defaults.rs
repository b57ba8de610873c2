//! Default values for submanifest.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Manifest file looked up when `--manifest` is not given.
pub const DEFAULT_MANIFEST_FILENAME: &str = "submodules.json";

/// Environment variable that overrides the manifest location.
pub const MANIFEST_ENV: &str = "SUBMANIFEST_FILE";

/// Remote used for fetching and pushing.
pub const DEFAULT_REMOTE: &str = "origin";

/// Glob passed to `git tag --list` when looking for version tags.
pub const VERSION_TAG_PATTERN: &str = "v*";

/// Returns the parent repository root for a manifest file: the directory
/// that contains it, or `.` for a bare file name.
pub fn default_root_for(manifest_path: &Path) -> PathBuf {
    manifest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
