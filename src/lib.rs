//! # Submanifest Library
//!
//! This library pins git submodules to versions recorded in a JSON manifest.
//! It is designed to be used by the `submanifest` command-line tool but can
//! also drive submodules from other programs or test harnesses, since every
//! interaction with git goes through a replaceable backend.
//!
//! ## Quick Example
//!
//! ```
//! use submanifest::manifest;
//! use submanifest::resolve::{resolve, RefKind};
//!
//! let json = r#"{
//!   "last_updated": "2024-05-01T12:00:00Z",
//!   "submodules": {
//!     "libfoo": {
//!       "path": "vendor/libfoo",
//!       "url": "https://example.com/libfoo.git",
//!       "tag": null,
//!       "branch": "main",
//!       "commit": "0123abc",
//!       "description": "Foo support library"
//!     }
//!   }
//! }"#;
//!
//! let manifest = manifest::parse(json).unwrap();
//! let entry = manifest.entry("libfoo").unwrap();
//!
//! // A branch outranks a commit.
//! let target = resolve("libfoo", entry).unwrap();
//! assert_eq!(target.kind, RefKind::Branch);
//! assert_eq!(target.value, "main");
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: The JSON document listing every tracked
//!   submodule, its path and origin, and the tag, branch or commit it should
//!   be at. Saved atomically.
//! - **Resolution (`resolve`)**: Picks the one reference to check out for an
//!   entry: tag, then branch, then commit.
//! - **Backend (`backend`, `git`)**: The `VcsBackend` trait and its
//!   implementation on top of the system `git` binary.
//! - **Synchronization (`sync`)**: Checks out every entry, captures current
//!   commits back into the manifest, initializes missing working copies and
//!   reports drift. One entry's failure never stops the others.
//! - **Versions (`version`, `bump`)**: Version-aware tag ordering and the
//!   major/minor/fix bump that creates a new annotated tag.

pub mod backend;
pub mod bump;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod manifest;
pub mod output;
pub mod resolve;
pub mod sync;
pub mod version;

#[cfg(test)]
mod version_proptest;
