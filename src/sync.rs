//! # Manifest Synchronization
//!
//! This module applies a manifest to the working copies it describes, and
//! records the working copies' observed state back into the manifest.
//!
//! ## Operations
//!
//! - [`checkout`]: bring one working copy to a resolved reference.
//! - [`synchronize_all`]: resolve and check out every entry.
//! - [`capture_state`]: write each working copy's current commit into its
//!   entry's `commit` field.
//! - [`initialize_missing`]: create working copies that do not exist yet.
//! - [`status`]: compare each working copy with its declared reference.
//!
//! Entries are processed one at a time in manifest order. Batch operations
//! never stop at the first failure: each entry's outcome is recorded in a
//! report, and the report says whether everything succeeded.

use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::backend::VcsBackend;
use crate::error::{Error, Result};
use crate::manifest::{Manifest, SubmoduleEntry};
use crate::resolve::{resolve, RefKind, ResolvedRef};

/// Bring the working copy at `path` to `resolved`.
///
/// Checking out the reference the working copy is already at succeeds.
pub fn checkout(backend: &dyn VcsBackend, path: &Path, resolved: &ResolvedRef) -> Result<()> {
    if !backend.is_initialized(path) {
        return Err(Error::NotInitialized {
            path: path.to_path_buf(),
        });
    }

    let fetched = match resolved.kind {
        RefKind::Tag => backend.fetch_tags(path),
        RefKind::Branch => backend.fetch_branch(path, &resolved.value),
        RefKind::Commit => backend.fetch_all(path),
    };

    fetched
        .and_then(|_| backend.checkout_ref(path, resolved.kind, &resolved.value))
        .map_err(|e| Error::CheckoutFailed {
            path: path.to_path_buf(),
            target: resolved.value.clone(),
            message: e.to_string(),
        })
}

/// Outcome of synchronizing one entry.
#[derive(Debug)]
pub enum SyncOutcome {
    CheckedOut(ResolvedRef),
    Failed(Error),
}

/// One line of a [`SyncReport`].
#[derive(Debug)]
pub struct SyncEntry {
    pub name: String,
    pub path: String,
    pub outcome: SyncOutcome,
}

/// Per-entry outcomes of [`synchronize_all`].
#[derive(Debug, Default)]
pub struct SyncReport {
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    /// True when every entry was checked out.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Entries that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            SyncOutcome::Failed(err) => Some((e.name.as_str(), err)),
            SyncOutcome::CheckedOut(_) => None,
        })
    }

    pub fn succeeded(&self) -> usize {
        self.entries.len() - self.failures().count()
    }
}

/// Resolve and check out every entry of `manifest`.
pub fn synchronize_all(backend: &dyn VcsBackend, manifest: &Manifest) -> SyncReport {
    let entries = manifest.submodules.iter().map(|(n, e)| (n.as_str(), e));
    synchronize_entries(backend, entries)
}

/// Like [`synchronize_all`], restricted to `names`. Unknown names fail
/// before anything is checked out.
pub fn synchronize_selected(
    backend: &dyn VcsBackend,
    manifest: &Manifest,
    names: &[String],
) -> Result<SyncReport> {
    let entries = select(manifest, names)?;
    Ok(synchronize_entries(backend, entries.into_iter()))
}

fn synchronize_entries<'a>(
    backend: &dyn VcsBackend,
    entries: impl Iterator<Item = (&'a str, &'a SubmoduleEntry)>,
) -> SyncReport {
    let mut report = SyncReport::default();

    for (name, entry) in entries {
        let outcome = match resolve(name, entry)
            .and_then(|r| checkout(backend, Path::new(&entry.path), &r).map(|_| r))
        {
            Ok(resolved) => {
                info!("{}: checked out {}", name, resolved);
                SyncOutcome::CheckedOut(resolved)
            }
            Err(e) => {
                warn!("{}: {}", name, e);
                SyncOutcome::Failed(e)
            }
        };

        report.entries.push(SyncEntry {
            name: name.to_string(),
            path: entry.path.clone(),
            outcome,
        });
    }

    report
}

/// Outcome of capturing one entry.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// The current commit was written into the entry.
    Recorded {
        previous: Option<String>,
        commit: String,
    },
    /// The working copy does not exist; the entry was left alone.
    Skipped,
    Failed(Error),
}

/// One line of a [`CaptureReport`].
#[derive(Debug)]
pub struct CaptureEntry {
    pub name: String,
    pub outcome: CaptureOutcome,
}

impl CaptureEntry {
    /// True when the recorded commit differs from the previous value.
    pub fn changed(&self) -> bool {
        matches!(
            &self.outcome,
            CaptureOutcome::Recorded { previous, commit } if previous.as_deref() != Some(commit.as_str())
        )
    }
}

/// Per-entry outcomes of [`capture_state`].
#[derive(Debug, Default)]
pub struct CaptureReport {
    pub entries: Vec<CaptureEntry>,
}

impl CaptureReport {
    /// True when no entry failed. Skipped entries do not count as failures.
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            CaptureOutcome::Failed(err) => Some((e.name.as_str(), err)),
            _ => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, CaptureOutcome::Skipped))
            .map(|e| e.name.as_str())
    }

    pub fn changed(&self) -> usize {
        self.entries.iter().filter(|e| e.changed()).count()
    }
}

/// Record the current commit of every initialized working copy into its
/// entry's `commit` field and stamp `last_updated` with `now`.
///
/// Only `commit` and `last_updated` are ever written.
pub fn capture_state(
    backend: &dyn VcsBackend,
    manifest: &mut Manifest,
    now: DateTime<Utc>,
) -> CaptureReport {
    let names: Vec<String> = manifest.submodules.keys().cloned().collect();
    capture_names(backend, manifest, &names, now)
}

/// Like [`capture_state`], restricted to `names` (every entry when empty).
/// Unknown names fail before anything is captured.
pub fn capture_selected(
    backend: &dyn VcsBackend,
    manifest: &mut Manifest,
    names: &[String],
    now: DateTime<Utc>,
) -> Result<CaptureReport> {
    let names: Vec<String> = select(manifest, names)?
        .into_iter()
        .map(|(name, _)| name.to_string())
        .collect();
    Ok(capture_names(backend, manifest, &names, now))
}

fn capture_names(
    backend: &dyn VcsBackend,
    manifest: &mut Manifest,
    names: &[String],
    now: DateTime<Utc>,
) -> CaptureReport {
    let mut report = CaptureReport::default();

    for name in names {
        let Some(entry) = manifest.submodules.get_mut(name) else {
            continue;
        };
        let path = Path::new(&entry.path);

        let outcome = if !backend.is_initialized(path) {
            warn!("{}: {} is not initialized, skipping", name, entry.path);
            CaptureOutcome::Skipped
        } else {
            match backend.current_commit(path) {
                Ok(commit) => {
                    info!("{}: at {}", name, commit);
                    let previous = entry.commit.replace(commit.clone());
                    CaptureOutcome::Recorded { previous, commit }
                }
                Err(e) => {
                    warn!("{}: {}", name, e);
                    CaptureOutcome::Failed(e)
                }
            }
        };

        report.entries.push(CaptureEntry {
            name: name.clone(),
            outcome,
        });
    }

    manifest.touch(now);
    report
}

/// Outcome of initializing one entry.
#[derive(Debug)]
pub enum InitOutcome {
    AlreadyInitialized,
    Initialized,
    Failed(Error),
}

/// Create the working copies of `names` (every entry when empty) that do not
/// exist yet, cloning from each entry's `url`.
pub fn initialize_missing(
    backend: &dyn VcsBackend,
    manifest: &Manifest,
    names: &[String],
) -> Result<Vec<(String, InitOutcome)>> {
    let entries = select(manifest, names)?;
    let mut outcomes = Vec::with_capacity(entries.len());

    for (name, entry) in entries {
        let path = Path::new(&entry.path);
        let outcome = if backend.is_initialized(path) {
            InitOutcome::AlreadyInitialized
        } else if entry.url.trim().is_empty() {
            InitOutcome::Failed(Error::ManifestParse {
                message: format!("submodule '{}' has no url to initialize from", name),
                hint: Some("Set \"url\" to the origin remote".to_string()),
            })
        } else {
            match backend.init_repo(path, &entry.url) {
                Ok(()) => {
                    info!("{}: initialized {} from {}", name, entry.path, entry.url);
                    InitOutcome::Initialized
                }
                Err(e) => {
                    warn!("{}: {}", name, e);
                    InitOutcome::Failed(e)
                }
            }
        };
        outcomes.push((name.to_string(), outcome));
    }

    Ok(outcomes)
}

/// How a working copy relates to its declared reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    InSync,
    /// Initialized, but not at the declared reference.
    Drifted,
    NotInitialized,
    Unresolvable,
}

/// Observed state of one entry.
#[derive(Debug, Clone)]
pub struct EntryStatus {
    pub name: String,
    pub path: String,
    pub target: Option<ResolvedRef>,
    pub current_commit: Option<String>,
    pub exact_tag: Option<String>,
    pub branch: Option<String>,
    pub drift: Drift,
}

/// Compare every working copy with its declared reference. Nothing is
/// fetched, so a branch counts as in sync when it is checked out.
pub fn status(backend: &dyn VcsBackend, manifest: &Manifest) -> Vec<EntryStatus> {
    manifest
        .submodules
        .iter()
        .map(|(name, entry)| entry_status(backend, name, entry))
        .collect()
}

fn entry_status(backend: &dyn VcsBackend, name: &str, entry: &SubmoduleEntry) -> EntryStatus {
    let path = Path::new(&entry.path);
    let target = resolve(name, entry).ok();

    let mut status = EntryStatus {
        name: name.to_string(),
        path: entry.path.clone(),
        target: target.clone(),
        current_commit: None,
        exact_tag: None,
        branch: None,
        drift: Drift::NotInitialized,
    };

    if !backend.is_initialized(path) {
        return status;
    }

    status.current_commit = backend.current_commit(path).ok();
    status.exact_tag = backend.current_exact_tag(path).ok().flatten();
    status.branch = backend.current_branch(path).ok().flatten();

    status.drift = match &target {
        None => Drift::Unresolvable,
        Some(r) => {
            let at_target = match r.kind {
                RefKind::Tag => status.exact_tag.as_deref() == Some(r.value.as_str()),
                RefKind::Branch => status.branch.as_deref() == Some(r.value.as_str()),
                RefKind::Commit => status.current_commit.as_deref().is_some_and(|c| {
                    c.get(..r.value.len())
                        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(&r.value))
                }),
            };
            if at_target {
                Drift::InSync
            } else {
                Drift::Drifted
            }
        }
    };

    status
}

fn select<'a>(
    manifest: &'a Manifest,
    names: &[String],
) -> Result<Vec<(&'a str, &'a SubmoduleEntry)>> {
    if names.is_empty() {
        return Ok(manifest
            .submodules
            .iter()
            .map(|(n, e)| (n.as_str(), e))
            .collect());
    }

    names
        .iter()
        .map(|name| {
            manifest
                .submodules
                .get_key_value(name)
                .map(|(n, e)| (n.as_str(), e))
                .ok_or_else(|| Error::UnknownEntry { name: name.clone() })
        })
        .collect()
}
