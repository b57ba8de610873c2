//! # Version Bumps
//!
//! Computing a new version tag for a submodule and creating it.
//!
//! A bump is split in two steps so the caller can ask for approval in
//! between:
//!
//! 1. [`bump`] reads the working copy and computes a [`BumpPlan`]. It has no
//!    side effects and can be repeated freely.
//! 2. [`release`] creates the annotated tag, then optionally pushes it and
//!    records the submodule pointer in the parent repository.
//!
//! [`bump_and_release`] runs both with a [`Confirm`] hook in between.

use std::path::{Path, PathBuf};

use log::{info, warn};
use semver::Version;

use crate::backend::VcsBackend;
use crate::config::Confirm;
use crate::defaults::VERSION_TAG_PATTERN;
use crate::error::{Error, Result};
use crate::version::{self, BumpKind, LatestPolicy};

/// Where a bump starts from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpPlan {
    pub path: PathBuf,
    /// Version the bump starts from; `0.0.0` when no version tag exists.
    pub baseline: Version,
    /// Tag the baseline was read from.
    pub baseline_tag: Option<String>,
    /// Whether the working copy sits exactly on `baseline_tag`.
    pub on_tag: bool,
    pub kind: BumpKind,
    pub new_version: Version,
    pub new_tag: String,
}

/// Determine the version the working copy is at.
///
/// The exact tag on the current commit wins when it is a version. Otherwise
/// the highest version tag eligible under `policy` is used, and `0.0.0` when
/// there is none.
pub fn baseline(
    backend: &dyn VcsBackend,
    path: &Path,
    policy: LatestPolicy,
) -> Result<(Version, Option<String>, bool)> {
    let exact = backend
        .current_exact_tag(path)?
        .and_then(|tag| version::parse_version_tag(&tag).map(|v| (tag, v)));

    if let Some((tag, v)) = exact {
        return Ok((v, Some(tag), true));
    }

    let tags = backend.list_tags(path, VERSION_TAG_PATTERN)?;
    match version::latest_version(&tags, policy, None) {
        Some((tag, v)) => Ok((v, Some(tag), false)),
        None => Ok((Version::new(0, 0, 0), None, false)),
    }
}

/// Compute the next version for the working copy at `path`.
///
/// Fails with `TagAlreadyExists` when the computed tag is already present.
pub fn bump(
    backend: &dyn VcsBackend,
    path: &Path,
    kind: BumpKind,
    policy: LatestPolicy,
) -> Result<BumpPlan> {
    if !backend.is_initialized(path) {
        return Err(Error::NotInitialized {
            path: path.to_path_buf(),
        });
    }

    let (baseline, baseline_tag, on_tag) = baseline(backend, path, policy)?;
    let new_version = version::next_version(&baseline, kind)?;
    let new_tag = version::format_tag(&new_version);

    if backend.tag_exists(path, &new_tag)? {
        return Err(Error::TagAlreadyExists {
            tag: new_tag,
            path: path.to_path_buf(),
        });
    }

    Ok(BumpPlan {
        path: path.to_path_buf(),
        baseline,
        baseline_tag,
        on_tag,
        kind,
        new_version,
        new_tag,
    })
}

/// What [`release`] should do besides creating the tag.
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Submodule name, used in the parent commit message.
    pub name: String,
    /// Tag message; `Release {tag}` when unset.
    pub message: Option<String>,
    pub push: bool,
    pub commit_parent: bool,
}

/// Result of [`release`]. Push and parent-commit failures are reported here
/// rather than raised: the tag exists locally either way.
#[derive(Debug)]
pub struct ReleaseOutcome {
    pub tag: String,
    pub pushed: Option<std::result::Result<(), String>>,
    pub committed: Option<std::result::Result<(), String>>,
}

/// Create the planned tag and carry out the follow-up steps.
pub fn release(
    backend: &dyn VcsBackend,
    plan: &BumpPlan,
    options: &ReleaseOptions,
) -> Result<ReleaseOutcome> {
    let path = plan.path.as_path();
    let tag = plan.new_tag.clone();

    if backend.tag_exists(path, &tag)? {
        return Err(Error::TagAlreadyExists {
            tag,
            path: plan.path.clone(),
        });
    }

    let message = options
        .message
        .clone()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Release {}", tag));
    backend.create_annotated_tag(path, &tag, &message)?;
    info!("created tag {} in {}", tag, path.display());

    let pushed = options.push.then(|| {
        backend.push_tag(path, &tag).map_err(|e| {
            warn!("push of {} failed: {}", tag, e);
            e.to_string()
        })
    });

    let committed = options.commit_parent.then(|| {
        let message = format!("Update {} to {}", options.name, tag);
        backend.commit_path_in_parent(path, &message).map_err(|e| {
            warn!("parent commit for {} failed: {}", options.name, e);
            e.to_string()
        })
    });

    Ok(ReleaseOutcome {
        tag,
        pushed,
        committed,
    })
}

/// Plan a bump, ask `confirm`, and release when approved. Returns the plan
/// and, when approved, the release outcome.
pub fn bump_and_release(
    backend: &dyn VcsBackend,
    path: &Path,
    kind: BumpKind,
    policy: LatestPolicy,
    options: &ReleaseOptions,
    confirm: &dyn Confirm,
) -> Result<(BumpPlan, Option<ReleaseOutcome>)> {
    let plan = bump(backend, path, kind, policy)?;

    let from = plan.baseline_tag.as_deref().unwrap_or("no version tag");
    let prompt = format!(
        "Create tag {} in {} (from {})?",
        plan.new_tag,
        path.display(),
        from
    );
    if !confirm.confirm(&prompt)? {
        info!("bump of {} declined", path.display());
        return Ok((plan, None));
    }

    let outcome = release(backend, &plan, options)?;
    Ok((plan, Some(outcome)))
}
