//! # Version-Control Backend
//!
//! This module defines the narrow interface through which the synchronizer
//! talks to the version-control tool, and the default implementation that
//! shells out to the system `git` binary.
//!
//! ## Design
//!
//! Every method takes the working-copy path explicitly. Nothing in this crate
//! changes the process working directory, so the core logic in `sync` and
//! `bump` can be exercised against an in-memory mock without touching the
//! filesystem or a terminal.
//!
//! Paths handed to the backend are the manifest's `path` values, i.e. relative
//! to the parent repository. [`GitBackend`] joins them onto its `root`.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::defaults::DEFAULT_REMOTE;
use crate::error::{Error, Result};
use crate::git;
use crate::resolve::RefKind;

#[cfg(test)]
pub(crate) mod mock;

/// Capabilities the synchronizer requires from the version-control tool.
pub trait VcsBackend: Send + Sync {
    /// Create the working copy at `path` from `url`.
    fn init_repo(&self, path: &Path, url: &str) -> Result<()>;

    /// Whether `path` holds an initialized working copy.
    fn is_initialized(&self, path: &Path) -> bool;

    /// Refresh the remote tag list.
    fn fetch_tags(&self, path: &Path) -> Result<()>;

    /// Fetch a single branch from the remote.
    fn fetch_branch(&self, path: &Path, name: &str) -> Result<()>;

    /// Fetch all remote objects.
    fn fetch_all(&self, path: &Path) -> Result<()>;

    /// Check out a tag, branch or commit.
    fn checkout_ref(&self, path: &Path, kind: RefKind, value: &str) -> Result<()>;

    /// Full identifier of the commit currently checked out.
    fn current_commit(&self, path: &Path) -> Result<String>;

    /// Tag pointing exactly at the current commit, if any.
    fn current_exact_tag(&self, path: &Path) -> Result<Option<String>>;

    /// Name of the checked-out branch, or `None` when HEAD is detached.
    fn current_branch(&self, path: &Path) -> Result<Option<String>>;

    /// Local tags matching a glob `pattern`.
    fn list_tags(&self, path: &Path, pattern: &str) -> Result<Vec<String>>;

    /// Whether a local tag called `name` exists.
    fn tag_exists(&self, path: &Path, name: &str) -> Result<bool> {
        Ok(self.list_tags(path, name)?.iter().any(|t| t == name))
    }

    /// Create an annotated tag at the current commit.
    fn create_annotated_tag(&self, path: &Path, name: &str, message: &str) -> Result<()>;

    /// Push a tag to the remote.
    fn push_tag(&self, path: &Path, name: &str) -> Result<()>;

    /// Record the submodule pointer at `path` in the enclosing repository.
    fn commit_path_in_parent(&self, path: &Path, message: &str) -> Result<()>;
}

/// [`VcsBackend`] implemented with the system `git` command.
#[derive(Debug, Clone)]
pub struct GitBackend {
    root: PathBuf,
    remote: String,
}

impl GitBackend {
    /// Backend for the parent repository at `root`, using the default remote.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    /// Like [`GitBackend::new`], but fails with `BackendUnavailable` when git
    /// cannot be run.
    pub fn detect(root: impl Into<PathBuf>) -> Result<Self> {
        let version = git::version()?;
        debug!("using {}", version);
        Ok(Self::new(root))
    }

    /// Use `remote` instead of `origin` for fetches and pushes.
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    fn dir(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl VcsBackend for GitBackend {
    fn init_repo(&self, path: &Path, url: &str) -> Result<()> {
        let rel = path.to_string_lossy();

        // Prefer the parent's own submodule registration when there is one.
        if git::is_work_tree(&self.root)
            && git::succeeds(
                &self.root,
                &["submodule", "update", "--init", "--", rel.as_ref()],
            )?
            && git::is_work_tree(&self.dir(path))
        {
            return Ok(());
        }

        debug!("{} is not a registered submodule, cloning {}", rel, url);
        git::clone(url, &self.dir(path))
    }

    fn is_initialized(&self, path: &Path) -> bool {
        git::is_work_tree(&self.dir(path))
    }

    fn fetch_tags(&self, path: &Path) -> Result<()> {
        git::run(&self.dir(path), &["fetch", "--tags", "--force", &self.remote]).map(|_| ())
    }

    fn fetch_branch(&self, path: &Path, name: &str) -> Result<()> {
        git::run(&self.dir(path), &["fetch", &self.remote, name]).map(|_| ())
    }

    fn fetch_all(&self, path: &Path) -> Result<()> {
        git::run(&self.dir(path), &["fetch", "--all", "--tags"]).map(|_| ())
    }

    fn checkout_ref(&self, path: &Path, kind: RefKind, value: &str) -> Result<()> {
        let dir = self.dir(path);
        match kind {
            RefKind::Tag => {
                // A bare name can be taken for a branch of the same name.
                let qualified = format!("refs/tags/{}", value);
                match git::run(&dir, &["checkout", "--quiet", &qualified]) {
                    Ok(_) => Ok(()),
                    Err(e) => {
                        debug!("{} did not resolve ({}), trying {}", qualified, e, value);
                        git::run(&dir, &["checkout", "--quiet", value]).map(|_| ())
                    }
                }
            }
            RefKind::Branch => {
                git::run(&dir, &["checkout", "--quiet", value])?;
                let upstream = format!("{}/{}", self.remote, value);
                if let Err(e) = git::run(&dir, &["merge", "--ff-only", "--quiet", &upstream]) {
                    warn!("could not fast-forward {} to {}: {}", value, upstream, e);
                    return Err(e);
                }
                Ok(())
            }
            RefKind::Commit => git::run(&dir, &["checkout", "--quiet", value]).map(|_| ()),
        }
    }

    fn current_commit(&self, path: &Path) -> Result<String> {
        git::run(&self.dir(path), &["rev-parse", "HEAD"])
    }

    fn current_exact_tag(&self, path: &Path) -> Result<Option<String>> {
        match git::run(
            &self.dir(path),
            &["describe", "--tags", "--exact-match", "HEAD"],
        ) {
            Ok(tag) if !tag.is_empty() => Ok(Some(tag)),
            Ok(_) | Err(Error::GitCommand { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn current_branch(&self, path: &Path) -> Result<Option<String>> {
        match git::run(&self.dir(path), &["symbolic-ref", "--short", "-q", "HEAD"]) {
            Ok(branch) if !branch.is_empty() => Ok(Some(branch)),
            Ok(_) | Err(Error::GitCommand { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn list_tags(&self, path: &Path, pattern: &str) -> Result<Vec<String>> {
        let stdout = git::run(&self.dir(path), &["tag", "--list", pattern])?;
        Ok(git::parse_tag_list(&stdout))
    }

    fn tag_exists(&self, path: &Path, name: &str) -> Result<bool> {
        let reference = format!("refs/tags/{}", name);
        git::succeeds(
            &self.dir(path),
            &["rev-parse", "--quiet", "--verify", &reference],
        )
    }

    fn create_annotated_tag(&self, path: &Path, name: &str, message: &str) -> Result<()> {
        git::run(&self.dir(path), &["tag", "-a", name, "-m", message]).map(|_| ())
    }

    fn push_tag(&self, path: &Path, name: &str) -> Result<()> {
        let reference = format!("refs/tags/{}", name);
        git::run(&self.dir(path), &["push", &self.remote, &reference]).map(|_| ())
    }

    fn commit_path_in_parent(&self, path: &Path, message: &str) -> Result<()> {
        let rel = path.to_string_lossy();
        git::run(&self.root, &["add", "--", rel.as_ref()])?;
        git::run(&self.root, &["commit", "-m", message, "--", rel.as_ref()]).map(|_| ())
    }
}
