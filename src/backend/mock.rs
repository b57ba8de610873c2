//! In-memory [`VcsBackend`] used by the unit tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::VcsBackend;
use crate::error::{Error, Result};
use crate::resolve::RefKind;

/// State of one simulated working copy and its remote.
#[derive(Debug, Clone, Default)]
pub struct MockRepo {
    pub head: String,
    pub branch: Option<String>,
    /// Local tags: name -> commit.
    pub tags: BTreeMap<String, String>,
    /// Tags only the remote has until `fetch_tags` runs.
    pub remote_tags: BTreeMap<String, String>,
    /// Remote branches: name -> tip commit.
    pub branches: BTreeMap<String, String>,
    /// Commits present locally.
    pub commits: BTreeSet<String>,
    /// Commits only the remote has until `fetch_all` runs.
    pub remote_commits: BTreeSet<String>,
    pub fail_fetch: bool,
    pub fail_push: bool,
}

impl MockRepo {
    pub fn at(commit: &str) -> Self {
        let mut repo = Self {
            head: commit.to_string(),
            ..Default::default()
        };
        repo.commits.insert(commit.to_string());
        repo
    }

    pub fn tag(mut self, name: &str, commit: &str) -> Self {
        self.commits.insert(commit.to_string());
        self.tags.insert(name.to_string(), commit.to_string());
        self
    }

    pub fn remote_tag(mut self, name: &str, commit: &str) -> Self {
        self.remote_commits.insert(commit.to_string());
        self.remote_tags.insert(name.to_string(), commit.to_string());
        self
    }

    pub fn branch(mut self, name: &str, commit: &str) -> Self {
        self.remote_commits.insert(commit.to_string());
        self.branches.insert(name.to_string(), commit.to_string());
        self
    }

    pub fn remote_commit(mut self, commit: &str) -> Self {
        self.remote_commits.insert(commit.to_string());
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }
}

#[derive(Default)]
struct MockState {
    repos: BTreeMap<PathBuf, MockRepo>,
    remotes: BTreeMap<String, MockRepo>,
    calls: Vec<String>,
    parent_commits: Vec<(PathBuf, String)>,
}

/// Backend that simulates git working copies in memory.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an initialized working copy at `path`.
    pub fn with_repo(self, path: &str, repo: MockRepo) -> Self {
        self.state
            .lock()
            .unwrap()
            .repos
            .insert(PathBuf::from(path), repo);
        self
    }

    /// Register a remote that `init_repo` can clone from.
    pub fn with_remote(self, url: &str, repo: MockRepo) -> Self {
        self.state
            .lock()
            .unwrap()
            .remotes
            .insert(url.to_string(), repo);
        self
    }

    pub fn repo(&self, path: &str) -> Option<MockRepo> {
        self.state.lock().unwrap().repos.get(Path::new(path)).cloned()
    }

    /// Move HEAD of an existing working copy, as a user would outside the tool.
    pub fn set_head(&self, path: &str, commit: &str) {
        let mut state = self.state.lock().unwrap();
        let repo = state.repos.get_mut(Path::new(path)).unwrap();
        repo.commits.insert(commit.to_string());
        repo.head = commit.to_string();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn parent_commits(&self) -> Vec<(PathBuf, String)> {
        self.state.lock().unwrap().parent_commits.clone()
    }

    fn with_repo_mut<R>(
        &self,
        call: &str,
        path: &Path,
        f: impl FnOnce(&mut MockRepo) -> std::result::Result<R, String>,
    ) -> Result<R> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{} {}", call, path.display()));

        let repo = state.repos.get_mut(path).ok_or_else(|| Error::GitCommand {
            command: call.to_string(),
            path: path.to_path_buf(),
            stderr: "not a git repository".to_string(),
        })?;

        f(repo).map_err(|stderr| Error::GitCommand {
            command: call.to_string(),
            path: path.to_path_buf(),
            stderr,
        })
    }
}

fn matches_glob(pattern: &str, name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => pattern == name,
    }
}

impl VcsBackend for MockBackend {
    fn init_repo(&self, path: &Path, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("init {}", path.display()));

        let remote = state
            .remotes
            .get(url)
            .cloned()
            .ok_or_else(|| Error::GitCommand {
                command: format!("clone {}", url),
                path: path.to_path_buf(),
                stderr: "repository not found".to_string(),
            })?;
        state.repos.insert(path.to_path_buf(), remote);
        Ok(())
    }

    fn is_initialized(&self, path: &Path) -> bool {
        self.state.lock().unwrap().repos.contains_key(path)
    }

    fn fetch_tags(&self, path: &Path) -> Result<()> {
        self.with_repo_mut("fetch-tags", path, |repo| {
            if repo.fail_fetch {
                return Err("could not resolve host".to_string());
            }
            for (name, commit) in repo.remote_tags.clone() {
                repo.commits.insert(commit.clone());
                repo.tags.insert(name, commit);
            }
            Ok(())
        })
    }

    fn fetch_branch(&self, path: &Path, name: &str) -> Result<()> {
        self.with_repo_mut("fetch-branch", path, |repo| {
            if repo.fail_fetch {
                return Err("could not resolve host".to_string());
            }
            let tip = repo
                .branches
                .get(name)
                .cloned()
                .ok_or_else(|| format!("couldn't find remote ref {}", name))?;
            repo.commits.insert(tip);
            Ok(())
        })
    }

    fn fetch_all(&self, path: &Path) -> Result<()> {
        self.with_repo_mut("fetch-all", path, |repo| {
            if repo.fail_fetch {
                return Err("could not resolve host".to_string());
            }
            let remote = repo.remote_commits.clone();
            repo.commits.extend(remote);
            Ok(())
        })
    }

    fn checkout_ref(&self, path: &Path, kind: RefKind, value: &str) -> Result<()> {
        self.with_repo_mut("checkout", path, |repo| {
            let missing = || format!("pathspec '{}' did not match", value);
            match kind {
                RefKind::Tag => {
                    repo.head = repo.tags.get(value).cloned().ok_or_else(missing)?;
                    repo.branch = None;
                }
                RefKind::Branch => {
                    let tip = repo.branches.get(value).cloned().ok_or_else(missing)?;
                    if !repo.commits.contains(&tip) {
                        return Err(missing());
                    }
                    repo.head = tip;
                    repo.branch = Some(value.to_string());
                }
                RefKind::Commit => {
                    repo.head = repo
                        .commits
                        .iter()
                        .find(|c| c.starts_with(value))
                        .cloned()
                        .ok_or_else(missing)?;
                    repo.branch = None;
                }
            }
            Ok(())
        })
    }

    fn current_commit(&self, path: &Path) -> Result<String> {
        self.with_repo_mut("rev-parse", path, |repo| Ok(repo.head.clone()))
    }

    fn current_exact_tag(&self, path: &Path) -> Result<Option<String>> {
        self.with_repo_mut("describe", path, |repo| {
            Ok(repo
                .tags
                .iter()
                .find(|(_, commit)| **commit == repo.head)
                .map(|(name, _)| name.clone()))
        })
    }

    fn current_branch(&self, path: &Path) -> Result<Option<String>> {
        self.with_repo_mut("symbolic-ref", path, |repo| Ok(repo.branch.clone()))
    }

    fn list_tags(&self, path: &Path, pattern: &str) -> Result<Vec<String>> {
        self.with_repo_mut("tag-list", path, |repo| {
            Ok(repo
                .tags
                .keys()
                .filter(|name| matches_glob(pattern, name))
                .cloned()
                .collect())
        })
    }

    fn create_annotated_tag(&self, path: &Path, name: &str, _message: &str) -> Result<()> {
        self.with_repo_mut("tag", path, |repo| {
            if repo.tags.contains_key(name) {
                return Err(format!("tag '{}' already exists", name));
            }
            repo.tags.insert(name.to_string(), repo.head.clone());
            Ok(())
        })
    }

    fn push_tag(&self, path: &Path, name: &str) -> Result<()> {
        self.with_repo_mut("push", path, |repo| {
            if repo.fail_push {
                return Err("remote rejected".to_string());
            }
            let commit = repo
                .tags
                .get(name)
                .cloned()
                .ok_or_else(|| format!("src refspec {} does not match any", name))?;
            repo.remote_tags.insert(name.to_string(), commit);
            Ok(())
        })
    }

    fn commit_path_in_parent(&self, path: &Path, message: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("commit-parent {}", path.display()));
        state
            .parent_commits
            .push((path.to_path_buf(), message.to_string()));
        Ok(())
    }
}
