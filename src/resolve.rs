//! Reference resolution for manifest entries.
//!
//! An entry may declare a tag, a branch and a commit at the same time. Only one
//! of them is checked out, chosen by strict precedence: tag, then branch, then
//! commit. Empty strings count as undeclared.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::manifest::SubmoduleEntry;

/// Which kind of git reference a [`ResolvedRef`] names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Tag,
    Branch,
    Commit,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefKind::Tag => "tag",
            RefKind::Branch => "branch",
            RefKind::Commit => "commit",
        };
        f.write_str(s)
    }
}

/// The concrete reference chosen for a submodule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedRef {
    pub kind: RefKind,
    pub value: String,
}

impl ResolvedRef {
    pub fn new(kind: RefKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

impl fmt::Display for ResolvedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.value)
    }
}

/// Pick the reference to check out for the entry called `name`.
pub fn resolve(name: &str, entry: &SubmoduleEntry) -> Result<ResolvedRef> {
    let candidates = [
        (RefKind::Tag, &entry.tag),
        (RefKind::Branch, &entry.branch),
        (RefKind::Commit, &entry.commit),
    ];

    candidates
        .into_iter()
        .find_map(|(kind, value)| declared(value).map(|v| ResolvedRef::new(kind, v)))
        .ok_or_else(|| Error::UnresolvableEntry {
            name: name.to_string(),
        })
}

fn declared(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Whether `value` looks like an abbreviated or full commit identifier.
pub fn is_commit_id(value: &str) -> bool {
    static COMMIT_ID: OnceLock<Regex> = OnceLock::new();
    COMMIT_ID
        .get_or_init(|| Regex::new(r"^[0-9a-fA-F]{7,64}$").expect("valid regex"))
        .is_match(value)
}
