//! # Version Manifest
//!
//! This module defines the JSON manifest that records, for every tracked
//! submodule, where its working copy lives, where it is cloned from, and which
//! tag, branch or commit it should be checked out at.
//!
//! ## Format
//!
//! ```json
//! {
//!   "last_updated": "2024-05-01T12:00:00Z",
//!   "submodules": {
//!     "libfoo": {
//!       "path": "vendor/libfoo",
//!       "url": "https://example.com/libfoo.git",
//!       "tag": "v1.2.0",
//!       "branch": null,
//!       "commit": null,
//!       "description": "Foo support library"
//!     }
//!   }
//! }
//! ```
//!
//! A missing field and an explicit `null` are read the same way, so manifests
//! written by hand can leave out whatever they do not use.
//!
//! ## Persistence
//!
//! [`Manifest::save`] never writes the target file in place: the document is
//! written to a hidden sibling file, flushed to disk and renamed over the
//! original. A failure before the rename leaves the previous manifest intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Timelike, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resolve::{RefKind, ResolvedRef};

/// The full version manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// When the manifest was last rewritten by a capture.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    /// Tracked submodules keyed by their stable name.
    #[serde(default)]
    pub submodules: BTreeMap<String, SubmoduleEntry>,
}

/// One tracked submodule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmoduleEntry {
    /// Working-copy location relative to the parent repository root.
    pub path: String,
    /// Origin remote, only used when the working copy is first created.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl SubmoduleEntry {
    /// Create an entry with no declared reference.
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Declare `reference` as the entry's intent and clear the other two
    /// reference fields.
    pub fn pin(&mut self, reference: &ResolvedRef) {
        self.tag = None;
        self.branch = None;
        self.commit = None;

        let value = Some(reference.value.clone());
        match reference.kind {
            RefKind::Tag => self.tag = value,
            RefKind::Branch => self.branch = value,
            RefKind::Commit => self.commit = value,
        }
    }
}

impl Manifest {
    /// Create an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by name.
    pub fn entry(&self, name: &str) -> Result<&SubmoduleEntry> {
        self.submodules.get(name).ok_or_else(|| Error::UnknownEntry {
            name: name.to_string(),
        })
    }

    /// Look up an entry by name for modification.
    pub fn entry_mut(&mut self, name: &str) -> Result<&mut SubmoduleEntry> {
        self.submodules
            .get_mut(name)
            .ok_or_else(|| Error::UnknownEntry {
                name: name.to_string(),
            })
    }

    /// Register a new entry, refusing duplicate names and duplicate paths.
    pub fn add_entry(&mut self, name: &str, entry: SubmoduleEntry) -> Result<()> {
        if self.submodules.contains_key(name) {
            return Err(Error::EntryExists {
                name: name.to_string(),
            });
        }

        self.submodules.insert(name.to_string(), entry);
        if let Err(e) = self.validate() {
            self.submodules.remove(name);
            return Err(e);
        }
        Ok(())
    }

    /// Set `last_updated`, truncated to whole seconds.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = Some(now.with_nanosecond(0).unwrap_or(now));
    }

    /// Check structural invariants: every entry has a path, and no two
    /// entries share one.
    pub fn validate(&self) -> Result<()> {
        let mut seen: BTreeMap<String, &str> = BTreeMap::new();

        for (name, entry) in &self.submodules {
            let normalized = normalize_path(&entry.path);
            if normalized.is_empty() {
                return Err(Error::ManifestParse {
                    message: format!("submodule '{}' has an empty path", name),
                    hint: Some("Set \"path\" to the working-copy location".to_string()),
                });
            }

            if let Some(first) = seen.insert(normalized.clone(), name) {
                return Err(Error::DuplicatePath {
                    path: normalized,
                    first: first.to_string(),
                    second: name.clone(),
                });
            }
        }

        Ok(())
    }

    /// Serialize to the on-disk representation.
    pub fn to_json_string(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the manifest atomically.
    ///
    /// 1. Serialize to pretty JSON.
    /// 2. Write to a hidden temporary file in the same directory.
    /// 3. fsync the temporary file.
    /// 4. Rename over the target path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json_string()?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                ))
            })?;
        let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

        let write_tmp = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()
        };

        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!("wrote manifest {}", path.display());
        Ok(())
    }
}

/// Parse and validate a manifest document.
pub fn parse(json: &str) -> Result<Manifest> {
    let manifest: Manifest = serde_json::from_str(json).map_err(|e| Error::ManifestParse {
        message: e.to_string(),
        hint: parse_hint(&e),
    })?;
    manifest.validate()?;
    Ok(manifest)
}

/// Read, parse and validate a manifest file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

fn parse_hint(e: &serde_json::Error) -> Option<String> {
    let message = e.to_string();
    if message.contains("missing field `path`") {
        Some("Every submodule needs a \"path\" field".to_string())
    } else if e.is_syntax() || e.is_eof() {
        Some("The manifest must be a JSON object".to_string())
    } else {
        None
    }
}

/// Canonical form of a manifest path, used to detect two entries pointing at
/// the same working copy.
pub fn normalize_path(path: &str) -> String {
    let mut p = path.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "last_updated": "2024-05-01T12:00:00Z",
  "submodules": {
    "libfoo": {
      "path": "vendor/libfoo",
      "url": "https://example.com/libfoo.git",
      "tag": "v1.2.0",
      "branch": null,
      "commit": null,
      "description": "Foo support library"
    },
    "tools": {
      "path": "tools",
      "url": "git@example.com:org/tools.git",
      "branch": "main"
    }
  }
}"#;

    #[test]
    fn test_parse_sample_manifest() {
        let manifest = parse(SAMPLE).unwrap();
        assert_eq!(manifest.submodules.len(), 2);

        let foo = manifest.entry("libfoo").unwrap();
        assert_eq!(foo.path, "vendor/libfoo");
        assert_eq!(foo.tag.as_deref(), Some("v1.2.0"));
        assert_eq!(foo.branch, None);

        let tools = manifest.entry("tools").unwrap();
        assert_eq!(tools.branch.as_deref(), Some("main"));
        assert_eq!(tools.commit, None);
        assert_eq!(tools.description, "");

        assert_eq!(
            manifest.last_updated,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = parse("{ \"submodules\": ").unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[test]
    fn test_parse_missing_path_has_hint() {
        let err = parse(r#"{"submodules": {"a": {"url": "x"}}}"#).unwrap_err();
        match err {
            Error::ManifestParse { hint, .. } => assert!(hint.unwrap().contains("path")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_document() {
        let manifest = parse("{}").unwrap();
        assert!(manifest.submodules.is_empty());
        assert!(manifest.last_updated.is_none());
    }

    #[test]
    fn test_duplicate_paths_rejected() {
        let json = r#"{"submodules": {
            "a": {"path": "libs/common"},
            "b": {"path": "./libs/common/"}
        }}"#;
        match parse(json).unwrap_err() {
            Error::DuplicatePath { path, first, second } => {
                assert_eq!(path, "libs/common");
                assert_eq!(first, "a");
                assert_eq!(second, "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = parse(r#"{"submodules": {"a": {"path": "  "}}}"#).unwrap_err();
        assert!(matches!(err, Error::ManifestParse { .. }));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./a/b/"), "a/b");
        assert_eq!(normalize_path("././a"), "a");
        assert_eq!(normalize_path("a"), "a");
        assert_eq!(normalize_path("./"), "");
    }

    #[test]
    fn test_pin_clears_other_fields() {
        let mut entry = SubmoduleEntry {
            path: "x".to_string(),
            tag: Some("v1.0.0".to_string()),
            branch: Some("main".to_string()),
            commit: Some("abc1234".to_string()),
            ..Default::default()
        };

        entry.pin(&ResolvedRef::new(RefKind::Tag, "v2.0.0"));
        assert_eq!(entry.tag.as_deref(), Some("v2.0.0"));
        assert_eq!(entry.branch, None);
        assert_eq!(entry.commit, None);

        entry.pin(&ResolvedRef::new(RefKind::Branch, "develop"));
        assert_eq!(entry.tag, None);
        assert_eq!(entry.branch.as_deref(), Some("develop"));
    }

    #[test]
    fn test_add_entry_rejects_duplicates() {
        let mut manifest = Manifest::new();
        manifest
            .add_entry("a", SubmoduleEntry::new("libs/a", "url-a"))
            .unwrap();

        let err = manifest
            .add_entry("a", SubmoduleEntry::new("libs/other", "url"))
            .unwrap_err();
        assert!(matches!(err, Error::EntryExists { .. }));

        let err = manifest
            .add_entry("b", SubmoduleEntry::new("libs/a/", "url-b"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicatePath { .. }));
        assert!(!manifest.submodules.contains_key("b"));
    }

    #[test]
    fn test_unknown_entry() {
        let manifest = Manifest::new();
        assert!(matches!(
            manifest.entry("nope"),
            Err(Error::UnknownEntry { .. })
        ));
    }

    #[test]
    fn test_touch_truncates_subseconds() {
        let mut manifest = Manifest::new();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(678);
        manifest.touch(now);

        let json = manifest.to_json_string().unwrap();
        assert!(json.contains("\"last_updated\": \"2024-01-02T03:04:05Z\""));
    }

    #[test]
    fn test_serialized_nulls_are_explicit() {
        let mut manifest = Manifest::new();
        manifest
            .add_entry("a", SubmoduleEntry::new("libs/a", "url-a"))
            .unwrap();
        let json = manifest.to_json_string().unwrap();
        assert!(json.contains("\"tag\": null"));
        assert!(json.contains("\"branch\": null"));
        assert!(json.contains("\"commit\": null"));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("submodules.json");

        let manifest = parse(SAMPLE).unwrap();
        manifest.save(&path).unwrap();

        let reloaded = from_file(&path).unwrap();
        assert_eq!(reloaded, manifest);
        assert!(!dir.path().join(".submodules.json.tmp").exists());
    }

    #[test]
    fn test_save_failure_leaves_original_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("submodules.json");
        fs::write(&path, SAMPLE).unwrap();

        // A directory where the temporary file should go makes the write fail.
        fs::create_dir(dir.path().join(".submodules.json.tmp")).unwrap();

        let mut manifest = parse(SAMPLE).unwrap();
        manifest.submodules.clear();
        assert!(manifest.save(&path).is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
    }

    #[test]
    fn test_from_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = from_file(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
