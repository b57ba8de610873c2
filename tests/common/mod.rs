//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest(manifests::SINGLE_TAG);
//!     fixture.command().arg("status").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git;
    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Manifest documents used across tests.
#[allow(dead_code)]
pub mod manifests {
    /// One submodule pinned to a tag.
    pub const SINGLE_TAG: &str = r#"{
  "submodules": {
    "libfoo": {
      "path": "libs/foo",
      "url": "https://example.com/libfoo.git",
      "tag": "v1.0.0",
      "description": "Foo library"
    }
  }
}
"#;

    /// Two submodules whose paths collide.
    pub const DUPLICATE_PATHS: &str = r#"{
  "submodules": {
    "a": { "path": "libs/x", "url": "u", "tag": "v1" },
    "b": { "path": "./libs/x/", "url": "u", "branch": "main" }
  }
}
"#;

    /// Not JSON at all.
    pub const MALFORMED: &str = "{ \"submodules\": { \"a\": ";

    pub const EMPTY: &str = "{\n  \"submodules\": {}\n}\n";
}

/// A temporary parent directory holding a manifest.
pub struct TestFixture {
    pub temp: TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `content` to `submodules.json`.
    pub fn with_manifest(self, content: &str) -> Self {
        self.temp
            .child("submodules.json")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.temp.path().join("submodules.json")
    }

    pub fn read_manifest(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(self.manifest_path()).expect("Failed to read manifest");
        serde_json::from_str(&text).expect("Manifest is not valid JSON")
    }

    /// The binary, run from the fixture directory with a fixed git identity
    /// and plain output.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("submanifest");
        cmd.current_dir(self.temp.path())
            .env_remove("SUBMANIFEST_FILE")
            .env_remove("SUBMANIFEST_LATEST_SCOPE")
            .env("NO_COLOR", "1");
        for (key, value) in git::IDENTITY {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Helpers that drive the real `git` binary.
#[allow(dead_code)]
pub mod git {
    use super::*;

    pub const IDENTITY: [(&str, &str); 4] = [
        ("GIT_AUTHOR_NAME", "Test User"),
        ("GIT_AUTHOR_EMAIL", "test@example.com"),
        ("GIT_COMMITTER_NAME", "Test User"),
        ("GIT_COMMITTER_EMAIL", "test@example.com"),
    ];

    /// Run git in `dir` and return trimmed stdout, panicking on failure.
    pub fn run(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .envs(IDENTITY)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Create a repository on branch `main` and return its path.
    pub fn init_repo(dir: &Path) -> PathBuf {
        std::fs::create_dir_all(dir).expect("Failed to create repo dir");
        run(dir, &["init", "--quiet"]);
        run(dir, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        dir.to_path_buf()
    }

    /// Commit a file change and return the new commit id.
    pub fn commit(dir: &Path, file: &str, content: &str) -> String {
        std::fs::write(dir.join(file), content).expect("Failed to write file");
        run(dir, &["add", file]);
        run(dir, &["commit", "--quiet", "-m", &format!("update {}", file)]);
        run(dir, &["rev-parse", "HEAD"])
    }

    pub fn tag(dir: &Path, name: &str) {
        run(dir, &["tag", "-a", name, "-m", name]);
    }

    pub fn head(dir: &Path) -> String {
        run(dir, &["rev-parse", "HEAD"])
    }

    pub fn tags(dir: &Path) -> Vec<String> {
        run(dir, &["tag", "--list"])
            .lines()
            .map(String::from)
            .collect()
    }

    /// An origin repository with `v1.0.0` and `v1.1.0` tags and one commit
    /// past the last tag on `main`. Returns the commit ids in order.
    pub fn origin_with_history(dir: &Path) -> Vec<String> {
        init_repo(dir);
        let first = commit(dir, "README.md", "one\n");
        tag(dir, "v1.0.0");
        let second = commit(dir, "README.md", "two\n");
        tag(dir, "v1.1.0");
        let third = commit(dir, "README.md", "three\n");
        vec![first, second, third]
    }
}
