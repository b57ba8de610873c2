use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::Error;

/// Run `git -C <dir> <args...>` and return trimmed stdout.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/
/// - Git credential helpers
/// - Personal access tokens
/// - Any authentication configured in ~/.gitconfig
pub fn run(dir: &Path, args: &[&str]) -> Result<String, Error> {
    let output = spawn(dir, args)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command: args.join(" "),
            path: dir.to_path_buf(),
            stderr: explain_stderr(stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Like [`run`], but reports only whether the command succeeded.
pub fn succeeds(dir: &Path, args: &[&str]) -> Result<bool, Error> {
    Ok(spawn(dir, args)?.status.success())
}

fn spawn(dir: &Path, args: &[&str]) -> Result<Output, Error> {
    debug!("git -C {} {}", dir.display(), args.join(" "));

    Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| Error::BackendUnavailable {
            tool: "git".to_string(),
            message: e.to_string(),
        })
}

// Provide helpful error message for common auth failures
fn explain_stderr(stderr: &str) -> String {
    if stderr.contains("Authentication failed")
        || stderr.contains("Permission denied")
        || stderr.contains("Could not read from remote repository")
    {
        format!(
            "Authentication failed. Make sure you have access to the repository.\n\
            For private repos, ensure you have:\n\
            - SSH key added to ssh-agent\n\
            - Git credentials configured\n\
            - Personal access token set up\n\
            Error: {}",
            stderr
        )
    } else {
        stderr.to_string()
    }
}

/// Report the installed git version, failing if git cannot be executed.
pub fn version() -> Result<String, Error> {
    let output = Command::new("git")
        .arg("--version")
        .output()
        .map_err(|e| Error::BackendUnavailable {
            tool: "git".to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(Error::BackendUnavailable {
            tool: "git".to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// True when `dir` holds a git working copy. Submodule working copies carry a
/// `.git` file rather than a directory, so either counts.
pub fn is_work_tree(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Clone `url` into `target_dir`, creating parent directories as needed.
pub fn clone(url: &str, target_dir: &Path) -> Result<(), Error> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    // The clone runs inside the parent directory, so only the last component
    // names the target.
    let name = target_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::GitCommand {
            command: format!("clone {}", url),
            path: target_dir.to_path_buf(),
            stderr: "target path has no final component".to_string(),
        })?;
    let parent = target_dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    run(parent, &["clone", url, &name]).map(|_| ())
}

/// Parse `git tag -l` output into tag names, one per line.
pub fn parse_tag_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
