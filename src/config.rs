//! Run settings and the confirmation hook.
//!
//! Interactive prompts are not part of the library. Operations that need the
//! user's approval take a [`Confirm`] implementation: the binary passes a
//! terminal prompt, tests and `--yes` runs pass [`AssumeYes`] or a closure.

use crate::defaults::DEFAULT_REMOTE;
use crate::error::Result;
use crate::version::LatestPolicy;

/// Asks the caller to approve a side effect.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Approves everything without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Ok(self(prompt))
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Skip confirmation prompts.
    pub assume_yes: bool,
    /// Which tags count when looking up the latest version.
    pub latest_policy: LatestPolicy,
    /// Remote used for fetches and pushes.
    pub remote: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assume_yes: false,
            latest_policy: LatestPolicy::default(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}
