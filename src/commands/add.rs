//! # Add Command Implementation
//!
//! This module implements the `add` subcommand, which starts tracking a new
//! submodule in the manifest.
//!
//! ## Functionality
//!
//! - **Reference**: At most one of `--tag`, `--branch` or `--commit` is
//!   recorded. With `--latest` the highest version tag of the fresh working
//!   copy is recorded instead.
//! - **Manifest Creation**: A missing manifest is created after confirmation
//!   (or right away with `--yes`).
//! - **Initialization**: With `--init` the working copy is created and checked
//!   out; when no reference was given, its current commit is recorded.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use log::info;

use submanifest::backend::VcsBackend;
use submanifest::config::Confirm as _;
use submanifest::defaults::VERSION_TAG_PATTERN;
use submanifest::manifest::{self, Manifest, SubmoduleEntry};
use submanifest::output::{emoji, short_commit};
use submanifest::resolve::{self, is_commit_id, RefKind, ResolvedRef};
use submanifest::sync::{self, InitOutcome};
use submanifest::version;

use crate::cli::Context;

/// Add a submodule to the manifest
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Repository URL to clone from
    #[arg(value_name = "URL")]
    pub url: String,

    /// Path of the working copy, relative to the parent repository root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Manifest key (defaults to the last component of PATH)
    #[arg(long)]
    pub name: Option<String>,

    /// Pin to a tag
    #[arg(long, conflicts_with_all = ["branch", "commit", "latest"])]
    pub tag: Option<String>,

    /// Follow a branch
    #[arg(long, conflicts_with_all = ["commit", "latest"])]
    pub branch: Option<String>,

    /// Pin to a commit id
    #[arg(long, conflicts_with = "latest")]
    pub commit: Option<String>,

    /// Pin to the latest version tag of the new working copy
    #[arg(long, requires = "init")]
    pub latest: bool,

    /// Human readable description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Create the working copy and check it out
    #[arg(long)]
    pub init: bool,
}

/// Execute the `add` command.
pub fn execute(args: AddArgs, ctx: &Context) -> Result<()> {
    let out = &ctx.output;

    if let Some(commit) = &args.commit {
        if !is_commit_id(commit) {
            anyhow::bail!("'{}' is not a commit id (expected 7 to 64 hex digits)", commit);
        }
    }

    let path = manifest::normalize_path(&args.path);
    let name = args.name.clone().unwrap_or_else(|| default_name(&path));
    if name.is_empty() {
        anyhow::bail!("Cannot derive a submodule name from '{}'; pass --name", args.path);
    }

    let mut manifest = if ctx.manifest_path.exists() {
        ctx.load_manifest()?
    } else {
        let prompt = format!(
            "{} does not exist. Create it?",
            ctx.manifest_path.display()
        );
        if !ctx.confirmer().confirm(&prompt)? {
            println!("Aborted, nothing was written.");
            return Ok(());
        }
        Manifest::new()
    };

    let mut entry = SubmoduleEntry::new(path.clone(), args.url.clone());
    entry.tag = args.tag.clone();
    entry.branch = args.branch.clone();
    entry.commit = args.commit.clone();
    entry.description = args.description.clone();
    manifest.add_entry(&name, entry)?;

    if args.init {
        let backend = ctx.backend()?;
        initialize(&backend, &mut manifest, &name, args.latest, ctx)?;
    } else if resolve::resolve(&name, manifest.entry(&name)?).is_err() {
        println!(
            "{} {} has no tag, branch or commit yet; run `submanifest update {}` after checking it out",
            emoji(out, "⚠️ ", "[WARN]"),
            name,
            name
        );
    }

    manifest.touch(Utc::now());
    ctx.save_manifest(&manifest)?;
    println!(
        "{} Added {} ({}) to {}",
        emoji(out, "✅", "[OK]"),
        name,
        path,
        ctx.manifest_path.display()
    );
    Ok(())
}

/// Create the working copy of `name` and bring the manifest entry in line
/// with it.
fn initialize(
    backend: &dyn VcsBackend,
    manifest: &mut Manifest,
    name: &str,
    latest: bool,
    ctx: &Context,
) -> Result<()> {
    let out = &ctx.output;
    let names = [name.to_string()];

    for (_, outcome) in sync::initialize_missing(backend, manifest, &names)? {
        if let InitOutcome::Failed(e) = outcome {
            return Err(e.into());
        }
    }

    let path = manifest.entry(name)?.path.clone();
    let work_tree = Path::new(&path);

    if latest {
        let tags = backend.list_tags(work_tree, VERSION_TAG_PATTERN)?;
        match version::latest_version(&tags, ctx.settings.latest_policy, None) {
            Some((tag, _)) => {
                info!("{}: latest version tag is {}", name, tag);
                manifest
                    .entry_mut(name)?
                    .pin(&ResolvedRef::new(RefKind::Tag, tag));
            }
            None => println!(
                "{} {} has no version tags, recording its commit instead",
                emoji(out, "⚠️ ", "[WARN]"),
                name
            ),
        }
    }

    match resolve::resolve(name, manifest.entry(name)?) {
        Ok(target) => {
            sync::checkout(backend, work_tree, &target)?;
            println!("{} {} at {}", emoji(out, "📥", "[INIT]"), name, target);
        }
        Err(_) => {
            let commit = backend.current_commit(work_tree)?;
            println!(
                "{} {} recorded at {}",
                emoji(out, "📥", "[INIT]"),
                name,
                short_commit(&commit)
            );
            manifest.entry_mut(name)?.commit = Some(commit);
        }
    }
    Ok(())
}

fn default_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}
