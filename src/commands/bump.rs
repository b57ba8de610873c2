//! # Bump Command Implementation
//!
//! This module implements the `bump` subcommand, which creates the next
//! `vMAJOR.MINOR.FIX` tag in a submodule's working copy.
//!
//! ## Functionality
//!
//! - **Baseline**: The exact version tag on the current commit, or else the
//!   highest version tag eligible under `--latest-scope`, or `0.0.0`.
//! - **Confirmation**: The new tag is created only after confirmation, or right
//!   away with `--yes`. `--dry-run` prints the plan and stops.
//! - **Follow-up**: `--push` pushes the tag, `--commit` commits the updated
//!   submodule pointer in the parent repository, `--apply` pins the manifest
//!   entry to the new tag. Push and commit failures are reported as warnings;
//!   the tag exists either way.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use console::Color;

use submanifest::bump::{self, BumpPlan, ReleaseOptions};
use submanifest::output::{emoji, paint, OutputConfig};
use submanifest::resolve::{RefKind, ResolvedRef};
use submanifest::version::BumpKind;

use crate::cli::Context;

/// Create the next version tag on a submodule
#[derive(Args, Debug)]
pub struct BumpArgs {
    /// Submodule to tag
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Which component to increment (major, minor, fix)
    #[arg(value_name = "KIND")]
    pub kind: BumpKind,

    /// Tag message (defaults to "Release <tag>")
    #[arg(short, long)]
    pub message: Option<String>,

    /// Push the new tag to the remote
    #[arg(long)]
    pub push: bool,

    /// Commit the updated submodule pointer in the parent repository
    #[arg(long)]
    pub commit: bool,

    /// Pin the manifest entry to the new tag
    #[arg(long)]
    pub apply: bool,

    /// Show the planned tag without creating it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the `bump` command.
pub fn execute(args: BumpArgs, ctx: &Context) -> Result<()> {
    let out = &ctx.output;
    let mut manifest = ctx.load_manifest()?;
    let path = manifest.entry(&args.name)?.path.clone();
    let backend = ctx.backend()?;
    let policy = ctx.settings.latest_policy;

    if args.dry_run {
        let plan = bump::bump(&backend, Path::new(&path), args.kind, policy)?;
        print_plan(out, &args.name, &plan);
        println!(
            "\n{} Dry run mode - no tag will be created.",
            emoji(out, "ℹ️ ", "[INFO]")
        );
        return Ok(());
    }

    let options = ReleaseOptions {
        name: args.name.clone(),
        message: args.message.clone(),
        push: args.push,
        commit_parent: args.commit,
    };
    let confirm = ctx.confirmer();
    let (plan, outcome) = bump::bump_and_release(
        &backend,
        Path::new(&path),
        args.kind,
        policy,
        &options,
        &*confirm,
    )?;
    print_plan(out, &args.name, &plan);

    let Some(outcome) = outcome else {
        println!("Aborted, no tag was created.");
        return Ok(());
    };

    println!(
        "{} Created tag {}",
        emoji(out, "🏷️ ", "[TAG]"),
        paint(out, &outcome.tag, Color::Green)
    );
    report_step(out, "Pushed", "Push", &outcome.pushed);
    report_step(out, "Committed", "Parent commit", &outcome.committed);

    if args.apply {
        manifest
            .entry_mut(&args.name)?
            .pin(&ResolvedRef::new(RefKind::Tag, outcome.tag.clone()));
        manifest.touch(Utc::now());
        ctx.save_manifest(&manifest)?;
        println!(
            "{} {} now pinned to {} in {}",
            emoji(out, "✅", "[OK]"),
            args.name,
            outcome.tag,
            ctx.manifest_path.display()
        );
    }
    Ok(())
}

fn print_plan(out: &OutputConfig, name: &str, plan: &BumpPlan) {
    let from = match &plan.baseline_tag {
        Some(tag) if plan.on_tag => format!("{} (current commit)", tag),
        Some(tag) => format!("{} (latest tag)", tag),
        None => "no version tag, starting from 0.0.0".to_string(),
    };
    println!(
        "{} {} {} bump: {} → {}",
        emoji(out, "📦", "[BUMP]"),
        name,
        plan.kind,
        from,
        plan.new_tag
    );
}

fn report_step(
    out: &OutputConfig,
    done: &str,
    step: &str,
    result: &Option<std::result::Result<(), String>>,
) {
    match result {
        None => {}
        Some(Ok(())) => println!("{} {}", emoji(out, "✅", "[OK]"), done),
        Some(Err(e)) => println!(
            "{} {} failed: {}",
            emoji(out, "⚠️ ", "[WARN]"),
            step,
            paint(out, e, Color::Yellow)
        ),
    }
}
