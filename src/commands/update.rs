//! # Update Command Implementation
//!
//! This module implements the `update` subcommand, which records the commit
//! each submodule's working copy is currently at into the manifest.
//!
//! ## Functionality
//!
//! - **Capture**: For every initialized working copy, the current commit is
//!   written into the entry's `commit` field. Declared tags and branches are
//!   left alone, since they express intent rather than observed state.
//! - **Skipping**: Submodules without a working copy are reported and skipped.
//! - **Atomic Write**: The manifest is written to a temporary file and renamed
//!   over the original, with `last_updated` set to the capture time.
//! - **Dry Run**: `--dry-run` shows what would change without writing.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use console::Color;

use submanifest::output::{emoji, paint, short_commit};
use submanifest::sync::{self, CaptureOutcome};

use crate::cli::Context;

/// Record current submodule commits in the manifest
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Submodules to capture (all when omitted)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Show what would be recorded without writing the manifest
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the `update` command.
pub fn execute(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let out = &ctx.output;
    let mut manifest = ctx.load_manifest()?;
    let backend = ctx.backend()?;

    println!(
        "{} Capturing submodule commits into {}",
        emoji(out, "📋", "[SCAN]"),
        ctx.manifest_path.display()
    );

    let report = sync::capture_selected(&backend, &mut manifest, &args.names, Utc::now())?;

    for entry in &report.entries {
        match &entry.outcome {
            CaptureOutcome::Recorded { previous, commit } if entry.changed() => println!(
                "{} {}: {} → {}",
                emoji(out, "🔄", "[CHANGED]"),
                entry.name,
                previous.as_deref().map(short_commit).unwrap_or("none"),
                short_commit(commit)
            ),
            CaptureOutcome::Recorded { commit, .. } => println!(
                "{} {}: {} (unchanged)",
                emoji(out, "✅", "[OK]"),
                entry.name,
                short_commit(commit)
            ),
            CaptureOutcome::Skipped => println!(
                "{} {}: not initialized, skipped",
                emoji(out, "⏭️ ", "[SKIP]"),
                entry.name
            ),
            CaptureOutcome::Failed(e) => println!(
                "{} {}: {}",
                emoji(out, "❌", "[ERR]"),
                entry.name,
                paint(out, &e.to_string(), Color::Red)
            ),
        }
    }

    if args.dry_run {
        println!(
            "\n{} Dry run mode - no changes will be made.",
            emoji(out, "ℹ️ ", "[INFO]")
        );
    } else {
        ctx.save_manifest(&manifest)?;
        println!(
            "\n{} Recorded {} change(s) in {}",
            emoji(out, "✅", "[OK]"),
            report.changed(),
            ctx.manifest_path.display()
        );
    }

    let failed = report.failures().count();
    if failed > 0 {
        anyhow::bail!(
            "{} of {} submodules could not be captured",
            failed,
            report.entries.len()
        );
    }
    Ok(())
}
