//! # Status Command Implementation
//!
//! This module implements the `status` subcommand, a read-only report that
//! compares each submodule's working copy with the reference declared in the
//! manifest. Nothing is fetched; the report reflects local state only.
//!
//! With `--check` the command exits non-zero when any submodule is not at its
//! declared reference, which makes it usable as a CI gate.

use anyhow::Result;
use clap::Args;
use console::Color;

use submanifest::output::{emoji, paint, short_commit, OutputConfig};
use submanifest::sync::{self, Drift, EntryStatus};

use crate::cli::Context;

/// Show how submodules compare with the manifest
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Exit with an error when any submodule is not at its declared version
    #[arg(long)]
    pub check: bool,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs, ctx: &Context) -> Result<()> {
    let out = &ctx.output;
    let manifest = ctx.load_manifest()?;
    let backend = ctx.backend()?;

    println!(
        "{} Submodule status ({})",
        emoji(out, "📊", "[INFO]"),
        ctx.manifest_path.display()
    );
    if let Some(ts) = manifest.last_updated {
        println!("   Last updated: {}", ts.to_rfc3339());
    }
    println!();

    let statuses = sync::status(&backend, &manifest);
    for status in &statuses {
        print_status(out, status);
    }

    let out_of_sync = statuses
        .iter()
        .filter(|s| s.drift != Drift::InSync)
        .count();
    println!(
        "\n{} of {} submodule(s) in sync",
        statuses.len() - out_of_sync,
        statuses.len()
    );

    if args.check && out_of_sync > 0 {
        anyhow::bail!("{} submodule(s) are not at their declared version", out_of_sync);
    }
    Ok(())
}

fn print_status(out: &OutputConfig, status: &EntryStatus) {
    let (marker, label) = match status.drift {
        Drift::InSync => (emoji(out, "✅", "[OK]"), paint(out, "in sync", Color::Green)),
        Drift::Drifted => (emoji(out, "🔄", "[DRIFT]"), paint(out, "drifted", Color::Yellow)),
        Drift::NotInitialized => (
            emoji(out, "⏭️ ", "[MISSING]"),
            paint(out, "not initialized", Color::Red),
        ),
        Drift::Unresolvable => (
            emoji(out, "❓", "[NOREF]"),
            paint(out, "no tag, branch or commit", Color::Red),
        ),
    };

    println!("{} {} ({}) - {}", marker, status.name, status.path, label);

    if let Some(target) = &status.target {
        println!("   Declared: {}", target);
    }

    if let Some(commit) = &status.current_commit {
        let mut current = short_commit(commit).to_string();
        if let Some(tag) = &status.exact_tag {
            current.push_str(&format!(" (tag {})", tag));
        }
        if let Some(branch) = &status.branch {
            current.push_str(&format!(" (branch {})", branch));
        }
        println!("   Current:  {}", current);
    }
}
