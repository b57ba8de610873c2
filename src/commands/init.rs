//! # Init Command Implementation
//!
//! This module implements the `init` subcommand, which creates the working
//! copies of submodules that do not exist yet and checks them out at their
//! manifest versions.
//!
//! A working copy is created through the parent repository's submodule
//! registration when there is one, and by cloning the entry's `url`
//! otherwise. Submodules that already exist are checked out but not re-cloned.

use anyhow::Result;
use clap::Args;

use submanifest::output::emoji;
use submanifest::sync::{self, InitOutcome};

use crate::cli::Context;

/// Initialize missing submodules and check them out
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Submodules to initialize (all when omitted)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Only create the working copies, do not check out manifest versions
    #[arg(long)]
    pub no_checkout: bool,
}

/// Execute the `init` command.
pub fn execute(args: InitArgs, ctx: &Context) -> Result<()> {
    let out = &ctx.output;
    let manifest = ctx.load_manifest()?;
    let backend = ctx.backend()?;

    println!(
        "{} Initializing submodules from {}",
        emoji(out, "📥", "[INIT]"),
        ctx.manifest_path.display()
    );

    let outcomes = sync::initialize_missing(&backend, &manifest, &args.names)?;
    let init_failed = super::print_init_outcomes(out, &outcomes);

    // Entries that could not be created are already reported above.
    let ready: Vec<String> = outcomes
        .iter()
        .filter(|(_, o)| !matches!(o, InitOutcome::Failed(_)))
        .map(|(name, _)| name.clone())
        .collect();

    if !args.no_checkout && !ready.is_empty() {
        let report = sync::synchronize_selected(&backend, &manifest, &ready)?;
        super::print_sync_report(out, &report);
        let checkout = super::finish_sync(out, &report);
        if init_failed > 0 {
            anyhow::bail!("{} submodule(s) could not be initialized", init_failed);
        }
        return checkout;
    }

    if init_failed > 0 {
        anyhow::bail!("{} submodule(s) could not be initialized", init_failed);
    }
    println!(
        "\n{} {} submodule(s) ready",
        emoji(out, "✅", "[OK]"),
        outcomes.len()
    );
    Ok(())
}
