//! # Checkout Command Implementation
//!
//! This module implements the `checkout` subcommand, which brings every
//! submodule's working copy to the reference declared in the manifest.
//!
//! ## Functionality
//!
//! - **Resolution**: Each entry's tag, branch or commit is chosen by
//!   precedence (tag first, then branch, then commit).
//! - **Selection**: Names given on the command line restrict the run to those
//!   submodules; without names every entry is processed.
//! - **Initialization**: With `--init`, missing working copies are cloned from
//!   the entry's `url` first.
//! - **Isolation**: A failing submodule is reported and the run continues; the
//!   command exits non-zero at the end if anything failed.
//!
//! The manifest itself is never modified by this command.

use anyhow::Result;
use clap::Args;

use submanifest::output::emoji;
use submanifest::sync;

use crate::cli::Context;

/// Check out submodules at their manifest versions
#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Submodules to check out (all when omitted)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Initialize missing working copies before checking out
    #[arg(long)]
    pub init: bool,
}

/// Execute the `checkout` command.
pub fn execute(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let out = &ctx.output;
    let manifest = ctx.load_manifest()?;
    let backend = ctx.backend()?;

    println!(
        "{} Checking out submodules from {}",
        emoji(out, "🔍", "[SCAN]"),
        ctx.manifest_path.display()
    );

    if args.init {
        let outcomes = sync::initialize_missing(&backend, &manifest, &args.names)?;
        super::print_init_outcomes(out, &outcomes);
    }

    let report = sync::synchronize_selected(&backend, &manifest, &args.names)?;
    super::print_sync_report(out, &report);
    super::finish_sync(out, &report)
}
