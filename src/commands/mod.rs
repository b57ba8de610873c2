//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `submanifest` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and the shared
//!   [`Context`](crate::cli::Context) and performs the command's logic.
//!
//! Commands that process several submodules print one line per submodule and
//! return an error at the end when any of them failed, which the binary turns
//! into exit code 1.

pub mod add;
pub mod bump;
pub mod checkout;
pub mod completions;
pub mod init;
pub mod status;
pub mod update;

use submanifest::output::{emoji, paint, OutputConfig};
use submanifest::sync::{InitOutcome, SyncOutcome, SyncReport};

use console::Color;

/// Print one line per entry of a checkout report.
pub(crate) fn print_sync_report(out: &OutputConfig, report: &SyncReport) {
    for entry in &report.entries {
        match &entry.outcome {
            SyncOutcome::CheckedOut(resolved) => println!(
                "{} {} ({}) at {}",
                emoji(out, "✅", "[OK]"),
                entry.name,
                entry.path,
                resolved
            ),
            SyncOutcome::Failed(e) => println!(
                "{} {} ({}): {}",
                emoji(out, "❌", "[ERR]"),
                entry.name,
                entry.path,
                paint(out, &e.to_string(), Color::Red)
            ),
        }
    }
}

/// Print initialization outcomes, skipping entries that already existed.
/// Returns the number of failures.
pub(crate) fn print_init_outcomes(out: &OutputConfig, outcomes: &[(String, InitOutcome)]) -> usize {
    let mut failed = 0;
    for (name, outcome) in outcomes {
        match outcome {
            InitOutcome::AlreadyInitialized => {}
            InitOutcome::Initialized => {
                println!("{} {}: initialized", emoji(out, "📥", "[INIT]"), name)
            }
            InitOutcome::Failed(e) => {
                failed += 1;
                println!(
                    "{} {}: {}",
                    emoji(out, "❌", "[ERR]"),
                    name,
                    paint(out, &e.to_string(), Color::Red)
                );
            }
        }
    }
    failed
}

/// Summary line plus an error when anything failed.
pub(crate) fn finish_sync(out: &OutputConfig, report: &SyncReport) -> anyhow::Result<()> {
    let total = report.entries.len();
    let failed = total - report.succeeded();

    if failed == 0 {
        println!(
            "\n{} {} submodule(s) checked out",
            emoji(out, "✅", "[OK]"),
            total
        );
        return Ok(());
    }

    println!("\n{} Failed submodules:", emoji(out, "⚠️ ", "[WARN]"));
    for (name, e) in report.failures() {
        println!("   {} [{}]", name, e.kind());
    }
    anyhow::bail!("{} of {} submodules failed to check out", failed, total)
}
