//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use dialoguer::theme::ColorfulTheme;

use submanifest::backend::GitBackend;
use submanifest::config::{AssumeYes, Confirm, Settings};
use submanifest::defaults::{
    default_root_for, DEFAULT_MANIFEST_FILENAME, DEFAULT_REMOTE, MANIFEST_ENV,
};
use submanifest::error::Error;
use submanifest::manifest::{self, Manifest};
use submanifest::output::OutputConfig;
use submanifest::version::LatestPolicy;

use crate::commands;

/// Submanifest - Pin git submodules to versions recorded in a JSON manifest
#[derive(Parser, Debug)]
#[command(name = "submanifest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the version manifest
    #[arg(
        short = 'f',
        long,
        global = true,
        value_name = "FILE",
        env = MANIFEST_ENV,
        default_value = DEFAULT_MANIFEST_FILENAME
    )]
    manifest: PathBuf,

    /// Parent repository root (defaults to the manifest's directory)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Remote used for fetching and pushing
    #[arg(long, global = true, value_name = "NAME", default_value = DEFAULT_REMOTE)]
    remote: String,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    /// Tags considered when looking up the latest version (any, current-major, major:N)
    #[arg(
        long,
        global = true,
        value_name = "SCOPE",
        env = "SUBMANIFEST_LATEST_SCOPE",
        default_value = "any"
    )]
    latest_scope: LatestPolicy,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check out every submodule at the version recorded in the manifest
    Checkout(commands::checkout::CheckoutArgs),

    /// Record the currently checked-out commit of each submodule in the manifest
    Update(commands::update::UpdateArgs),

    /// Compare each submodule's working copy with the manifest
    Status(commands::status::StatusArgs),

    /// Create missing working copies and check them out
    Init(commands::init::InitArgs),

    /// Start tracking a new submodule in the manifest
    Add(commands::add::AddArgs),

    /// Create the next major, minor or fix version tag on a submodule
    Bump(commands::bump::BumpArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub manifest_path: PathBuf,
    pub root: PathBuf,
    pub settings: Settings,
    pub output: OutputConfig,
}

impl Context {
    /// Load and validate the manifest.
    pub fn load_manifest(&self) -> Result<Manifest> {
        manifest::from_file(&self.manifest_path).with_context(|| {
            format!(
                "Failed to load manifest from {}",
                self.manifest_path.display()
            )
        })
    }

    /// Write the manifest back atomically.
    pub fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        manifest.save(&self.manifest_path).with_context(|| {
            format!(
                "Failed to write manifest to {}",
                self.manifest_path.display()
            )
        })
    }

    /// Git backend rooted at the parent repository.
    pub fn backend(&self) -> Result<GitBackend> {
        Ok(GitBackend::detect(&self.root)?.with_remote(&self.settings.remote))
    }

    /// Prompt on the terminal, or approve everything with `--yes`.
    pub fn confirmer(&self) -> Box<dyn Confirm> {
        if self.settings.assume_yes {
            Box::new(AssumeYes)
        } else {
            Box::new(TerminalConfirm)
        }
    }
}

struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> submanifest::error::Result<bool> {
        dialoguer::Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
    }
}

fn init_logging(level: &str) {
    // RUST_LOG, when set, takes precedence over --log-level.
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let root = self
            .root
            .clone()
            .unwrap_or_else(|| default_root_for(&self.manifest));
        let ctx = Context {
            manifest_path: self.manifest,
            root,
            settings: Settings {
                assume_yes: self.yes,
                latest_policy: self.latest_scope,
                remote: self.remote,
            },
            output: OutputConfig::from_env_and_flag(&self.color),
        };

        match self.command {
            Commands::Checkout(args) => commands::checkout::execute(args, &ctx),
            Commands::Update(args) => commands::update::execute(args, &ctx),
            Commands::Status(args) => commands::status::execute(args, &ctx),
            Commands::Init(args) => commands::init::execute(args, &ctx),
            Commands::Add(args) => commands::add::execute(args, &ctx),
            Commands::Bump(args) => commands::bump::execute(args, &ctx),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
