//! Command-line interface for modpin.
//!
//! modpin has a single job, so there are no subcommands: the global flags
//! below are combined with the [`validate::ValidateCommand`] arguments.
//!
//! ```text
//! modpin [OPTIONS] [PUPPETFILE]
//! ```
//!
//! Exit codes: `0` every reference is valid, `1` at least one is invalid,
//! `2` the manifest was not found, `3` any other fatal error, `130`
//! interrupted.

pub mod validate;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

pub use validate::{OutputFormat, ValidateCommand};

/// Check that every git reference pinned in a Puppetfile exists upstream.
#[derive(Parser, Debug)]
#[command(
    name = "modpin",
    version,
    about = "Check that the git references pinned in a Puppetfile exist",
    long_about = "Reads a Puppetfile, finds every module installed from git and checks that \
                  its ref, tag or branch exists in the remote repository. Raw commit pins are \
                  found by cloning the repository into a temporary directory."
)]
pub struct Cli {
    #[command(flatten)]
    pub validate: ValidateCommand,

    /// Show debug logging, including every git command
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Print only the verdict line (and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the global configuration file (default: ~/.modpin/config.toml)
    #[arg(long, value_name = "PATH", env = "MODPIN_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Log filter implied by `--verbose`/`--quiet`, or `None` to defer to
    /// `RUST_LOG`.
    #[must_use]
    pub const fn log_filter(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Run the validation with the configured global settings.
    ///
    /// # Errors
    ///
    /// Returns an error for any fatal condition; see
    /// [`ValidateCommand::execute`].
    pub async fn execute(self) -> Result<i32> {
        self.validate.execute(self.config, self.quiet).await
    }
}
