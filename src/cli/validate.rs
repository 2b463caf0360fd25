//! Validate the git references pinned in a Puppetfile.
//!
//! # Examples
//!
//! ```bash
//! modpin                                  # ./Puppetfile
//! modpin environments/production/Puppetfile
//! modpin --exact-refs --format json
//! MODPIN_TIMEOUT=10 modpin --clone-timeout 300
//! ```
//!
//! # Output Formats
//!
//! ## Text (default)
//! ```text
//! NAME                URL                                         REF                     STATUS
//! ──────────────────────────────────────────────────────────────────────────────────────────────
//! acme-profile        https://git.example.com/acme/profile.git    nonexistent-branch-xyz  ✗
//! puppetlabs-apache   https://github.com/puppetlabs/apache.git    v1.0                    ✓
//!
//! 1 of 2 git references are invalid
//! ```
//!
//! ## JSON
//! ```json
//! {
//!   "valid": false,
//!   "total": 2,
//!   "invalid": 1,
//!   "results": [ { "name": "acme-profile", "url": "...", "ref": "...", "is_valid": false, "resolution": "missing" } ]
//! }
//! ```

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::{GlobalConfig, Overrides, Settings};
use crate::constants::DEFAULT_MANIFEST_NAME;
use crate::git::{SystemGit, is_git_installed};
use crate::manifest::{Manifest, resolve_manifest_path};
use crate::report::Report;
use crate::validator::RefValidator;

/// Arguments of a validation run.
#[derive(Args, Debug, Clone)]
pub struct ValidateCommand {
    /// Puppetfile to validate (default: ./Puppetfile)
    #[arg(value_name = "PUPPETFILE", env = "MODPIN_PUPPETFILE")]
    pub puppetfile: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Match whole ref names instead of any substring of the remote's ref listing
    #[arg(long)]
    pub exact_refs: bool,

    /// Timeout for listing a remote's refs, in seconds
    #[arg(long, value_name = "SECS", env = "MODPIN_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Timeout for cloning a remote to look up a commit, in seconds
    #[arg(long, value_name = "SECS", env = "MODPIN_CLONE_TIMEOUT")]
    pub clone_timeout: Option<u64>,
}

/// How the report is written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Coloured table followed by a verdict line.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

impl ValidateCommand {
    fn overrides(&self) -> Overrides {
        Overrides {
            ls_remote_timeout_secs: self.timeout,
            clone_timeout_secs: self.clone_timeout,
            exact_refs: self.exact_refs,
            manifest: self.puppetfile.clone(),
        }
    }

    /// Run the validation and print the report.
    ///
    /// Returns the process exit code: success when every reference resolved,
    /// [`EXIT_INVALID`](crate::constants::EXIT_INVALID) otherwise.
    ///
    /// # Errors
    ///
    /// Fatal problems only: a missing or unreadable manifest, or invalid
    /// settings. Unreachable repositories, and a missing git binary, are
    /// reported as invalid rows instead.
    ///
    /// A manifest named on the command line is located before the config
    /// file is read, so a missing manifest is reported as such even when the
    /// config is broken. Without one, the config may name the manifest and
    /// is read first.
    pub async fn execute(self, config_path: Option<PathBuf>, quiet: bool) -> Result<i32> {
        let working_dir =
            std::env::current_dir().context("Failed to determine current directory")?;
        let explicit = self
            .puppetfile
            .as_deref()
            .map(|path| resolve_manifest_path(Some(path), &working_dir, DEFAULT_MANIFEST_NAME))
            .transpose()?;

        let config = GlobalConfig::load_with_optional(config_path).await?;
        let settings = Settings::resolve(&config, self.overrides())?;
        let path = match explicit {
            Some(path) => path,
            None => resolve_manifest_path(
                settings.manifest.as_deref(),
                &working_dir,
                DEFAULT_MANIFEST_NAME,
            )?,
        };

        let manifest = Manifest::load(&path).await?;
        let dependencies = manifest.remote_dependencies();
        tracing::debug!(
            "{} declarations in {}, {} with a git source",
            manifest.declarations.len(),
            path.display(),
            dependencies.len()
        );

        let results = if dependencies.is_empty() {
            Vec::new()
        } else {
            if !is_git_installed() {
                tracing::warn!("git is not installed or not in PATH; no reference can be verified");
            }
            let git = SystemGit::new(settings.ls_remote_timeout, settings.clone_timeout);
            RefValidator::new(git, settings.match_mode).validate_all(&dependencies).await
        };

        let report = Report::new(results);
        match self.format {
            OutputFormat::Json => println!("{}", report.to_json()?),
            OutputFormat::Text if quiet => println!("{}", report.summary()),
            OutputFormat::Text => print!("{}", report.render_text()),
        }

        Ok(report.exit_code())
    }
}
