//! modpin - validate the git references pinned in a Puppetfile
//!
//! A Puppetfile lists the modules an environment installs. Modules installed
//! from git name a repository and optionally a `ref`, `tag` or `branch`.
//! A typo in one of those, or a branch deleted upstream, is usually only
//! noticed when a deployment fails. modpin checks every such reference
//! against its remote ahead of time.
//!
//! # Pipeline
//!
//! 1. [`manifest`] parses the Puppetfile into declarations and selects the
//!    ones with a `git` source, choosing the pinned reference with the
//!    precedence `ref` > `tag` > `branch` > default branch.
//! 2. [`validator`] checks each reference, first against the remote's
//!    advertised refs and, failing that, as a commit in a temporary clone.
//! 3. [`report`] orders the results (invalid first), renders them and
//!    decides the exit code.
//!
//! # Modules
//!
//! - [`cli`] - argument parsing and the validation command
//! - [`config`] - `~/.modpin/config.toml` and its merge with CLI flags
//! - [`constants`] - timeouts, file names and exit codes
//! - [`core`] - error types and user-facing error rendering
//! - [`git`] - system `git` wrapper behind the [`git::RemoteGit`] trait
//! - [`manifest`] - Puppetfile parsing and git dependency selection
//! - [`report`] - result aggregation and output
//! - [`validator`] - two-tier reference validation
//!
//! # Example
//!
//! ```rust,no_run
//! use modpin::git::SystemGit;
//! use modpin::manifest::Manifest;
//! use modpin::report::Report;
//! use modpin::validator::{MatchMode, RefValidator};
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let manifest = Manifest::load(Path::new("Puppetfile")).await?;
//! let validator = RefValidator::new(SystemGit::default(), MatchMode::Substring);
//! let report = Report::new(validator.validate_all(&manifest.remote_dependencies()).await);
//! print!("{}", report.render_text());
//! std::process::exit(report.exit_code());
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod git;
pub mod manifest;
pub mod report;
pub mod validator;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
