//! Git access for modpin
//!
//! modpin talks to remotes through the system `git` binary rather than an
//! embedded library, so SSH agents, credential helpers and `insteadOf`
//! rewrites configured for the user apply unchanged.
//!
//! The validator only needs two capabilities, captured by [`RemoteGit`]:
//!
//! - list the references a remote advertises (`git ls-remote --symref`)
//! - clone a remote into a scratch directory and resolve a commit there
//!
//! [`SystemGit`] implements both on top of [`command_builder::GitCommand`];
//! tests substitute their own implementation so the validation logic can be
//! exercised without network access.
//!
//! # Timeouts
//!
//! Every remote call carries an explicit timeout. A listing or clone that
//! exceeds it is killed and reported as [`ModpinError::GitTimeout`].
//!
//! [`ModpinError::GitTimeout`]: crate::core::ModpinError::GitTimeout

pub mod command_builder;
#[cfg(test)]
mod tests;

use anyhow::Result;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::constants::{GIT_CLONE_TIMEOUT, GIT_LS_REMOTE_TIMEOUT};
use crate::git::command_builder::GitCommand;

/// The remote operations the reference validator depends on.
pub trait RemoteGit {
    /// Return the raw reference listing advertised by `url`.
    ///
    /// Each line is `<sha>\t<refname>`; the symbolic default branch appears
    /// as `ref: refs/heads/<branch>\tHEAD`.
    fn list_remote_refs(&self, url: &str) -> impl Future<Output = Result<String>> + Send;

    /// Clone `url` into `workdir` and report whether `candidate` resolves to
    /// a commit object there.
    ///
    /// `Ok(false)` means the clone succeeded but the commit does not exist;
    /// errors mean the repository itself could not be fetched.
    fn resolve_commit(
        &self,
        url: &str,
        candidate: &str,
        workdir: &Path,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// [`RemoteGit`] backed by the system `git` binary.
#[derive(Debug, Clone)]
pub struct SystemGit {
    ls_remote_timeout: Duration,
    clone_timeout: Duration,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new(GIT_LS_REMOTE_TIMEOUT, GIT_CLONE_TIMEOUT)
    }
}

impl SystemGit {
    #[must_use]
    pub const fn new(ls_remote_timeout: Duration, clone_timeout: Duration) -> Self {
        Self {
            ls_remote_timeout,
            clone_timeout,
        }
    }
}

impl RemoteGit for SystemGit {
    async fn list_remote_refs(&self, url: &str) -> Result<String> {
        GitCommand::ls_remote(url)
            .with_timeout(Some(self.ls_remote_timeout))
            .with_context(url)
            .execute_stdout()
            .await
    }

    async fn resolve_commit(&self, url: &str, candidate: &str, workdir: &Path) -> Result<bool> {
        GitCommand::clone_for_lookup(url, workdir)
            .with_timeout(Some(self.clone_timeout))
            .with_context(url)
            .execute_success()
            .await?;

        let resolved =
            GitCommand::verify_commit(candidate).current_dir(workdir).with_context(url).execute().await;

        Ok(resolved.is_ok())
    }
}

/// Name of the git executable for the current platform.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if cfg!(windows) {
        "git.exe"
    } else {
        "git"
    }
}

/// Checks whether git can be found in PATH.
#[must_use]
pub fn is_git_installed() -> bool {
    which::which(get_git_command()).is_ok()
}
