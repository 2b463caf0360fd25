//! Type-safe Git command builder for consistent command execution
//!
//! This module provides a fluent API for building and executing Git commands,
//! so every invocation gets the same timeout handling, logging and error
//! mapping.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::constants::GIT_LOCAL_TIMEOUT;
use crate::core::ModpinError;

use super::get_git_command;

/// Builder for constructing and executing Git commands.
///
/// # Examples
///
/// ```rust,no_run
/// use modpin::git::command_builder::GitCommand;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let listing = GitCommand::ls_remote("https://github.com/example/repo.git")
///     .with_timeout(Some(Duration::from_secs(30)))
///     .with_context("acme-profile")
///     .execute_stdout()
///     .await?;
/// # Ok(())
/// # }
/// ```
///
/// # Default Configuration
///
/// - **Timeout**: [`GIT_LOCAL_TIMEOUT`]; network commands override it
/// - **Output capture**: always; git never writes to the terminal
/// - **Prompts**: `GIT_TERMINAL_PROMPT=0`, so missing credentials fail
///   instead of blocking on stdin
/// - **Cancellation**: the child is killed when the returned future is dropped
pub struct GitCommand {
    /// Command arguments to pass to Git (e.g., ["ls-remote", "--symref", url])
    args: Vec<String>,

    /// Working directory passed to git with `-C`
    current_dir: Option<PathBuf>,

    /// Environment variables to set for the Git process
    env_vars: Vec<(String, String)>,

    /// Maximum duration to wait for command completion (None = no timeout)
    timeout_duration: Option<Duration>,

    /// Optional context string for log messages (typically the module name)
    context: Option<String>,

    /// For clone commands, store the URL for better error messages
    clone_url: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            env_vars: vec![("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())],
            timeout_duration: Some(GIT_LOCAL_TIMEOUT),
            context: None,
            clone_url: None,
        }
    }
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run git in `dir` (passed as `git -C <dir>`).
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Set a custom timeout for the command (None for no timeout)
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Set a context for logging (e.g., module name)
    ///
    /// With context, log messages include the identifier:
    /// ```text
    /// (acme-profile) Executing command: git ls-remote --symref -- https://...
    /// ```
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn log_prefix(&self) -> String {
        self.context.as_ref().map(|ctx| format!("({ctx}) ")).unwrap_or_default()
    }

    /// The git subcommand, skipping the `-C <dir>` prefix.
    fn operation(&self) -> String {
        self.args.first().cloned().unwrap_or_else(|| "unknown".to_string())
    }

    /// Execute the command and return the output
    ///
    /// # Errors
    ///
    /// - [`ModpinError::GitNotFound`] if the git binary cannot be spawned
    /// - [`ModpinError::GitTimeout`] if the timeout elapses (the process is killed)
    /// - [`ModpinError::GitCloneFailed`] if a clone exits unsuccessfully
    /// - [`ModpinError::GitCommandError`] for any other unsuccessful exit
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let start = std::time::Instant::now();
        let git_command = get_git_command();
        let prefix = self.log_prefix();
        let operation = self.operation();

        let mut full_args = Vec::new();
        if let Some(ref dir) = self.current_dir {
            full_args.push("-C".to_string());
            full_args.push(dir.display().to_string());
        }
        full_args.extend(self.args.iter().cloned());

        let mut cmd = Command::new(git_command);
        cmd.args(&full_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            target: "git",
            "{}Executing command: {} {}",
            prefix,
            git_command,
            full_args.join(" ")
        );

        for (key, value) in &self.env_vars {
            tracing::trace!(target: "git", "Setting env var: {}={}", key, value);
            cmd.env(key, value);
        }

        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            if let Ok(result) = timeout(duration, output_future).await {
                result
            } else {
                tracing::warn!(
                    target: "git",
                    "{}Command timed out after {} seconds: git {}",
                    prefix,
                    duration.as_secs(),
                    operation
                );
                return Err(ModpinError::GitTimeout {
                    operation,
                    seconds: duration.as_secs(),
                }
                .into());
            }
        } else {
            tracing::trace!(target: "git", "Executing command without timeout");
            output_future.await
        };

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ModpinError::GitNotFound.into());
            }
            Err(e) => {
                return Err(e).context(format!("Failed to execute git {}", full_args.join(" ")));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "git",
                "{}Command failed with exit code: {:?}",
                prefix,
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "git", "{}Error: {}", prefix, stderr.trim());
            }

            let error = match self.clone_url {
                Some(url) => ModpinError::GitCloneFailed {
                    url,
                    reason: stderr,
                },
                None => ModpinError::GitCommandError {
                    operation,
                    stderr: if stderr.is_empty() {
                        stdout
                    } else {
                        stderr
                    },
                },
            };
            return Err(error.into());
        }

        if !stdout.is_empty() {
            tracing::trace!(target: "git", "{}{}", prefix, stdout.trim());
        }
        if !stderr.is_empty() {
            tracing::debug!(target: "git", "{}{}", prefix, stderr.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(target: "git::perf", "{}Git {} took {:.2}s", prefix, operation, elapsed.as_secs_f64());
        } else if elapsed.as_millis() > 100 {
            tracing::debug!(target: "git::perf", "{}Git {} took {}ms", prefix, operation, elapsed.as_millis());
        }

        Ok(GitCommandOutput {
            stdout,
        })
    }

    /// Execute and return trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        let output = self.execute().await?;
        Ok(output.stdout.trim().to_string())
    }

    /// Execute and discard output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await?;
        Ok(())
    }
}

/// Output from a Git command
#[derive(Debug)]
pub struct GitCommandOutput {
    pub stdout: String,
}

// Convenience builders for the operations modpin performs

impl GitCommand {
    /// `git ls-remote --symref -- <url>`: every advertised ref plus the
    /// symbolic `HEAD` line.
    pub fn ls_remote(url: &str) -> Self {
        Self::new().args(["ls-remote", "--symref", "--", url])
    }

    /// Bare, tag-less clone used to look up commit objects.
    ///
    /// Remote URLs are cloned blobless (`--filter=blob:none`): commits and
    /// trees only. Local repositories do not honour filters, so they get a
    /// plain bare clone.
    pub fn clone_for_lookup(url: &str, target: impl AsRef<Path>) -> Self {
        let mut args =
            vec!["clone".to_string(), "--bare".to_string(), "--no-tags".to_string(), "--quiet".to_string()];

        if !is_local_url(url) {
            args.push("--filter=blob:none".to_string());
        }

        args.extend(["--".to_string(), url.to_string(), target.as_ref().display().to_string()]);

        let mut cmd = Self::new().args(args);
        cmd.clone_url = Some(url.to_string());
        cmd
    }

    /// Resolve `reference` to a commit object; fails if it does not exist.
    pub fn verify_commit(reference: &str) -> Self {
        Self::new().args([
            "rev-parse",
            "--verify",
            "--quiet",
            "--end-of-options",
            &format!("{reference}^{{commit}}"),
        ])
    }

    pub fn version() -> Self {
        Self::new().arg("--version")
    }
}

/// Local paths and `file://` URLs, which git serves without a transport.
fn is_local_url(url: &str) -> bool {
    url.starts_with("file://")
        || url.starts_with('/')
        || url.starts_with('.')
        || url.starts_with('~')
        || (url.len() > 1 && url.chars().nth(1) == Some(':') && !url.contains('@'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_basic() {
        let cmd = GitCommand::new().arg("status").arg("--short");
        assert_eq!(cmd.args, vec!["status", "--short"]);
    }

    #[test]
    fn test_prompts_disabled_by_default() {
        let cmd = GitCommand::new();
        assert!(cmd.env_vars.contains(&("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())));
    }

    #[test]
    fn test_command_builder_with_dir() {
        let cmd = GitCommand::new().current_dir("/tmp/repo").arg("status");
        assert_eq!(cmd.current_dir, Some(PathBuf::from("/tmp/repo")));
    }

    #[test]
    fn test_ls_remote_builder() {
        let cmd = GitCommand::ls_remote("https://example.com/repo.git");
        assert_eq!(cmd.args, vec!["ls-remote", "--symref", "--", "https://example.com/repo.git"]);
        assert_eq!(cmd.operation(), "ls-remote");
    }

    #[test]
    fn test_clone_for_lookup_remote_is_blobless() {
        let cmd = GitCommand::clone_for_lookup("https://example.com/repo.git", "/tmp/target");
        assert_eq!(&cmd.args[..4], &["clone", "--bare", "--no-tags", "--quiet"]);
        assert!(cmd.args.contains(&"--filter=blob:none".to_string()));
        assert_eq!(cmd.clone_url.as_deref(), Some("https://example.com/repo.git"));
    }

    #[test]
    fn test_clone_for_lookup_local_has_no_filter() {
        let cmd = GitCommand::clone_for_lookup("file:///srv/git/repo.git", "/tmp/target");
        assert!(!cmd.args.contains(&"--filter=blob:none".to_string()));
        let cmd = GitCommand::clone_for_lookup("/srv/git/repo.git", "/tmp/target");
        assert!(!cmd.args.contains(&"--filter=blob:none".to_string()));
    }

    #[test]
    fn test_scp_style_url_is_remote() {
        assert!(!is_local_url("git@github.com:org/repo.git"));
        assert!(is_local_url("C:\\repos\\profile"));
    }

    #[test]
    fn test_verify_commit_builder() {
        let cmd = GitCommand::verify_commit("abc123");
        assert_eq!(cmd.args.last().map(String::as_str), Some("abc123^{commit}"));
        assert!(cmd.args.contains(&"--end-of-options".to_string()));
    }

    #[tokio::test]
    async fn test_git_version_executes() {
        let output = GitCommand::version().execute().await.unwrap();
        assert!(output.stdout.starts_with("git version"));
    }

    #[tokio::test]
    async fn test_failed_command_maps_to_git_command_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let err = GitCommand::new()
            .current_dir(temp.path())
            .args(["rev-parse", "--verify", "HEAD"])
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModpinError>(),
            Some(ModpinError::GitCommandError { operation, .. }) if operation == "rev-parse"
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hung_remote_times_out() {
        // The fake ssh transport never answers, like a stalled connection.
        let err = GitCommand::ls_remote("ssh://example.invalid/repo.git")
            .env("GIT_SSH_COMMAND", "sleep 5; true")
            .with_timeout(Some(Duration::from_millis(200)))
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModpinError>(),
            Some(ModpinError::GitTimeout { operation, .. }) if operation == "ls-remote"
        ));
    }
}
