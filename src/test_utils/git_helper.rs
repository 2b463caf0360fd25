//! Git fixture helpers for tests.
//!
//! These use `std::process::Command` directly (not [`GitCommand`]) so that
//! fixture setup stays independent of the code under test.
//!
//! [`GitCommand`]: crate::git::command_builder::GitCommand

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Runs git commands inside one repository.
pub struct TestGit {
    repo_path: PathBuf,
}

impl TestGit {
    fn run_git_command(&self, args: &[&str], action: &str) -> Result<std::process::Output> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .with_context(|| action.to_string())?;

        if !output.status.success() {
            bail!("{} failed: {}", action, String::from_utf8_lossy(&output.stderr));
        }

        Ok(output)
    }

    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// `git init` with a fixed initial branch so tests do not depend on the
    /// user's `init.defaultBranch`.
    pub fn init(&self) -> Result<()> {
        self.run_git_command(&["init", "--initial-branch=main"], "Failed to initialize git repository")?;
        Ok(())
    }

    pub fn config_user(&self) -> Result<()> {
        self.run_git_command(
            &["config", "user.email", "test@modpin.example"],
            "Failed to configure git user email",
        )?;
        self.run_git_command(&["config", "user.name", "Test User"], "Failed to configure git user name")?;
        self.run_git_command(&["config", "commit.gpgsign", "false"], "Failed to disable commit signing")?;
        Ok(())
    }

    pub fn add_all(&self) -> Result<()> {
        self.run_git_command(&["add", "."], "Failed to add files to git")?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run_git_command(&["commit", "-m", message], "Failed to create git commit")?;
        Ok(())
    }

    pub fn tag(&self, tag_name: &str) -> Result<()> {
        self.run_git_command(&["tag", tag_name], &format!("Failed to create tag: {tag_name}"))?;
        Ok(())
    }

    /// Create a branch at HEAD without switching to it.
    pub fn branch(&self, branch_name: &str) -> Result<()> {
        self.run_git_command(&["branch", branch_name], &format!("Failed to create branch: {branch_name}"))?;
        Ok(())
    }

    pub fn rev_parse_head(&self) -> Result<String> {
        let output = self.run_git_command(&["rev-parse", "HEAD"], "Failed to get current commit SHA")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Write `content` to `file`, stage it and commit; returns the new SHA.
    pub fn commit_file(&self, file: &str, content: &str, message: &str) -> Result<String> {
        std::fs::write(self.repo_path.join(file), content)
            .with_context(|| format!("Failed to write {file}"))?;
        self.add_all()?;
        self.commit(message)?;
        self.rev_parse_head()
    }
}

/// A local repository usable as a git remote through a `file://` URL.
///
/// Layout of the history:
///
/// ```text
/// first ── second (tag v1.0.0, branch release-1.x) ── third (main, HEAD)
/// ```
///
/// The third commit is only reachable from `main`; `first_commit` is not the
/// tip of any ref, so it can only be found by inspecting history.
pub struct FixtureRepo {
    _temp_dir: TempDir,
    path: PathBuf,
    pub first_commit: String,
    pub tagged_commit: String,
    pub head_commit: String,
}

impl FixtureRepo {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create fixture directory")?;
        let path = temp_dir.path().join("remote");
        std::fs::create_dir_all(&path).context("Failed to create fixture repository directory")?;

        let git = TestGit::new(&path);
        git.init()?;
        git.config_user()?;
        let first_commit = git.commit_file("metadata.json", "{\"version\": \"0.1.0\"}\n", "Initial commit")?;
        let tagged_commit = git.commit_file("metadata.json", "{\"version\": \"1.0.0\"}\n", "Release 1.0.0")?;
        git.tag("v1.0.0")?;
        git.branch("release-1.x")?;
        let head_commit = git.commit_file("README.md", "# fixture\n", "Add readme")?;

        Ok(Self {
            _temp_dir: temp_dir,
            path,
            first_commit,
            tagged_commit,
            head_commit,
        })
    }

    pub fn file_url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}
