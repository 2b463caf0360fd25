//! Reference validation
//!
//! Decides, for each git-sourced module, whether its pinned reference exists
//! in the remote repository. The check runs in two tiers:
//!
//! 1. **Advertised refs**: `git ls-remote` lists the remote's branches, tags
//!    and symbolic `HEAD`. If the listing succeeds and mentions the
//!    candidate, the module is valid. No clone is needed.
//! 2. **Commit lookup**: otherwise the candidate may be a commit hash, which
//!    only the object database can confirm. The remote is cloned (bare,
//!    tag-less, blobless where possible) into a scratch directory and the
//!    candidate is resolved there. The scratch directory is removed on every
//!    exit path, including cancellation, because it is owned by a
//!    [`tempfile::TempDir`].
//!
//! Remote failures of any kind (unreachable host, missing repository,
//! authentication, timeout) make that one module invalid. They are logged,
//! never returned, so a single bad entry cannot abort the run.
//!
//! # Matching
//!
//! By default the listing check is a plain substring test, which is
//! permissive: `main` also matches a remote that only has `main-old`.
//! [`MatchMode::Exact`] tightens this to whole ref names.


use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_REFERENCE;
use crate::git::RemoteGit;
use crate::manifest::RemoteDependency;

/// How a candidate reference is matched against the advertised listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The candidate appears anywhere in the listing text.
    #[default]
    Substring,
    /// The candidate equals a ref name, a branch or tag short name, or a
    /// full advertised object id.
    Exact,
}

/// How (or whether) a reference was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Found in the remote's advertised references.
    Advertised,
    /// Found as a commit after cloning the repository.
    Commit,
    /// Not found, or the remote could not be queried.
    Missing,
}

impl Resolution {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Missing)
    }
}

/// Outcome of validating one [`RemoteDependency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub name: String,
    pub url: String,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub is_valid: bool,
    pub resolution: Resolution,
}

impl ValidationResult {
    #[must_use]
    pub fn new(dependency: &RemoteDependency, resolution: Resolution) -> Self {
        Self {
            name: dependency.name.clone(),
            url: dependency.url.clone(),
            reference: dependency.reference.clone(),
            is_valid: resolution.is_valid(),
            resolution,
        }
    }

    /// Display glyph for the status column.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        if self.is_valid {
            "✓"
        } else {
            "✗"
        }
    }
}

/// Validates references against remotes reachable through `G`.
#[derive(Debug, Clone)]
pub struct RefValidator<G> {
    git: G,
    match_mode: MatchMode,
}

impl<G: RemoteGit> RefValidator<G> {
    pub fn new(git: G, match_mode: MatchMode) -> Self {
        Self {
            git,
            match_mode,
        }
    }

    /// Check whether `reference` (or the default branch when `None`) exists
    /// in the repository at `url`.
    pub async fn check(&self, url: &str, reference: Option<&str>) -> Resolution {
        let candidate = reference.unwrap_or(DEFAULT_REFERENCE);

        if candidate.is_empty() {
            tracing::debug!(target: "validator", "Empty reference for {}", url);
            return Resolution::Missing;
        }
        if url.is_empty() || url.starts_with('-') {
            tracing::warn!(target: "validator", "Refusing to query suspicious repository URL '{}'", url);
            return Resolution::Missing;
        }

        match self.git.list_remote_refs(url).await {
            Ok(listing) if listing_contains(&listing, candidate, self.match_mode) => {
                tracing::debug!(target: "validator", "{} is advertised by {}", candidate, url);
                return Resolution::Advertised;
            }
            Ok(_) => {
                tracing::debug!(target: "validator", "{} is not advertised by {}", candidate, url);
            }
            Err(e) => {
                tracing::debug!(target: "validator", "Listing refs of {} failed: {:#}", url, e);
            }
        }

        self.resolve_commit(url, candidate).await
    }

    /// Escalation: clone into a scratch directory and resolve `candidate`
    /// as a commit.
    async fn resolve_commit(&self, url: &str, candidate: &str) -> Resolution {
        tracing::warn!(
            target: "validator",
            "'{}' is not a branch or tag of {}; cloning to look for a commit. \
             Pinning to a tag is preferable to pinning a raw commit",
            candidate,
            url
        );

        let workdir = match tempfile::Builder::new().prefix("modpin-").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!(target: "validator", "Failed to create scratch directory: {}", e);
                return Resolution::Missing;
            }
        };

        let resolution = match self.git.resolve_commit(url, candidate, workdir.path()).await {
            Ok(true) => Resolution::Commit,
            Ok(false) => {
                tracing::debug!(target: "validator", "{} does not resolve to a commit in {}", candidate, url);
                Resolution::Missing
            }
            Err(e) => {
                tracing::debug!(target: "validator", "Commit lookup in {} failed: {:#}", url, e);
                Resolution::Missing
            }
        };

        let path = workdir.path().to_path_buf();
        if let Err(e) = workdir.close() {
            tracing::warn!(target: "validator", "Failed to remove {}: {}", path.display(), e);
        }

        resolution
    }

    /// Validate one dependency.
    pub async fn validate(&self, dependency: &RemoteDependency) -> ValidationResult {
        tracing::info!(
            target: "validator",
            "Checking {} ({} @ {})",
            dependency.name,
            dependency.url,
            dependency.reference.as_deref().unwrap_or(DEFAULT_REFERENCE)
        );
        let resolution = self.check(&dependency.url, dependency.reference.as_deref()).await;
        ValidationResult::new(dependency, resolution)
    }

    /// Validate dependencies one at a time, in order.
    pub async fn validate_all(&self, dependencies: &[RemoteDependency]) -> Vec<ValidationResult> {
        let mut results = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            results.push(self.validate(dependency).await);
        }
        results
    }
}

/// Test whether `listing` (output of `git ls-remote --symref`) mentions
/// `candidate`.
#[must_use]
pub fn listing_contains(listing: &str, candidate: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Substring => listing.contains(candidate),
        MatchMode::Exact => listing.lines().any(|line| line_matches_exactly(line, candidate)),
    }
}

fn line_matches_exactly(line: &str, candidate: &str) -> bool {
    let Some((object, refname)) = line.split_once('\t') else {
        return false;
    };

    // `ref: refs/heads/main\tHEAD` names the default branch.
    if let Some(target) = object.strip_prefix("ref: ") {
        return refname == candidate || target == candidate || short_name(target) == Some(candidate);
    }

    object == candidate
        || refname == candidate
        || short_name(refname.trim_end_matches("^{}")) == Some(candidate)
}

fn short_name(refname: &str) -> Option<&str> {
    refname.strip_prefix("refs/heads/").or_else(|| refname.strip_prefix("refs/tags/"))
}
