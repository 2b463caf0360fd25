//! Selects the declarations that point at a git repository.
//!
//! Registry-only modules (`mod 'puppetlabs-stdlib', '9.4.1'`) are installed
//! from the forge and have nothing to check against git, so they are
//! filtered out here. For the rest, the pinned reference is chosen by
//! precedence: `ref`, then `tag`, then `branch`. A module that pins none of
//! them is checked against the remote's default branch.

use serde::Serialize;

use super::Declaration;

/// Argument key holding the repository URL.
pub const GIT_KEY: &str = "git";

/// Reference keys in precedence order.
pub const REFERENCE_KEYS: [&str; 3] = ["ref", "tag", "branch"];

/// A declaration known to have a git source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteDependency {
    /// Module name as written in the manifest (`namespace-name`).
    pub name: String,
    /// Repository URL from the `git` argument.
    pub url: String,
    /// Effective reference; `None` means the remote default branch.
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

impl RemoteDependency {
    /// Build the remote view of a declaration, or `None` for registry-only
    /// modules.
    #[must_use]
    pub fn from_declaration(declaration: &Declaration) -> Option<Self> {
        let url = declaration.argument(GIT_KEY)?;
        let reference = REFERENCE_KEYS
            .iter()
            .find_map(|key| declaration.argument(key))
            .map(ToString::to_string);

        Some(Self {
            name: declaration.full_name(),
            url: url.to_string(),
            reference,
        })
    }
}

/// Keep only git-sourced declarations, preserving manifest order.
#[must_use]
pub fn remote_dependencies(declarations: &[Declaration]) -> Vec<RemoteDependency> {
    declarations.iter().filter_map(RemoteDependency::from_declaration).collect()
}
