//! Puppetfile parsing for modpin
//!
//! A Puppetfile is Ruby DSL, but modpin never evaluates it. Instead the text
//! goes through a small, tolerant tokenizer that understands the handful of
//! shapes real Puppetfiles use:
//!
//! ```ruby
//! forge 'https://forge.puppet.com'
//! moduledir 'modules'
//!
//! # registry-only module, ignored by the validator
//! mod 'puppetlabs-stdlib', '9.4.1'
//!
//! mod 'puppetlabs/apache',
//!   :git => 'https://github.com/puppetlabs/puppetlabs-apache.git',
//!   :tag => 'v12.0.0'
//!
//! mod 'profile', git: 'git@example.com:infra/profile.git', branch: 'production'
//! ```
//!
//! # Parsing Rules
//!
//! - Any line containing `#` is dropped entirely. Comment removal is line
//!   granular, so a trailing comment removes the whole line.
//! - The remaining text is split into chunks at each line that starts with a
//!   directive keyword (`mod`, `forge`, `moduledir`).
//! - `forge` and `moduledir` chunks are recorded on [`Manifest`] and never
//!   become declarations.
//! - A `mod` chunk is split on top-level commas. The first token is the
//!   identifier (`namespace-name` or `namespace/name`); the rest are either
//!   `key => value` / `key: value` pairs or a bare version string stored
//!   under the reserved [`VERSION_KEY`].
//!
//! Parsing never fails: chunks that yield no identifier are dropped.
//!
//! # Modules
//!
//! - [`classify`] filters declarations down to git-sourced dependencies
//! - [`helpers`] locates the manifest file on disk

pub mod classify;
pub mod helpers;
mod parser;


use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::ModpinError;

pub use classify::{RemoteDependency, remote_dependencies};
pub use helpers::resolve_manifest_path;
pub use parser::{parse, parse_declarations};

/// Reserved argument key holding a bare positional value such as `'4.2.0'`.
pub const VERSION_KEY: &str = "version";

/// One `mod` entry from a Puppetfile.
///
/// Declarations are created once per parse and never modified. Two
/// declarations are the same entry when every field is equal; the parser
/// drops such duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Declaration {
    /// Organizational prefix, e.g. `puppetlabs` in `puppetlabs-stdlib`.
    pub namespace: Option<String>,
    /// Short module name; never empty.
    pub name: String,
    /// Keyword arguments with normalized keys, plus [`VERSION_KEY`].
    pub arguments: BTreeMap<String, String>,
}

impl Declaration {
    /// Name as written in the manifest, `namespace-name` when namespaced.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{namespace}-{}", self.name),
            None => self.name.clone(),
        }
    }

    #[must_use]
    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).map(String::as_str)
    }

    /// The bare positional version, if one was declared.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.argument(VERSION_KEY)
    }
}

/// Everything modpin extracts from one Puppetfile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Value of the `forge` directive (the default module registry).
    pub forge: Option<String>,
    /// Value of the `moduledir` directive.
    pub moduledir: Option<String>,
    /// Parsed `mod` entries in first-seen order, without duplicates.
    pub declarations: Vec<Declaration>,
}

impl Manifest {
    /// Read and parse a manifest from disk.
    ///
    /// # Errors
    ///
    /// - [`ModpinError::ManifestNotFound`] if the file does not exist
    /// - [`ModpinError::ManifestRead`] if it exists but cannot be read as UTF-8
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ModpinError::ManifestNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
            Err(e) => {
                return Err(ModpinError::ManifestRead {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into());
            }
        };

        let manifest = parse(&content);
        tracing::debug!(
            target: "manifest",
            "Parsed {} declarations from {}",
            manifest.declarations.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Declarations with a git source, in manifest order.
    #[must_use]
    pub fn remote_dependencies(&self) -> Vec<RemoteDependency> {
        remote_dependencies(&self.declarations)
    }
}
