//! Helper functions for locating the manifest file.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::ModpinError;

/// Resolve the manifest to validate.
///
/// Uses the explicit path if given (with `~` expanded), otherwise
/// `default_name` inside `working_dir`. The file must exist: a missing
/// manifest is fatal and is reported before anything is parsed.
///
/// # Errors
///
/// Returns [`ModpinError::ManifestNotFound`] if the resolved path does not
/// exist.
pub fn resolve_manifest_path(
    explicit_path: Option<&Path>,
    working_dir: &Path,
    default_name: &str,
) -> Result<PathBuf> {
    let path = match explicit_path {
        Some(path) => expand_home(path),
        None => working_dir.join(default_name),
    };

    if path.is_file() {
        Ok(path)
    } else {
        Err(ModpinError::ManifestNotFound {
            path: path.display().to_string(),
        }
        .into())
    }
}

/// Expand a leading `~` the way a shell would; other paths pass through.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) if raw.starts_with('~') => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        _ => path.to_path_buf(),
    }
}
