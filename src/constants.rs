//! Global constants used throughout the modpin codebase.
//!
//! Timeouts, file names and process exit codes live here so that the CLI,
//! the validator and the tests agree on the same values.

use std::time::Duration;

/// Manifest file looked up in the working directory when no path is given.
pub const DEFAULT_MANIFEST_NAME: &str = "Puppetfile";

/// Symbolic reference checked when a module pins no ref, tag or branch.
pub const DEFAULT_REFERENCE: &str = "HEAD";

/// Timeout for `git ls-remote` (30 seconds).
///
/// Listing advertised references is a single round trip; anything slower
/// almost always means a hung connection or a credential prompt.
pub const GIT_LS_REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the escalation clone (120 seconds).
///
/// Clone operations may take longer than a listing, especially
/// for large repositories.
pub const GIT_CLONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Timeout for local git operations inside the escalation clone (30 seconds).
pub const GIT_LOCAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Every pinned reference resolved.
pub const EXIT_SUCCESS: i32 = 0;

/// At least one pinned reference could not be resolved.
pub const EXIT_INVALID: i32 = 1;

/// The manifest file does not exist.
pub const EXIT_MANIFEST_NOT_FOUND: i32 = 2;

/// Any other fatal error (unreadable manifest, broken config, missing git).
pub const EXIT_FATAL: i32 = 3;

/// The run was interrupted with Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;
