//! Error handling for modpin
//!
//! Errors come in two layers:
//!
//! - [`ModpinError`]: a structured enum (built with `thiserror`) for the
//!   conditions the CLI needs to recognize, such as a missing manifest or a
//!   git binary that cannot be found.
//! - [`ErrorContext`]: wraps a [`ModpinError`] with optional details and a
//!   suggestion, and knows how to print itself to stderr in colour.
//!
//! Application code propagates `anyhow::Result`; the CLI converts whatever
//! reaches the top level with [`user_friendly_error`] before exiting.
//!
//! Git failures for an individual module never reach this layer: the
//! validator turns them into an invalid result for that module instead.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::constants::{EXIT_FATAL, EXIT_MANIFEST_NOT_FOUND};

/// The main error type for modpin operations.
#[derive(Error, Debug)]
pub enum ModpinError {
    /// A git command exited unsuccessfully.
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git subcommand that failed (e.g. "ls-remote")
        operation: String,
        /// Standard error captured from git
        stderr: String,
    },

    /// A git command did not finish within its timeout and was killed.
    #[error("Git operation timed out after {seconds}s: {operation}")]
    GitTimeout {
        /// The git subcommand that timed out
        operation: String,
        /// The timeout that elapsed
        seconds: u64,
    },

    /// The system git binary is not installed or not in PATH.
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Cloning a repository for commit resolution failed.
    #[error("Failed to clone repository: {url}")]
    GitCloneFailed {
        /// The URL that could not be cloned
        url: String,
        /// Standard error captured from git
        reason: String,
    },

    /// The manifest file does not exist.
    #[error("Manifest file {path} not found")]
    ManifestNotFound {
        /// The path that was looked up
        path: String,
    },

    /// The manifest exists but could not be read.
    #[error("Failed to read manifest {path}")]
    ManifestRead {
        /// The manifest path
        path: String,
        /// The underlying IO error message
        reason: String,
    },

    /// The global configuration file is invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Any other fatal error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl ModpinError {
    /// Process exit code for a run that aborts with this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ManifestNotFound {
                ..
            } => EXIT_MANIFEST_NOT_FOUND,
            _ => EXIT_FATAL,
        }
    }
}

/// A [`ModpinError`] with optional user-facing details and suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ModpinError,
    /// Actionable hint shown in green
    pub suggestion: Option<String>,
    /// Explanation shown in yellow
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: ModpinError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow,
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.error.exit_code()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error reaching the top level into an [`ErrorContext`].
///
/// Known [`ModpinError`] variants anywhere in the chain get tailored
/// suggestions; everything else is wrapped with the full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(modpin_error) = cause.downcast_ref::<ModpinError>() {
            return create_error_context(modpin_error);
        }
    }

    if let Some(toml_error) = error.chain().find_map(|c| c.downcast_ref::<toml::de::Error>()) {
        return ErrorContext::new(ModpinError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your modpin config file");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ModpinError::Other {
        message,
    })
}

fn create_error_context(error: &ModpinError) -> ErrorContext {
    match error {
        ModpinError::ManifestNotFound { path } => ErrorContext::new(ModpinError::ManifestNotFound {
            path: path.clone(),
        })
            .with_suggestion("Run modpin from the directory containing your Puppetfile, or pass its path as an argument")
            .with_details("modpin reads ./Puppetfile unless another manifest path is given"),

        ModpinError::ManifestRead { path, reason } => ErrorContext::new(ModpinError::ManifestRead {
            path: path.clone(),
            reason: reason.clone(),
        })
            .with_details(reason.clone())
            .with_suggestion("Check that the manifest is a readable UTF-8 text file"),

        ModpinError::GitNotFound => ErrorContext::new(ModpinError::GitNotFound)
            .with_suggestion("Install git from https://git-scm.com/ or your package manager (e.g., 'brew install git', 'apt install git')")
            .with_details("modpin queries remote repositories through the system git binary"),

        ModpinError::ConfigError { message } => ErrorContext::new(ModpinError::ConfigError {
            message: message.clone(),
        })
            .with_suggestion("Fix or remove ~/.modpin/config.toml, or point --config at a valid file"),

        ModpinError::GitCommandError { operation, stderr } => ErrorContext::new(ModpinError::GitCommandError {
            operation: operation.clone(),
            stderr: stderr.clone(),
        })
            .with_details(stderr.clone()),

        ModpinError::GitTimeout { operation, seconds } => ErrorContext::new(ModpinError::GitTimeout {
            operation: operation.clone(),
            seconds: *seconds,
        })
            .with_suggestion("Raise the limit with --timeout or --clone-timeout"),

        ModpinError::GitCloneFailed { url, reason } => ErrorContext::new(ModpinError::GitCloneFailed {
            url: url.clone(),
            reason: reason.clone(),
        })
            .with_details(reason.clone()),

        ModpinError::IoError(e) => ErrorContext::new(ModpinError::Other {
            message: format!("IO error: {e}"),
        }),

        ModpinError::Other { message } => ErrorContext::new(ModpinError::Other {
            message: message.clone(),
        }),

        ModpinError::TomlError(e) => ErrorContext::new(ModpinError::ConfigError {
            message: format!("TOML parsing error: {e}"),
        })
            .with_suggestion("Check the TOML syntax of your modpin config file"),
    }
}
