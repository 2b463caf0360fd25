//! Global configuration for modpin.
//!
//! Settings that rarely change between runs live in a TOML file in the
//! user's home directory. Command-line flags and their environment variables
//! always win over the file.
//!
//! **Location:**
//! - Unix/macOS: `~/.modpin/config.toml`
//! - Windows: `%LOCALAPPDATA%\modpin\config.toml`
//!
//! ```toml
//! ls_remote_timeout_secs = 15
//! clone_timeout_secs = 300
//! exact_refs = true
//! default_manifest = "~/control-repo/Puppetfile"
//! ```
//!
//! Every key is optional. A missing file at the default location is the same
//! as an empty one; a missing file named explicitly with `--config` is an
//! error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{GIT_CLONE_TIMEOUT, GIT_LS_REMOTE_TIMEOUT};
use crate::core::ModpinError;
use crate::manifest::helpers::expand_home;
use crate::validator::MatchMode;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Timeout for `git ls-remote`, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ls_remote_timeout_secs: Option<u64>,

    /// Timeout for the commit lookup clone, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_timeout_secs: Option<u64>,

    /// Match whole ref names instead of substrings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_refs: Option<bool>,

    /// Manifest used when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_manifest: Option<String>,
}

impl GlobalConfig {
    /// Load from `path`, or from [`Self::default_path`] when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file does not exist, or if
    /// the file cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(ModpinError::ConfigError {
                    message: format!("Config file {} does not exist", path.display()),
                }
                .into());
            }
            return Self::load_from(&path).await;
        }

        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path).await,
            Ok(_) => Ok(Self::default()),
            Err(e) => {
                tracing::debug!("No default config location: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid config TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Platform-specific location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be
    /// determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("modpin")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".modpin")
        };

        Ok(config_dir.join("config.toml"))
    }
}

/// Values supplied on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub ls_remote_timeout_secs: Option<u64>,
    pub clone_timeout_secs: Option<u64>,
    pub exact_refs: bool,
    pub manifest: Option<PathBuf>,
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub ls_remote_timeout: Duration,
    pub clone_timeout: Duration,
    pub match_mode: MatchMode,
    pub manifest: Option<PathBuf>,
}

impl Settings {
    /// Merge command-line overrides over the config file over built-in
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout of zero seconds is configured.
    pub fn resolve(config: &GlobalConfig, overrides: Overrides) -> Result<Self> {
        let ls_remote_timeout = timeout(
            "ls-remote timeout",
            overrides.ls_remote_timeout_secs.or(config.ls_remote_timeout_secs),
            GIT_LS_REMOTE_TIMEOUT,
        )?;
        let clone_timeout = timeout(
            "clone timeout",
            overrides.clone_timeout_secs.or(config.clone_timeout_secs),
            GIT_CLONE_TIMEOUT,
        )?;

        let match_mode = if overrides.exact_refs || config.exact_refs.unwrap_or(false) {
            MatchMode::Exact
        } else {
            MatchMode::Substring
        };

        let manifest = overrides
            .manifest
            .or_else(|| config.default_manifest.as_deref().map(|raw| expand_home(Path::new(raw))));

        Ok(Self {
            ls_remote_timeout,
            clone_timeout,
            match_mode,
            manifest,
        })
    }
}

fn timeout(name: &str, secs: Option<u64>, default: Duration) -> Result<Duration> {
    match secs {
        Some(0) => Err(ModpinError::ConfigError {
            message: format!("{name} must be at least one second"),
        }
        .into()),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "ls_remote_timeout_secs = 5\nexact_refs = true\ndefault_manifest = \"/srv/Puppetfile\"\n",
        )
        .unwrap();

        let config = GlobalConfig::load_from(&path).await.unwrap();
        assert_eq!(config.ls_remote_timeout_secs, Some(5));
        assert_eq!(config.clone_timeout_secs, None);
        assert_eq!(config.exact_refs, Some(true));
        assert_eq!(config.default_manifest.as_deref(), Some("/srv/Puppetfile"));
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "ls_remote_timeout = 5\n").unwrap();

        assert!(GlobalConfig::load_from(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_explicit_missing_config_is_error() {
        let temp = TempDir::new().unwrap();
        let err = GlobalConfig::load_with_optional(Some(temp.path().join("absent.toml")))
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ModpinError>(), Some(ModpinError::ConfigError { .. })));
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = GlobalConfig::default_path().unwrap();
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn test_defaults_without_config() {
        let settings = Settings::resolve(&GlobalConfig::default(), Overrides::default()).unwrap();
        assert_eq!(settings.ls_remote_timeout, GIT_LS_REMOTE_TIMEOUT);
        assert_eq!(settings.clone_timeout, GIT_CLONE_TIMEOUT);
        assert_eq!(settings.match_mode, MatchMode::Substring);
        assert_eq!(settings.manifest, None);
    }

    #[test]
    fn test_overrides_beat_config() {
        let config = GlobalConfig {
            ls_remote_timeout_secs: Some(10),
            clone_timeout_secs: Some(60),
            exact_refs: Some(false),
            default_manifest: Some("/srv/Puppetfile".to_string()),
        };
        let overrides = Overrides {
            ls_remote_timeout_secs: Some(3),
            clone_timeout_secs: None,
            exact_refs: true,
            manifest: Some(PathBuf::from("other/Puppetfile")),
        };

        let settings = Settings::resolve(&config, overrides).unwrap();
        assert_eq!(settings.ls_remote_timeout, Duration::from_secs(3));
        assert_eq!(settings.clone_timeout, Duration::from_secs(60));
        assert_eq!(settings.match_mode, MatchMode::Exact);
        assert_eq!(settings.manifest, Some(PathBuf::from("other/Puppetfile")));
    }

    #[test]
    fn test_config_manifest_used_when_not_given() {
        let config = GlobalConfig {
            default_manifest: Some("/srv/Puppetfile".to_string()),
            exact_refs: Some(true),
            ..GlobalConfig::default()
        };
        let settings = Settings::resolve(&config, Overrides::default()).unwrap();
        assert_eq!(settings.manifest, Some(PathBuf::from("/srv/Puppetfile")));
        assert_eq!(settings.match_mode, MatchMode::Exact);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let overrides = Overrides {
            clone_timeout_secs: Some(0),
            ..Overrides::default()
        };
        assert!(Settings::resolve(&GlobalConfig::default(), overrides).is_err());
    }
}
