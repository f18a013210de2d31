//! Configuration file loading and management.
//!
//! Loads configuration from:
//! - Linux: `~/.config/feedstat/config.toml`
//! - macOS: `~/Library/Application Support/com.feedstat.feedstat/config.toml`
//! - Windows: `%APPDATA%/feedstat/feedstat/config/config.toml`
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `FEEDSTAT_CONFIG`: Override config file path
//! - `FEEDSTAT_PROFILE`: Samples root holding the `content` profile directory
//! - `FEEDSTAT_API_BASE`: Content API base URL
//! - `FEEDSTAT_TIMEOUT`: Request timeout in seconds
//! - `FEEDSTAT_NO_COLOR` or `NO_COLOR`: Disable colors

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::{AppPaths, ProfilePaths};
use crate::cli::args::Cli;
use crate::error::{FeedstatError, Result};

// =============================================================================
// Environment Variable Names
// =============================================================================

/// Environment variable to override config file path.
pub const ENV_CONFIG: &str = "FEEDSTAT_CONFIG";
/// Environment variable naming the samples root.
pub const ENV_PROFILE: &str = "FEEDSTAT_PROFILE";
/// Environment variable for the Content API base URL.
pub const ENV_API_BASE: &str = "FEEDSTAT_API_BASE";
/// Environment variable for timeout in seconds.
pub const ENV_TIMEOUT: &str = "FEEDSTAT_TIMEOUT";
/// Environment variable to disable colors.
pub const ENV_NO_COLOR: &str = "FEEDSTAT_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";

/// Production Content API endpoint.
pub const DEFAULT_API_BASE: &str = "https://shopping.googleapis.com/content/v2.1";
/// Largest page the Content API serves for datafeed listings.
pub const MAX_PAGE_SIZE: u32 = 250;

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved configuration after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Profile directory, or `None` when running with `--noconfig`.
    pub profile: Option<ProfilePaths>,
    /// Content API base URL.
    pub api_base: String,
    /// Request timeout.
    pub timeout: Duration,
    /// `maxResults` for list calls.
    pub page_size: u32,
    /// Whether to probe the GCE metadata server for ambient credentials.
    pub metadata_probe: bool,
    /// Local port for the OAuth redirect listener (0 picks a free port).
    pub redirect_port: u16,
    /// Whether to disable colored output.
    pub no_color: bool,
    /// Source of each setting for debugging.
    pub sources: ConfigSources,
}

/// Tracks the source of each configuration value.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub profile: ConfigSource,
    pub api_base: ConfigSource,
    pub timeout: ConfigSource,
    pub no_color: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but is invalid, or if an
    /// environment override holds an unusable value.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let config = Self::load_config()?;
        config.validate()?;

        let mut sources = ConfigSources::default();

        let profile = Self::resolve_profile(cli, &config, &mut sources.profile);
        let api_base = Self::resolve_api_base(&config, &mut sources.api_base)?;
        let timeout = Self::resolve_timeout(cli, &config, &mut sources.timeout)?;
        let no_color = Self::resolve_no_color(cli, &config, &mut sources.no_color);

        Ok(Self {
            profile,
            api_base,
            timeout,
            page_size: config.api.page_size,
            metadata_probe: config.auth.metadata_probe,
            redirect_port: config.auth.redirect_port,
            no_color,
            sources,
        })
    }

    /// Load config file, respecting the `FEEDSTAT_CONFIG` override.
    fn load_config() -> Result<Config> {
        if let Ok(path) = std::env::var(ENV_CONFIG) {
            Config::load_from(Path::new(&path))
        } else {
            Config::load()
        }
    }

    fn resolve_profile(
        cli: &Cli,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Option<ProfilePaths> {
        if cli.noconfig {
            *source = ConfigSource::Cli;
            return None;
        }
        if let Some(root) = &cli.config_path {
            *source = ConfigSource::Cli;
            return Some(ProfilePaths::from_samples_root(root));
        }

        if let Some(root) = env_non_empty(ENV_PROFILE) {
            *source = ConfigSource::Env;
            return Some(ProfilePaths::from_samples_root(Path::new(&root)));
        }

        if let Some(root) = &config.profile.path {
            *source = ConfigSource::ConfigFile;
            return Some(ProfilePaths::from_samples_root(root));
        }

        *source = ConfigSource::Default;
        ProfilePaths::default_location()
    }

    fn resolve_api_base(config: &Config, source: &mut ConfigSource) -> Result<String> {
        if let Some(base) = env_non_empty(ENV_API_BASE) {
            validate_base_url(ENV_API_BASE, &base)?;
            *source = ConfigSource::Env;
            return Ok(base.trim_end_matches('/').to_string());
        }

        if let Some(base) = &config.api.base_url {
            *source = ConfigSource::ConfigFile;
            return Ok(base.trim_end_matches('/').to_string());
        }

        *source = ConfigSource::Default;
        Ok(DEFAULT_API_BASE.to_string())
    }

    fn resolve_timeout(cli: &Cli, config: &Config, source: &mut ConfigSource) -> Result<Duration> {
        if let Some(seconds) = cli.timeout {
            *source = ConfigSource::Cli;
            return Ok(Duration::from_secs(validate_timeout("--timeout", seconds)?));
        }

        if let Some(raw) = env_non_empty(ENV_TIMEOUT) {
            let seconds = raw.parse::<u64>().map_err(|_| FeedstatError::ConfigInvalid {
                key: ENV_TIMEOUT.to_string(),
                value: raw.clone(),
                message: "expected a whole number of seconds".to_string(),
            })?;
            *source = ConfigSource::Env;
            return Ok(Duration::from_secs(validate_timeout(ENV_TIMEOUT, seconds)?));
        }

        *source = ConfigSource::ConfigFile;
        Ok(Duration::from_secs(config.api.timeout_seconds))
    }

    fn resolve_no_color(cli: &Cli, config: &Config, source: &mut ConfigSource) -> bool {
        if cli.no_color {
            *source = ConfigSource::Cli;
            return true;
        }

        if is_env_truthy(ENV_NO_COLOR) || std::env::var(ENV_NO_COLOR_STD).is_ok() {
            *source = ConfigSource::Env;
            return true;
        }

        if !config.output.color {
            *source = ConfigSource::ConfigFile;
            return true;
        }

        *source = ConfigSource::Default;
        false
    }

    /// Whether output may be coloured.
    ///
    /// Uses the resolved setting when there is one. When resolution itself
    /// failed, only the flag and environment are consulted.
    #[must_use]
    pub fn color_enabled(cli: &Cli, resolved: Option<&Self>) -> bool {
        match resolved {
            Some(config) => !config.no_color,
            None => !Self::resolve_no_color(cli, &Config::default(), &mut ConfigSource::default()),
        }
    }
}

/// Check if an environment variable is set to a truthy value.
#[must_use]
pub fn is_env_truthy(var: &str) -> bool {
    std::env::var(var)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_timeout(key: &str, seconds: u64) -> Result<u64> {
    if seconds == 0 || seconds > 300 {
        return Err(FeedstatError::ConfigInvalid {
            key: key.to_string(),
            value: seconds.to_string(),
            message: "timeout must be between 1 and 300 seconds".to_string(),
        });
    }
    Ok(seconds)
}

fn validate_base_url(key: &str, value: &str) -> Result<()> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(FeedstatError::ConfigInvalid {
            key: key.to_string(),
            value: value.to_string(),
            message: "base URL must use http or https".to_string(),
        }),
        Err(e) => Err(FeedstatError::ConfigInvalid {
            key: key.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile directory settings.
    pub profile: ProfileConfig,
    /// Content API settings.
    pub api: ApiConfig,
    /// Credential discovery settings.
    pub auth: AuthConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Profile directory settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Samples root; the profile is its `content` sub-directory.
    pub path: Option<PathBuf>,
}

/// Content API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Override for the Content API base URL.
    pub base_url: Option<String>,
    /// Default timeout for network requests in seconds.
    pub timeout_seconds: u64,
    /// `maxResults` for paginated list calls.
    pub page_size: u32,
}

/// Credential discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Probe the GCE metadata server when looking for ambient credentials.
    pub metadata_probe: bool,
    /// Fixed port for the OAuth redirect listener; 0 picks a free port.
    pub redirect_port: u16,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub color: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: 30,
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            metadata_probe: true,
            redirect_port: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Load configuration from the default config file path.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error only if the file exists but is invalid.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().config_file())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns default config if the file doesn't exist.
    /// Returns error only if the file exists but is invalid.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FeedstatError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Validate configuration values.
    ///
    /// Checks that:
    /// - Timeout is within reasonable bounds (1-300 seconds)
    /// - Page size is between 1 and 250
    /// - The base URL, if set, is an http(s) URL
    pub fn validate(&self) -> Result<()> {
        validate_timeout("api.timeout_seconds", self.api.timeout_seconds)?;

        if self.api.page_size == 0 || self.api.page_size > MAX_PAGE_SIZE {
            return Err(FeedstatError::ConfigInvalid {
                key: "api.page_size".to_string(),
                value: self.api.page_size.to_string(),
                message: format!("page size must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        if let Some(base) = &self.api.base_url {
            validate_base_url("api.base_url", base)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: &[&str] = &[
        ENV_CONFIG,
        ENV_PROFILE,
        ENV_API_BASE,
        ENV_TIMEOUT,
        ENV_NO_COLOR,
        ENV_NO_COLOR_STD,
    ];

    /// Runs `f` with the given variables set and every other feedstat
    /// variable cleared, restoring prior values afterwards.
    #[allow(unsafe_code)]
    fn with_env(vars: &[(&str, &str)], f: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let prior: Vec<_> = ALL_VARS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();
        unsafe {
            for key in ALL_VARS {
                std::env::remove_var(key);
            }
            // Keep the developer's own config.toml out of the picture.
            std::env::set_var(ENV_CONFIG, "/nonexistent/feedstat/config.toml");
            for (key, value) in vars {
                std::env::set_var(key, value);
            }
        }
        f();
        for (key, value) in prior {
            unsafe {
                match value {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["feedstat"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.page_size, 250);
        assert!(config.auth.metadata_probe);
        assert!(config.output.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_missing_file_returns_default() {
        let config = Config::load_from(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
        assert!(config.profile.path.is_none());
    }

    #[test]
    fn load_valid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[profile]
path = "/srv/shopping-samples"

[api]
timeout_seconds = 60
page_size = 100

[auth]
metadata_probe = false
redirect_port = 8085

[output]
color = false
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(
            config.profile.path.as_deref(),
            Some(Path::new("/srv/shopping-samples"))
        );
        assert_eq!(config.api.timeout_seconds, 60);
        assert_eq!(config.api.page_size, 100);
        assert!(!config.auth.metadata_probe);
        assert_eq!(config.auth.redirect_port, 8085);
        assert!(!config.output.color);
    }

    #[test]
    fn load_invalid_toml_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, FeedstatError::ConfigParse { .. }));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.page_size = 500;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.page_size"));

        let mut config = Config::default();
        config.api.base_url = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Cli), "CLI flag");
        assert_eq!(format!("{}", ConfigSource::Env), "environment variable");
        assert_eq!(format!("{}", ConfigSource::ConfigFile), "config file");
        assert_eq!(format!("{}", ConfigSource::Default), "default");
    }

    #[test]
    fn resolved_defaults() {
        with_env(&[], || {
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert_eq!(resolved.api_base, DEFAULT_API_BASE);
            assert_eq!(resolved.timeout, Duration::from_secs(30));
            assert_eq!(resolved.page_size, MAX_PAGE_SIZE);
            assert!(!resolved.no_color);
            assert_eq!(resolved.sources.profile, ConfigSource::Default);
        });
    }

    #[test]
    fn noconfig_disables_profile() {
        with_env(&[(ENV_PROFILE, "/srv/samples")], || {
            let resolved = ResolvedConfig::resolve(&cli(&["--noconfig"])).unwrap();
            assert!(resolved.profile.is_none());
            assert_eq!(resolved.sources.profile, ConfigSource::Cli);
        });
    }

    #[test]
    fn config_path_flag_beats_env() {
        with_env(&[(ENV_PROFILE, "/srv/env-samples")], || {
            let resolved =
                ResolvedConfig::resolve(&cli(&["--config-path", "/srv/flag-samples"])).unwrap();
            let profile = resolved.profile.unwrap();
            assert_eq!(profile.dir(), Path::new("/srv/flag-samples/content"));
        });
    }

    #[test]
    fn env_profile_used_without_flag() {
        with_env(&[(ENV_PROFILE, "/srv/env-samples")], || {
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert_eq!(
                resolved.profile.unwrap().dir(),
                Path::new("/srv/env-samples/content")
            );
            assert_eq!(resolved.sources.profile, ConfigSource::Env);
        });
    }

    #[test]
    fn env_api_base_strips_trailing_slash() {
        with_env(&[(ENV_API_BASE, "http://127.0.0.1:9000/content/v2.1/")], || {
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert_eq!(resolved.api_base, "http://127.0.0.1:9000/content/v2.1");
            assert_eq!(resolved.sources.api_base, ConfigSource::Env);
        });
    }

    #[test]
    fn env_timeout_must_be_numeric() {
        with_env(&[(ENV_TIMEOUT, "soon")], || {
            let err = ResolvedConfig::resolve(&cli(&[])).unwrap_err();
            assert!(matches!(err, FeedstatError::ConfigInvalid { .. }));
        });
    }

    #[test]
    fn cli_timeout_beats_env() {
        with_env(&[(ENV_TIMEOUT, "90")], || {
            let resolved = ResolvedConfig::resolve(&cli(&["--timeout", "45"])).unwrap();
            assert_eq!(resolved.timeout, Duration::from_secs(45));
            assert_eq!(resolved.sources.timeout, ConfigSource::Cli);
        });
    }

    #[test]
    fn no_color_from_standard_env() {
        with_env(&[(ENV_NO_COLOR_STD, "")], || {
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert!(resolved.no_color);
            assert_eq!(resolved.sources.no_color, ConfigSource::Env);
        });
    }

    #[test]
    fn feedstat_no_color_disables_color() {
        with_env(&[(ENV_NO_COLOR, "1")], || {
            let args = cli(&[]);
            let resolved = ResolvedConfig::resolve(&args).unwrap();
            assert!(!ResolvedConfig::color_enabled(&args, Some(&resolved)));
            assert!(!ResolvedConfig::color_enabled(&args, None));
        });
    }

    #[test]
    fn config_file_color_false_disables_color() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\ncolor = false").unwrap();
        let path = file.path().display().to_string();

        with_env(&[(ENV_CONFIG, &path)], || {
            let args = cli(&[]);
            let resolved = ResolvedConfig::resolve(&args).unwrap();
            assert_eq!(resolved.sources.no_color, ConfigSource::ConfigFile);
            assert!(!ResolvedConfig::color_enabled(&args, Some(&resolved)));
        });
    }

    #[test]
    fn color_enabled_by_default() {
        with_env(&[], || {
            let args = cli(&[]);
            let resolved = ResolvedConfig::resolve(&args).unwrap();
            assert!(ResolvedConfig::color_enabled(&args, Some(&resolved)));
            assert!(ResolvedConfig::color_enabled(&args, None));
            assert!(!ResolvedConfig::color_enabled(&cli(&["--no-color"]), None));
        });
    }

    #[test]
    fn config_file_from_env_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"http://localhost:1234\"").unwrap();
        let path = file.path().display().to_string();

        with_env(&[(ENV_CONFIG, &path)], || {
            let resolved = ResolvedConfig::resolve(&cli(&[])).unwrap();
            assert_eq!(resolved.api_base, "http://localhost:1234");
            assert_eq!(resolved.sources.api_base, ConfigSource::ConfigFile);
        });
    }
}
