//! Application paths and the profile-directory layout.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Service-account key file name inside a profile directory.
pub const SERVICE_ACCOUNT_FILE: &str = "service-account.json";
/// OAuth client secrets file name inside a profile directory.
pub const CLIENT_SECRETS_FILE: &str = "client-secrets.json";
/// Cached refresh-token record file name inside a profile directory.
pub const TOKEN_FILE: &str = "stored-token.json";
/// Merchant account list file name inside a profile directory.
pub const ACCOUNTS_FILE: &str = "merchant-ids.json";

/// Sub-directory of the samples root that holds the Content API profile.
pub const CONTENT_PROFILE_DIR: &str = "content";
/// Default samples root, relative to the home directory.
pub const DEFAULT_SAMPLES_ROOT: &str = "shopping-samples";

/// Application paths.
pub struct AppPaths {
    /// Configuration directory.
    pub config: PathBuf,
}

impl AppPaths {
    /// Create paths for the feedstat application.
    #[must_use]
    pub fn new() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("com", "feedstat", "feedstat") {
            Self {
                config: proj_dirs.config_dir().to_path_buf(),
            }
        } else {
            let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
            Self {
                config: home.join(".config/feedstat"),
            }
        }
    }

    /// Path to `config.toml`.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-name files of one profile directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilePaths {
    root: PathBuf,
}

impl ProfilePaths {
    /// Use `dir` as the profile directory itself.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { root: dir.into() }
    }

    /// Profile directory under a samples root (`<root>/content`).
    #[must_use]
    pub fn from_samples_root(root: &Path) -> Self {
        Self::new(root.join(CONTENT_PROFILE_DIR))
    }

    /// Profile under `~/shopping-samples`, if a home directory is known.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        home_dir().map(|home| Self::from_samples_root(&home.join(DEFAULT_SAMPLES_ROOT)))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn service_account_file(&self) -> PathBuf {
        self.root.join(SERVICE_ACCOUNT_FILE)
    }

    #[must_use]
    pub fn client_secrets_file(&self) -> PathBuf {
        self.root.join(CLIENT_SECRETS_FILE)
    }

    #[must_use]
    pub fn token_file(&self) -> PathBuf {
        self.root.join(TOKEN_FILE)
    }

    #[must_use]
    pub fn accounts_file(&self) -> PathBuf {
        self.root.join(ACCOUNTS_FILE)
    }
}

/// The current user's home directory.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_root_maps_to_content_dir() {
        let profile = ProfilePaths::from_samples_root(Path::new("/srv/samples"));
        assert_eq!(profile.dir(), Path::new("/srv/samples/content"));
        assert_eq!(
            profile.client_secrets_file(),
            PathBuf::from("/srv/samples/content/client-secrets.json")
        );
        assert_eq!(
            profile.accounts_file(),
            PathBuf::from("/srv/samples/content/merchant-ids.json")
        );
    }

    #[test]
    fn config_file_lives_in_config_dir() {
        let paths = AppPaths::new();
        assert!(paths.config_file().ends_with("config.toml"));
    }
}
