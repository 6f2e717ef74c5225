//! Portal credentials: TOML file with environment override.
//!
//! Resolution order:
//! 1. `EKZ_PORTAL_USER` + `EKZ_PORTAL_SESSION` environment variables
//! 2. An explicit config file path, when the caller passes one
//! 3. `ekzsync.toml` in the working directory, then `~/.config/ekzsync.toml`
//!
//! The session cookie is wrapped in [`SecretString`] immediately after
//! parsing and is never serialized back out.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use shared_utils::env::get_env_var_opt;

/// Environment variable holding the portal account name.
pub const ENV_USER: &str = "EKZ_PORTAL_USER";
/// Environment variable holding the authenticated session cookie.
pub const ENV_SESSION: &str = "EKZ_PORTAL_SESSION";

/// Errors related to credentials configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No usable credential source was found.
    #[error("no portal credentials: set {ENV_USER}/{ENV_SESSION} or provide a config file")]
    MissingCredentials,

    /// The config file exists but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Loaded portal credentials.
#[derive(Debug)]
pub struct PortalConfig {
    /// Portal account name; shown in logs, not a secret.
    pub user: String,
    /// Pre-authenticated session cookie for the portal API.
    pub session_cookie: SecretString,
}

#[derive(Deserialize)]
struct RawConfig {
    user: String,
    session_cookie: String,
}

impl PortalConfig {
    /// Loads credentials, preferring the environment over config files.
    ///
    /// `explicit_path` skips the default file search entirely.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let (Some(user), Some(cookie)) =
            (get_env_var_opt(ENV_USER), get_env_var_opt(ENV_SESSION))
        {
            return Ok(Self {
                user,
                session_cookie: SecretString::new(cookie.into()),
            });
        }

        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        for candidate in default_paths() {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }

        Err(ConfigError::MissingCredentials)
    }

    /// Loads credentials from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            user: raw.user,
            session_cookie: SecretString::new(raw.session_cookie.into()),
        })
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("ekzsync.toml")];
    if let Some(home) = get_env_var_opt("HOME") {
        paths.push(Path::new(&home).join(".config").join("ekzsync.toml"));
    }
    paths
}
