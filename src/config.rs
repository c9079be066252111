//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default so an empty environment yields a working client
//! pointed at a local backend. Error-code sets used by the gateway are data
//! here rather than literals in the request path, so backend contract changes
//! only touch configuration.

use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_DIR_NAME: &str = ".quillpost";
pub const DEFAULT_AUTH_ERROR_CODES: &[&str] = &["AUTH_REQUIRED", "AUTH_INVALID_TOKEN"];
pub const DEFAULT_BAN_ERROR_CODES: &[&str] = &["USER_BANNED"];

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Parse(String),
}

impl ConfigError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "CONFIG_PARSE",
        }
    }
}

/// How the session is hydrated when the process starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BootPolicy {
    /// Refresh before anything renders; clear the session if refresh fails.
    Strict,
    /// Render from the cached session immediately and refresh in the background.
    #[default]
    Optimistic,
}

impl FromStr for BootPolicy {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "optimistic" => Ok(Self::Optimistic),
            other => Err(ConfigError::Parse(format!(
                "unknown boot policy '{other}' (expected 'strict' or 'optimistic')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

/// Which error responses count as expired credentials or a banned account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthErrorPolicy {
    /// Codes that, on a 401, trigger the refresh-and-retry protocol.
    pub auth_codes: Vec<String>,
    /// Codes that, on a 403, clear the session unconditionally.
    pub ban_codes: Vec<String>,
}

impl Default for AuthErrorPolicy {
    fn default() -> Self {
        Self {
            auth_codes: DEFAULT_AUTH_ERROR_CODES.iter().map(|c| (*c).to_owned()).collect(),
            ban_codes: DEFAULT_BAN_ERROR_CODES.iter().map(|c| (*c).to_owned()).collect(),
        }
    }
}

impl AuthErrorPolicy {
    #[must_use]
    pub fn is_auth_error(&self, status: u16, code: &str) -> bool {
        status == 401 && self.auth_codes.iter().any(|c| c == code)
    }

    #[must_use]
    pub fn is_ban_error(&self, status: u16, code: &str) -> bool {
        status == 403 && self.ban_codes.iter().any(|c| c == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub session_dir: PathBuf,
    pub boot_policy: BootPolicy,
    pub timeouts: Timeouts,
    pub auth_errors: AuthErrorPolicy,
}

impl ClientConfig {
    /// Config with defaults for everything except the backend location.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            session_dir: default_session_dir(std::env::var("HOME").ok()),
            boot_policy: BootPolicy::default(),
            timeouts: Timeouts::default(),
            auth_errors: AuthErrorPolicy::default(),
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `QUILLPOST_BASE_URL`: default `http://127.0.0.1:8080`
    /// - `QUILLPOST_SESSION_DIR`: default `$HOME/.quillpost`
    /// - `QUILLPOST_BOOT_POLICY`: `optimistic` (default) or `strict`
    /// - `QUILLPOST_REQUEST_TIMEOUT_SECS`: default 30
    /// - `QUILLPOST_CONNECT_TIMEOUT_SECS`: default 10
    /// - `QUILLPOST_AUTH_ERROR_CODES`: default `AUTH_REQUIRED,AUTH_INVALID_TOKEN`
    /// - `QUILLPOST_BAN_ERROR_CODES`: default `USER_BANNED`
    ///
    /// # Errors
    ///
    /// Returns an error if the boot policy is not recognised.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns an error if the boot policy is not recognised.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("QUILLPOST_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let session_dir = lookup("QUILLPOST_SESSION_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| default_session_dir(lookup("HOME")), PathBuf::from);
        let boot_policy = match lookup("QUILLPOST_BOOT_POLICY") {
            Some(raw) => raw.parse()?,
            None => BootPolicy::default(),
        };
        let timeouts = Timeouts {
            request_secs: parse_u64(lookup("QUILLPOST_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("QUILLPOST_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let defaults = AuthErrorPolicy::default();
        let auth_errors = AuthErrorPolicy {
            auth_codes: parse_code_list(lookup("QUILLPOST_AUTH_ERROR_CODES")).unwrap_or(defaults.auth_codes),
            ban_codes: parse_code_list(lookup("QUILLPOST_BAN_ERROR_CODES")).unwrap_or(defaults.ban_codes),
        };

        Ok(Self { base_url: normalize_base_url(&base_url), session_dir, boot_policy, timeouts, auth_errors })
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn default_session_dir(home: Option<String>) -> PathBuf {
    match home.filter(|h| !h.is_empty()) {
        Some(home) => PathBuf::from(home).join(DEFAULT_SESSION_DIR_NAME),
        None => PathBuf::from(DEFAULT_SESSION_DIR_NAME),
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Comma-separated list; `None` when absent or empty after trimming.
fn parse_code_list(raw: Option<String>) -> Option<Vec<String>> {
    let codes: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(ToOwned::to_owned)
        .collect();
    if codes.is_empty() { None } else { Some(codes) }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
