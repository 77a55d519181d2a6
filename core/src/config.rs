//! Connection settings for the gateway's admin API.
//!
//! A `Config` is built once and then shared read-only (behind an `Arc`) by
//! every client handle, so nothing here is mutated after construction.

use std::time::Duration;

use crate::error::AclError;

pub const DEFAULT_HOST_ADDRESS: &str = "http://localhost:8001";

pub const ENV_HOST_ADDRESS: &str = "KONG_ADMIN_ADDR";
pub const ENV_USERNAME: &str = "KONG_ADMIN_USERNAME";
pub const ENV_PASSWORD: &str = "KONG_ADMIN_PASSWORD";
pub const ENV_API_KEY: &str = "KONG_API_KEY";
pub const ENV_ADMIN_TOKEN: &str = "KONG_ADMIN_TOKEN";
pub const ENV_TLS_SKIP_VERIFY: &str = "TLS_SKIP_VERIFY";

/// Host address and credentials used for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host_address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sent as the `apikey` header when the admin API sits behind key-auth.
    pub api_key: Option<String>,
    /// Sent as the `Kong-Admin-Token` header.
    pub admin_token: Option<String>,
    pub insecure_skip_verify: bool,
    /// Applied by the transport to the whole request; `None` means no deadline.
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn new(host_address: &str) -> Self {
        Self {
            host_address: host_address.trim_end_matches('/').to_string(),
            username: None,
            password: None,
            api_key: None,
            admin_token: None,
            insecure_skip_verify: false,
            timeout: None,
        }
    }

    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, AclError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AclError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let host = get(ENV_HOST_ADDRESS).unwrap_or_else(|| DEFAULT_HOST_ADDRESS.to_string());
        let mut config = Config::new(&host);
        config.username = get(ENV_USERNAME);
        config.password = get(ENV_PASSWORD);
        config.api_key = get(ENV_API_KEY);
        config.admin_token = get(ENV_ADMIN_TOKEN);

        if let Some(raw) = get(ENV_TLS_SKIP_VERIFY) {
            config.insecure_skip_verify = parse_bool(&raw).ok_or_else(|| {
                AclError::Config(format!("{ENV_TLS_SKIP_VERIFY} must be a boolean, got {raw:?}"))
            })?;
        }

        Ok(config)
    }

    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_admin_token(mut self, token: &str) -> Self {
        self.admin_token = Some(token.to_string());
        self
    }

    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
