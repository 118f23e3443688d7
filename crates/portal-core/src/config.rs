//! Configuration module
//!
//! Client configuration is read from the environment (after loading `.env` via
//! dotenvy). CLI flags override individual fields.

use std::env;

use crate::error::{PortalError, PortalResult};
use crate::models::{DepartmentId, SessionId};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CSRF_PAGE: &str = "/";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Hops a folder-move ancestor walk may take before giving up.
pub const MAX_ANCESTOR_DEPTH: usize = 64;

/// Upper bound applied by the fallback transport before a call is treated as failed.
pub const FALLBACK_TIMEOUT_SECS: u64 = 120;

/// Portal client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    /// Value of the portal's `sessionid` cookie
    pub session_cookie: Option<String>,
    /// Explicit anti-forgery token; when absent it is discovered from `csrf_page`
    pub csrf_token: Option<String>,
    /// Page fetched to discover the anti-forgery token
    pub csrf_page: String,
    pub timeout_secs: u64,
    pub fallback_enabled: bool,
    pub max_ancestor_depth: usize,
    // Defaults for upload/browse context
    pub default_session: Option<SessionId>,
    pub default_department: Option<DepartmentId>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: None,
            csrf_token: None,
            csrf_page: DEFAULT_CSRF_PAGE.to_string(),
            timeout_secs: REQUEST_TIMEOUT_SECS,
            fallback_enabled: true,
            max_ancestor_depth: MAX_ANCESTOR_DEPTH,
            default_session: None,
            default_department: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from the process environment.
    ///
    /// Reads PORTAL_URL (or API_URL), PORTAL_SESSION_COOKIE, PORTAL_CSRF_TOKEN,
    /// PORTAL_CSRF_PAGE, PORTAL_TIMEOUT_SECS, PORTAL_FALLBACK, PORTAL_MAX_ANCESTOR_DEPTH,
    /// PORTAL_ACADEMIC_SESSION and PORTAL_DEPARTMENT.
    pub fn from_env() -> PortalResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> PortalResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("PORTAL_URL")
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup("PORTAL_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("PORTAL_TIMEOUT_SECS", &raw)?,
            None => REQUEST_TIMEOUT_SECS,
        };

        let max_ancestor_depth = match lookup("PORTAL_MAX_ANCESTOR_DEPTH") {
            Some(raw) => parse_number::<usize>("PORTAL_MAX_ANCESTOR_DEPTH", &raw)?,
            None => MAX_ANCESTOR_DEPTH,
        };

        let fallback_enabled = lookup("PORTAL_FALLBACK")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        let default_session = lookup("PORTAL_ACADEMIC_SESSION")
            .map(|raw| parse_number::<SessionId>("PORTAL_ACADEMIC_SESSION", &raw))
            .transpose()?;
        let default_department = lookup("PORTAL_DEPARTMENT")
            .map(|raw| parse_number::<DepartmentId>("PORTAL_DEPARTMENT", &raw))
            .transpose()?;

        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_cookie: lookup("PORTAL_SESSION_COOKIE").filter(|v| !v.is_empty()),
            csrf_token: lookup("PORTAL_CSRF_TOKEN").filter(|v| !v.is_empty()),
            csrf_page: lookup("PORTAL_CSRF_PAGE").unwrap_or_else(|| DEFAULT_CSRF_PAGE.to_string()),
            timeout_secs,
            fallback_enabled,
            max_ancestor_depth,
            default_session,
            default_department,
        };

        config.validate()?;
        tracing::debug!(
            base_url = %config.base_url,
            session_cookie = config.session_cookie.is_some(),
            csrf_token = config.csrf_token.is_some(),
            timeout_secs = config.timeout_secs,
            fallback = config.fallback_enabled,
            "Client configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> PortalResult<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(PortalError::Config(format!(
                "PORTAL_URL must start with http:// or https:// (got {})",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(PortalError::Config(
                "PORTAL_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.max_ancestor_depth == 0 {
            return Err(PortalError::Config(
                "PORTAL_MAX_ANCESTOR_DEPTH must be greater than 0".to_string(),
            ));
        }

        if !self.csrf_page.starts_with('/') {
            return Err(PortalError::Config(
                "PORTAL_CSRF_PAGE must be a path starting with '/'".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> PortalResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| PortalError::Config(format!("{} must be a number (got {:?})", key, raw)))
}
