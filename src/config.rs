//! Configuration management for FitSearch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::context::ContextKind;
use crate::error::{ConfigError, Result};

/// Default app-proxy subpath, matching the app's Partner Dashboard setting
pub const DEFAULT_PROXY_SUBPATH: &str = "vehicle-search-widget";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Shop domain (e.g. my-store.myshopify.com), cached across runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop: Option<String>,

    /// Execution context the CLI should impersonate
    #[serde(default)]
    pub context: ContextKind,

    /// App-proxy subpath used for storefront URLs
    #[serde(default = "default_proxy_subpath")]
    pub proxy_subpath: String,

    /// Origin of the app backend, used for admin/dev contexts
    /// (e.g. http://localhost:3000 or the deployed app URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_url: Option<String>,

    /// Admin session token (a Shopify session JWT), sent as a bearer
    /// header when the context is Admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,

    /// Analytics session id passed to fitment/search endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_proxy_subpath() -> String {
    DEFAULT_PROXY_SUBPATH.to_string()
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Default page size for product listings
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    20
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            page_size: default_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shop: None,
            context: ContextKind::default(),
            proxy_subpath: default_proxy_subpath(),
            app_url: None,
            admin_token: None,
            session_id: None,
            preferences: Preferences::default(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".fitsearch").join("config.yaml"))
    }

    /// Resolve the config path from an optional override
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, honoring an optional path override
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration, honoring an optional path override
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Set file permissions to 600 on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Directory holding the config file, also used for the vehicle store
    pub fn data_dir(path: Option<&str>) -> Result<PathBuf> {
        let config_path = Self::resolve_path(path)?;
        Ok(config_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the session id, generating and recording one on first use
    pub fn ensure_session_id(&mut self) -> &str {
        if self.session_id.is_none() {
            self.session_id = Some(generate_session_id());
        }
        self.session_id.as_deref().unwrap_or_default()
    }

    /// Expiry of the admin session token, if it is a decodable JWT
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        let token = self.admin_token.as_deref()?;
        decode_jwt_expiry(token)
    }

    /// Whether the admin token is absent, undecodable, or past (or within
    /// 5 minutes of) its expiry
    pub fn is_token_expired(&self) -> bool {
        match self.token_expiry() {
            None => true,
            Some(expires_at) => {
                let buffer = chrono::Duration::minutes(5);
                expires_at - buffer < Utc::now()
            }
        }
    }
}

/// Generate a session id for analytics correlation.
///
/// Derived from the current time and process id, hashed so the raw values
/// do not leak into server logs.
fn generate_session_id() -> String {
    use sha2::{Digest, Sha256};

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(nanos.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());

    let digest = format!("{:x}", hasher.finalize());
    digest.chars().take(32).collect()
}

/// Decode base64url (URL-safe base64 without padding)
fn base64_decode_url(input: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::{engine::general_purpose, Engine as _};

    let standard_b64 = input.replace('-', "+").replace('_', "/");

    let padding = match standard_b64.len() % 4 {
        0 => "",
        2 => "==",
        3 => "=",
        _ => return Err("Invalid base64url length".to_string()),
    };

    let padded = format!("{}{}", standard_b64, padding);

    general_purpose::STANDARD
        .decode(&padded)
        .map_err(|e| e.to_string())
}

/// Extract the `exp` claim from a JWT without verifying its signature.
/// Shopify session tokens carry their expiry this way.
fn decode_jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    #[derive(Deserialize)]
    struct Claims {
        exp: i64,
    }

    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let payload = base64_decode_url(parts[1]).ok()?;
    let claims: Claims = serde_json::from_slice(&payload).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}
