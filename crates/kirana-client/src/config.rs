//! # Client Configuration
//!
//! Where the order service lives and how the till checks out by default.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KIRANA_API_URL=http://10.0.0.5:8000/api                            │
//! │     KIRANA_WAREHOUSE_ID=wh-main                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/client.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.kirana.pos/client.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api, 30s timeout, fulfill + mark paid on     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [service]
//! base_url = "http://localhost:8000/api"
//! timeout_secs = 30
//! access_token = "eyJhbGciOi..."
//!
//! [checkout]
//! default_warehouse_id = "wh-main"
//! auto_fulfill = true
//! mark_paid = true
//! notes = "POS Order"
//! ```

use kirana_core::{CheckoutFlags, DEFAULT_ORDER_NOTES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ClientResult, ServiceError};

// =============================================================================
// Service Settings
// =============================================================================

/// How to reach the order service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Bearer token sent with every request, if the service needs one.
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ServiceSettings {
    fn default() -> Self {
        ServiceSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            access_token: None,
        }
    }
}

// =============================================================================
// Checkout Settings
// =============================================================================

/// Defaults a fresh POS session starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Warehouse preselected for every session on this till.
    #[serde(default)]
    pub default_warehouse_id: Option<String>,

    #[serde(default = "default_true")]
    pub auto_fulfill: bool,

    #[serde(default = "default_true")]
    pub mark_paid: bool,

    /// Free-text notes attached to each order.
    #[serde(default = "default_notes")]
    pub notes: String,
}

fn default_true() -> bool {
    true
}

fn default_notes() -> String {
    DEFAULT_ORDER_NOTES.to_string()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            default_warehouse_id: None,
            auto_fulfill: true,
            mark_paid: true,
            notes: default_notes(),
        }
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub service: ServiceSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl ClientConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Override with config file (if exists)
    /// 3. Override with environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration, falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = reqwest::Url::parse(&self.service.base_url)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", self.service.base_url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ServiceError::InvalidUrl(format!(
                "Service URL must start with http:// or https://, got: {}",
                self.service.base_url
            )));
        }

        if self.service.timeout_secs == 0 {
            return Err(ServiceError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `KIRANA_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    ///
    /// Unparseable numbers and booleans are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("KIRANA_API_URL") {
            debug!(url = %url, "Overriding service URL from environment");
            self.service.base_url = url;
        }

        if let Some(token) = lookup("KIRANA_API_TOKEN") {
            self.service.access_token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(timeout) = lookup("KIRANA_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(t) => self.service.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Invalid KIRANA_TIMEOUT_SECS in environment"),
            }
        }

        if let Some(warehouse) = lookup("KIRANA_WAREHOUSE_ID") {
            debug!(warehouse_id = %warehouse, "Overriding default warehouse from environment");
            self.checkout.default_warehouse_id = Some(warehouse).filter(|w| !w.is_empty());
        }

        if let Some(value) = lookup("KIRANA_AUTO_FULFILL") {
            match parse_flag(&value) {
                Some(flag) => self.checkout.auto_fulfill = flag,
                None => warn!(value = %value, "Invalid KIRANA_AUTO_FULFILL in environment"),
            }
        }

        if let Some(value) = lookup("KIRANA_MARK_PAID") {
            match parse_flag(&value) {
                Some(flag) => self.checkout.mark_paid = flag,
                None => warn!(value = %value, "Invalid KIRANA_MARK_PAID in environment"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "kirana", "pos")
            .map(|dirs| dirs.config_dir().join("client.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Checkout toggles a new session starts with.
    pub fn flags(&self) -> CheckoutFlags {
        CheckoutFlags {
            auto_fulfill: self.checkout.auto_fulfill,
            mark_paid: self.checkout.mark_paid,
        }
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
