//! Shared configuration structures.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::Serialize;

use domain::DEFAULT_QR_SERVICE_URL;

/// Admin console refresh period
pub const DEFAULT_ADMIN_POLL_SECS: u64 = 5;

/// Resident dashboard refresh period
pub const DEFAULT_RESIDENT_POLL_SECS: u64 = 2;

/// Fallback data directory when no platform directory can be resolved
pub const FALLBACK_DATA_DIR: &str = ".portal";

/// Portal configuration.
#[derive(Debug, Clone, Serialize)]
pub struct PortalConfig {
    /// Directory holding the database and session files
    pub data_dir: PathBuf,
    /// Interval between admin console refreshes
    pub admin_poll_interval: Duration,
    /// Interval between resident dashboard refreshes
    pub resident_poll_interval: Duration,
    /// External QR image renderer
    pub qr_service_url: String,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl PortalConfig {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            data_dir: lookup("PORTAL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            admin_poll_interval: secs("PORTAL_ADMIN_POLL_SECS", defaults.admin_poll_interval),
            resident_poll_interval: secs(
                "PORTAL_RESIDENT_POLL_SECS",
                defaults.resident_poll_interval,
            ),
            qr_service_url: lookup("PORTAL_QR_SERVICE_URL").unwrap_or(defaults.qr_service_url),
            log_level: lookup("PORTAL_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    /// Platform data directory, e.g. `~/.local/share/portal` on Linux.
    pub fn default_data_dir() -> PathBuf {
        ProjectDirs::from("com", "residencial", "portal")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            admin_poll_interval: Duration::from_secs(DEFAULT_ADMIN_POLL_SECS),
            resident_poll_interval: Duration::from_secs(DEFAULT_RESIDENT_POLL_SECS),
            qr_service_url: DEFAULT_QR_SERVICE_URL.to_string(),
            log_level: "info".to_string(),
        }
    }
}
