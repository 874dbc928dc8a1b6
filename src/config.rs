//! Client configuration.
//!
//! Values come from the environment with sensible defaults for a single
//! back-office workstation: backend on `localhost:5000`, print agent on
//! `localhost:5003`.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_PRINT_AGENT_URL: &str = "http://localhost:5003";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const ENV_API_URL: &str = "LILY_API_URL";
pub const ENV_PRINT_AGENT_URL: &str = "LILY_PRINT_AGENT_URL";
pub const ENV_TIMEOUT_SECS: &str = "LILY_TIMEOUT_SECS";
pub const ENV_LOG_DIR: &str = "LILY_LOG_DIR";
pub const ENV_KEYRING_SERVICE: &str = "LILY_KEYRING_SERVICE";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `http://localhost:5000/api`. Endpoints are
    /// appended verbatim.
    pub api_url: String,
    /// Local receipt-printer agent.
    pub print_agent_url: String,
    pub timeout: Duration,
    /// Keyring service the persisted session lives under.
    pub keyring_service: String,
    pub log_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            print_agent_url: DEFAULT_PRINT_AGENT_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            keyring_service: crate::storage::DEFAULT_SERVICE_NAME.to_string(),
            log_dir: default_log_dir(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl AsRef<str>) -> Self {
        Self::default().with_api_url(api_url)
    }

    /// Build from `LILY_*` environment variables, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = env_non_empty(ENV_API_URL) {
            config.api_url = normalize_base_url(&url);
        }
        if let Some(url) = env_non_empty(ENV_PRINT_AGENT_URL) {
            config.print_agent_url = normalize_base_url(&url);
        }
        if let Some(raw) = env_non_empty(ENV_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "ignoring invalid {ENV_TIMEOUT_SECS}"),
            }
        }
        if let Some(service) = env_non_empty(ENV_KEYRING_SERVICE) {
            config.keyring_service = service;
        }
        if let Some(dir) = env_non_empty(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }

        config
    }

    pub fn with_api_url(mut self, url: impl AsRef<str>) -> Self {
        self.api_url = normalize_base_url(url.as_ref());
        self
    }

    pub fn with_print_agent_url(mut self, url: impl AsRef<str>) -> Self {
        self.print_agent_url = normalize_base_url(url.as_ref());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalise a base URL:
/// - trim whitespace
/// - ensure a scheme is present (http for localhost and LAN addresses,
///   https otherwise)
/// - strip trailing slashes
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if is_local_host(&url) {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

/// Per-user data directory for log files.
/// Host part of a scheme-less URL is `localhost` or a loopback, private or
/// link-local IPv4 address.
fn is_local_host(url: &str) -> bool {
    let authority = url.split('/').next().unwrap_or_default();
    let host = authority.split(':').next().unwrap_or_default();
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.parse::<Ipv4Addr>()
        .map(|ip| ip.is_loopback() || ip.is_private() || ip.is_link_local())
        .unwrap_or(false)
}

pub fn default_log_dir() -> PathBuf {
    let base = std::env::var("LOCALAPPDATA")
        .or_else(|_| std::env::var("XDG_DATA_HOME"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(target_os = "windows")]
            {
                PathBuf::from(std::env::var("USERPROFILE").unwrap_or_else(|_| ".".into()))
                    .join("AppData")
                    .join("Local")
            }
            #[cfg(not(target_os = "windows"))]
            {
                PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
                    .join(".local")
                    .join("share")
            }
        });
    base.join("lily-backoffice").join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            ENV_API_URL,
            ENV_PRINT_AGENT_URL,
            ENV_TIMEOUT_SECS,
            ENV_LOG_DIR,
            ENV_KEYRING_SERVICE,
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn normalize_adds_scheme_and_strips_slashes() {
        assert_eq!(
            normalize_base_url("localhost:5000/api/"),
            "http://localhost:5000/api"
        );
        assert_eq!(
            normalize_base_url(" api.example.com// "),
            "https://api.example.com"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/api"),
            "https://api.example.com/api"
        );
    }

    #[test]
    fn lan_addresses_default_to_http() {
        assert_eq!(normalize_base_url("10.0.0.5:5000"), "http://10.0.0.5:5000");
        assert_eq!(
            normalize_base_url("172.16.4.2/api"),
            "http://172.16.4.2/api"
        );
        assert_eq!(normalize_base_url("127.0.0.1"), "http://127.0.0.1");
        assert_eq!(normalize_base_url("8.8.8.8:443"), "https://8.8.8.8:443");
        assert_eq!(
            normalize_base_url("localhost.example.com"),
            "https://localhost.example.com"
        );
    }

    #[test]
    #[serial]
    fn from_env_uses_defaults_when_unset() {
        clear_env();
        let config = ClientConfig::from_env();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.print_agent_url, DEFAULT_PRINT_AGENT_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.log_dir.ends_with("logs"));
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() {
        clear_env();
        std::env::set_var(ENV_API_URL, "192.168.1.20:5000/api/");
        std::env::set_var(ENV_TIMEOUT_SECS, "25");
        std::env::set_var(ENV_KEYRING_SERVICE, "lily-test");
        let config = ClientConfig::from_env();
        clear_env();

        assert_eq!(config.api_url, "http://192.168.1.20:5000/api");
        assert_eq!(config.timeout, Duration::from_secs(25));
        assert_eq!(config.keyring_service, "lily-test");
    }

    #[test]
    #[serial]
    fn from_env_ignores_bad_timeout() {
        clear_env();
        std::env::set_var(ENV_TIMEOUT_SECS, "soon");
        let config = ClientConfig::from_env();
        clear_env();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
