use crate::adapters::outbound::GeoLiteConfig;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Value of `ENVIRONMENT` that enables the auth bypass.
pub const TEST_ENVIRONMENT: &str = "test";

#[derive(Clone)]
pub struct Config {
    // HTTP server
    pub listen_addr: String,
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    pub debug: bool,

    // Inbound basic auth
    pub auth_username: String,
    pub auth_password: String,
    pub test_mode: bool,

    // Outbound geolocation provider
    pub maxmind_user_id: String,
    pub maxmind_license_key: String,
    pub geolite_base_url: String,
    pub geolite_timeout_ms: u64,
    pub geolite_client_timeout_ms: u64,

    // Resolution cache
    pub cache_max_entries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 5,
            shutdown_grace_secs: 5,
            debug: false,
            auth_username: String::new(),
            auth_password: String::new(),
            test_mode: false,
            maxmind_user_id: String::new(),
            maxmind_license_key: String::new(),
            geolite_base_url: "https://geolite.info".to_string(),
            geolite_timeout_ms: 1000,
            geolite_client_timeout_ms: 3000,
            cache_max_entries: 0,
        }
    }
}

// Secrets are redacted so the config can be logged.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("shutdown_grace_secs", &self.shutdown_grace_secs)
            .field("debug", &self.debug)
            .field("auth_username", &self.auth_username)
            .field("auth_password", &"<redacted>")
            .field("test_mode", &self.test_mode)
            .field("maxmind_user_id", &self.maxmind_user_id)
            .field("maxmind_license_key", &"<redacted>")
            .field("geolite_base_url", &self.geolite_base_url)
            .field("geolite_timeout_ms", &self.geolite_timeout_ms)
            .field("geolite_client_timeout_ms", &self.geolite_client_timeout_ms)
            .field("cache_max_entries", &self.cache_max_entries)
            .finish()
    }
}

impl Config {
    /// Build a config from a variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let number = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let maxmind_license_key = lookup("MAXIND_LICENSE_KEY")
            .or_else(|| lookup("MAXMIND_LICENSE_KEY"))
            .unwrap_or_default();

        Self {
            listen_addr: string("GEOLOCATE_LISTEN_ADDR", &defaults.listen_addr),
            request_timeout_secs: number(
                "GEOLOCATE_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
            shutdown_grace_secs: number(
                "GEOLOCATE_SHUTDOWN_GRACE_SECS",
                defaults.shutdown_grace_secs,
            ),
            debug: lookup("DEBUG").is_some(),
            auth_username: string("BASIC_AUTH_USERNAME", ""),
            auth_password: string("BASIC_AUTH_PASSWORD", ""),
            test_mode: lookup("ENVIRONMENT")
                .map(|v| v.trim().eq_ignore_ascii_case(TEST_ENVIRONMENT))
                .unwrap_or(false),
            maxmind_user_id: string("MAXMIND_USER_ID", ""),
            maxmind_license_key,
            geolite_base_url: string("GEOLITE_BASE_URL", &defaults.geolite_base_url),
            geolite_timeout_ms: number("GEOLITE_TIMEOUT_MS", defaults.geolite_timeout_ms),
            geolite_client_timeout_ms: number(
                "GEOLITE_CONNECT_TIMEOUT_MS",
                defaults.geolite_client_timeout_ms,
            ),
            cache_max_entries: number("GEOLOCATE_CACHE_MAX_ENTRIES", 0) as usize,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.test_mode && (self.auth_username.is_empty() || self.auth_password.is_empty()) {
            return Err(ConfigError::MissingAuthCredentials);
        }
        if self.geolite_timeout_ms == 0 {
            return Err(ConfigError::ZeroLookupTimeout);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        Ok(())
    }

    /// Settings for the outbound GeoLite client.
    pub fn geolite(&self) -> GeoLiteConfig {
        GeoLiteConfig {
            base_url: self.geolite_base_url.clone(),
            user_id: self.maxmind_user_id.clone(),
            license_key: self.maxmind_license_key.clone(),
            lookup_timeout: Duration::from_millis(self.geolite_timeout_ms),
            client_timeout: Duration::from_millis(self.geolite_client_timeout_ms),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("BASIC_AUTH_USERNAME and BASIC_AUTH_PASSWORD are required outside the test environment")]
    MissingAuthCredentials,
    #[error("GEOLITE_TIMEOUT_MS must be greater than zero")]
    ZeroLookupTimeout,
    #[error("GEOLOCATE_REQUEST_TIMEOUT_SECS must be greater than zero")]
    ZeroRequestTimeout,
}

/// Load variables from a dotenv file into the process environment.
///
/// Variables already set in the environment win. A missing file is not
/// an error; returns whether the file was read.
pub fn load_env_file(path: &Path) -> anyhow::Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> anyhow::Result<Config> {
    let cfg = Config::from_lookup(|key| std::env::var(key).ok());
    cfg.validate()?;
    Ok(cfg)
}

/// Load configuration from an explicit map (used by tests and tools).
pub fn config_from_map(vars: &HashMap<String, String>) -> Config {
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.geolite_base_url, "https://geolite.info");
        assert_eq!(cfg.geolite_timeout_ms, 1000);
        assert_eq!(cfg.cache_max_entries, 0);
        assert!(!cfg.test_mode);
        assert!(!cfg.debug);
    }

    #[test]
    fn test_empty_lookup_uses_defaults() {
        let cfg = config_from_map(&HashMap::new());
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.request_timeout_secs, 5);
        assert_eq!(cfg.shutdown_grace_secs, 5);
        assert!(cfg.auth_username.is_empty());
    }

    #[test]
    fn test_credentials_loaded() {
        let cfg = config_from_map(&vars(&[
            ("BASIC_AUTH_USERNAME", "admin"),
            ("BASIC_AUTH_PASSWORD", "hunter2"),
            ("MAXMIND_USER_ID", "12345"),
            ("MAXIND_LICENSE_KEY", "license"),
        ]));
        assert_eq!(cfg.auth_username, "admin");
        assert_eq!(cfg.auth_password, "hunter2");
        assert_eq!(cfg.maxmind_user_id, "12345");
        assert_eq!(cfg.maxmind_license_key, "license");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_license_key_alias() {
        let cfg = config_from_map(&vars(&[("MAXMIND_LICENSE_KEY", "corrected")]));
        assert_eq!(cfg.maxmind_license_key, "corrected");

        let cfg = config_from_map(&vars(&[
            ("MAXIND_LICENSE_KEY", "legacy"),
            ("MAXMIND_LICENSE_KEY", "corrected"),
        ]));
        assert_eq!(cfg.maxmind_license_key, "legacy");
    }

    #[test]
    fn test_test_mode() {
        assert!(config_from_map(&vars(&[("ENVIRONMENT", "test")])).test_mode);
        assert!(config_from_map(&vars(&[("ENVIRONMENT", "TEST")])).test_mode);
        assert!(!config_from_map(&vars(&[("ENVIRONMENT", "production")])).test_mode);
    }

    #[test]
    fn test_validate_requires_auth_outside_test_mode() {
        let cfg = config_from_map(&HashMap::new());
        assert_eq!(cfg.validate(), Err(ConfigError::MissingAuthCredentials));

        let cfg = config_from_map(&vars(&[("BASIC_AUTH_USERNAME", "admin")]));
        assert_eq!(cfg.validate(), Err(ConfigError::MissingAuthCredentials));
    }

    #[test]
    fn test_validate_test_mode_without_auth() {
        let cfg = config_from_map(&vars(&[("ENVIRONMENT", "test")]));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let cfg = config_from_map(&vars(&[
            ("ENVIRONMENT", "test"),
            ("GEOLITE_TIMEOUT_MS", "0"),
        ]));
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroLookupTimeout));
    }

    #[test]
    fn test_validate_zero_request_timeout() {
        let cfg = config_from_map(&vars(&[
            ("ENVIRONMENT", "test"),
            ("GEOLOCATE_REQUEST_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroRequestTimeout));
    }

    #[test]
    fn test_numeric_overrides() {
        let cfg = config_from_map(&vars(&[
            ("GEOLITE_TIMEOUT_MS", "2500"),
            ("GEOLITE_CONNECT_TIMEOUT_MS", "4000"),
            ("GEOLOCATE_REQUEST_TIMEOUT_SECS", "10"),
            ("GEOLOCATE_CACHE_MAX_ENTRIES", "10000"),
            ("GEOLOCATE_SHUTDOWN_GRACE_SECS", "1"),
        ]));
        assert_eq!(cfg.geolite_timeout_ms, 2500);
        assert_eq!(cfg.geolite_client_timeout_ms, 4000);
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.cache_max_entries, 10000);
        assert_eq!(cfg.shutdown_grace_secs, 1);
    }

    #[test]
    fn test_parse_error_uses_default() {
        let cfg = config_from_map(&vars(&[("GEOLITE_TIMEOUT_MS", "not_a_number")]));
        assert_eq!(cfg.geolite_timeout_ms, 1000); // default
    }

    #[test]
    fn test_debug_flag() {
        assert!(config_from_map(&vars(&[("DEBUG", "1")])).debug);
    }

    #[test]
    fn test_geolite_settings() {
        let cfg = config_from_map(&vars(&[
            ("GEOLITE_BASE_URL", "http://127.0.0.1:9999"),
            ("MAXMIND_USER_ID", "42"),
            ("MAXIND_LICENSE_KEY", "key"),
            ("GEOLITE_TIMEOUT_MS", "1500"),
        ]));
        let geo = cfg.geolite();
        assert_eq!(geo.base_url, "http://127.0.0.1:9999");
        assert_eq!(geo.user_id, "42");
        assert_eq!(geo.license_key, "key");
        assert_eq!(geo.lookup_timeout, Duration::from_millis(1500));
        assert_eq!(geo.client_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let cfg = config_from_map(&vars(&[
            ("BASIC_AUTH_PASSWORD", "hunter2"),
            ("MAXIND_LICENSE_KEY", "license-secret"),
        ]));
        let debug_str = format!("{:?}", cfg);
        assert!(debug_str.contains("listen_addr"));
        assert!(!debug_str.contains("hunter2"));
        assert!(!debug_str.contains("license-secret"));
    }

    #[test]
    fn test_load_env_file_missing_is_ok() {
        let result = load_env_file(Path::new("/nonexistent/geolocate-ip.env"));
        assert!(!result.unwrap());
    }

    #[test]
    fn test_load_env_file_sets_vars() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GEOLOCATE_TEST_ENV_FILE_MARKER=from-file").unwrap();

        assert!(load_env_file(file.path()).unwrap());
        assert_eq!(
            std::env::var("GEOLOCATE_TEST_ENV_FILE_MARKER").unwrap(),
            "from-file"
        );
    }
}
