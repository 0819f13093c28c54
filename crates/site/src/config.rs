//! Site configuration loaded from environment variables.
//!
//! Demo mode is decided here, once, at startup: when no document store
//! credentials are configured the whole process runs against in-memory
//! emulators (catalog, media, auth) and never touches the network. There is
//! no runtime toggle.
//!
//! # Environment Variables
//!
//! ## Live mode (all required together)
//! - `STORE_API_URL` - Document store API base URL
//! - `STORE_API_KEY` - Document store API key
//! - `STORAGE_API_URL` - Object storage write URL
//! - `STORAGE_PUBLIC_URL` - Public base URL for stored objects
//! - `STORAGE_API_KEY` - Object storage API key
//! - `AUTH_API_URL` - Identity service API base URL
//! - `AUTH_API_KEY` - Identity service API key
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_BASE_URL` - Public URL of the site (default: <http://localhost:3000>)
//! - `SITE_SESSION_SECRET` - Session signing secret (min 32 chars, high
//!   entropy; required in live mode, generated per-process in demo mode)
//! - `STORE_POLL_SECONDS` - Snapshot poll interval for the live store (default: 2)
//! - `AUTH_FEDERATED_CLIENT_ID` - OAuth client id for "Continue with Google"
//! - `AUTH_FEDERATED_AUTHORIZE_URL` - OAuth authorize endpoint
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry trace sample rate (default: 0.1)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Length of the per-process session secret generated in demo mode.
const GENERATED_SECRET_LENGTH: usize = 64;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Document store connection; `None` switches the process to demo mode
    pub store: Option<StoreSettings>,
    /// Object storage connection; present exactly when `store` is
    pub storage: Option<StorageSettings>,
    /// Identity service connection; present exactly when `store` is
    pub auth: Option<AuthSettings>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry trace sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Document store connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct StoreSettings {
    /// Store API base URL
    pub api_url: String,
    /// Store API key
    pub api_key: SecretString,
    /// How often snapshot subscriptions re-read a collection
    pub poll_interval: Duration,
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// Object storage connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct StorageSettings {
    /// Write endpoint base URL
    pub api_url: String,
    /// Public base URL prefixed onto object keys
    pub public_url: String,
    /// Storage API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSettings")
            .field("api_url", &self.api_url)
            .field("public_url", &self.public_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Identity service connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AuthSettings {
    /// Identity API base URL
    pub api_url: String,
    /// Identity API key
    pub api_key: SecretString,
    /// OAuth client id for the federated sign-in button
    pub federated_client_id: Option<String>,
    /// OAuth authorize endpoint for the federated sign-in button
    pub federated_authorize_url: Option<String>,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("federated_client_id", &self.federated_client_id)
            .field("federated_authorize_url", &self.federated_authorize_url)
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if variables are missing or invalid, if only
    /// part of the live-mode credential set is configured, or if secrets
    /// fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SITE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SITE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SITE_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("SITE_BASE_URL", "http://localhost:3000");

        let store = StoreSettings::from_env()?;

        // Live mode needs the full credential set; demo mode needs none.
        let (storage, auth) = if store.is_some() {
            (
                Some(StorageSettings::from_env()?),
                Some(AuthSettings::from_env()?),
            )
        } else {
            (None, None)
        };

        let session_secret = match get_optional_env("SITE_SESSION_SECRET") {
            Some(value) => {
                validate_secret_strength(&value, "SITE_SESSION_SECRET")?;
                let secret = SecretString::from(value);
                validate_session_secret(&secret, "SITE_SESSION_SECRET")?;
                secret
            }
            None if store.is_none() => generate_session_secret(),
            None => {
                return Err(ConfigError::MissingEnvVar("SITE_SESSION_SECRET".to_string()));
            }
        };

        let sentry_sample_rate = get_env_or_default("SENTRY_SAMPLE_RATE", "1.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), e.to_string())
            })?;
        let sentry_traces_sample_rate = get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.1")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_TRACES_SAMPLE_RATE".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            store,
            storage,
            auth,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Whether the process runs against in-memory emulators.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        self.store.is_none()
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreSettings {
    /// `Some` when both store variables are set, `None` when neither is.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_url = get_optional_env("STORE_API_URL");
        let api_key = get_optional_env("STORE_API_KEY");

        let (api_url, api_key) = match (api_url, api_key) {
            (Some(url), Some(key)) => (url, key),
            (None, None) => return Ok(None),
            // Half a credential pair is a deployment mistake, not demo mode.
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar("STORE_API_KEY".to_string()));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("STORE_API_URL".to_string()));
            }
        };

        validate_secret_strength(&api_key, "STORE_API_KEY")?;

        let poll_interval = get_env_or_default("STORE_POLL_SECONDS", "2")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_POLL_SECONDS".to_string(), e.to_string())
            })?;

        Ok(Some(Self {
            api_url,
            api_key: SecretString::from(api_key),
            poll_interval: Duration::from_secs(poll_interval),
        }))
    }
}

impl StorageSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: get_required_env("STORAGE_API_URL")?,
            public_url: get_required_env("STORAGE_PUBLIC_URL")?,
            api_key: get_validated_secret("STORAGE_API_KEY")?,
        })
    }
}

impl AuthSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: get_required_env("AUTH_API_URL")?,
            api_key: get_validated_secret("AUTH_API_KEY")?,
            federated_client_id: get_optional_env("AUTH_FEDERATED_CLIENT_ID"),
            federated_authorize_url: get_optional_env("AUTH_FEDERATED_AUTHORIZE_URL"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Generate a random per-process session secret for demo mode.
///
/// Sessions do not survive a restart, which matches the rest of demo mode.
fn generate_session_secret() -> SecretString {
    let secret: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LENGTH)
        .map(char::from)
        .collect();
    SecretString::from(secret)
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn demo_config() -> SiteConfig {
        SiteConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: generate_session_secret(),
            store: None,
            storage: None,
            auth: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_generated_secret_passes_validation() {
        let secret = generate_session_secret();
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_ok());
        assert!(validate_secret_strength(secret.expose_secret(), "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_demo_mode_when_store_absent() {
        let config = demo_config();
        assert!(config.is_demo());

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_store_settings_debug_redacts_key() {
        let settings = StoreSettings {
            api_url: "https://store.example.com".to_string(),
            api_key: SecretString::from("super_secret_store_key"),
            poll_interval: Duration::from_secs(2),
        };

        let debug_output = format!("{settings:?}");
        assert!(debug_output.contains("https://store.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_store_key"));
    }

    #[test]
    fn test_auth_settings_debug_redacts_key() {
        let settings = AuthSettings {
            api_url: "https://auth.example.com".to_string(),
            api_key: SecretString::from("super_secret_auth_key"),
            federated_client_id: Some("client-1".to_string()),
            federated_authorize_url: None,
        };

        let debug_output = format!("{settings:?}");
        assert!(debug_output.contains("client-1"));
        assert!(!debug_output.contains("super_secret_auth_key"));
    }
}
