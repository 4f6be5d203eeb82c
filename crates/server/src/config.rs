//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Server
//! - `ATELIER_HOST` - Bind address (default: 127.0.0.1)
//! - `ATELIER_PORT` - Listen port (default: 3000)
//! - `CORS_ALLOWED_ORIGIN` - Allowed browser origin (default: any)
//!
//! ## Storage
//! - `ATELIER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `USE_MOCK_REPOSITORIES` - `true` forces the in-memory repositories
//!
//! ## Email (optional, all-or-nothing)
//! - `SMTP_HOST` - SMTP relay host
//! - `SMTP_PORT` - SMTP relay port (default: 587)
//! - `SMTP_USERNAME` / `SMTP_PASSWORD` - relay credentials
//! - `EMAIL_FROM` - Sender address (default: `SMTP_USERNAME`)
//! - `ADMIN_EMAIL` - Where order and support notifications go (default: admin@example.com)
//!
//! ## Payments
//! - `SUCCESS_REDIRECT_URL` - Where `/order/success` redirects (default: <http://localhost:3000/success>)
//!
//! ## Media (optional, all-or-nothing)
//! - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`
//!
//! ## Error tracking
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const DEFAULT_SUCCESS_REDIRECT_URL: &str = "http://localhost:3000/success";
const DEFAULT_SMTP_PORT: u16 = 587;

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

/// Decide whether the in-memory repositories should back the server.
///
/// True when the override flag is exactly `"true"` or when no connection
/// string is available.
#[must_use]
pub fn should_use_mocks(use_mocks: Option<&str>, database_url: Option<&str>) -> bool {
    use_mocks == Some("true") || database_url.is_none_or(str::is_empty)
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Whether to serve from the in-memory repositories
    pub use_mock_repositories: bool,
    /// Recipient of order and support notifications
    pub admin_email: String,
    /// Target of the post-payment redirect
    pub success_redirect_url: String,
    /// Browser origin allowed by CORS, permissive when unset
    pub cors_allowed_origin: Option<String>,
    /// SMTP settings, `None` disables outgoing email
    pub email: Option<EmailConfig>,
    /// Cloudinary settings, `None` disables media uploads
    pub cloudinary: Option<CloudinaryConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// SMTP relay configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// Envelope sender for every outgoing message
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// Cloudinary API configuration.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed, if a partially
    /// configured integration is missing its credentials, or if the
    /// Cloudinary secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ATELIER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ATELIER_HOST".to_string(), e.to_string()))?;
        let port = parse_env_or_default("ATELIER_PORT", 3000_u16)?;

        let database_url = get_database_url("ATELIER_DATABASE_URL");
        let use_mock_repositories = should_use_mocks(
            get_optional_env("USE_MOCK_REPOSITORIES").as_deref(),
            database_url.as_ref().map(ExposeSecret::expose_secret),
        );

        Ok(Self {
            host,
            port,
            database_url,
            use_mock_repositories,
            admin_email: get_env_or_default("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            success_redirect_url: get_env_or_default(
                "SUCCESS_REDIRECT_URL",
                DEFAULT_SUCCESS_REDIRECT_URL,
            ),
            cors_allowed_origin: get_optional_env("CORS_ALLOWED_ORIGIN"),
            email: EmailConfig::from_env()?,
            cloudinary: CloudinaryConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default("SENTRY_SAMPLE_RATE", 1.0_f32)?,
            sentry_traces_sample_rate: parse_env_or_default("SENTRY_TRACES_SAMPLE_RATE", 0.0_f32)?,
        })
    }

    /// Configuration for a local process with no external services.
    ///
    /// In-memory repositories, email and media uploads disabled.
    #[must_use]
    pub fn local() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            database_url: None,
            use_mock_repositories: true,
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            success_redirect_url: DEFAULT_SUCCESS_REDIRECT_URL.to_string(),
            cors_allowed_origin: None,
            email: None,
            cloudinary: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = get_optional_env("SMTP_HOST") else {
            return Ok(None);
        };
        let smtp_username = get_required_env("SMTP_USERNAME")?;
        let smtp_password = SecretString::from(get_required_env("SMTP_PASSWORD")?);
        let from_address = get_optional_env("EMAIL_FROM").unwrap_or_else(|| smtp_username.clone());

        Ok(Some(Self {
            smtp_host,
            smtp_port: parse_env_or_default("SMTP_PORT", DEFAULT_SMTP_PORT)?,
            smtp_username,
            smtp_password,
            from_address,
        }))
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(cloud_name) = get_optional_env("CLOUDINARY_CLOUD_NAME") else {
            return Ok(None);
        };

        Ok(Some(Self {
            cloud_name,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_validated_secret("CLOUDINARY_API_SECRET")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
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
    let len = s.chars().count() as f64;
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

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret issued by the provider."
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

    #[test]
    fn test_should_use_mocks_flag_forces_mocks() {
        assert!(should_use_mocks(Some("true"), Some("postgres://localhost/atelier")));
    }

    #[test]
    fn test_should_use_mocks_without_database_url() {
        assert!(should_use_mocks(None, None));
        assert!(should_use_mocks(Some("false"), None));
        assert!(should_use_mocks(None, Some("")));
    }

    #[test]
    fn test_should_use_mocks_with_database_url() {
        assert!(!should_use_mocks(None, Some("postgres://localhost/atelier")));
        assert!(!should_use_mocks(Some("false"), Some("postgres://localhost/atelier")));
        // Only the exact lowercase literal counts
        assert!(!should_use_mocks(Some("TRUE"), Some("postgres://localhost/atelier")));
        assert!(!should_use_mocks(Some("1"), Some("postgres://localhost/atelier")));
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-secret-here", "CLOUDINARY_API_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaa", "CLOUDINARY_API_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3xY9mK2nL5pQ7rT0uW4zC6", "CLOUDINARY_API_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_local_config_uses_mocks() {
        let config = ServerConfig::local();
        assert!(config.use_mock_repositories);
        assert!(config.email.is_none());
        assert_eq!(config.success_redirect_url, "http://localhost:3000/success");
        assert_eq!(config.socket_addr().port(), 3000);
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.mailbox.test".to_string(),
            smtp_port: 587,
            smtp_username: "shop@mailbox.test".to_string(),
            smtp_password: SecretString::from("hunter2-hunter2"),
            from_address: "shop@mailbox.test".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.mailbox.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }

    #[test]
    fn test_cloudinary_config_debug_redacts_secret() {
        let config = CloudinaryConfig {
            cloud_name: "atelier".to_string(),
            api_key: "123456789012345".to_string(),
            api_secret: SecretString::from("aB3xY9mK2nL5pQ7rT0uW4zC6"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("atelier"));
        assert!(!debug_output.contains("aB3xY9mK2nL5pQ7rT0uW4zC6"));
    }
}
