//! Bot configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SLACK_BOT_TOKEN` - Slack bot token (xoxb-...)
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret
//!
//! ## Optional
//! - `BOT_HOST` - Bind address (default: 127.0.0.1)
//! - `BOT_PORT` - Listen port (default: 8080)
//! - `BOT_COMMAND_SET` - `full` or `basic` (default: full)
//! - `BOT_CHECK_DELAY_SECS` - Delay before the `check` reminder (default: 10)
//! - `BOT_CHECK_REFERENCE_USER` - User tagged by `check` (default: A017C1D07AR)
//! - `BOT_COOKING_SECS` - Wait between the cooking notices (default: 10)
//! - `BOT_SIGNATURE_TOLERANCE_SECS` - Request freshness window (default: 300)
//! - `BOT_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)
//!
//! ## Optional (TLS)
//! - `BOT_TLS_CERT` - PEM-encoded certificate chain
//! - `BOT_TLS_KEY` - PEM-encoded private key

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use gohan_core::{CommandSet, UserId};
use secrecy::SecretString;
use thiserror::Error;

use crate::services::DispatcherSettings;
use crate::services::dispatcher::DEFAULT_REFERENCE_USER;
use crate::slack::SignatureVerifier;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
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

/// Bot application configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Slack credentials
    pub slack: SlackConfig,
    /// Mention command settings
    pub commands: CommandConfig,
    /// Wait between the cooking start and completion notices
    pub cooking_duration: Duration,
    /// Emit JSON logs instead of human-readable ones
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// TLS configuration for HTTPS (optional)
    pub tls: Option<TlsConfig>,
}

/// Slack app credentials.
///
/// Implements `Debug` manually to redact secrets.
#[derive(Clone)]
pub struct SlackConfig {
    /// Slack bot token (xoxb-...).
    pub bot_token: SecretString,
    /// Slack app signing secret for webhook verification.
    pub signing_secret: SecretString,
    /// How far a request timestamp may drift from now.
    pub signature_tolerance: Duration,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("signing_secret", &"[REDACTED]")
            .field("signature_tolerance", &self.signature_tolerance)
            .finish()
    }
}

/// Mention command settings.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    /// Commands this deployment answers.
    pub command_set: CommandSet,
    /// Delay before the `check` reminder.
    pub check_delay: Duration,
    /// User tagged by the `check` reminder.
    pub reference_user: UserId,
}

/// TLS configuration for HTTPS.
#[derive(Clone)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain
    pub cert_pem: String,
    /// PEM-encoded private key
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &"[CERTIFICATE]")
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

/// A source of configuration values.
trait Env {
    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment.
struct ProcessEnv;

impl Env for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[cfg(test)]
impl Env for HashMap<&str, &str> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).map(ToString::to_string)
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// does not parse. Weak secrets only produce warnings.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::load(&ProcessEnv)
    }

    fn load(env: &impl Env) -> Result<Self, ConfigError> {
        let host = parse_env(env, "BOT_HOST", "127.0.0.1")?;
        let port = parse_env(env, "BOT_PORT", "8080")?;

        let slack = SlackConfig::load(env)?;
        let commands = CommandConfig::load(env)?;
        let cooking_duration = Duration::from_secs(parse_env(env, "BOT_COOKING_SECS", "10")?);
        let log_json = get_optional_env(env, "BOT_LOG_JSON")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        let sentry_dsn = get_optional_env(env, "SENTRY_DSN");
        let sentry_environment = get_optional_env(env, "SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env(env, "SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env(env, "SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);
        let tls = TlsConfig::load(env)?;

        Ok(Self {
            host,
            port,
            slack,
            commands,
            cooking_duration,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            tls,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Settings for the command dispatcher.
    #[must_use]
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            command_set: self.commands.command_set,
            check_delay: self.commands.check_delay,
            reference_user: self.commands.reference_user.clone(),
        }
    }

    /// A verifier for inbound webhook signatures.
    #[must_use]
    pub fn signature_verifier(&self) -> SignatureVerifier {
        SignatureVerifier::with_tolerance(
            self.slack.signing_secret.clone(),
            self.slack.signature_tolerance,
        )
    }
}

impl SlackConfig {
    fn load(env: &impl Env) -> Result<Self, ConfigError> {
        let bot_token = get_required_env(env, "SLACK_BOT_TOKEN")?;
        let signing_secret = get_required_env(env, "SLACK_SIGNING_SECRET")?;

        // Weak secrets are worth a warning, not a refusal to start
        if let Err(e) = validate_secret_strength(&bot_token, "SLACK_BOT_TOKEN") {
            tracing::warn!("SLACK_BOT_TOKEN validation warning: {e}");
        }
        if let Err(e) = validate_secret_strength(&signing_secret, "SLACK_SIGNING_SECRET") {
            tracing::warn!("SLACK_SIGNING_SECRET validation warning: {e}");
        }

        let tolerance_secs = parse_env(env, "BOT_SIGNATURE_TOLERANCE_SECS", "300")?;

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            signing_secret: SecretString::from(signing_secret),
            signature_tolerance: Duration::from_secs(tolerance_secs),
        })
    }
}

impl CommandConfig {
    fn load(env: &impl Env) -> Result<Self, ConfigError> {
        Ok(Self {
            command_set: parse_env(env, "BOT_COMMAND_SET", "full")?,
            check_delay: Duration::from_secs(parse_env(env, "BOT_CHECK_DELAY_SECS", "10")?),
            reference_user: UserId::new(get_env_or_default(
                env,
                "BOT_CHECK_REFERENCE_USER",
                DEFAULT_REFERENCE_USER,
            )),
        })
    }
}

impl TlsConfig {
    fn load(env: &impl Env) -> Result<Option<Self>, ConfigError> {
        let cert_pem = get_optional_env(env, "BOT_TLS_CERT");
        let key_pem = get_optional_env(env, "BOT_TLS_KEY");

        match (cert_pem, key_pem) {
            (Some(cert), Some(key)) => Ok(Some(Self {
                cert_pem: cert,
                key_pem: SecretString::from(key),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "BOT_TLS_*".to_string(),
                "Both BOT_TLS_CERT and BOT_TLS_KEY must be set together".to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(env: &impl Env, key: &str) -> Result<String, ConfigError> {
    env.get(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(env: &impl Env, key: &str) -> Option<String> {
    env.get(key).filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: &impl Env, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(env: &impl Env, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(env, key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
