//! Configuration types.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Default model for the hosted completion service.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Default OpenAI-compatible endpoint (Groq).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Prefix every valid Groq key starts with.
const API_KEY_PREFIX: &str = "gsk_";

/// Remote completion service settings.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Process-wide triage configuration, built from environment variables.
///
/// Read once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// `None` runs the service in rule-based mode.
    pub remote: Option<RemoteConfig>,
    /// Maximum characters accepted from a single input.
    pub max_content_chars: usize,
    /// Maximum size of an input file.
    pub max_file_bytes: u64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            remote: None,
            max_content_chars: 50_000,
            max_file_bytes: 10 * 1024 * 1024, // 10 MiB
        }
    }
}

impl TriageConfig {
    /// Build config from environment variables.
    ///
    /// The remote service is enabled only when `GROQ_API_KEY` is set and
    /// looks like a Groq key; anything else leaves `remote` empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let remote = match std::env::var("GROQ_API_KEY") {
            Ok(key) if key.starts_with(API_KEY_PREFIX) => {
                let model = std::env::var("EMAIL_TRIAGE_MODEL")
                    .unwrap_or_else(|_| DEFAULT_MODEL.to_string());
                let base_url = std::env::var("EMAIL_TRIAGE_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
                let timeout_secs: u64 = parse_env("EMAIL_TRIAGE_TIMEOUT_SECS", 30)?;

                Some(RemoteConfig {
                    api_key: SecretString::from(key),
                    model,
                    base_url,
                    timeout: Duration::from_secs(timeout_secs),
                })
            }
            Ok(_) => {
                tracing::warn!("GROQ_API_KEY does not look like a Groq key, using rule-based mode");
                None
            }
            Err(_) => None,
        };

        let max_content_chars =
            parse_env("EMAIL_TRIAGE_MAX_CONTENT_CHARS", defaults.max_content_chars)?;
        let max_file_bytes = parse_env("EMAIL_TRIAGE_MAX_FILE_BYTES", defaults.max_file_bytes)?;

        Ok(Self {
            remote,
            max_content_chars,
            max_file_bytes,
        })
    }

    /// Whether a remote service is configured.
    pub fn remote_enabled(&self) -> bool {
        self.remote
            .as_ref()
            .is_some_and(|r| !r.api_key.expose_secret().is_empty())
    }
}

/// Parse an optional numeric environment variable, falling back to `default`
/// when unset. A set-but-invalid value is an error.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
