//! Environment-driven engine configuration.
//!
//! All knobs have defaults; only the Gemini API key has to be provided
//! when the shipped backend is used. A `.env` file is honoured via
//! dotenvy.

use crate::backend::gemini::DEFAULT_API_BASE;
use crate::retry::{BackoffStrategy, RetryPolicy};
use crate::types::{AppError, Result};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Default model, matching the reference deployment.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Construction-time configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Model identifier handed to every agent's backend config.
    pub model: String,
    /// Gemini API key; only required when the shipped backend is used.
    pub api_key: Option<String>,
    /// Backend endpoint, overridable for proxies and tests.
    pub api_base: String,
    /// Attempt budget per backend/capability call.
    pub max_attempts: u32,
    /// Time budget for a single attempt.
    pub attempt_timeout: Duration,
    /// Exponential backoff base delay.
    pub backoff_base: Duration,
    /// Exponential backoff delay cap.
    pub backoff_cap: Duration,
    /// Maximum tool round-trips per agent invocation.
    pub tool_round_trip_cap: usize,
    /// Result limit for the web search capability.
    pub search_results: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(30),
            backoff_base: Duration::from_millis(500),
            backoff_cap: Duration::from_secs(8),
            tool_round_trip_cap: 5,
            search_results: 10,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when a set variable fails to
    /// parse.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            model: env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            api_key: env::var("GEMINI_API_KEY").ok(),
            api_base: env::var("GEMINI_API_BASE").unwrap_or(defaults.api_base),
            max_attempts: parse_var("TANDEM_MAX_ATTEMPTS", defaults.max_attempts)?,
            attempt_timeout: Duration::from_secs(parse_var(
                "TANDEM_ATTEMPT_TIMEOUT_SECS",
                defaults.attempt_timeout.as_secs(),
            )?),
            backoff_base: Duration::from_millis(parse_var(
                "TANDEM_BACKOFF_BASE_MS",
                defaults.backoff_base.as_millis() as u64,
            )?),
            backoff_cap: Duration::from_millis(parse_var(
                "TANDEM_BACKOFF_CAP_MS",
                defaults.backoff_cap.as_millis() as u64,
            )?),
            tool_round_trip_cap: parse_var(
                "TANDEM_TOOL_ROUND_TRIP_CAP",
                defaults.tool_round_trip_cap,
            )?,
            search_results: parse_var("TANDEM_SEARCH_RESULTS", defaults.search_results)?,
        })
    }

    /// The retry policy shared by the default agent definitions.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(
            self.max_attempts,
            self.attempt_timeout,
            BackoffStrategy::Exponential {
                base: self.backoff_base,
                cap: self.backoff_cap,
            },
        )
    }
}

/// Parse an env var, using the default when unset.
fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| {
            AppError::Configuration(format!("invalid value for {key}: {e}"))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.attempt_timeout, Duration::from_secs(30));
        assert_eq!(config.tool_round_trip_cap, 5);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_default_retry_policy_is_valid() {
        let config = EngineConfig::default();
        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(
            policy.backoff,
            BackoffStrategy::Exponential {
                base: Duration::from_millis(500),
                cap: Duration::from_secs(8),
            }
        );
    }

    #[test]
    fn test_invalid_attempts_rejected_by_policy() {
        let config = EngineConfig {
            max_attempts: 0,
            ..EngineConfig::default()
        };
        assert!(config.retry_policy().is_err());
    }
}
