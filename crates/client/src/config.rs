//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `QUICKBITE_API_URL` - Base URL of the cart backend (e.g., `https://api.quickbite.app/api`)
//!
//! ## Optional
//! - `QUICKBITE_API_TOKEN` - Bearer token for the signed-in diner
//! - `QUICKBITE_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `QUICKBITE_DELIVERY_FEE` - Flat delivery fee (default: 2.99)
//! - `QUICKBITE_TAX_RATE` - Tax rate as a fraction of the subtotal (default: 0.08)
//! - `QUICKBITE_COUPONS_FILE` - JSON coupon catalogue for local validation
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use quickbite_core::{Money, PricingPolicy};

const DEFAULT_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart client configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the cart backend
    pub api_url: Url,
    /// Bearer token for the signed-in diner
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Delivery fee and tax rate for local totals
    pub pricing: PricingPolicy,
    /// Coupon catalogue for local validation
    pub coupons_file: Option<PathBuf>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("pricing", &self.pricing)
            .field("coupons_file", &self.coupons_file)
            .field("sentry_dsn", &self.sentry_dsn)
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration with defaults for everything but the backend URL.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            api_token: None,
            timeout: Duration::from_secs(10),
            pricing: PricingPolicy::default(),
            coupons_file: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_env::<Url>(
            "QUICKBITE_API_URL",
            &get_required_env(env, "QUICKBITE_API_URL")?,
        )?;
        let api_token = get_optional_env(env, "QUICKBITE_API_TOKEN").map(SecretString::from);

        let timeout_secs = parse_env::<u64>(
            "QUICKBITE_HTTP_TIMEOUT_SECS",
            &get_env_or_default(env, "QUICKBITE_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "QUICKBITE_HTTP_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let pricing = pricing_from_source(env)?;

        Ok(Self {
            api_url,
            api_token,
            timeout: Duration::from_secs(timeout_secs),
            pricing,
            coupons_file: get_optional_env(env, "QUICKBITE_COUPONS_FILE").map(PathBuf::from),
            sentry_dsn: get_optional_env(env, "SENTRY_DSN"),
            sentry_environment: get_optional_env(env, "SENTRY_ENVIRONMENT"),
        })
    }
}

/// Load only the pricing variables, for work that never talks to the backend.
///
/// # Errors
///
/// Returns `ConfigError` if `QUICKBITE_DELIVERY_FEE` or `QUICKBITE_TAX_RATE`
/// is invalid.
pub fn pricing_from_env() -> Result<PricingPolicy, ConfigError> {
    let _ = dotenvy::dotenv();
    pricing_from_source(&|key| std::env::var(key).ok())
}

/// Pricing overrides. Unset variables keep the standard fee and rate.
fn pricing_from_source(
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<PricingPolicy, ConfigError> {
    let mut pricing = PricingPolicy::default();

    if let Some(raw) = get_optional_env(env, "QUICKBITE_DELIVERY_FEE") {
        let fee = parse_env::<Money>("QUICKBITE_DELIVERY_FEE", &raw)?;
        if fee.amount().is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "QUICKBITE_DELIVERY_FEE".to_string(),
                "must not be negative".to_string(),
            ));
        }
        pricing.delivery_fee = fee;
    }

    if let Some(raw) = get_optional_env(env, "QUICKBITE_TAX_RATE") {
        let rate = parse_env::<Decimal>("QUICKBITE_TAX_RATE", &raw)?;
        if rate.is_sign_negative() || rate > Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "QUICKBITE_TAX_RATE".to_string(),
                "must be between 0 and 1".to_string(),
            ));
        }
        pricing.tax_rate = rate;
    }

    Ok(pricing)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    get_optional_env(env, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

/// Parse a variable's value, naming the variable on failure.
fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
