//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible
//! defaults. Monitoring credentials are deliberately strict: a missing DSN
//! or release identifier fails startup before the listener binds.

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `SENTRY_DEMO_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `SENTRY_DEMO_PORT`: The port to listen on (default: 8080)
///
/// Monitoring configuration is read separately; see [`MonitorConfig`].
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Monitoring client configuration.
    pub monitor: MonitorConfig,
}

/// Monitoring client configuration.
///
/// Loaded once at startup and immutable for the process lifetime:
/// - `SENTRY_DSN`: project credential (required)
/// - `SENTRY_RELEASE`: release identifier (required)
/// - `SENTRY_TRACES_SAMPLE_RATE`: fraction of transactions to sample
///   (default: 1.0)
/// - `SENTRY_PROFILES_SAMPLE_RATE`: fraction of transactions to profile
///   (default: 1.0)
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Sentry project DSN.
    pub dsn: String,
    /// Release identifier attached to every reported event.
    pub release: String,
    /// Trace sample rate in `[0.0, 1.0]`.
    pub traces_sample_rate: f32,
    /// Profiling sample rate in `[0.0, 1.0]`.
    pub profiles_sample_rate: f32,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SENTRY_DEMO_PORT` is set but cannot be parsed as a valid port number
    /// - The monitoring configuration is missing or invalid
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SENTRY_DEMO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("SENTRY_DEMO_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("SENTRY_DEMO_PORT must be a valid port number")?
            .unwrap_or(8080);

        Ok(Self {
            host,
            port,
            monitor: MonitorConfig::from_env()?,
        })
    }

    /// Returns the listen address formed from `SENTRY_DEMO_HOST` and
    /// `SENTRY_DEMO_PORT`.
    ///
    /// # Panics
    ///
    /// Panics if `SENTRY_DEMO_HOST` is not an IP address; the port was
    /// already validated by [`Config::from_env`].
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("SENTRY_DEMO_HOST must be an IP address")
    }
}

impl MonitorConfig {
    /// Creates a new monitoring configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `SENTRY_DSN` or `SENTRY_RELEASE` is missing or
    /// empty, or if a sample rate is not a number in `[0.0, 1.0]`.
    pub fn from_env() -> Result<Self> {
        let Some(dsn) = non_empty_var("SENTRY_DSN") else {
            bail!("SENTRY_DSN must be set to the Sentry project DSN");
        };
        let Some(release) = non_empty_var("SENTRY_RELEASE") else {
            bail!("SENTRY_RELEASE must identify the release being monitored");
        };

        let traces_sample_rate = sample_rate_from_env("SENTRY_TRACES_SAMPLE_RATE")?;
        let profiles_sample_rate = sample_rate_from_env("SENTRY_PROFILES_SAMPLE_RATE")?;

        Ok(Self {
            dsn,
            release,
            traces_sample_rate,
            profiles_sample_rate,
        })
    }
}

/// Reads an environment variable, treating empty values as unset.
fn non_empty_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.is_empty())
}

/// Reads a sampling rate from the environment, defaulting to 1.0 (always
/// sample).
fn sample_rate_from_env(var: &str) -> Result<f32> {
    match std::env::var(var) {
        Ok(raw) => parse_sample_rate(var, &raw),
        Err(_) => Ok(1.0),
    }
}

fn parse_sample_rate(var: &str, raw: &str) -> Result<f32> {
    let rate: f32 = raw
        .parse()
        .with_context(|| format!("{var} must be a number between 0.0 and 1.0"))?;
    if !(0.0..=1.0).contains(&rate) {
        bail!("{var} must be between 0.0 and 1.0, got {rate}");
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_monitor_config() -> MonitorConfig {
        MonitorConfig {
            dsn: "https://public@o0.ingest.sentry.io/1234".to_string(),
            release: "sentry-demo@0.1.0".to_string(),
            traces_sample_rate: 1.0,
            profiles_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_config_socket_addr() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            monitor: test_monitor_config(),
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_parse_sample_rate_bounds() {
        assert!((parse_sample_rate("RATE", "0.0").unwrap() - 0.0).abs() < f32::EPSILON);
        assert!((parse_sample_rate("RATE", "1.0").unwrap() - 1.0).abs() < f32::EPSILON);
        assert!((parse_sample_rate("RATE", "0.25").unwrap() - 0.25).abs() < f32::EPSILON);

        assert!(parse_sample_rate("RATE", "1.5").is_err());
        assert!(parse_sample_rate("RATE", "-0.1").is_err());
        assert!(parse_sample_rate("RATE", "always").is_err());
    }

    // Mutating the process environment is not thread-safe across tests, so
    // every from_env permutation lives in this single test.
    #[test]
    fn test_monitor_config_from_env_permutations() {
        std::env::remove_var("SENTRY_DSN");
        std::env::remove_var("SENTRY_RELEASE");
        std::env::remove_var("SENTRY_TRACES_SAMPLE_RATE");
        std::env::remove_var("SENTRY_PROFILES_SAMPLE_RATE");

        // Missing DSN is fatal.
        assert!(MonitorConfig::from_env().is_err());

        // Missing release identifier is fatal.
        std::env::set_var("SENTRY_DSN", "https://public@o0.ingest.sentry.io/1234");
        assert!(MonitorConfig::from_env().is_err());

        // Empty release identifier counts as missing.
        std::env::set_var("SENTRY_RELEASE", "");
        assert!(MonitorConfig::from_env().is_err());

        // Fully specified configuration with defaulted sample rates.
        std::env::set_var("SENTRY_RELEASE", "sentry-demo@0.1.0");
        let config = MonitorConfig::from_env().unwrap();
        assert_eq!(config.release, "sentry-demo@0.1.0");
        assert!((config.traces_sample_rate - 1.0).abs() < f32::EPSILON);
        assert!((config.profiles_sample_rate - 1.0).abs() < f32::EPSILON);

        // Out-of-range sample rate is fatal.
        std::env::set_var("SENTRY_TRACES_SAMPLE_RATE", "2.0");
        assert!(MonitorConfig::from_env().is_err());

        std::env::remove_var("SENTRY_TRACES_SAMPLE_RATE");
        std::env::remove_var("SENTRY_DSN");
        std::env::remove_var("SENTRY_RELEASE");
    }
}
