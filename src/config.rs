// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the confession board service.
//!
//! Values come from environment variables (loaded through `dotenvy` in
//! `main`). The CAPTCHA secret is the one mandatory value: the process
//! refuses to start without it rather than running with the anti-abuse
//! gate silently disabled.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration error raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Allowed CORS origins
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Feed page size (default: 15)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// CAPTCHA verification configuration
    pub captcha: CaptchaConfig,
}

/// Fixed-window rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Counting window in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum content-creating requests per window per IP (default: 5)
    #[serde(default = "default_max_write_requests")]
    pub max_write_requests: u32,

    /// Maximum read requests per window per IP (default: 60)
    #[serde(default = "default_max_read_requests")]
    pub max_read_requests: u32,
}

/// CAPTCHA provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptchaConfig {
    /// Server-held secret, submitted with every verification. Never sent
    /// to clients.
    #[serde(skip_serializing)]
    pub secret: String,

    /// Provider verification endpoint (default: hCaptcha siteverify)
    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    /// Outbound call timeout in milliseconds (default: 5000)
    #[serde(default = "default_captcha_timeout_ms")]
    pub timeout_ms: u64,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["https://localhost".to_string()]
}

fn default_page_size() -> usize {
    15
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_max_write_requests() -> u32 {
    5
}

fn default_max_read_requests() -> u32 {
    60
}

fn default_verify_url() -> String {
    "https://hcaptcha.com/siteverify".to_string()
}

fn default_captcha_timeout_ms() -> u64 {
    5_000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_write_requests: default_max_write_requests(),
            max_read_requests: default_max_read_requests(),
        }
    }
}

impl RateLimitConfig {
    /// Get the counting window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl CaptchaConfig {
    /// Get the outbound call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails fast when `CAPTCHA_SECRET` is absent; every other value has a
    /// default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("CAPTCHA_SECRET")
            .map_err(|_| ConfigError::MissingVar("CAPTCHA_SECRET"))?;
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingVar("CAPTCHA_SECRET"));
        }

        // A zero page size would make every feed read fail; refuse to start
        let page_size: usize = parse_var("PAGE_SIZE", default_page_size())?;
        if page_size == 0 {
            return Err(ConfigError::InvalidVar {
                var: "PAGE_SIZE",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| default_bind_addr()),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| default_allowed_origins()),
            page_size,
            rate_limit: RateLimitConfig {
                window_ms: parse_var("RATE_WINDOW_MS", default_window_ms())?,
                max_write_requests: parse_var("MAX_WRITE_REQUESTS", default_max_write_requests())?,
                max_read_requests: parse_var("MAX_READ_REQUESTS", default_max_read_requests())?,
            },
            captcha: CaptchaConfig {
                secret,
                verify_url: std::env::var("CAPTCHA_VERIFY_URL")
                    .unwrap_or_else(|_| default_verify_url()),
                timeout_ms: parse_var("CAPTCHA_TIMEOUT_MS", default_captcha_timeout_ms())?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.window_ms, 60_000);
        assert_eq!(config.max_write_requests, 5);
        assert_eq!(config.max_read_requests, 60);
        assert_eq!(config.window_duration(), Duration::from_secs(60));
    }

    #[test]
    fn test_from_env_rejects_zero_page_size() {
        // Only this test touches these variables, so no cross-test races
        std::env::set_var("CAPTCHA_SECRET", "0x0000");
        std::env::set_var("PAGE_SIZE", "0");

        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar {
                var: "PAGE_SIZE",
                ..
            })
        ));

        std::env::remove_var("PAGE_SIZE");
        std::env::remove_var("CAPTCHA_SECRET");
    }

    #[test]
    fn test_captcha_timeout() {
        let config = CaptchaConfig {
            secret: "0x0000".to_string(),
            verify_url: default_verify_url(),
            timeout_ms: 1500,
        };
        assert_eq!(config.timeout(), Duration::from_millis(1500));
    }
}
