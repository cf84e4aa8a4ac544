// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CAPTCHA verification against an external provider.
//!
//! The pipeline only sees the [`CaptchaVerify`] trait; the HTTP
//! implementation posts `{secret, response}` to the provider's siteverify
//! endpoint with a bounded timeout. A provider that is unreachable or times
//! out fails the write — verification never fails open.

use crate::config::CaptchaConfig;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// CAPTCHA verification error types.
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("Captcha provider unavailable: {0}")]
    Unavailable(String),
}

/// Provider verdict for one token.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaVerdict {
    pub success: bool,
    /// Provider diagnostic codes, passed through to clients verbatim
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

/// Verify a submitted token against the provider.
#[async_trait]
pub trait CaptchaVerify: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict, CaptchaError>;
}

/// HTTP client for the CAPTCHA provider's siteverify endpoint.
pub struct HttpCaptchaVerifier {
    config: CaptchaConfig,
    client: reqwest::Client,
}

impl HttpCaptchaVerifier {
    /// Create a new verifier; the client carries the configured timeout.
    pub fn new(config: CaptchaConfig) -> Result<Self, CaptchaError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CaptchaError::Unavailable(e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl CaptchaVerify for HttpCaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<CaptchaVerdict, CaptchaError> {
        let response = self
            .client
            .post(&self.config.verify_url)
            .form(&[
                ("secret", self.config.secret.as_str()),
                ("response", token),
            ])
            .send()
            .await
            .map_err(|e| CaptchaError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CaptchaError::Unavailable(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let verdict: CaptchaVerdict = response
            .json()
            .await
            .map_err(|e| CaptchaError::Unavailable(e.to_string()))?;

        debug!(
            success = verdict.success,
            error_codes = ?verdict.error_codes,
            "Captcha verdict received"
        );
        Ok(verdict)
    }
}
