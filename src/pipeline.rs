// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Admission pipeline for confession and comment writes.
//!
//! Every write passes the same gates in a fixed, short-circuiting order:
//!
//! 1. rate limit (local, cheapest, protects the provider and the store)
//! 2. structural validation (local, keeps garbage away from the provider)
//! 3. CAPTCHA verification (network-bound, the actual anti-automation gate)
//! 4. persistence (only reached once the write is known-good)
//!
//! No gate retries; a failure before persistence leaves no trace in the
//! store. Retry decisions belong to the caller.

use crate::captcha::CaptchaVerify;
use crate::error::{AppError, Result};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::models::{Confession, MAX_TEXT_LEN};
use crate::store::ConfessionStore;
use chrono::Utc;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Orchestrates the write gates in front of the store.
pub struct AdmissionPipeline {
    limiter: Arc<RateLimiter>,
    verifier: Arc<dyn CaptchaVerify>,
    store: Arc<dyn ConfessionStore>,
    write_ceiling: u32,
}

impl AdmissionPipeline {
    pub fn new(
        limiter: Arc<RateLimiter>,
        verifier: Arc<dyn CaptchaVerify>,
        store: Arc<dyn ConfessionStore>,
        write_ceiling: u32,
    ) -> Self {
        Self {
            limiter,
            verifier,
            store,
            write_ceiling,
        }
    }

    /// Admit a new confession.
    pub async fn admit_confession(
        &self,
        ip: IpAddr,
        text: &str,
        captcha_token: Option<&str>,
    ) -> Result<Confession> {
        let created_at = Utc::now();

        self.check_rate(ip).await?;
        validate_text(text, AppError::MissingText)?;
        self.check_captcha(captcha_token).await?;

        let confession = self
            .store
            .insert(Confession::new(text.to_string(), created_at))
            .await?;
        info!(id = %confession.id, "Confession admitted");
        Ok(confession)
    }

    /// Admit a comment on an existing confession.
    pub async fn admit_comment(
        &self,
        ip: IpAddr,
        confession_id: Uuid,
        comment: &str,
        captcha_token: Option<&str>,
    ) -> Result<Confession> {
        self.check_rate(ip).await?;
        validate_text(comment, AppError::MissingComment)?;

        // Parent must resolve before the provider is called
        if self.store.find_by_id(confession_id).await?.is_none() {
            debug!(id = %confession_id, "Comment rejected, parent not found");
            return Err(AppError::NotFound(confession_id.to_string()));
        }

        self.check_captcha(captcha_token).await?;

        match self
            .store
            .append_comment(confession_id, comment.to_string())
            .await?
        {
            Some(confession) => {
                info!(id = %confession.id, "Comment admitted");
                Ok(confession)
            }
            // Deleted between the lookup and the append
            None => Err(AppError::NotFound(confession_id.to_string())),
        }
    }

    async fn check_rate(&self, ip: IpAddr) -> Result<()> {
        match self.limiter.check(ip, self.write_ceiling).await {
            RateLimitResult::Allowed { remaining } => {
                debug!(%ip, remaining, "Write admitted by rate limiter");
                Ok(())
            }
            RateLimitResult::Limited { retry_after } => {
                Err(AppError::RateLimited { retry_after })
            }
        }
    }

    async fn check_captcha(&self, token: Option<&str>) -> Result<()> {
        let token = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(AppError::MissingCaptcha),
        };

        let verdict = self
            .verifier
            .verify(token)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if verdict.success {
            Ok(())
        } else {
            Err(AppError::CaptchaRejected {
                codes: verdict.error_codes,
            })
        }
    }
}

/// Structural validation shared by both write kinds: non-empty after
/// trimming, at most [`MAX_TEXT_LEN`] characters.
fn validate_text(text: &str, missing: AppError) -> Result<()> {
    if text.trim().is_empty() {
        return Err(missing);
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::TooLong { max: MAX_TEXT_LEN });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_text_empty() {
        assert!(matches!(
            validate_text("", AppError::MissingText),
            Err(AppError::MissingText)
        ));
        assert!(matches!(
            validate_text("   ", AppError::MissingComment),
            Err(AppError::MissingComment)
        ));
    }

    #[test]
    fn test_validate_text_bounds() {
        let at_limit = "x".repeat(300);
        assert!(validate_text(&at_limit, AppError::MissingText).is_ok());

        let over_limit = "x".repeat(301);
        assert!(matches!(
            validate_text(&over_limit, AppError::MissingText),
            Err(AppError::TooLong { max: 300 })
        ));
    }

    #[test]
    fn test_validate_text_counts_chars_not_bytes() {
        // 300 multi-byte characters are within bounds
        let text = "é".repeat(300);
        assert!(validate_text(&text, AppError::MissingText).is_ok());
    }
}
