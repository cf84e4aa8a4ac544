// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Confession Board
//!
//! A minimal anonymous message board: short text confessions with embedded
//! comment threads and a paginated, newest-first feed. Every write passes
//! an admission pipeline of ordered gates:
//!
//! - Per-IP rate limiting (fixed window, stricter ceiling for writes)
//! - Structural validation (non-empty, 300-character bound)
//! - CAPTCHA verification against an external provider (never fails open)
//! - Persistence via the record store adapter

pub mod captcha;
pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod limiter;
pub mod models;
pub mod pipeline;
pub mod store;

pub use captcha::{CaptchaVerdict, CaptchaVerify, HttpCaptchaVerifier};
pub use config::Config;
pub use error::AppError;
pub use feed::FeedPaginator;
pub use limiter::{RateLimitResult, RateLimiter};
pub use models::Confession;
pub use pipeline::AdmissionPipeline;
pub use store::{ConfessionStore, MemoryStore};
