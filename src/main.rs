// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Confession Board Service
//!
//! Anonymous text confessions with embedded comments and a paginated,
//! newest-first feed. Writes pass an admission pipeline (rate limit →
//! validation → CAPTCHA → persist); reads go through the feed paginator.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is
//! honored). `CAPTCHA_SECRET` is required; the process exits at startup
//! without it.
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `ALLOWED_ORIGINS`: Comma-separated CORS origins
//! - `CAPTCHA_SECRET`: CAPTCHA provider secret (required)
//! - `CAPTCHA_VERIFY_URL`: Provider siteverify endpoint
//! - `CAPTCHA_TIMEOUT_MS`: Outbound verification timeout (default: 5000)
//! - `RATE_WINDOW_MS`: Rate limit window (default: 60000)
//! - `MAX_WRITE_REQUESTS`: Write ceiling per window per IP (default: 5)
//! - `MAX_READ_REQUESTS`: Read ceiling per window per IP (default: 60)
//! - `PAGE_SIZE`: Feed page size (default: 15)

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use confession_board::{
    config::Config,
    handlers::{
        create_comment, create_confession, delete_confession, get_comments, get_confession,
        health, list_confessions, AppState,
    },
    AdmissionPipeline, FeedPaginator, HttpCaptchaVerifier, MemoryStore, RateLimiter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load environment variables, fail fast on incomplete configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("configuration incomplete")?;
    info!(
        bind_addr = %config.bind_addr,
        window_ms = config.rate_limit.window_ms,
        max_write_requests = config.rate_limit.max_write_requests,
        max_read_requests = config.rate_limit.max_read_requests,
        page_size = config.page_size,
        "Starting confession board"
    );

    // Create application state
    let limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
    let verifier = Arc::new(
        HttpCaptchaVerifier::new(config.captcha.clone())
            .context("failed to build captcha verifier")?,
    );
    let store = Arc::new(MemoryStore::new());

    let state = Arc::new(AppState {
        pipeline: AdmissionPipeline::new(
            limiter.clone(),
            verifier,
            store.clone(),
            config.rate_limit.max_write_requests,
        ),
        paginator: FeedPaginator::new(store.clone(), config.page_size),
        store,
        limiter: limiter.clone(),
        read_ceiling: config.rate_limit.max_read_requests,
    });

    // Spawn cleanup task for stale rate limit buckets
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    });

    // Restrictive CORS from configured origins
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route("/confessions", post(create_confession).get(list_confessions))
        .route("/confessions/:id", get(get_confession).delete(delete_confession))
        .route(
            "/confessions/:id/comments",
            get(get_comments).post(create_comment),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
