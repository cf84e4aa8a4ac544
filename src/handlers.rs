// SPDX-FileCopyrightText: 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the confession board.
//!
//! This layer is deliberately thin: it maps routes onto the admission
//! pipeline, the feed paginator, and direct store lookups, and maps
//! [`AppError`] tags onto status codes. No domain logic lives here.

use crate::error::{AppError, Result};
use crate::feed::{FeedPage, FeedPaginator};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::models::Confession;
use crate::pipeline::AdmissionPipeline;
use crate::store::ConfessionStore;
use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    pub pipeline: AdmissionPipeline,
    pub paginator: FeedPaginator,
    pub store: Arc<dyn ConfessionStore>,
    pub limiter: Arc<RateLimiter>,
    pub read_ceiling: u32,
}

/// New confession request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfessionRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub captcha_token: Option<String>,
}

/// New comment request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub captcha_token: Option<String>,
}

/// Feed query parameters.
#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub page: Option<String>,
}

/// Write response carrying the created or updated record.
#[derive(Debug, Serialize)]
pub struct ConfessionResponse {
    pub message: &'static str,
    pub confession: Confession,
}

/// Comment listing response.
#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<String>,
}

/// Deletion confirmation response.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "confession-board",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /confessions
pub async fn create_confession(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<CreateConfessionRequest>,
) -> Result<impl IntoResponse> {
    let confession = state
        .pipeline
        .admit_confession(
            addr.ip(),
            req.text.as_deref().unwrap_or(""),
            req.captcha_token.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ConfessionResponse {
            message: "Confession saved successfully",
            confession,
        }),
    ))
}

/// GET /confessions?page=N
pub async fn list_confessions(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedPage>> {
    if let RateLimitResult::Limited { retry_after } =
        state.limiter.check(addr.ip(), state.read_ceiling).await
    {
        return Err(AppError::RateLimited { retry_after });
    }

    // Non-numeric page values fall back to page 1
    let page = query.page.as_deref().and_then(|p| p.parse::<i64>().ok());
    debug!(?page, "Serving feed page");

    let feed = state.paginator.page(page).await?;
    Ok(Json(feed))
}

/// GET /confessions/:id
pub async fn get_confession(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Confession>> {
    let id = parse_id(&id)?;
    state
        .store
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(id.to_string()))
}

/// GET /confessions/:id/comments
pub async fn get_comments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommentsResponse>> {
    let id = parse_id(&id)?;
    let confession = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;

    Ok(Json(CommentsResponse {
        comments: confession.comments,
    }))
}

/// POST /confessions/:id/comments
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(id): Path<String>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<Json<ConfessionResponse>> {
    let id = parse_id(&id)?;
    let confession = state
        .pipeline
        .admit_comment(
            addr.ip(),
            id,
            req.comment.as_deref().unwrap_or(""),
            req.captcha_token.as_deref(),
        )
        .await?;

    Ok(Json(ConfessionResponse {
        message: "Comment added successfully",
        confession,
    }))
}

/// DELETE /confessions/:id
pub async fn delete_confession(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let id = parse_id(&id)?;
    if !state.store.delete_by_id(id).await? {
        return Err(AppError::NotFound(id.to_string()));
    }

    info!(%id, "Confession deleted");
    Ok(Json(DeletedResponse {
        message: "Confession deleted successfully",
    }))
}

/// A path id that is not a well-formed UUID cannot resolve to a record.
fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound(id.to_string()))
}
