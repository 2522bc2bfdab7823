//! News API HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Liveness message |
//! | `GET` | `/health` | Health check (returns version) |
//! | `GET` | `/articles?page=&limit=` | Newest-first page of articles |
//! | `GET` | `/articles/{id}` | One article with full content |
//! | `GET` | `/search?query=` | Keyword search with previews |
//! | `GET` | `/query?query=` | Question answering |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "page must be >= 1" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser front-ends
//! can call the API directly.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::articles::{self, ArticlePage, ArticleResponse, DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::context::AppContext;
use crate::error::QueryError;
use crate::ingest;
use crate::qa::{self, QueryAnswer, Reader, SentenceReader};
use crate::search::{self, SearchResponse};

/// Shared state handed to every route handler.
#[derive(Clone)]
struct AppState {
    ctx: AppContext,
    reader: Arc<dyn Reader>,
}

/// Build the API router around an opened context.
pub fn router(ctx: AppContext) -> Router {
    let reader: Arc<dyn Reader> =
        Arc::new(SentenceReader::new(ctx.config.retrieval.context_window));
    router_with_reader(ctx, reader)
}

/// Like [`router`], answering `/query` with a caller-supplied [`Reader`].
pub fn router_with_reader(ctx: AppContext, reader: Arc<dyn Reader>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/articles", get(handle_list_articles))
        .route("/articles/{id}", get(handle_get_article))
        .route("/search", get(handle_search))
        .route("/query", get(handle_query))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { ctx, reader })
}

/// Start the server on `[server].bind` and run until Ctrl-C.
pub async fn run_server(ctx: &AppContext) -> anyhow::Result<()> {
    load_archive_on_startup(ctx).await;

    let bind_addr = ctx.config.server.bind.clone();
    let app = router(ctx.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("News API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

/// Fill an empty in-memory store from the archive, since it starts out empty
/// on every launch. Persistent backends are left to `news import`.
///
/// A failed import is logged and the server comes up with whatever the store
/// holds.
async fn load_archive_on_startup(ctx: &AppContext) {
    if !ctx.config.db.is_memory() {
        return;
    }
    match ingest::import_if_empty(ctx).await {
        Ok(Some(summary)) => tracing::info!(
            "Loaded archive: {} inserted, {} empty, {} errors",
            summary.inserted,
            summary.empty,
            summary.errors
        ),
        Ok(None) => {}
        Err(e) => tracing::warn!("Archive not loaded: {:#}", e),
    }
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::BadRequest(message) => bad_request(message),
            QueryError::NotFound(id) => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found",
                message: format!("article not found: {}", id),
            },
            QueryError::Internal(e) => {
                tracing::error!("request failed: {:#}", e);
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal",
                    message: e.to_string(),
                }
            }
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

// ============ GET / and /health ============

#[derive(Serialize)]
struct RootResponse {
    status: &'static str,
    message: &'static str,
}

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        message: "News API is running",
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /articles ============

#[derive(Deserialize)]
struct PageParams {
    page: Option<i64>,
    limit: Option<i64>,
}

async fn handle_list_articles(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<ArticlePage>, AppError> {
    let Query(params) = params?;
    let page = articles::list_articles(
        &state.ctx,
        params.page.unwrap_or(DEFAULT_PAGE),
        params.limit.unwrap_or(DEFAULT_LIMIT),
    )
    .await?;
    Ok(Json(page))
}

async fn handle_get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArticleResponse>, AppError> {
    Ok(Json(articles::get_article(&state.ctx, &id).await?))
}

// ============ /search and /query ============

#[derive(Deserialize)]
struct QueryParams {
    query: Option<String>,
}

impl QueryParams {
    fn required(self) -> Result<String, AppError> {
        self.query
            .ok_or_else(|| bad_request("query parameter is required"))
    }
}

async fn handle_search(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(params) = params?;
    let query = params.required()?;
    Ok(Json(search::search_articles(&state.ctx, &query, None).await?))
}

async fn handle_query(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> Result<Json<QueryAnswer>, AppError> {
    let Query(params) = params?;
    let query = params.required()?;
    tracing::info!("QA query: {}", query);
    let answer = qa::answer_question(&state.ctx, state.reader.as_ref(), &query).await?;
    Ok(Json(answer))
}
