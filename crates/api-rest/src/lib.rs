//! # API REST
//!
//! REST API implementation for Masthead.
//!
//! Handles:
//! - HTTP endpoints with axum for the admin preview and form helpers
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for request/response types and `masthead-core` for every operation.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    parse_id, AssociationRes, ErrorRes, HealthRes, HealthService, NormalizeReq, NormalizeRes,
    PrepareArticleReq, PrepareArticleRes, RenderReq, RenderRes, ReselectPrimaryReq,
    ReselectPrimaryRes, SelectionDto, ToggleReq, ToggleRes,
};
use masthead_core::{ArticleError, ArticleService, CoreConfig};

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers. Configuration is
/// resolved once at startup; handlers never read the environment.
#[derive(Clone)]
struct AppState {
    cfg: Arc<CoreConfig>,
    articles: ArticleService,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        render,
        normalize_associations,
        toggle_association,
        reselect_primary,
        prepare_article,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        RenderReq,
        RenderRes,
        SelectionDto,
        AssociationRes,
        NormalizeReq,
        NormalizeRes,
        ToggleReq,
        ToggleRes,
        ReselectPrimaryReq,
        ReselectPrimaryRes,
        PrepareArticleReq,
        PrepareArticleRes,
    ))
)]
pub struct ApiDoc;

type ApiError = (StatusCode, Json<ErrorRes>);

/// Builds the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(cfg: Arc<CoreConfig>) -> Router {
    let state = AppState {
        articles: ArticleService::new(cfg.clone()),
        cfg,
    };

    Router::new()
        .route("/health", get(health))
        .route("/render", post(render))
        .route("/associations/normalize", post(normalize_associations))
        .route("/associations/toggle", post(toggle_association))
        .route("/associations/reselect-primary", post(reselect_primary))
        .route("/articles/prepare", post(prepare_article))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a core error onto an HTTP response.
///
/// Validation errors are the caller's to fix and become `400` with the message. Anything else is
/// logged and reported as `500`.
fn reject(context: &str, e: ArticleError) -> ApiError {
    if e.is_validation() {
        tracing::debug!("{} rejected: {}", context, e);
        (StatusCode::BAD_REQUEST, Json(ErrorRes { error: e.to_string() }))
    } else {
        tracing::error!("{} error: {:?}", context, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorRes {
                error: "Internal error".into(),
            }),
        )
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/render",
    request_body = RenderReq,
    responses(
        (status = 200, description = "Rendered HTML fragment", body = RenderRes)
    )
)]
/// Render a stored body for the admin preview
///
/// Never fails: malformed documents render as a fixed fallback fragment.
#[axum::debug_handler]
async fn render(State(state): State<AppState>, Json(req): Json<RenderReq>) -> Json<RenderRes> {
    let html = state.articles.render_body(&req.document);
    Json(RenderRes {
        html: html.into_string(),
    })
}

#[utoipa::path(
    post,
    path = "/associations/normalize",
    request_body = NormalizeReq,
    responses(
        (status = 200, description = "Normalized association rows", body = NormalizeRes),
        (status = 400, description = "Selection violates the primary policy", body = ErrorRes)
    )
)]
/// Normalize a selection into association rows
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the kind or an identifier is invalid,
/// - a category selection is empty or has no resolvable primary.
#[axum::debug_handler]
async fn normalize_associations(
    State(state): State<AppState>,
    Json(req): Json<NormalizeReq>,
) -> Result<Json<NormalizeRes>, ApiError> {
    let kind = req.kind().map_err(|e| reject("Normalize", e))?;
    let selection = req.selection().map_err(|e| reject("Normalize", e))?;

    match selection.normalize(kind, state.cfg.primary_policy()) {
        Ok(rows) => Ok(Json(NormalizeRes {
            associations: rows.iter().map(AssociationRes::from).collect(),
        })),
        Err(e) => Err(reject("Normalize", e)),
    }
}

#[utoipa::path(
    post,
    path = "/associations/toggle",
    request_body = ToggleReq,
    responses(
        (status = 200, description = "Updated selection", body = ToggleRes),
        (status = 400, description = "Invalid identifier", body = ErrorRes)
    )
)]
/// Toggle one identifier in a selection
///
/// Removing the current primary clears it.
#[axum::debug_handler]
async fn toggle_association(
    State(_state): State<AppState>,
    Json(req): Json<ToggleReq>,
) -> Result<Json<ToggleRes>, ApiError> {
    let selection = req
        .selection
        .into_selection()
        .map_err(|e| reject("Toggle", e))?;
    let id = parse_id("id", &req.id).map_err(|e| reject("Toggle", e))?;

    Ok(Json(ToggleRes {
        selection: SelectionDto::from(&selection.toggle(&id)),
    }))
}

#[utoipa::path(
    post,
    path = "/associations/reselect-primary",
    request_body = ReselectPrimaryReq,
    responses(
        (status = 200, description = "Selection with the new primary", body = ReselectPrimaryRes),
        (status = 400, description = "Invalid identifier", body = ErrorRes)
    )
)]
/// Make an already-selected identifier the primary
///
/// A candidate that is not selected leaves the selection unchanged.
#[axum::debug_handler]
async fn reselect_primary(
    State(_state): State<AppState>,
    Json(req): Json<ReselectPrimaryReq>,
) -> Result<Json<ReselectPrimaryRes>, ApiError> {
    let selection = req
        .selection
        .into_selection()
        .map_err(|e| reject("Reselect primary", e))?;
    let candidate =
        parse_id("candidateId", &req.candidate_id).map_err(|e| reject("Reselect primary", e))?;

    Ok(Json(ReselectPrimaryRes {
        selection: SelectionDto::from(&selection.reselect_primary(&candidate)),
    }))
}

#[utoipa::path(
    post,
    path = "/articles/prepare",
    request_body = PrepareArticleReq,
    responses(
        (status = 200, description = "Validated article ready to persist", body = PrepareArticleRes),
        (status = 400, description = "Validation failed", body = ErrorRes)
    )
)]
/// Validate a submitted article form
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the title is blank or the slug is malformed,
/// - a selection violates the primary policy,
/// - the body is not a well-formed document.
#[axum::debug_handler]
async fn prepare_article(
    State(state): State<AppState>,
    Json(req): Json<PrepareArticleReq>,
) -> Result<Json<PrepareArticleRes>, ApiError> {
    let draft = req.into_draft().map_err(|e| reject("Prepare article", e))?;

    match state.articles.prepare(draft) {
        Ok(article) => Ok(Json(PrepareArticleRes::from(article))),
        Err(e) => Err(reject("Prepare article", e)),
    }
}
