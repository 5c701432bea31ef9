use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use parley_core::ChatBackend;
use parley_core::chat::{ChatCompletionRequest, ChatCompletionResponse};
use parley_core::translate;

use crate::auth::require_auth_token;
use crate::dto::{HealthResponse, ModelListResponse, ModelResponse};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn router<B: ChatBackend + 'static>(state: Arc<AppState<B>>) -> Router {
    let api = Router::new()
        // Root alias for clients that post chat requests to `/`.
        .route("/", post(chat_completions::<B>))
        .route("/v1/chat/completions", post(chat_completions::<B>))
        .route("/v1/models", get(list_models::<B>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth_token::<B>,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(api).with_state(state)
}

// ---------------------------------------------------------------------------
// Chat completions
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/v1/chat/completions",
    request_body = ChatCompletionRequest,
    responses(
        (status = 200, description = "Chat completion", body = ChatCompletionResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Upstream failure", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "chat"
)]
pub async fn chat_completions<B: ChatBackend>(
    State(state): State<Arc<AppState<B>>>,
    axum::Json(body): axum::Json<ChatCompletionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let model = body
        .model
        .clone()
        .unwrap_or_else(|| state.default_model.clone());

    let upstream_request = translate::to_generate_request(&body)?;

    tracing::info!(%model, turns = upstream_request.contents.len(), "Proxying chat completion");

    let upstream_response = state.backend.generate(&model, &upstream_request).await?;
    let response = translate::from_generate_response(&model, upstream_response)?;

    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/v1/models",
    responses(
        (status = 200, description = "Available models", body = ModelListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Upstream failure", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "models"
)]
pub async fn list_models<B: ChatBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Result<impl IntoResponse, ApiError> {
    let models = state.backend.list_models().await?;

    let response = ModelListResponse {
        object: "list",
        data: models.models.into_iter().map(ModelResponse::from).collect(),
    };

    Ok(axum::Json(response))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse { status: "healthy" })
}
