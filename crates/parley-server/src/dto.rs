use serde::Serialize;

use parley_core::upstream::ModelInfo;

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ModelListResponse {
    pub object: &'static str,
    pub data: Vec<ModelResponse>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ModelResponse {
    pub id: String,
    pub object: &'static str,
    pub owned_by: &'static str,
}

impl From<ModelInfo> for ModelResponse {
    fn from(model: ModelInfo) -> Self {
        Self {
            id: model.id().to_string(),
            object: "model",
            owned_by: "google",
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
