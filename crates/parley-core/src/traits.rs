use std::future::Future;

use crate::error::AppError;
use crate::upstream::{GenerateContentRequest, GenerateContentResponse, ModelList};

/// Talks to a generative-language backend.
///
/// The gateway router is generic over this trait so tests can stand in a
/// local mock server without touching the real API.
pub trait ChatBackend: Send + Sync + Clone {
    /// Run one generation call against the named model.
    fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> impl Future<Output = Result<GenerateContentResponse, AppError>> + Send;

    /// List the models the backend exposes.
    fn list_models(&self) -> impl Future<Output = Result<ModelList, AppError>> + Send;
}
