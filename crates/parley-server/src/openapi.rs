use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Parley API",
        version = "0.1.0",
        description = "OpenAI-style chat-completion gateway over the generative-language API."
    ),
    paths(
        crate::routes::chat_completions,
        crate::routes::list_models,
        crate::routes::health,
    ),
    components(schemas(
        parley_core::chat::ChatCompletionRequest,
        parley_core::chat::ChatCompletionResponse,
        parley_core::chat::ChatMessage,
        parley_core::chat::AssistantMessage,
        parley_core::chat::Choice,
        parley_core::chat::Role,
        parley_core::chat::StopSequences,
        parley_core::chat::Usage,
        crate::dto::ModelListResponse,
        crate::dto::ModelResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "chat", description = "Chat completions"),
        (name = "models", description = "Model listing"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("token")
                        .description(Some(
                            "API auth token. Set via PARLEY_AUTH_TOKEN environment variable.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
