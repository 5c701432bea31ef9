use axum::Router;
use axum::response::IntoResponse;
use axum::routing::{get, post};

use crate::dto::{EchoChoice, EchoReply, EchoRequest, EchoResponse, HealthResponse};

/// Build the echo router.
pub fn router() -> Router {
    Router::new()
        .route("/", post(reply))
        .route("/health", get(health))
}

/// Answer with a canned reply echoing the caller's last message.
///
/// The text is taken from the last entry of `messages`, falling back to the
/// bare `message` field, falling back to `"Hello"`.
pub async fn reply(axum::Json(body): axum::Json<EchoRequest>) -> impl IntoResponse {
    let text = body
        .messages
        .and_then(|messages| messages.into_iter().next_back())
        .and_then(|message| message.content)
        .or(body.message)
        .unwrap_or_else(|| "Hello".to_string());

    axum::Json(EchoResponse {
        id: "lite-reply-1",
        object: "response",
        choices: vec![EchoChoice {
            message: EchoReply {
                content: format!("Bot reply: {text}"),
            },
        }],
    })
}

pub async fn health() -> impl IntoResponse {
    axum::Json(HealthResponse { ok: true })
}
