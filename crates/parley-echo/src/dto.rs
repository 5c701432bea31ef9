use serde::{Deserialize, Serialize};

/// Loose request shape: either a chat-style `messages` array or a bare
/// `message` string. Everything is optional; unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct EchoRequest {
    pub messages: Option<Vec<EchoMessage>>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EchoMessage {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub id: &'static str,
    pub object: &'static str,
    pub choices: Vec<EchoChoice>,
}

#[derive(Debug, Serialize)]
pub struct EchoChoice {
    pub message: EchoReply,
}

#[derive(Debug, Serialize)]
pub struct EchoReply {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}
