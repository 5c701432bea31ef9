//! Translation between the OpenAI-style chat schema and the
//! generative-language `generateContent` schema.
//!
//! Both directions are pure reshaping: no I/O, no state. The gateway calls
//! [`to_generate_request`] before the outbound call and
//! [`from_generate_response`] after it.

use chrono::Utc;
use uuid::Uuid;

use crate::chat::{
    AssistantMessage, ChatCompletionRequest, ChatCompletionResponse, Choice, Role, StopSequences,
    Usage,
};
use crate::error::AppError;
use crate::upstream::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};

/// Build the upstream request from a chat-completion request.
///
/// System messages are lifted out of the turn list into `systemInstruction`
/// (multiple system messages are concatenated, blank-line separated). The
/// remaining turns map `user` -> `"user"` and `assistant` -> `"model"`.
pub fn to_generate_request(
    request: &ChatCompletionRequest,
) -> Result<GenerateContentRequest, AppError> {
    if request.messages.is_empty() {
        return Err(AppError::InvalidRequest(
            "messages must not be empty".into(),
        ));
    }

    if request.stream == Some(true) {
        return Err(AppError::InvalidRequest(
            "streaming responses are not supported".into(),
        ));
    }

    let mut system_texts: Vec<&str> = Vec::new();
    let mut contents: Vec<Content> = Vec::new();

    for message in &request.messages {
        match message.role {
            Role::System => system_texts.push(&message.content),
            Role::User => contents.push(Content {
                role: Some("user".into()),
                parts: vec![Part::text(&message.content)],
            }),
            Role::Assistant => contents.push(Content {
                role: Some("model".into()),
                parts: vec![Part::text(&message.content)],
            }),
        }
    }

    if contents.is_empty() {
        return Err(AppError::InvalidRequest(
            "at least one user or assistant message is required".into(),
        ));
    }

    let system_instruction = if system_texts.is_empty() {
        None
    } else {
        Some(Content {
            role: None,
            parts: vec![Part::text(system_texts.join("\n\n"))],
        })
    };

    Ok(GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: build_generation_config(request),
    })
}

/// Assemble `generationConfig`, or `None` when no knob is set.
///
/// `max_completion_tokens` wins over the older `max_tokens` alias.
fn build_generation_config(request: &ChatCompletionRequest) -> Option<GenerationConfig> {
    let max_output_tokens = request.max_completion_tokens.or(request.max_tokens);

    let config = GenerationConfig {
        temperature: request.temperature,
        top_p: request.top_p,
        max_output_tokens,
        candidate_count: request.n,
        stop_sequences: request.stop.clone().map(StopSequences::into_vec),
    };

    let is_empty = config.temperature.is_none()
        && config.top_p.is_none()
        && config.max_output_tokens.is_none()
        && config.candidate_count.is_none()
        && config.stop_sequences.is_none();

    if is_empty { None } else { Some(config) }
}

/// Reshape the upstream response into a chat-completion response.
///
/// `model` is the name the request resolved to; the upstream `modelVersion`
/// takes precedence when present.
pub fn from_generate_response(
    model: &str,
    response: GenerateContentResponse,
) -> Result<ChatCompletionResponse, AppError> {
    if response.candidates.is_empty() {
        let message = match response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            Some(reason) => format!("prompt was blocked upstream (reason: {reason})"),
            None => "empty response from upstream".to_string(),
        };
        return Err(AppError::Upstream {
            message,
            status_code: 200,
        });
    }

    let choices = response
        .candidates
        .into_iter()
        .enumerate()
        .map(|(position, candidate)| Choice {
            index: candidate.index.unwrap_or(position as u32),
            message: AssistantMessage {
                role: Role::Assistant,
                content: candidate
                    .content
                    .map(|content| join_text_parts(&content))
                    .unwrap_or_default(),
            },
            finish_reason: map_finish_reason(candidate.finish_reason.as_deref()).to_string(),
        })
        .collect();

    Ok(ChatCompletionResponse {
        id: format!("chatcmpl-{}", Uuid::new_v4().simple()),
        object: "chat.completion".to_string(),
        created: Utc::now().timestamp(),
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        choices,
        usage: response.usage_metadata.map(|meta| Usage {
            prompt_tokens: meta.prompt_token_count,
            completion_tokens: meta.candidates_token_count,
            total_tokens: meta.total_token_count,
        }),
    })
}

/// Join the text parts of a candidate, skipping non-text parts.
fn join_text_parts(content: &Content) -> String {
    content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect()
}

/// Map upstream finish reasons onto the chat-completion vocabulary.
///
/// Absent or unrecognized reasons collapse to `stop`.
fn map_finish_reason(reason: Option<&str>) -> &'static str {
    match reason {
        Some("MAX_TOKENS") => "length",
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
            "content_filter"
        }
        _ => "stop",
    }
}
