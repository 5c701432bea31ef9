use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parley_client::GeminiClient;
use parley_core::ChatBackend;
use parley_core::chat::{ChatCompletionRequest, ChatMessage, Role};
use parley_core::translate;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Parser)]
#[command(name = "parley", version, about = "Chat with a generative-language model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single prompt and print the reply
    Chat {
        /// Prompt text
        prompt: String,

        /// Model to use
        #[arg(short, long, env = "PARLEY_MODEL", default_value = "gemini-2.5-flash")]
        model: String,

        /// API key for the upstream API
        #[arg(short, long, env = "GEMINI_API_KEY")]
        api_key: String,

        /// Upstream API base URL
        #[arg(short, long, env = "PARLEY_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,

        /// System instruction to prepend
        #[arg(short, long)]
        system: Option<String>,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Maximum number of tokens to generate
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 120)]
        timeout: u64,

        /// Print the full chat-completion response as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the models the upstream API exposes
    Models {
        /// API key for the upstream API
        #[arg(short, long, env = "GEMINI_API_KEY")]
        api_key: String,

        /// Upstream API base URL
        #[arg(short, long, env = "PARLEY_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("parley=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            prompt,
            model,
            api_key,
            base_url,
            system,
            temperature,
            max_tokens,
            timeout,
            json,
        } => {
            cmd_chat(
                &prompt,
                &model,
                &api_key,
                &base_url,
                system.as_deref(),
                temperature,
                max_tokens,
                timeout,
                json,
            )
            .await?;
        }
        Commands::Models { api_key, base_url } => {
            cmd_models(&api_key, &base_url).await?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn cmd_chat(
    prompt: &str,
    model: &str,
    api_key: &str,
    base_url: &str,
    system: Option<&str>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    timeout: u64,
    json: bool,
) -> Result<()> {
    // 1. Assemble the chat-completion request
    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(ChatMessage {
            role: Role::System,
            content: system.to_string(),
        });
    }
    messages.push(ChatMessage {
        role: Role::User,
        content: prompt.to_string(),
    });

    let request = ChatCompletionRequest {
        model: Some(model.to_string()),
        messages,
        temperature,
        top_p: None,
        max_tokens: None,
        max_completion_tokens: max_tokens,
        n: None,
        stop: None,
        stream: None,
    };

    // 2. Translate to the upstream schema
    let upstream_request =
        translate::to_generate_request(&request).map_err(|e| anyhow::anyhow!(e))?;

    // 3. Run the generation call
    let client = GeminiClient::with_base_url(api_key, base_url)
        .and_then(|client| client.with_timeout(Duration::from_secs(timeout)))
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!("Generating with model {} ...", model);

    let upstream_response = client
        .generate(model, &upstream_request)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    // 4. Reshape into the chat-completion form
    let response = translate::from_generate_response(model, upstream_response)
        .map_err(|e| anyhow::anyhow!(e))?;

    if let Some(usage) = &response.usage {
        tracing::info!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Generation complete"
        );
    }

    // 5. Output to stdout
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .unwrap_or_default();
        println!("{content}");
    }

    Ok(())
}

async fn cmd_models(api_key: &str, base_url: &str) -> Result<()> {
    let client = GeminiClient::with_base_url(api_key, base_url).map_err(|e| anyhow::anyhow!(e))?;

    let list = client
        .list_models()
        .await
        .context("Failed to list models")?;

    if list.models.is_empty() {
        println!("No models available");
        return Ok(());
    }

    for model in &list.models {
        match &model.display_name {
            Some(display_name) => println!("{} — {display_name}", model.id()),
            None => println!("{}", model.id()),
        }
    }

    tracing::info!("Total: {} models", list.models.len());

    Ok(())
}
