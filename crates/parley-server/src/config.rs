use parley_core::AppError;

const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub upstream_api_key: String,
    pub upstream_base_url: String,
    pub default_model: String,
    pub upstream_timeout_secs: u64,
    /// Bearer token for the API routes (unset = open access).
    pub auth_token: Option<String>,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `GEMINI_API_KEY` (required)
    /// - `PARLEY_PORT` (optional, defaults to 4000)
    /// - `PARLEY_BASE_URL` (optional, defaults to the generative-language endpoint)
    /// - `PARLEY_MODEL` (optional, defaults to gemini-2.5-flash)
    /// - `PARLEY_TIMEOUT_SECS` (optional, defaults to 120)
    /// - `PARLEY_AUTH_TOKEN` (optional; when set, API routes require it as a bearer token)
    pub fn from_env() -> Result<Self, AppError> {
        let upstream_api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            AppError::ConfigError("GEMINI_API_KEY not set. Required for upstream calls.".into())
        })?;

        let port = match std::env::var("PARLEY_PORT") {
            Err(_) => DEFAULT_PORT,
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid PARLEY_PORT '{raw}': must be a port number"))
            })?,
        };

        let upstream_timeout_secs = match std::env::var("PARLEY_TIMEOUT_SECS") {
            Err(_) => DEFAULT_TIMEOUT_SECS,
            Ok(raw) => {
                let parsed: u64 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!(
                        "Invalid PARLEY_TIMEOUT_SECS '{raw}': must be a positive integer"
                    ))
                })?;
                if parsed == 0 {
                    return Err(AppError::ConfigError(
                        "PARLEY_TIMEOUT_SECS must be at least 1".into(),
                    ));
                }
                parsed
            }
        };

        let upstream_base_url = std::env::var("PARLEY_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_UPSTREAM_BASE_URL.to_string());

        let default_model =
            std::env::var("PARLEY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let auth_token = std::env::var("PARLEY_AUTH_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        Ok(Self {
            port,
            upstream_api_key,
            upstream_base_url,
            default_model,
            upstream_timeout_secs,
            auth_token,
        })
    }
}
