use parley_core::ChatBackend;

/// Shared application state, available to all route handlers via `State<Arc<AppState<B>>>`.
pub struct AppState<B: ChatBackend> {
    pub backend: B,
    /// Model used when a request does not name one.
    pub default_model: String,
    /// Bearer token protecting the API routes (None = open access).
    pub auth_token: Option<String>,
}
