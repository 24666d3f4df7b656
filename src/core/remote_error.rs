use thiserror::Error;

/// Failure talking to any remote Google service.
///
/// Lives in core so services can match on it without knowing about HTTP.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// True when an error message carries Google's insufficient-scope reason,
/// which usually means the token file predates a scope change and must be
/// re-authorized. Works on rendered error chains.
pub fn reports_insufficient_scope(message: &str) -> bool {
    message.contains("SCOPE_INSUFFICIENT")
}
