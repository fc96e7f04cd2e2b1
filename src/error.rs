use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdoLensError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unauthorized: invalid or expired personal access token ({0})")]
    Unauthorized(String),

    #[error("Forbidden: insufficient permissions for this resource ({0})")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: too many requests against {0}")]
    RateLimited(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdoLensError>;
