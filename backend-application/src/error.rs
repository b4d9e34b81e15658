use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing API key")]
    MissingApiKey,
    /// Unknown and inactive keys share one variant so the caller cannot
    /// tell which case occurred.
    #[error("invalid or inactive API key")]
    InvalidApiKey,
    #[error("rate limit exceeded")]
    RateLimited { remaining: u32, reset_at: i64 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
