use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum HttpError {
    MissingApiKey,
    InvalidApiKey,
    RateLimited { remaining: u32, reset_at: i64 },
    InvalidEvents,
    Unauthorized,
    Internal(String),
}

impl From<backend_application::AppError> for HttpError {
    fn from(value: backend_application::AppError) -> Self {
        match value {
            backend_application::AppError::MissingApiKey => HttpError::MissingApiKey,
            backend_application::AppError::InvalidApiKey => HttpError::InvalidApiKey,
            backend_application::AppError::RateLimited {
                remaining,
                reset_at,
            } => HttpError::RateLimited {
                remaining,
                reset_at,
            },
            backend_application::AppError::Internal(err) => HttpError::Internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::MissingApiKey => (StatusCode::UNAUTHORIZED, "Missing API key".to_string()),
            HttpError::InvalidApiKey => (
                StatusCode::UNAUTHORIZED,
                "Invalid or inactive API key".to_string(),
            ),
            HttpError::RateLimited {
                remaining,
                reset_at,
            } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorBody {
                        error: "Rate limit exceeded".to_string(),
                    }),
                )
                    .into_response();
                let headers = response.headers_mut();
                if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
                    headers.insert("X-RateLimit-Remaining", value);
                }
                if let Ok(value) = HeaderValue::from_str(&reset_at.to_string()) {
                    headers.insert("X-RateLimit-Reset", value);
                }
                return response;
            }
            HttpError::InvalidEvents => {
                (StatusCode::BAD_REQUEST, "Invalid events format".to_string())
            }
            HttpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
