// src/common/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::clients::ClientError;

// Erro único da aplicação. Cada variante sabe o seu status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid {0} ID")]
    InvalidId(&'static str),

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("A product with this SKU already exists")]
    SkuAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or missing authentication token")]
    InvalidToken,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Token signing secret is not configured")]
    MissingSigningSecret,

    // Falha de um serviço irmão que não foi um 404 confirmado.
    #[error("{service} service unavailable: {reason}")]
    ServiceUnavailable { service: &'static str, reason: String },

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Traduz a falha de um serviço irmão: 404 confirmado vira o nosso NotFound.
    pub fn from_client(service: &'static str, entity: &'static str, err: ClientError) -> Self {
        match err {
            ClientError::NotFound => AppError::NotFound(entity),
            other => AppError::ServiceUnavailable {
                service,
                reason: other.to_string(),
            },
        }
    }
}

// Corpo JSON malformado também responde no nosso formato `{"error": ...}`.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::BadRequest(ref message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::InvalidId(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::UserAlreadyExists => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::SkuAlreadyExists => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Conflict(ref message) => (StatusCode::CONFLICT, message.clone()),

            // Detalhes internos vão para o log, nunca para o corpo da resposta.
            ref e => {
                tracing::error!("Internal server error: {}", e);
                let message = match e {
                    AppError::MissingSigningSecret => "Server configuration error",
                    AppError::ServiceUnavailable { .. } => "A required service is unavailable",
                    _ => "An unexpected error occurred",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
