use axum::{Json, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::errors::EsgrowError;

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub amount: Decimal,
}

#[derive(Deserialize, ToSchema)]
pub struct DisputeTransactionRequest {
    pub reason: String,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for EsgrowError to implement IntoResponse
pub struct ApiError(pub EsgrowError);

impl From<EsgrowError> for ApiError {
    fn from(err: EsgrowError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            EsgrowError::MissingUsername
            | EsgrowError::InvalidEmail(_)
            | EsgrowError::InvalidAmount(_)
            | EsgrowError::InvalidInput(_, _) => StatusCode::BAD_REQUEST,
            EsgrowError::InvalidCredentials | EsgrowError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            EsgrowError::NotTransactionParty(_) => StatusCode::FORBIDDEN,
            EsgrowError::UserNotFound(_) | EsgrowError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
            EsgrowError::UsernameAlreadyRegistered(_)
            | EsgrowError::TransactionAlreadyCompleted(_)
            | EsgrowError::TransactionClosed(_, _) => StatusCode::CONFLICT,
            EsgrowError::InternalServerError(_) | EsgrowError::StorageError(_) | EsgrowError::LoggingError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}
