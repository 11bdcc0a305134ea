//! Error types for the loyalty CRM

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("User not found")]
  UserNotFound,

  #[error("Prize not found")]
  PrizeNotFound,

  #[error("Redemption not found")]
  RedemptionNotFound,

  #[error("Registration link not found")]
  LinkNotFound,

  #[error("Registration link inactive, used or bound to another email")]
  LinkInvalid,

  #[error("Not enough points for this prize")]
  InsufficientPoints,

  #[error("Balance too low for this deduction")]
  InsufficientBalance,

  #[error("Redemption already resolved")]
  AlreadyResolved,

  #[error("A comment is required when rejecting")]
  CommentRequired,

  #[error("Prize has redemption history")]
  PrizeInUse,

  #[error("Email already registered")]
  EmailTaken,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
      Error::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
      Error::PrizeNotFound => (StatusCode::NOT_FOUND, "Prize not found"),
      Error::RedemptionNotFound => (StatusCode::NOT_FOUND, "Redemption not found"),
      Error::LinkNotFound => (StatusCode::NOT_FOUND, "Registration link not found"),
      Error::LinkInvalid => (StatusCode::BAD_REQUEST, "Registration link is not valid"),
      Error::InsufficientPoints => (StatusCode::BAD_REQUEST, "Not enough points for this prize"),
      Error::InsufficientBalance => (StatusCode::BAD_REQUEST, "Balance too low for this deduction"),
      Error::AlreadyResolved => (StatusCode::CONFLICT, "Redemption already resolved"),
      Error::CommentRequired => (StatusCode::BAD_REQUEST, "A comment is required when rejecting"),
      Error::PrizeInUse => (StatusCode::CONFLICT, "Prize has redemption history"),
      Error::EmailTaken => (StatusCode::CONFLICT, "Email already registered"),
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T> = std::result::Result<T, Error>;
