//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fleet_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Every response body is
/// `{"code": <machine-readable>, "message": <human-readable>}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] CoreError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code, message) = match &self {
      ApiError::Core(e) => match e {
        CoreError::ContractNotFound(_)
        | CoreError::ClientNotFound(_)
        | CoreError::VehicleNotFound(_) => {
          (StatusCode::NOT_FOUND, "not_found", e.to_string())
        }
        CoreError::Validation(r) => {
          (StatusCode::UNPROCESSABLE_ENTITY, r.code(), e.to_string())
        }
        CoreError::IllegalTransition { .. } => {
          (StatusCode::CONFLICT, "illegal_transition", e.to_string())
        }
        CoreError::DuplicateClient | CoreError::DuplicateLicence(_) => {
          (StatusCode::CONFLICT, "duplicate_client", e.to_string())
        }
        CoreError::DuplicateRegistration(_) => {
          (StatusCode::CONFLICT, "duplicate_vehicle", e.to_string())
        }
        CoreError::VehicleRented(_) | CoreError::RentedIsManaged => {
          (StatusCode::CONFLICT, "vehicle_state_managed", e.to_string())
        }
        CoreError::Store(_) => {
          (StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
      },
      ApiError::Store(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
      }
    };
    (status, Json(json!({ "code": code, "message": message })))
      .into_response()
  }
}
