//! API types for the HTTP surface.
//!
//! Request bodies, response envelopes and the structured error type shared
//! by every endpoint.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::RecordId;

/// One requested line of a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
	pub product_id: RecordId,
	pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
	#[serde(default)]
	pub items: Vec<OrderLineRequest>,
}

/// Body of `PUT /orders/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
	#[serde(default)]
	pub status: Option<String>,
}

/// Body of `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiatePaymentRequest {
	pub order_id: RecordId,
}

/// Response for endpoints that create a numbered record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedResponse {
	pub message: String,
	pub id: RecordId,
}

/// Response for endpoints that only acknowledge an action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
	pub message: String,
}

impl MessageResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// Response for `POST /payments`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentInitiatedResponse {
	pub message: String,
	pub payment_id: String,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Bad request with validation errors (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Caller identity missing or unknown (401)
	Unauthorized { message: String },
	/// Caller lacks the role or ownership required (403)
	Forbidden { message: String },
	/// Addressed record does not exist (404)
	NotFound { error_type: String, message: String },
	/// Request body exceeds the configured limit (413)
	PayloadTooLarge { message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::Unauthorized { .. } => 401,
			APIError::Forbidden { .. } => 403,
			APIError::NotFound { .. } => 404,
			APIError::PayloadTooLarge { .. } => 413,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error, message, details) = match self {
			APIError::BadRequest {
				error_type,
				message,
				details,
			} => (error_type.as_str(), message, details.clone()),
			APIError::Unauthorized { message } => ("UNAUTHENTICATED", message, None),
			APIError::Forbidden { message } => ("FORBIDDEN", message, None),
			APIError::NotFound {
				error_type,
				message,
			} => (error_type.as_str(), message, None),
			APIError::PayloadTooLarge { message } => ("PAYLOAD_TOO_LARGE", message, None),
			APIError::InternalServerError {
				error_type,
				message,
			} => (error_type.as_str(), message, None),
		};

		ErrorResponse {
			error: error.to_string(),
			message: message.clone(),
			details,
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::Unauthorized { message } => write!(f, "Unauthorized: {}", message),
			APIError::Forbidden { message } => write!(f, "Forbidden: {}", message),
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::PayloadTooLarge { message } => write!(f, "Payload Too Large: {}", message),
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

/// Malformed or missing JSON bodies are validation errors.
impl From<JsonRejection> for APIError {
	fn from(rejection: JsonRejection) -> Self {
		if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
			return APIError::PayloadTooLarge {
				message: rejection.body_text(),
			};
		}
		APIError::BadRequest {
			error_type: "VALIDATION_ERROR".into(),
			message: rejection.body_text(),
			details: None,
		}
	}
}

impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::response::Json;

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

		(status, Json(self.to_error_response())).into_response()
	}
}
