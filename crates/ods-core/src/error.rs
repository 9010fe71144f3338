//! Error taxonomy for lifecycle operations.
//!
//! Every variant describes a caller-correctable condition except `Storage`,
//! which wraps backend failures. None of them is retried.

use ods_storage::StorageError;
use ods_types::{APIError, AuthError, RecordId};
use thiserror::Error;

/// Errors returned by the engine's handlers.
#[derive(Debug, Error)]
pub enum ShopError {
	/// Missing or malformed input.
	#[error("{0}")]
	Validation(String),
	/// The named record does not exist.
	#[error("{entity} {id} not found")]
	NotFound { entity: &'static str, id: String },
	/// A line asked for more units than the product has.
	#[error(
		"Insufficient stock for product {product_id}: requested {requested}, available {available}"
	)]
	InsufficientStock {
		product_id: RecordId,
		requested: u32,
		available: u32,
	},
	/// A guarded transition was attempted from the wrong state.
	#[error("Cannot {action} when status is {from}")]
	InvalidTransition { from: String, action: &'static str },
	/// The user is missing or does not hold the delivery role.
	#[error("Invalid delivery agent: {0}")]
	InvalidAgent(RecordId),
	#[error("Authentication required")]
	Unauthenticated,
	/// Ownership or role mismatch.
	#[error("{0}")]
	Unauthorized(String),
	#[error("Storage error: {0}")]
	Storage(String),
}

impl ShopError {
	pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
		ShopError::NotFound {
			entity,
			id: id.to_string(),
		}
	}

	/// HTTP mapping for order placement, where an unknown product is bad
	/// input rather than a missing resource.
	pub fn into_placement_error(self) -> APIError {
		match self {
			ShopError::NotFound {
				entity: "Product",
				id,
			} => {
				let product_id = id
					.parse::<RecordId>()
					.map(serde_json::Value::from)
					.unwrap_or_else(|_| serde_json::Value::from(id.as_str()));
				APIError::BadRequest {
					error_type: "INVALID_PRODUCT".into(),
					message: format!("Invalid product {}", id),
					details: Some(serde_json::json!({ "product_id": product_id })),
				}
			},
			other => other.into(),
		}
	}
}

impl From<StorageError> for ShopError {
	fn from(err: StorageError) -> Self {
		ShopError::Storage(err.to_string())
	}
}

impl From<AuthError> for ShopError {
	fn from(err: AuthError) -> Self {
		match err {
			AuthError::Unauthenticated => ShopError::Unauthenticated,
			AuthError::Forbidden(reason) => ShopError::Unauthorized(reason),
		}
	}
}

/// Maps lifecycle errors onto the HTTP error envelope.
impl From<ShopError> for APIError {
	fn from(err: ShopError) -> Self {
		let message = err.to_string();
		match err {
			ShopError::Validation(_) => APIError::BadRequest {
				error_type: "VALIDATION_ERROR".into(),
				message,
				details: None,
			},
			ShopError::InsufficientStock {
				product_id,
				requested,
				available,
			} => APIError::BadRequest {
				error_type: "INSUFFICIENT_STOCK".into(),
				message,
				details: Some(serde_json::json!({
					"product_id": product_id,
					"requested": requested,
					"available": available,
				})),
			},
			ShopError::InvalidTransition { .. } => APIError::BadRequest {
				error_type: "INVALID_TRANSITION".into(),
				message,
				details: None,
			},
			ShopError::InvalidAgent(agent_id) => APIError::BadRequest {
				error_type: "INVALID_AGENT".into(),
				message,
				details: Some(serde_json::json!({ "agent_id": agent_id })),
			},
			ShopError::NotFound { entity, .. } => APIError::NotFound {
				error_type: format!("{}_NOT_FOUND", entity.to_uppercase()),
				message,
			},
			ShopError::Unauthenticated => APIError::Unauthorized { message },
			ShopError::Unauthorized(_) => APIError::Forbidden { message },
			ShopError::Storage(_) => {
				tracing::error!(error = %message, "Storage failure");
				APIError::InternalServerError {
					error_type: "STORAGE_ERROR".into(),
					message: "Internal storage error".into(),
				}
			},
		}
	}
}
