//! Payment endpoints.

use super::auth::Caller;
use super::json::ApiJson;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use ods_types::{
	APIError, InitiatePaymentRequest, MessageResponse, Payment, PaymentInitiatedResponse,
};

/// Handles POST /api/payments.
pub async fn initiate_payment(
	State(state): State<AppState>,
	Caller(auth): Caller,
	ApiJson(request): ApiJson<InitiatePaymentRequest>,
) -> Result<Json<PaymentInitiatedResponse>, APIError> {
	let payment = state
		.engine
		.payments()
		.initiate_payment(&auth, request.order_id)
		.await?;
	Ok(Json(PaymentInitiatedResponse {
		message: "Payment initiated".into(),
		payment_id: payment.id,
	}))
}

/// Handles GET /api/payments/{id}.
pub async fn get_payment(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<String>,
) -> Result<Json<Payment>, APIError> {
	Ok(Json(state.engine.payments().get_payment(&auth, &id).await?))
}

/// Handles PUT /api/payments/{id}/confirm.
pub async fn confirm_payment(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<String>,
) -> Result<Json<MessageResponse>, APIError> {
	state.engine.payments().confirm_payment(&auth, &id).await?;
	Ok(Json(MessageResponse::new("Payment confirmed")))
}
