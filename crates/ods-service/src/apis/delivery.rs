//! Delivery endpoints.

use super::auth::Caller;
use super::json::ApiJson;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use ods_types::{APIError, Delivery, DeliveryUpdate, MessageResponse, RecordId};

/// Handles PUT /api/orders/{id}/assign/{agent_id}.
pub async fn assign_delivery(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path((order_id, agent_id)): Path<(RecordId, RecordId)>,
) -> Result<Json<MessageResponse>, APIError> {
	state
		.engine
		.deliveries()
		.assign_delivery(&auth, order_id, agent_id)
		.await?;
	Ok(Json(MessageResponse::new("Delivery assigned")))
}

/// Handles GET /api/delivery/{order_id}.
pub async fn track_delivery(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(order_id): Path<RecordId>,
) -> Result<Json<Delivery>, APIError> {
	Ok(Json(
		state.engine.deliveries().track_delivery(&auth, order_id).await?,
	))
}

/// Handles PUT /api/delivery/{order_id}/update.
pub async fn update_delivery(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(order_id): Path<RecordId>,
	ApiJson(update): ApiJson<DeliveryUpdate>,
) -> Result<Json<MessageResponse>, APIError> {
	state
		.engine
		.deliveries()
		.update_delivery(&auth, order_id, update)
		.await?;
	Ok(Json(MessageResponse::new("Delivery updated")))
}
