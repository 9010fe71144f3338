//! Order endpoints.

use super::auth::Caller;
use super::json::ApiJson;
use crate::server::AppState;
use ods_core::ShopError;
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use ods_types::{
	APIError, CreatedResponse, MessageResponse, Order, OrderSummary, PlaceOrderRequest, RecordId,
	UpdateStatusRequest,
};

/// Handles POST /api/orders.
pub async fn place_order(
	State(state): State<AppState>,
	Caller(auth): Caller,
	ApiJson(request): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), APIError> {
	let order = state
		.engine
		.orders()
		.place_order(&auth, request)
		.await
		.map_err(ShopError::into_placement_error)?;
	Ok((
		StatusCode::CREATED,
		Json(CreatedResponse {
			message: "Order created".into(),
			id: order.id,
		}),
	))
}

/// Handles GET /api/orders/{id}.
pub async fn get_order(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<RecordId>,
) -> Result<Json<Order>, APIError> {
	Ok(Json(state.engine.orders().get_order(&auth, id).await?))
}

/// Handles GET /api/orders/user/{user_id}.
pub async fn list_user_orders(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(user_id): Path<RecordId>,
) -> Result<Json<Vec<OrderSummary>>, APIError> {
	Ok(Json(
		state.engine.orders().list_user_orders(&auth, user_id).await?,
	))
}

/// Handles PUT /api/orders/{id}/cancel.
pub async fn cancel_order(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<RecordId>,
) -> Result<Json<MessageResponse>, APIError> {
	state.engine.orders().cancel_order(&auth, id).await?;
	Ok(Json(MessageResponse::new("Order cancelled")))
}

/// Handles PUT /api/orders/{id}/accept.
pub async fn accept_order(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<RecordId>,
) -> Result<Json<MessageResponse>, APIError> {
	state.engine.orders().accept_order(&auth, id).await?;
	Ok(Json(MessageResponse::new("Order accepted")))
}

/// Handles PUT /api/orders/{id}/status.
pub async fn update_status(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<RecordId>,
	ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>, APIError> {
	state
		.engine
		.orders()
		.update_status(&auth, id, request.status.as_deref())
		.await?;
	Ok(Json(MessageResponse::new("Order status updated")))
}
