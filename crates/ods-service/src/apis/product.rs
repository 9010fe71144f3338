//! Catalogue endpoints. Reads are public, writes are admin only.

use super::auth::Caller;
use super::json::ApiJson;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use ods_types::{
	APIError, CreatedResponse, MessageResponse, Product, ProductCreate, ProductUpdate, RecordId,
};

pub async fn create_product(
	State(state): State<AppState>,
	Caller(auth): Caller,
	ApiJson(request): ApiJson<ProductCreate>,
) -> Result<(StatusCode, Json<CreatedResponse>), APIError> {
	let product = state.engine.products().create_product(&auth, request).await?;
	Ok((
		StatusCode::CREATED,
		Json(CreatedResponse {
			message: "Product created".into(),
			id: product.id,
		}),
	))
}

pub async fn get_product(
	State(state): State<AppState>,
	Path(id): Path<RecordId>,
) -> Result<Json<Product>, APIError> {
	Ok(Json(state.engine.products().get_product(id).await?))
}

pub async fn update_product(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<RecordId>,
	ApiJson(update): ApiJson<ProductUpdate>,
) -> Result<Json<MessageResponse>, APIError> {
	state
		.engine
		.products()
		.update_product(&auth, id, update)
		.await?;
	Ok(Json(MessageResponse::new("Product updated")))
}

pub async fn delete_product(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<RecordId>,
) -> Result<Json<MessageResponse>, APIError> {
	state.engine.products().delete_product(&auth, id).await?;
	Ok(Json(MessageResponse::new("Product deleted")))
}
