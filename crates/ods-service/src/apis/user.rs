//! User endpoints.

use super::auth::Caller;
use crate::server::AppState;
use axum::{
	extract::{Path, State},
	response::Json,
};
use ods_types::{APIError, RecordId, User};

/// Handles GET /api/users/{id}.
pub async fn get_user(
	State(state): State<AppState>,
	Caller(auth): Caller,
	Path(id): Path<RecordId>,
) -> Result<Json<User>, APIError> {
	Ok(Json(state.engine.users().get_user(&auth, id).await?))
}
