//! JSON body extractor whose rejections use the API error envelope.

use axum::{
	extract::{rejection::JsonRejection, FromRequest, Request},
	Json,
};
use ods_types::APIError;

/// Like [`Json`], but a malformed body is a structured `VALIDATION_ERROR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
	Json<T>: FromRequest<S, Rejection = JsonRejection>,
	S: Send + Sync,
{
	type Rejection = APIError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let Json(value) = Json::<T>::from_request(req, state).await?;
		Ok(ApiJson(value))
	}
}
