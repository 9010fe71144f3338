//! Caller resolution for API requests.
//!
//! The caller names itself with the `X-User-Id` header. The id is resolved
//! against the user store before any handler runs; a missing, malformed or
//! unknown id is rejected with 401.

use crate::server::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use ods_types::{APIError, AuthContext};

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub AuthContext);

impl FromRequestParts<AppState> for Caller {
	type Rejection = APIError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let user_id = parts
			.headers
			.get(USER_ID_HEADER)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.trim().parse::<u64>().ok())
			.ok_or_else(|| APIError::Unauthorized {
				message: "Authentication required".into(),
			})?;

		let auth = state.engine.users().authenticate(user_id).await?;
		Ok(Caller(auth))
	}
}
