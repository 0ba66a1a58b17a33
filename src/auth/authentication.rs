//! Bearer-token request authentication.
//!
//! Runs once per request before routing. A missing header means an
//! anonymous request; a present but invalid token is rejected outright
//! rather than downgraded to anonymous.

use crate::apps::users::models::User;
use crate::exceptions::{ApiError, ApiResult};
use crate::http::Request;
use crate::state::AppState;

pub async fn authenticate(state: &AppState, request: &Request) -> ApiResult<Option<User>> {
	let Some(token) = request.bearer_token() else {
		return Ok(None);
	};

	let claims = state
		.jwt
		.decode_token(token)
		.map_err(|_| ApiError::AuthenticationFailed("Invalid or expired token.".to_string()))?;

	let user_id = claims
		.user_id()
		.ok_or_else(|| ApiError::AuthenticationFailed("Malformed token subject.".to_string()))?;

	// The account may have been deleted since the token was minted.
	let user = User::find_by_id(&state.pool, user_id)
		.await?
		.ok_or_else(|| ApiError::AuthenticationFailed("User no longer exists.".to_string()))?;

	Ok(Some(user))
}
