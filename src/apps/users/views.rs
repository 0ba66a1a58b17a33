//! Views for signup, token exchange, user management, and `/users/me`.

use std::sync::Arc;

use hyper::StatusCode;
use serde_json::json;

use super::models::User;
use super::serializers::{SignUpData, TokenRequest, UserCreateData, UserOut, UserPatchData};
use crate::auth::permissions::{
	AllowAny, IsAdminOrSuperuser, IsAuthenticated, Permission, PermissionContext,
};
use crate::exceptions::{ApiError, ApiResult};
use crate::http::{Request, Response};
use crate::mail::EmailMessage;
use crate::pagination::{PageParams, Paginated};
use crate::state::AppState;

/// `POST /api/v1/auth/signup/`
///
/// Get-or-create the account for the exact (username, email) pair and
/// email a confirmation code. Idempotent: repeating the same pair
/// re-sends a code for the existing account.
pub async fn signup(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	AllowAny
		.check(&PermissionContext::from_request(&request))
		.require()?;
	let data: SignUpData = request.json()?;
	data.validate(&state.pool).await?;

	let (user, created) = User::get_or_create(&state.pool, &data.username, &data.email).await?;
	if created {
		tracing::info!(username = %user.username, "new account pending confirmation");
	}

	let code = state.confirmations.make_code(&user);
	let message = EmailMessage {
		from: state.settings.from_email.clone(),
		to: user.email.clone(),
		subject: "Confirmation code".to_string(),
		body: format!("Your confirmation code: {code}"),
	};
	state
		.mailer
		.send(&message)
		.await
		.map_err(|err| ApiError::Delivery(err.to_string()))?;

	Ok(Response::ok_json(&json!({
		"username": user.username,
		"email": user.email,
	})))
}

/// `POST /api/v1/auth/token/`
///
/// Exchange a valid (username, confirmation code) pair for a bearer
/// token. Unknown username is 404; a bad code is 400 and leaves the user
/// record untouched.
pub async fn token(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	AllowAny
		.check(&PermissionContext::from_request(&request))
		.require()?;
	let data: TokenRequest = request.json()?;
	data.validate()?;

	let user = User::find_by_username(&state.pool, &data.username)
		.await?
		.ok_or(ApiError::NotFound)?;

	if !state.confirmations.check_code(&user, &data.confirmation_code) {
		return Ok(Response::json_value(
			StatusCode::BAD_REQUEST,
			&json!({"confirmation code": "Invalid confirmation code."}),
		));
	}

	let token = state
		.jwt
		.generate_token(user.id, user.username.clone())
		.map_err(|err| {
			tracing::error!(error = %err, "failed to sign access token");
			ApiError::AuthenticationFailed("Could not issue token.".to_string())
		})?;
	Ok(Response::ok_json(&json!({"token": token})))
}

/// `GET /api/v1/users/` (admin)
pub async fn list_users(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAdminOrSuperuser
		.check(&PermissionContext::from_request(&request))
		.require()?;

	let page = PageParams::from_request(&request, &state.settings)?;
	let search = request.query_param("search");
	let (users, count) = User::list(&state.pool, search.as_deref(), page).await?;
	let results: Vec<UserOut> = users.iter().map(UserOut::from).collect();
	Ok(Response::ok_json(&Paginated::new(
		results,
		count,
		page,
		request.uri.path(),
	)))
}

/// `POST /api/v1/users/` (admin)
pub async fn create_user(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAdminOrSuperuser
		.check(&PermissionContext::from_request(&request))
		.require()?;

	let data: UserCreateData = request.json()?;
	let role = data.validate(&state.pool).await?;
	let user = User::create(
		&state.pool,
		&data.username,
		&data.email,
		&data.first_name,
		&data.last_name,
		&data.bio,
		role,
	)
	.await
	.map_err(crate::db::map_unique_violation("username"))?;
	Ok(Response::created_json(&UserOut::from(&user)))
}

/// `GET /api/v1/users/{username}/` (admin)
pub async fn retrieve_user(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAdminOrSuperuser
		.check(&PermissionContext::from_request(&request))
		.require()?;

	let username = request.param("username").ok_or(ApiError::NotFound)?;
	let user = User::find_by_username(&state.pool, username)
		.await?
		.ok_or(ApiError::NotFound)?;
	Ok(Response::ok_json(&UserOut::from(&user)))
}

/// `PATCH /api/v1/users/{username}/` (admin; may change role)
pub async fn patch_user(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAdminOrSuperuser
		.check(&PermissionContext::from_request(&request))
		.require()?;

	let username = request.param("username").ok_or(ApiError::NotFound)?;
	let mut user = User::find_by_username(&state.pool, username)
		.await?
		.ok_or(ApiError::NotFound)?;

	let patch: UserPatchData = request.json()?;
	patch.apply(&state.pool, &mut user, true).await?;
	user.save(&state.pool)
		.await
		.map_err(crate::db::map_unique_violation("username"))?;
	Ok(Response::ok_json(&UserOut::from(&user)))
}

/// `DELETE /api/v1/users/{username}/` (admin)
pub async fn delete_user(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAdminOrSuperuser
		.check(&PermissionContext::from_request(&request))
		.require()?;

	let username = request.param("username").ok_or(ApiError::NotFound)?;
	if User::delete_by_username(&state.pool, username).await? {
		Ok(Response::no_content())
	} else {
		Err(ApiError::NotFound)
	}
}

/// `GET /api/v1/users/me/`
pub async fn me_detail(_state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAuthenticated
		.check(&PermissionContext::from_request(&request))
		.require()?;
	let user = request.require_user()?;
	Ok(Response::ok_json(&UserOut::from(user)))
}

/// `PATCH /api/v1/users/me/`
///
/// Self-service profile update. The caller's stored role is preserved
/// regardless of any role value in the body.
pub async fn me_patch(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAuthenticated
		.check(&PermissionContext::from_request(&request))
		.require()?;

	let mut user = request.require_user()?.clone();
	let patch: UserPatchData = request.json()?;
	patch.apply(&state.pool, &mut user, false).await?;
	user.save(&state.pool)
		.await
		.map_err(crate::db::map_unique_violation("username"))?;
	Ok(Response::ok_json(&UserOut::from(&user)))
}
