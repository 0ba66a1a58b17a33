//! Route table for the users app.
//!
//! `/users/me/` is registered ahead of `/users/{username}/` so the
//! reserved alias never resolves as a lookup (usernames can never be
//! "me" anyway, but the order keeps the intent explicit).

use hyper::Method;

use super::views;
use crate::routing::Router;

pub fn register(router: &mut Router) {
	router.route(Method::POST, "/api/v1/auth/signup/", |state, request| {
		Box::pin(views::signup(state, request))
	});
	router.route(Method::POST, "/api/v1/auth/token/", |state, request| {
		Box::pin(views::token(state, request))
	});

	router.route(Method::GET, "/api/v1/users/me/", |state, request| {
		Box::pin(views::me_detail(state, request))
	});
	router.route(Method::PATCH, "/api/v1/users/me/", |state, request| {
		Box::pin(views::me_patch(state, request))
	});

	router.route(Method::GET, "/api/v1/users/", |state, request| {
		Box::pin(views::list_users(state, request))
	});
	router.route(Method::POST, "/api/v1/users/", |state, request| {
		Box::pin(views::create_user(state, request))
	});
	router.route(Method::GET, "/api/v1/users/{username}/", |state, request| {
		Box::pin(views::retrieve_user(state, request))
	});
	router.route(
		Method::PATCH,
		"/api/v1/users/{username}/",
		|state, request| Box::pin(views::patch_user(state, request)),
	);
	router.route(
		Method::DELETE,
		"/api/v1/users/{username}/",
		|state, request| Box::pin(views::delete_user(state, request)),
	);
}
