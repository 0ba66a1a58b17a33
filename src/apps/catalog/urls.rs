//! Route table for the catalog app. Categories and genres are
//! collection-plus-delete only; titles get the full CRUD set.

use hyper::Method;

use super::views;
use crate::routing::Router;

pub fn register(router: &mut Router) {
	router.route(Method::GET, "/api/v1/categories/", |state, request| {
		Box::pin(views::list_categories(state, request))
	});
	router.route(Method::POST, "/api/v1/categories/", |state, request| {
		Box::pin(views::create_category(state, request))
	});
	router.route(
		Method::DELETE,
		"/api/v1/categories/{slug}/",
		|state, request| Box::pin(views::delete_category(state, request)),
	);

	router.route(Method::GET, "/api/v1/genres/", |state, request| {
		Box::pin(views::list_genres(state, request))
	});
	router.route(Method::POST, "/api/v1/genres/", |state, request| {
		Box::pin(views::create_genre(state, request))
	});
	router.route(
		Method::DELETE,
		"/api/v1/genres/{slug}/",
		|state, request| Box::pin(views::delete_genre(state, request)),
	);

	router.route(Method::GET, "/api/v1/titles/", |state, request| {
		Box::pin(views::list_titles(state, request))
	});
	router.route(Method::POST, "/api/v1/titles/", |state, request| {
		Box::pin(views::create_title(state, request))
	});
	router.route(
		Method::GET,
		"/api/v1/titles/{title_id}/",
		|state, request| Box::pin(views::retrieve_title(state, request)),
	);
	router.route(
		Method::PATCH,
		"/api/v1/titles/{title_id}/",
		|state, request| Box::pin(views::update_title(state, request)),
	);
	router.route(
		Method::DELETE,
		"/api/v1/titles/{title_id}/",
		|state, request| Box::pin(views::delete_title(state, request)),
	);
}
