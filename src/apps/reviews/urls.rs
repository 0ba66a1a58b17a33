//! Route table for the reviews app. Everything lives under its title;
//! comments additionally live under their review.

use hyper::Method;

use super::views;
use crate::routing::Router;

pub fn register(router: &mut Router) {
	router.route(
		Method::GET,
		"/api/v1/titles/{title_id}/reviews/",
		|state, request| Box::pin(views::list_reviews(state, request)),
	);
	router.route(
		Method::POST,
		"/api/v1/titles/{title_id}/reviews/",
		|state, request| Box::pin(views::create_review(state, request)),
	);
	router.route(
		Method::GET,
		"/api/v1/titles/{title_id}/reviews/{review_id}/",
		|state, request| Box::pin(views::retrieve_review(state, request)),
	);
	router.route(
		Method::PATCH,
		"/api/v1/titles/{title_id}/reviews/{review_id}/",
		|state, request| Box::pin(views::update_review(state, request)),
	);
	router.route(
		Method::DELETE,
		"/api/v1/titles/{title_id}/reviews/{review_id}/",
		|state, request| Box::pin(views::delete_review(state, request)),
	);

	router.route(
		Method::GET,
		"/api/v1/titles/{title_id}/reviews/{review_id}/comments/",
		|state, request| Box::pin(views::list_comments(state, request)),
	);
	router.route(
		Method::POST,
		"/api/v1/titles/{title_id}/reviews/{review_id}/comments/",
		|state, request| Box::pin(views::create_comment(state, request)),
	);
	router.route(
		Method::GET,
		"/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
		|state, request| Box::pin(views::retrieve_comment(state, request)),
	);
	router.route(
		Method::PATCH,
		"/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
		|state, request| Box::pin(views::update_comment(state, request)),
	);
	router.route(
		Method::DELETE,
		"/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
		|state, request| Box::pin(views::delete_comment(state, request)),
	);
}
