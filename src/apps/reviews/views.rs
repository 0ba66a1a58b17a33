//! Views for reviews and comments.
//!
//! Reads are open. Creating requires authentication; editing and
//! deleting require being the author, a moderator, or an admin. Parent
//! resources are resolved before anything else so a bad branch of the
//! URL tree is a 404, never a permission error.

use std::sync::Arc;

use super::models::{Comment, Review};
use super::serializers::{CommentData, CommentOut, ReviewData, ReviewOut};
use crate::apps::catalog::models::Title;
use crate::auth::permissions::{
	IsAuthenticated, IsAuthorOrModeratorOrAdmin, Permission, PermissionContext,
};
use crate::exceptions::{ApiError, ApiResult, FieldErrors};
use crate::http::{Request, Response};
use crate::pagination::{PageParams, Paginated};
use crate::state::AppState;

/// `GET /api/v1/titles/{title_id}/reviews/`
pub async fn list_reviews(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	let title = find_title(&state, &request).await?;
	let page = PageParams::from_request(&request, &state.settings)?;
	let (reviews, count) = Review::list(&state.pool, title.id, page).await?;
	let mut results = Vec::with_capacity(reviews.len());
	for review in &reviews {
		results.push(ReviewOut::build(&state.pool, review).await?);
	}
	Ok(Response::ok_json(&Paginated::new(
		results,
		count,
		page,
		request.uri.path(),
	)))
}

/// `POST /api/v1/titles/{title_id}/reviews/`
///
/// One review per (title, author); a second attempt is a validation
/// error. The schema constraint backstops the pre-check under
/// concurrent requests.
pub async fn create_review(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAuthenticated
		.check(&PermissionContext::from_request(&request))
		.require()?;
	let title = find_title(&state, &request).await?;
	let author = request.require_user()?;

	let data: ReviewData = request.json()?;
	let score = data.validate()?;

	if Review::exists_for_author(&state.pool, title.id, author.id).await? {
		return Err(ApiError::Validation(FieldErrors::single(
			"title",
			"You have already reviewed this title.",
		)));
	}

	let review = Review::create(&state.pool, title.id, author.id, &data.text, score)
		.await
		.map_err(crate::db::map_unique_violation("title"))?;
	Ok(Response::created_json(
		&ReviewOut::build(&state.pool, &review).await?,
	))
}

/// `GET /api/v1/titles/{title_id}/reviews/{review_id}/`
pub async fn retrieve_review(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	let review = find_review(&state, &request).await?;
	Ok(Response::ok_json(
		&ReviewOut::build(&state.pool, &review).await?,
	))
}

/// `PATCH /api/v1/titles/{title_id}/reviews/{review_id}/`
pub async fn update_review(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	let mut review = find_review(&state, &request).await?;
	IsAuthorOrModeratorOrAdmin
		.check_object(&PermissionContext::from_request(&request), review.author_id)
		.require()?;

	// Partial update: absent fields keep their stored values.
	let data: ReviewData = request.json()?;
	let patched = ReviewData {
		text: if data.text.is_empty() {
			review.text.clone()
		} else {
			data.text
		},
		score: data.score.or(Some(review.score)),
	};
	review.score = patched.validate()?;
	review.text = patched.text;
	let review = review.save(&state.pool).await?;
	Ok(Response::ok_json(
		&ReviewOut::build(&state.pool, &review).await?,
	))
}

/// `DELETE /api/v1/titles/{title_id}/reviews/{review_id}/`
pub async fn delete_review(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	let review = find_review(&state, &request).await?;
	IsAuthorOrModeratorOrAdmin
		.check_object(&PermissionContext::from_request(&request), review.author_id)
		.require()?;
	review.delete(&state.pool).await?;
	Ok(Response::no_content())
}

/// `GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/`
pub async fn list_comments(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	let review = find_review(&state, &request).await?;
	let page = PageParams::from_request(&request, &state.settings)?;
	let (comments, count) = Comment::list(&state.pool, review.id, page).await?;
	let mut results = Vec::with_capacity(comments.len());
	for comment in &comments {
		results.push(CommentOut::build(&state.pool, comment).await?);
	}
	Ok(Response::ok_json(&Paginated::new(
		results,
		count,
		page,
		request.uri.path(),
	)))
}

/// `POST /api/v1/titles/{title_id}/reviews/{review_id}/comments/`
pub async fn create_comment(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	IsAuthenticated
		.check(&PermissionContext::from_request(&request))
		.require()?;
	let review = find_review(&state, &request).await?;
	let author = request.require_user()?;

	let data: CommentData = request.json()?;
	data.validate()?;

	let comment = Comment::create(&state.pool, review.id, author.id, &data.text).await?;
	Ok(Response::created_json(
		&CommentOut::build(&state.pool, &comment).await?,
	))
}

/// `GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/`
pub async fn retrieve_comment(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	let comment = find_comment(&state, &request).await?;
	Ok(Response::ok_json(
		&CommentOut::build(&state.pool, &comment).await?,
	))
}

/// `PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/`
pub async fn update_comment(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	let mut comment = find_comment(&state, &request).await?;
	IsAuthorOrModeratorOrAdmin
		.check_object(&PermissionContext::from_request(&request), comment.author_id)
		.require()?;

	let data: CommentData = request.json()?;
	data.validate()?;
	comment.text = data.text;
	let comment = comment.save(&state.pool).await?;
	Ok(Response::ok_json(
		&CommentOut::build(&state.pool, &comment).await?,
	))
}

/// `DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/`
pub async fn delete_comment(state: Arc<AppState>, request: Request) -> ApiResult<Response> {
	let comment = find_comment(&state, &request).await?;
	IsAuthorOrModeratorOrAdmin
		.check_object(&PermissionContext::from_request(&request), comment.author_id)
		.require()?;
	comment.delete(&state.pool).await?;
	Ok(Response::no_content())
}

async fn find_title(state: &AppState, request: &Request) -> ApiResult<Title> {
	let title_id = request.id_param("title_id")?;
	Title::find_by_id(&state.pool, title_id)
		.await?
		.ok_or(ApiError::NotFound)
}

async fn find_review(state: &AppState, request: &Request) -> ApiResult<Review> {
	let title = find_title(state, request).await?;
	let review_id = request.id_param("review_id")?;
	Review::find_in_title(&state.pool, title.id, review_id)
		.await?
		.ok_or(ApiError::NotFound)
}

async fn find_comment(state: &AppState, request: &Request) -> ApiResult<Comment> {
	let review = find_review(state, request).await?;
	let comment_id = request.id_param("comment_id")?;
	Comment::find_in_review(&state.pool, review.id, comment_id)
		.await?
		.ok_or(ApiError::NotFound)
}
