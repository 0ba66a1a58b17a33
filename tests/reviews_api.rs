//! Reviews and comments over HTTP, including the derived rating.

mod common;

use common::TestApp;
use critique::apps::users::models::Role;
use hyper::StatusCode;
use serde_json::{Value, json};

async fn setup_title(app: &TestApp) -> i64 {
	let token = app
		.obtain_token_with_role("root", "root@example.com", Role::Admin)
		.await;
	let (status, title) = app
		.post(
			"/api/v1/titles/",
			Some(&token),
			&json!({"name": "Dune", "year": 1965}),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);
	title["id"].as_i64().unwrap()
}

async fn post_review(app: &TestApp, title_id: i64, token: &str, body: &Value) -> (StatusCode, Value) {
	app.post(
		&format!("/api/v1/titles/{title_id}/reviews/"),
		Some(token),
		body,
	)
	.await
}

#[tokio::test]
async fn review_lifecycle() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;
	let token = app.obtain_token("alice", "alice@example.com").await;

	let (status, review) = post_review(
		&app,
		title_id,
		&token,
		&json!({"text": "A classic.", "score": 9}),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(review["author"], "alice");
	assert_eq!(review["score"], 9);
	assert!(review["pub_date"].is_string());
	let path = format!(
		"/api/v1/titles/{title_id}/reviews/{}/",
		review["id"].as_i64().unwrap()
	);

	let (status, fetched) = app.get(&path, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(fetched["text"], "A classic.");

	let (status, patched) = app
		.patch(&path, Some(&token), &json!({"text": "Still a classic."}))
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(patched["text"], "Still a classic.");
	assert_eq!(patched["score"], 9);

	let (status, _) = app.delete(&path, Some(&token)).await;
	assert_eq!(status, StatusCode::NO_CONTENT);
	let (status, _) = app.get(&path, None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_review_for_same_title_is_rejected() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;
	let token = app.obtain_token("alice", "alice@example.com").await;

	let (status, _) =
		post_review(&app, title_id, &token, &json!({"text": "First.", "score": 8})).await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, body) =
		post_review(&app, title_id, &token, &json!({"text": "Second.", "score": 2})).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["title"].is_array());

	// The same user may still review a different title.
	let other_token = app
		.obtain_token_with_role("root2", "root2@example.com", Role::Admin)
		.await;
	let (_, other) = app
		.post(
			"/api/v1/titles/",
			Some(&other_token),
			&json!({"name": "Solaris", "year": 1961}),
		)
		.await;
	let (status, _) = post_review(
		&app,
		other["id"].as_i64().unwrap(),
		&token,
		&json!({"text": "Also good.", "score": 7}),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn rating_is_mean_of_scores() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;

	for (idx, score) in [4, 7, 10].iter().enumerate() {
		let username = format!("reader{idx}");
		let email = format!("reader{idx}@example.com");
		let token = app.obtain_token(&username, &email).await;
		let (status, _) =
			post_review(&app, title_id, &token, &json!({"text": "Read it.", "score": score}))
				.await;
		assert_eq!(status, StatusCode::CREATED);
	}

	let (status, body) = app.get(&format!("/api/v1/titles/{title_id}/"), None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["rating"], 7.0);
}

#[tokio::test]
async fn score_out_of_range_is_rejected() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;
	let token = app.obtain_token("alice", "alice@example.com").await;

	for score in [-1, 11] {
		let (status, body) =
			post_review(&app, title_id, &token, &json!({"text": "Bad.", "score": score})).await;
		assert_eq!(status, StatusCode::BAD_REQUEST, "{score}");
		assert!(body["score"].is_array());
	}
}

#[tokio::test]
async fn omitted_score_defaults_to_zero_and_drags_rating() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;
	let token = app.obtain_token("alice", "alice@example.com").await;

	let (status, review) =
		post_review(&app, title_id, &token, &json!({"text": "No score given."})).await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(review["score"], 0);

	let (_, body) = app.get(&format!("/api/v1/titles/{title_id}/"), None).await;
	assert_eq!(body["rating"], 0.0);
}

#[tokio::test]
async fn review_under_wrong_title_is_not_found() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;
	let token = app.obtain_token("alice", "alice@example.com").await;
	let (_, review) =
		post_review(&app, title_id, &token, &json!({"text": "Here.", "score": 5})).await;
	let review_id = review["id"].as_i64().unwrap();

	// Existing review id under a nonexistent title.
	let (status, _) = app
		.get(&format!("/api/v1/titles/999/reviews/{review_id}/"), None)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// Nonexistent review id under the right title.
	let (status, _) = app
		.get(&format!("/api/v1/titles/{title_id}/reviews/999/"), None)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// Posting to a nonexistent title is 404, not a validation error.
	let (status, _) = app
		.post(
			"/api/v1/titles/999/reviews/",
			Some(&token),
			&json!({"text": "Void.", "score": 5}),
		)
		.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_lifecycle() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;
	let author_token = app.obtain_token("alice", "alice@example.com").await;
	let commenter_token = app.obtain_token("bob", "bob@example.com").await;

	let (_, review) = post_review(
		&app,
		title_id,
		&author_token,
		&json!({"text": "A classic.", "score": 9}),
	)
	.await;
	let review_id = review["id"].as_i64().unwrap();
	let comments_path = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments/");

	let (status, comment) = app
		.post(&comments_path, Some(&commenter_token), &json!({"text": "Agreed."}))
		.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(comment["author"], "bob");
	let comment_path = format!("{comments_path}{}/", comment["id"].as_i64().unwrap());

	let (status, body) = app.get(&comments_path, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["count"], 1);

	// Only the comment author (or staff) may edit it.
	let (status, _) = app
		.patch(&comment_path, Some(&author_token), &json!({"text": "Hijack."}))
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	let (status, body) = app
		.patch(
			&comment_path,
			Some(&commenter_token),
			&json!({"text": "Fully agreed."}),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["text"], "Fully agreed.");

	let (status, _) = app.delete(&comment_path, Some(&commenter_token)).await;
	assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn deleting_review_removes_its_comments_from_the_tree() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;
	let token = app.obtain_token("alice", "alice@example.com").await;

	let (_, review) =
		post_review(&app, title_id, &token, &json!({"text": "Gone soon.", "score": 5})).await;
	let review_id = review["id"].as_i64().unwrap();
	let comments_path = format!("/api/v1/titles/{title_id}/reviews/{review_id}/comments/");
	app.post(&comments_path, Some(&token), &json!({"text": "Ephemeral."}))
		.await;

	let review_path = format!("/api/v1/titles/{title_id}/reviews/{review_id}/");
	let (status, _) = app.delete(&review_path, Some(&token)).await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = app.get(&comments_path, None).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	// The rating no longer reflects the deleted review.
	let (_, body) = app.get(&format!("/api/v1/titles/{title_id}/"), None).await;
	assert_eq!(body["rating"], json!(null));
}

#[tokio::test]
async fn blank_review_text_is_rejected() {
	let app = TestApp::spawn().await;
	let title_id = setup_title(&app).await;
	let token = app.obtain_token("alice", "alice@example.com").await;

	let (status, body) = post_review(&app, title_id, &token, &json!({"score": 5})).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["text"].is_array());
}
