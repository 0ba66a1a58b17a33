//! Role and access-policy behavior across the API surface.

mod common;

use common::TestApp;
use critique::apps::users::models::Role;
use hyper::StatusCode;
use serde_json::json;

#[tokio::test]
async fn user_management_requires_admin() {
	let app = TestApp::spawn().await;
	let user_token = app.obtain_token("alice", "alice@example.com").await;
	let moderator_token = app
		.obtain_token_with_role("mia", "mia@example.com", Role::Moderator)
		.await;

	let (status, _) = app.get("/api/v1/users/", None).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, _) = app.get("/api/v1/users/", Some(&user_token)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	// Moderator privileges do not extend to user management.
	let (status, _) = app.get("/api/v1/users/", Some(&moderator_token)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_role_and_superuser_flag_both_grant_admin() {
	let app = TestApp::spawn().await;
	let admin_token = app
		.obtain_token_with_role("root", "root@example.com", Role::Admin)
		.await;
	let super_token = app.obtain_token("suzy", "suzy@example.com").await;
	app.set_superuser("suzy").await;

	for token in [&admin_token, &super_token] {
		let (status, body) = app.get("/api/v1/users/", Some(token)).await;
		assert_eq!(status, StatusCode::OK);
		assert!(body["count"].as_i64().unwrap() >= 2);
	}
}

#[tokio::test]
async fn superuser_with_demoted_role_keeps_admin_capability() {
	let app = TestApp::spawn().await;
	let token = app.obtain_token("suzy", "suzy@example.com").await;
	app.set_superuser("suzy").await;
	app.set_role("suzy", Role::User).await;

	let (status, _) = app.get("/api/v1/users/", Some(&token)).await;
	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_can_manage_users() {
	let app = TestApp::spawn().await;
	let admin_token = app
		.obtain_token_with_role("root", "root@example.com", Role::Admin)
		.await;

	let (status, body) = app
		.post(
			"/api/v1/users/",
			Some(&admin_token),
			&json!({
				"username": "bob",
				"email": "bob@example.com",
				"role": "moderator",
				"bio": "reads a lot"
			}),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(body["role"], "moderator");

	let (status, body) = app.get("/api/v1/users/bob/", Some(&admin_token)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["bio"], "reads a lot");

	let (status, body) = app
		.patch(
			"/api/v1/users/bob/",
			Some(&admin_token),
			&json!({"role": "admin"}),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["role"], "admin");

	let (status, _) = app.delete("/api/v1/users/bob/", Some(&admin_token)).await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = app.get("/api/v1/users/bob/", Some(&admin_token)).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn me_patch_preserves_stored_role() {
	let app = TestApp::spawn().await;
	let token = app.obtain_token("alice", "alice@example.com").await;

	let (status, body) = app
		.patch(
			"/api/v1/users/me/",
			Some(&token),
			&json!({"role": "admin", "bio": "trying my luck"}),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["role"], "user");
	assert_eq!(body["bio"], "trying my luck");

	// The escalation attempt did not stick.
	let (status, _) = app.get("/api/v1/users/", Some(&token)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn catalog_writes_are_admin_only_but_reads_are_open() {
	let app = TestApp::spawn().await;
	let user_token = app.obtain_token("alice", "alice@example.com").await;
	let admin_token = app
		.obtain_token_with_role("root", "root@example.com", Role::Admin)
		.await;

	let payload = json!({"name": "Books", "slug": "books"});
	let (status, _) = app.post("/api/v1/categories/", None, &payload).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	let (status, _) = app
		.post("/api/v1/categories/", Some(&user_token), &payload)
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	let (status, _) = app
		.post("/api/v1/categories/", Some(&admin_token), &payload)
		.await;
	assert_eq!(status, StatusCode::CREATED);

	// Anonymous reads pass.
	let (status, body) = app.get("/api/v1/categories/", None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn review_editing_rights_follow_author_moderator_admin() {
	let app = TestApp::spawn().await;
	let admin_token = app
		.obtain_token_with_role("root", "root@example.com", Role::Admin)
		.await;
	let author_token = app.obtain_token("alice", "alice@example.com").await;
	let other_token = app.obtain_token("bob", "bob@example.com").await;
	let moderator_token = app
		.obtain_token_with_role("mia", "mia@example.com", Role::Moderator)
		.await;

	let (_, title) = app
		.post(
			"/api/v1/titles/",
			Some(&admin_token),
			&json!({"name": "Dune", "year": 1965}),
		)
		.await;
	let title_id = title["id"].as_i64().unwrap();

	let (status, review) = app
		.post(
			&format!("/api/v1/titles/{title_id}/reviews/"),
			Some(&author_token),
			&json!({"text": "A classic.", "score": 9}),
		)
		.await;
	assert_eq!(status, StatusCode::CREATED);
	let review_path = format!(
		"/api/v1/titles/{title_id}/reviews/{}/",
		review["id"].as_i64().unwrap()
	);

	// A stranger cannot edit or delete it.
	let (status, _) = app
		.patch(&review_path, Some(&other_token), &json!({"score": 1}))
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	let (status, _) = app.delete(&review_path, Some(&other_token)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	// The author can edit.
	let (status, body) = app
		.patch(&review_path, Some(&author_token), &json!({"score": 10}))
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["score"], 10);

	// So can a moderator, and an admin can delete.
	let (status, _) = app
		.patch(
			&review_path,
			Some(&moderator_token),
			&json!({"text": "Toned down."}),
		)
		.await;
	assert_eq!(status, StatusCode::OK);
	let (status, _) = app.delete(&review_path, Some(&admin_token)).await;
	assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn anonymous_cannot_post_reviews_or_comments() {
	let app = TestApp::spawn().await;
	let admin_token = app
		.obtain_token_with_role("root", "root@example.com", Role::Admin)
		.await;
	let (_, title) = app
		.post(
			"/api/v1/titles/",
			Some(&admin_token),
			&json!({"name": "Dune", "year": 1965}),
		)
		.await;
	let title_id = title["id"].as_i64().unwrap();

	let (status, _) = app
		.post(
			&format!("/api/v1/titles/{title_id}/reviews/"),
			None,
			&json!({"text": "Anon.", "score": 5}),
		)
		.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleted_account_token_stops_working() {
	let app = TestApp::spawn().await;
	let admin_token = app
		.obtain_token_with_role("root", "root@example.com", Role::Admin)
		.await;
	let token = app.obtain_token("alice", "alice@example.com").await;

	let (status, _) = app.delete("/api/v1/users/alice/", Some(&admin_token)).await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = app.get("/api/v1/users/me/", Some(&token)).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
}
