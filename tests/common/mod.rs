#![allow(dead_code)]

//! In-process test harness: an application wired to an in-memory
//! database and a memory mail backend, driven through the router.

use std::sync::Arc;

use bytes::Bytes;
use hyper::{HeaderMap, Method, StatusCode, Version, header};
use serde_json::{Value, json};

use critique::apps::users::models::Role;
use critique::config::Settings;
use critique::config::urls::build_router;
use critique::http::Request;
use critique::mail::MemoryBackend;
use critique::routing::Router;
use critique::state::AppState;

pub struct TestApp {
	pub state: Arc<AppState>,
	pub router: Router,
	pub mailer: Arc<MemoryBackend>,
}

impl TestApp {
	pub async fn spawn() -> Self {
		let settings = Settings::for_tests();
		let pool = critique::db::connect(&settings.database_url)
			.await
			.expect("in-memory database");
		let mailer = Arc::new(MemoryBackend::new());
		let state = Arc::new(AppState::with_parts(settings, pool, mailer.clone()));
		let router = build_router(state.clone());
		Self {
			state,
			router,
			mailer,
		}
	}

	pub async fn request(
		&self,
		method: Method,
		path: &str,
		token: Option<&str>,
		body: Option<&Value>,
	) -> (StatusCode, Value) {
		let mut headers = HeaderMap::new();
		if let Some(token) = token {
			headers.insert(
				header::AUTHORIZATION,
				format!("Bearer {token}").parse().expect("header value"),
			);
		}
		let body = body
			.map(|value| Bytes::from(value.to_string()))
			.unwrap_or_default();
		let request = Request::new(
			method,
			path.parse().expect("test uri"),
			Version::HTTP_11,
			headers,
			body,
		);
		let response = self.router.dispatch(request).await;
		let parsed = if response.body.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&response.body).expect("json response body")
		};
		(response.status, parsed)
	}

	pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
		self.request(Method::GET, path, token, None).await
	}

	pub async fn post(
		&self,
		path: &str,
		token: Option<&str>,
		body: &Value,
	) -> (StatusCode, Value) {
		self.request(Method::POST, path, token, Some(body)).await
	}

	pub async fn patch(
		&self,
		path: &str,
		token: Option<&str>,
		body: &Value,
	) -> (StatusCode, Value) {
		self.request(Method::PATCH, path, token, Some(body)).await
	}

	pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
		self.request(Method::DELETE, path, token, None).await
	}

	/// Run the full signup flow and return a bearer token.
	pub async fn obtain_token(&self, username: &str, email: &str) -> String {
		let (status, _) = self
			.post(
				"/api/v1/auth/signup/",
				None,
				&json!({"username": username, "email": email}),
			)
			.await;
		assert_eq!(status, StatusCode::OK, "signup for {username}");

		let code = self.last_confirmation_code().await;
		let (status, body) = self
			.post(
				"/api/v1/auth/token/",
				None,
				&json!({"username": username, "confirmation_code": code}),
			)
			.await;
		assert_eq!(status, StatusCode::OK, "token exchange for {username}");
		body["token"].as_str().expect("token in body").to_string()
	}

	pub async fn last_confirmation_code(&self) -> String {
		let sent = self.mailer.sent_messages().await;
		let body = &sent.last().expect("a confirmation email was sent").body;
		body.rsplit(": ")
			.next()
			.expect("code after colon")
			.trim()
			.to_string()
	}

	/// Assign a role directly in the database. The API offers no
	/// bootstrap path for the first admin, mirroring command-line user
	/// promotion in a deployment.
	pub async fn set_role(&self, username: &str, role: Role) {
		sqlx::query("UPDATE users SET role = ? WHERE username = ?")
			.bind(role)
			.bind(username)
			.execute(&self.state.pool)
			.await
			.expect("role update");
	}

	pub async fn set_superuser(&self, username: &str) {
		sqlx::query("UPDATE users SET is_superuser = 1 WHERE username = ?")
			.bind(username)
			.execute(&self.state.pool)
			.await
			.expect("superuser update");
	}

	/// Signup plus promotion in one step.
	pub async fn obtain_token_with_role(
		&self,
		username: &str,
		email: &str,
		role: Role,
	) -> String {
		let token = self.obtain_token(username, email).await;
		self.set_role(username, role).await;
		token
	}
}
