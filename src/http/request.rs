use std::collections::HashMap;

use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri, Version, header};
use serde::de::DeserializeOwned;

use crate::apps::users::models::User;
use crate::exceptions::{ApiError, ApiResult, FieldErrors};

/// HTTP request representation handed to views.
///
/// Wraps the raw hyper parts with the pieces the application layer needs:
/// path parameters captured by the router and the authenticated user
/// resolved from the `Authorization` header, if any.
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Named captures from the matched route pattern.
	pub path_params: HashMap<String, String>,
	/// Actor resolved by bearer-token authentication; `None` for
	/// anonymous requests.
	pub user: Option<User>,
}

impl Request {
	pub fn new(
		method: Method,
		uri: Uri,
		version: Version,
		headers: HeaderMap,
		body: Bytes,
	) -> Self {
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: HashMap::new(),
			user: None,
		}
	}

	/// Named path parameter captured by the router.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}

	/// Path parameter parsed as an integer id, or 404 when malformed.
	///
	/// A non-numeric id can never reference an existing row, so it is
	/// treated the same as a missing one.
	pub fn id_param(&self, name: &str) -> ApiResult<i64> {
		self.param(name)
			.and_then(|raw| raw.parse().ok())
			.ok_or(ApiError::NotFound)
	}

	/// Deserialize the JSON body. An empty body is treated as `{}` so
	/// that fully-optional payloads (e.g. partial updates) parse.
	pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
		let bytes: &[u8] = if self.body.is_empty() {
			b"{}"
		} else {
			&self.body
		};
		serde_json::from_slice(bytes).map_err(|err| {
			ApiError::Validation(FieldErrors::single(
				"non_field_errors",
				format!("Invalid JSON body: {err}"),
			))
		})
	}

	/// Deserialize the query string.
	pub fn query<T: DeserializeOwned + Default>(&self) -> ApiResult<T> {
		match self.uri.query() {
			None => Ok(T::default()),
			Some(raw) => serde_urlencoded::from_str(raw).map_err(|err| {
				ApiError::Validation(FieldErrors::single(
					"non_field_errors",
					format!("Invalid query string: {err}"),
				))
			}),
		}
	}

	/// Raw value of a single query parameter.
	pub fn query_param(&self, name: &str) -> Option<String> {
		let raw = self.uri.query()?;
		serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
			.ok()?
			.into_iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value)
	}

	/// Token from an `Authorization: Bearer <token>` header.
	pub fn bearer_token(&self) -> Option<&str> {
		self.headers
			.get(header::AUTHORIZATION)?
			.to_str()
			.ok()?
			.strip_prefix("Bearer ")
			.map(str::trim)
	}

	/// True for methods that cannot mutate state (GET/HEAD/OPTIONS).
	pub fn is_read_only(&self) -> bool {
		matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS)
	}

	/// The authenticated actor, or `NotAuthenticated` for anonymous
	/// requests. Views use this after the access policy has admitted the
	/// request, so the error path is a safety net rather than the
	/// expected flow.
	pub fn require_user(&self) -> ApiResult<&User> {
		self.user.as_ref().ok_or(ApiError::NotAuthenticated)
	}
}
