use bytes::Bytes;
use hyper::{HeaderMap, StatusCode, header};
use serde::Serialize;

/// HTTP response representation returned by views.
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	pub fn method_not_allowed() -> Self {
		Self::json_value(
			StatusCode::METHOD_NOT_ALLOWED,
			&serde_json::json!({"detail": "Method not allowed."}),
		)
	}

	/// Serialize `data` as the JSON body with the given status.
	///
	/// # Examples
	///
	/// ```
	/// use critique::http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::json(StatusCode::OK, &serde_json::json!({"ok": true}));
	/// assert_eq!(response.status, StatusCode::OK);
	/// ```
	pub fn json<T: Serialize>(status: StatusCode, data: &T) -> Self {
		// Serialization of our own output types cannot fail; fall back to
		// an empty object rather than panicking mid-request.
		let body = serde_json::to_vec(data).unwrap_or_else(|_| b"{}".to_vec());
		let mut response = Self::new(status);
		response.headers.insert(
			header::CONTENT_TYPE,
			header::HeaderValue::from_static("application/json"),
		);
		response.body = Bytes::from(body);
		response
	}

	pub fn json_value(status: StatusCode, value: &serde_json::Value) -> Self {
		Self::json(status, value)
	}

	pub fn ok_json<T: Serialize>(data: &T) -> Self {
		Self::json(StatusCode::OK, data)
	}

	pub fn created_json<T: Serialize>(data: &T) -> Self {
		Self::json(StatusCode::CREATED, data)
	}
}
