//! Request-level error taxonomy.
//!
//! Every failure a view can produce maps onto one of these variants, and
//! each variant renders as a structured JSON body with a fixed status
//! code. Errors are synchronous and local to the request; nothing is
//! queued or retried.

use std::collections::BTreeMap;

use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::auth::permissions::DenyReason;
use crate::http::Response;

pub type ApiResult<T> = Result<T, ApiError>;

/// Field-keyed validation messages, rendered as `{"field": ["msg", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Single-field shorthand.
	///
	/// # Examples
	///
	/// ```
	/// use critique::exceptions::FieldErrors;
	///
	/// let errors = FieldErrors::single("year", "must not be in the future");
	/// assert!(!errors.is_empty());
	/// ```
	pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
		let mut errors = Self::new();
		errors.add(field, message);
		errors
	}

	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.entry(field.into()).or_default().push(message.into());
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns `Err(ApiError::Validation)` if any message was collected.
	pub fn into_result(self) -> ApiResult<()> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(ApiError::Validation(self))
		}
	}

	fn to_json(&self) -> serde_json::Value {
		json!(self.0)
	}
}

#[derive(Debug, Error)]
pub enum ApiError {
	/// Malformed or out-of-range input. Renders field-level detail.
	#[error("validation failed")]
	Validation(FieldErrors),

	/// No credentials were supplied on a request that requires them.
	#[error("authentication required")]
	NotAuthenticated,

	/// Credentials were supplied but could not be verified.
	#[error("authentication failed: {0}")]
	AuthenticationFailed(String),

	/// An access-policy predicate denied the request.
	#[error("permission denied ({0:?})")]
	PermissionDenied(DenyReason),

	/// Referenced resource does not exist.
	#[error("not found")]
	NotFound,

	/// Outbound confirmation email could not be delivered. Fatal for the
	/// signup request; no retry.
	#[error("email delivery failed: {0}")]
	Delivery(String),

	#[error("database error")]
	Database(#[from] sqlx::Error),
}

impl ApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::Validation(_) => StatusCode::BAD_REQUEST,
			ApiError::NotAuthenticated | ApiError::AuthenticationFailed(_) => {
				StatusCode::UNAUTHORIZED
			}
			ApiError::PermissionDenied(DenyReason::NotAuthenticated) => StatusCode::UNAUTHORIZED,
			ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
			ApiError::NotFound => StatusCode::NOT_FOUND,
			ApiError::Delivery(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Render the error as the response the client sees. Server-side
	/// failures are logged here and surface an opaque detail message.
	pub fn into_response(self) -> Response {
		let status = self.status();
		let body = match &self {
			ApiError::Validation(fields) => fields.to_json(),
			ApiError::NotAuthenticated => {
				json!({"detail": "Authentication credentials were not provided."})
			}
			ApiError::AuthenticationFailed(reason) => json!({"detail": reason}),
			ApiError::PermissionDenied(_) => {
				json!({"detail": "You do not have permission to perform this action."})
			}
			ApiError::NotFound => json!({"detail": "Not found."}),
			ApiError::Delivery(reason) => {
				tracing::error!(%reason, "confirmation email delivery failed");
				json!({"detail": "Internal server error."})
			}
			ApiError::Database(err) => {
				tracing::error!(error = %err, "database error while handling request");
				json!({"detail": "Internal server error."})
			}
		};
		Response::json_value(status, &body)
	}
}
