//! Access-policy predicates.
//!
//! Each predicate evaluates a [`PermissionContext`] (request method plus
//! the resolved actor) and returns an explicit [`Access`] decision with a
//! reason code on denial. Collection-level checks run before a resource
//! is fetched; object-level checks run once the instance is identified.
//! The predicates are pure functions of their inputs and touch no I/O.

use hyper::Method;

use crate::apps::users::models::User;
use crate::exceptions::{ApiError, ApiResult};
use crate::http::Request;

/// Why a predicate denied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
	NotAuthenticated,
	AdminRequired,
	NotOwner,
}

/// An allow/deny decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
	Allow,
	Deny(DenyReason),
}

impl Access {
	/// Convert a denial into the authorization error views propagate.
	pub fn require(self) -> ApiResult<()> {
		match self {
			Access::Allow => Ok(()),
			Access::Deny(reason) => Err(ApiError::PermissionDenied(reason)),
		}
	}
}

/// Inputs a predicate may consult.
pub struct PermissionContext<'a> {
	pub method: &'a Method,
	pub user: Option<&'a User>,
}

impl<'a> PermissionContext<'a> {
	pub fn from_request(request: &'a Request) -> Self {
		Self {
			method: &request.method,
			user: request.user.as_ref(),
		}
	}

	fn is_read_only(&self) -> bool {
		matches!(*self.method, Method::GET | Method::HEAD | Method::OPTIONS)
	}
}

pub trait Permission {
	/// Collection-level check, evaluated before any object is fetched.
	fn check(&self, context: &PermissionContext<'_>) -> Access;

	/// Object-level check, evaluated once a specific resource is
	/// identified. `author_id` is the owning user of that resource.
	/// Defaults to the collection-level decision.
	fn check_object(&self, context: &PermissionContext<'_>, _author_id: i64) -> Access {
		self.check(context)
	}
}

/// Admit every request (signup and token endpoints).
pub struct AllowAny;

impl Permission for AllowAny {
	fn check(&self, _context: &PermissionContext<'_>) -> Access {
		Access::Allow
	}
}

/// Require an authenticated actor.
pub struct IsAuthenticated;

impl Permission for IsAuthenticated {
	fn check(&self, context: &PermissionContext<'_>) -> Access {
		if context.user.is_some() {
			Access::Allow
		} else {
			Access::Deny(DenyReason::NotAuthenticated)
		}
	}
}

/// Require admin capability (admin role or the superuser flag).
pub struct IsAdminOrSuperuser;

impl Permission for IsAdminOrSuperuser {
	fn check(&self, context: &PermissionContext<'_>) -> Access {
		match context.user {
			None => Access::Deny(DenyReason::NotAuthenticated),
			Some(user) if user.is_admin() => Access::Allow,
			Some(_) => Access::Deny(DenyReason::AdminRequired),
		}
	}
}

/// Reads for anyone; mutations only for admin capability.
pub struct IsAdminOrReadOnly;

impl Permission for IsAdminOrReadOnly {
	fn check(&self, context: &PermissionContext<'_>) -> Access {
		if context.is_read_only() {
			return Access::Allow;
		}
		IsAdminOrSuperuser.check(context)
	}
}

/// Object-level rule for reviews and comments: reads for anyone,
/// creation for any authenticated actor, and mutation of an instance
/// only for its author, a moderator, or an admin.
pub struct IsAuthorOrModeratorOrAdmin;

impl Permission for IsAuthorOrModeratorOrAdmin {
	fn check(&self, context: &PermissionContext<'_>) -> Access {
		if context.is_read_only() {
			return Access::Allow;
		}
		IsAuthenticated.check(context)
	}

	fn check_object(&self, context: &PermissionContext<'_>, author_id: i64) -> Access {
		if context.is_read_only() {
			return Access::Allow;
		}
		match context.user {
			None => Access::Deny(DenyReason::NotAuthenticated),
			Some(user) if user.id == author_id || user.is_moderator() || user.is_admin() => {
				Access::Allow
			}
			Some(_) => Access::Deny(DenyReason::NotOwner),
		}
	}
}
