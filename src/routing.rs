//! Regex-based URL routing.
//!
//! Routes are registered with Django-style patterns
//! (`/api/v1/titles/{title_id}/`); named segments become path parameters
//! on the request. The trailing slash is optional when matching.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::Method;
use regex::Regex;

use crate::auth::authentication;
use crate::exceptions::ApiResult;
use crate::http::{Request, Response};
use crate::state::AppState;

pub type ViewFuture = Pin<Box<dyn Future<Output = ApiResult<Response>> + Send>>;

/// A view is a plain async function adapted through a non-capturing
/// closure: `|state, req| Box::pin(my_view(state, req))`.
pub type ViewFn = fn(Arc<AppState>, Request) -> ViewFuture;

struct Route {
	method: Method,
	pattern: Regex,
	view: ViewFn,
}

pub struct Router {
	state: Arc<AppState>,
	routes: Vec<Route>,
}

impl Router {
	pub fn new(state: Arc<AppState>) -> Self {
		Self {
			state,
			routes: Vec::new(),
		}
	}

	/// Register a route. Panics on a malformed pattern, which is a
	/// programming error caught at startup.
	pub fn route(&mut self, method: Method, pattern: &str, view: ViewFn) -> &mut Self {
		let regex = compile_pattern(pattern)
			.unwrap_or_else(|err| panic!("invalid route pattern {pattern:?}: {err}"));
		self.routes.push(Route {
			method,
			pattern: regex,
			view,
		});
		self
	}

	/// Resolve and run the view for `request`.
	///
	/// Bearer authentication runs first so that every view sees the
	/// resolved actor; an unparseable or expired token is rejected here
	/// with 401 before any route logic. An unmatched path is 404, a
	/// matched path with the wrong method is 405.
	pub async fn dispatch(&self, mut request: Request) -> Response {
		match authentication::authenticate(&self.state, &request).await {
			Ok(user) => request.user = user,
			Err(err) => return err.into_response(),
		}

		let path = request.uri.path().to_string();
		let mut path_matched = false;
		for route in &self.routes {
			let Some(captures) = route.pattern.captures(&path) else {
				continue;
			};
			path_matched = true;
			if route.method != request.method {
				continue;
			}
			for name in route.pattern.capture_names().flatten() {
				if let Some(value) = captures.name(name) {
					request
						.path_params
						.insert(name.to_string(), value.as_str().to_string());
				}
			}
			return match (route.view)(self.state.clone(), request).await {
				Ok(response) => response,
				Err(err) => err.into_response(),
			};
		}

		if path_matched {
			Response::method_not_allowed()
		} else {
			crate::exceptions::ApiError::NotFound.into_response()
		}
	}
}

fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
	let mut regex = String::from("^");
	for segment in pattern.split('/') {
		if segment.is_empty() {
			continue;
		}
		regex.push('/');
		if let Some(name) = segment
			.strip_prefix('{')
			.and_then(|rest| rest.strip_suffix('}'))
		{
			regex.push_str(&format!("(?P<{name}>[^/]+)"));
		} else {
			regex.push_str(&regex::escape(segment));
		}
	}
	regex.push_str("/?$");
	Regex::new(&regex)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn literal_pattern_matches_with_and_without_trailing_slash() {
		let regex = compile_pattern("/api/v1/auth/signup/").unwrap();
		assert!(regex.is_match("/api/v1/auth/signup/"));
		assert!(regex.is_match("/api/v1/auth/signup"));
		assert!(!regex.is_match("/api/v1/auth/signup/extra"));
	}

	#[test]
	fn named_segments_capture_values() {
		let regex = compile_pattern("/api/v1/titles/{title_id}/reviews/{review_id}/").unwrap();
		let captures = regex.captures("/api/v1/titles/42/reviews/7/").unwrap();
		assert_eq!(&captures["title_id"], "42");
		assert_eq!(&captures["review_id"], "7");
	}

	#[test]
	fn named_segment_does_not_cross_slashes() {
		let regex = compile_pattern("/api/v1/users/{username}/").unwrap();
		assert!(regex.captures("/api/v1/users/alice/extra/").is_none());
	}
}
