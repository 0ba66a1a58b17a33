//! Limit/offset pagination for list endpoints.
//!
//! Responses carry the DRF-conventional envelope:
//! `{count, next, previous, results}` with absolute-path links.

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::exceptions::{ApiResult, FieldErrors};
use crate::http::Request;

#[derive(Debug, Clone, Copy)]
pub struct PageParams {
	pub limit: i64,
	pub offset: i64,
}

impl PageParams {
	/// Parse `limit`/`offset` query parameters, clamping to the
	/// configured bounds.
	pub fn from_request(request: &Request, settings: &Settings) -> ApiResult<Self> {
		#[derive(Default, Deserialize)]
		struct RawParams {
			limit: Option<String>,
			offset: Option<String>,
		}

		let raw: RawParams = request.query()?;
		let limit = parse_non_negative("limit", raw.limit)?.unwrap_or(settings.default_page_limit);
		let offset = parse_non_negative("offset", raw.offset)?.unwrap_or(0);
		Ok(Self {
			limit: limit.min(settings.max_page_limit).max(1),
			offset,
		})
	}
}

fn parse_non_negative(field: &str, raw: Option<String>) -> ApiResult<Option<i64>> {
	match raw {
		None => Ok(None),
		Some(value) => match value.parse::<i64>() {
			Ok(parsed) if parsed >= 0 => Ok(Some(parsed)),
			_ => Err(crate::exceptions::ApiError::Validation(FieldErrors::single(
				field,
				"must be a non-negative integer",
			))),
		},
	}
}

/// Paginated response envelope.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
	pub count: i64,
	pub next: Option<String>,
	pub previous: Option<String>,
	pub results: Vec<T>,
}

impl<T> Paginated<T> {
	/// Wrap a page of `results` knowing the total `count` and the
	/// request path used for the navigation links.
	pub fn new(results: Vec<T>, count: i64, params: PageParams, path: &str) -> Self {
		let next = if params.offset + params.limit < count {
			Some(format!(
				"{path}?limit={}&offset={}",
				params.limit,
				params.offset + params.limit
			))
		} else {
			None
		};
		let previous = if params.offset > 0 {
			let prev_offset = (params.offset - params.limit).max(0);
			Some(format!("{path}?limit={}&offset={prev_offset}", params.limit))
		} else {
			None
		};
		Self {
			count,
			next,
			previous,
			results,
		}
	}
}
