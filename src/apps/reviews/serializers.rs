//! Input validation and output shapes for reviews and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::models::{Comment, Review};
use crate::exceptions::{ApiError, ApiResult, FieldErrors};

pub const SCORE_MIN: i64 = 0;
pub const SCORE_MAX: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct ReviewData {
	#[serde(default)]
	pub text: String,
	/// Omitted score falls back to the bottom of the scale.
	pub score: Option<i64>,
}

impl ReviewData {
	pub fn validate(&self) -> ApiResult<i64> {
		let mut errors = FieldErrors::new();
		if self.text.is_empty() {
			errors.add("text", "This field may not be blank.");
		}
		let score = self.score.unwrap_or(SCORE_MIN);
		if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
			errors.add(
				"score",
				format!("Score must be between {SCORE_MIN} and {SCORE_MAX}."),
			);
		}
		errors.into_result()?;
		Ok(score)
	}
}

#[derive(Debug, Deserialize)]
pub struct CommentData {
	#[serde(default)]
	pub text: String,
}

impl CommentData {
	pub fn validate(&self) -> ApiResult<()> {
		if self.text.is_empty() {
			return Err(ApiError::Validation(FieldErrors::single(
				"text",
				"This field may not be blank.",
			)));
		}
		Ok(())
	}
}

#[derive(Debug, Serialize)]
pub struct ReviewOut {
	pub id: i64,
	pub text: String,
	pub author: String,
	pub score: i64,
	pub pub_date: DateTime<Utc>,
}

impl ReviewOut {
	pub async fn build(pool: &SqlitePool, review: &Review) -> ApiResult<Self> {
		Ok(Self {
			id: review.id,
			text: review.text.clone(),
			author: author_username(pool, review.author_id).await?,
			score: review.score,
			pub_date: review.pub_date,
		})
	}
}

#[derive(Debug, Serialize)]
pub struct CommentOut {
	pub id: i64,
	pub text: String,
	pub author: String,
	pub pub_date: DateTime<Utc>,
}

impl CommentOut {
	pub async fn build(pool: &SqlitePool, comment: &Comment) -> ApiResult<Self> {
		Ok(Self {
			id: comment.id,
			text: comment.text.clone(),
			author: author_username(pool, comment.author_id).await?,
			pub_date: comment.pub_date,
		})
	}
}

async fn author_username(pool: &SqlitePool, author_id: i64) -> ApiResult<String> {
	let username = sqlx::query_scalar("SELECT username FROM users WHERE id = ?")
		.bind(author_id)
		.fetch_one(pool)
		.await?;
	Ok(username)
}
