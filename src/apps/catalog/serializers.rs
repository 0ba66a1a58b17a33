//! Input validation and output shapes for the catalog app.

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::models::{Category, Genre, Title};
use crate::exceptions::{ApiResult, FieldErrors};

pub const NAME_MAX_LENGTH: usize = 256;
pub const SLUG_MAX_LENGTH: usize = 50;

static SLUG_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug pattern"));

/// Create payload shared by categories and genres.
#[derive(Debug, Deserialize)]
pub struct LabelData {
	#[serde(default)]
	pub name: String,
	#[serde(default)]
	pub slug: String,
}

impl LabelData {
	pub fn validate(&self) -> ApiResult<()> {
		let mut errors = FieldErrors::new();
		if self.name.is_empty() {
			errors.add("name", "This field may not be blank.");
		} else if self.name.len() > NAME_MAX_LENGTH {
			errors.add(
				"name",
				format!("Ensure this field has no more than {NAME_MAX_LENGTH} characters."),
			);
		}
		if self.slug.is_empty() {
			errors.add("slug", "This field may not be blank.");
		} else {
			if self.slug.len() > SLUG_MAX_LENGTH {
				errors.add(
					"slug",
					format!("Ensure this field has no more than {SLUG_MAX_LENGTH} characters."),
				);
			}
			if !SLUG_RE.is_match(&self.slug) {
				errors.add(
					"slug",
					"Enter a valid slug: letters, digits, hyphens and underscores only.",
				);
			}
		}
		errors.into_result()
	}
}

#[derive(Debug, Serialize)]
pub struct LabelOut {
	pub name: String,
	pub slug: String,
}

impl From<&Category> for LabelOut {
	fn from(category: &Category) -> Self {
		Self {
			name: category.name.clone(),
			slug: category.slug.clone(),
		}
	}
}

impl From<&Genre> for LabelOut {
	fn from(genre: &Genre) -> Self {
		Self {
			name: genre.name.clone(),
			slug: genre.slug.clone(),
		}
	}
}

/// Title create/update payload. Category and genres are referenced by
/// slug, the external key for both.
#[derive(Debug, Deserialize)]
pub struct TitleData {
	#[serde(default)]
	pub name: String,
	pub year: Option<i32>,
	pub category: Option<String>,
	pub genre: Option<Vec<String>>,
}

/// Resolved references after validation.
pub struct ValidatedTitle {
	pub name: String,
	pub year: i32,
	pub category_id: Option<i64>,
	pub genre_ids: Option<Vec<i64>>,
}

impl TitleData {
	pub async fn validate(&self, pool: &SqlitePool) -> ApiResult<ValidatedTitle> {
		let mut errors = FieldErrors::new();

		if self.name.is_empty() {
			errors.add("name", "This field may not be blank.");
		} else if self.name.len() > NAME_MAX_LENGTH {
			errors.add(
				"name",
				format!("Ensure this field has no more than {NAME_MAX_LENGTH} characters."),
			);
		}

		let current_year = Utc::now().year();
		let year = match self.year {
			None => {
				errors.add("year", "This field is required.");
				0
			}
			Some(year) if year > current_year => {
				errors.add(
					"year",
					format!("Release year must not exceed {current_year}."),
				);
				year
			}
			Some(year) => year,
		};

		let category_id = match &self.category {
			None => None,
			Some(slug) => match Category::find_by_slug(pool, slug).await? {
				Some(category) => Some(category.id),
				None => {
					errors.add("category", format!("Unknown category slug \"{slug}\"."));
					None
				}
			},
		};

		let genre_ids = match &self.genre {
			None => None,
			Some(slugs) => {
				let mut ids = Vec::with_capacity(slugs.len());
				for slug in slugs {
					match Genre::find_by_slug(pool, slug).await? {
						Some(genre) => ids.push(genre.id),
						None => errors.add("genre", format!("Unknown genre slug \"{slug}\".")),
					}
				}
				Some(ids)
			}
		};

		errors.into_result()?;
		Ok(ValidatedTitle {
			name: self.name.clone(),
			year,
			category_id,
			genre_ids,
		})
	}
}

#[derive(Debug, Serialize)]
pub struct TitleOut {
	pub id: i64,
	pub name: String,
	pub year: i32,
	/// Mean review score; `null` when the title has no reviews.
	pub rating: Option<f64>,
	pub category: Option<LabelOut>,
	pub genre: Vec<LabelOut>,
}

impl TitleOut {
	/// Assemble the full representation, resolving the derived rating
	/// and the category/genre associations.
	pub async fn build(pool: &SqlitePool, title: &Title) -> ApiResult<Self> {
		let rating = title.rating(pool).await?;
		let category = title.category(pool).await?.as_ref().map(LabelOut::from);
		let genre = title
			.genres(pool)
			.await?
			.iter()
			.map(LabelOut::from)
			.collect();
		Ok(Self {
			id: title.id,
			name: title.name.clone(),
			year: title.year,
			rating,
			category,
			genre,
		})
	}
}
