//! Catalog models and queries.

use sqlx::SqlitePool;

use crate::pagination::PageParams;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
	pub id: i64,
	pub name: String,
	pub slug: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Genre {
	pub id: i64,
	pub name: String,
	pub slug: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Title {
	pub id: i64,
	pub name: String,
	pub year: i32,
	pub category_id: Option<i64>,
}

/// Shared queries for the two slug-keyed label tables. They are
/// structurally identical, so the table name is the only variable.
macro_rules! labeled_queries {
	($model:ident, $table:literal) => {
		impl $model {
			pub async fn find_by_slug(
				pool: &SqlitePool,
				slug: &str,
			) -> sqlx::Result<Option<$model>> {
				sqlx::query_as(concat!("SELECT * FROM ", $table, " WHERE slug = ?"))
					.bind(slug)
					.fetch_optional(pool)
					.await
			}

			pub async fn create(pool: &SqlitePool, name: &str, slug: &str) -> sqlx::Result<$model> {
				sqlx::query_as(concat!(
					"INSERT INTO ",
					$table,
					" (name, slug) VALUES (?, ?) RETURNING *"
				))
				.bind(name)
				.bind(slug)
				.fetch_one(pool)
				.await
			}

			pub async fn delete_by_slug(pool: &SqlitePool, slug: &str) -> sqlx::Result<bool> {
				let result = sqlx::query(concat!("DELETE FROM ", $table, " WHERE slug = ?"))
					.bind(slug)
					.execute(pool)
					.await?;
				Ok(result.rows_affected() > 0)
			}

			/// Name-ordered listing with optional substring search over
			/// name and slug.
			pub async fn list(
				pool: &SqlitePool,
				search: Option<&str>,
				page: PageParams,
			) -> sqlx::Result<(Vec<$model>, i64)> {
				match search.map(|term| format!("%{term}%")) {
					Some(pattern) => {
						let rows = sqlx::query_as(concat!(
							"SELECT * FROM ",
							$table,
							" WHERE name LIKE ? OR slug LIKE ? ORDER BY name LIMIT ? OFFSET ?"
						))
						.bind(&pattern)
						.bind(&pattern)
						.bind(page.limit)
						.bind(page.offset)
						.fetch_all(pool)
						.await?;
						let count = sqlx::query_scalar(concat!(
							"SELECT COUNT(*) FROM ",
							$table,
							" WHERE name LIKE ? OR slug LIKE ?"
						))
						.bind(&pattern)
						.bind(&pattern)
						.fetch_one(pool)
						.await?;
						Ok((rows, count))
					}
					None => {
						let rows = sqlx::query_as(concat!(
							"SELECT * FROM ",
							$table,
							" ORDER BY name LIMIT ? OFFSET ?"
						))
						.bind(page.limit)
						.bind(page.offset)
						.fetch_all(pool)
						.await?;
						let count =
							sqlx::query_scalar(concat!("SELECT COUNT(*) FROM ", $table))
								.fetch_one(pool)
								.await?;
						Ok((rows, count))
					}
				}
			}
		}
	};
}

labeled_queries!(Category, "categories");
labeled_queries!(Genre, "genres");

impl Title {
	pub async fn find_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Title>> {
		sqlx::query_as("SELECT * FROM titles WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await
	}

	pub async fn create(
		pool: &SqlitePool,
		name: &str,
		year: i32,
		category_id: Option<i64>,
		genre_ids: &[i64],
	) -> sqlx::Result<Title> {
		let title: Title = sqlx::query_as(
			"INSERT INTO titles (name, year, category_id) VALUES (?, ?, ?) RETURNING *",
		)
		.bind(name)
		.bind(year)
		.bind(category_id)
		.fetch_one(pool)
		.await?;
		title.set_genres(pool, genre_ids).await?;
		Ok(title)
	}

	pub async fn update(
		&self,
		pool: &SqlitePool,
		name: &str,
		year: i32,
		category_id: Option<i64>,
		genre_ids: Option<&[i64]>,
	) -> sqlx::Result<Title> {
		let title: Title = sqlx::query_as(
			"UPDATE titles SET name = ?, year = ?, category_id = ? WHERE id = ? RETURNING *",
		)
		.bind(name)
		.bind(year)
		.bind(category_id)
		.bind(self.id)
		.fetch_one(pool)
		.await?;
		if let Some(genre_ids) = genre_ids {
			title.set_genres(pool, genre_ids).await?;
		}
		Ok(title)
	}

	async fn set_genres(&self, pool: &SqlitePool, genre_ids: &[i64]) -> sqlx::Result<()> {
		sqlx::query("DELETE FROM title_genres WHERE title_id = ?")
			.bind(self.id)
			.execute(pool)
			.await?;
		for genre_id in genre_ids {
			sqlx::query("INSERT INTO title_genres (title_id, genre_id) VALUES (?, ?)")
				.bind(self.id)
				.bind(genre_id)
				.execute(pool)
				.await?;
		}
		Ok(())
	}

	pub async fn delete(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
		let result = sqlx::query("DELETE FROM titles WHERE id = ?")
			.bind(id)
			.execute(pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	pub async fn list(
		pool: &SqlitePool,
		search: Option<&str>,
		page: PageParams,
	) -> sqlx::Result<(Vec<Title>, i64)> {
		match search.map(|term| format!("%{term}%")) {
			Some(pattern) => {
				let rows = sqlx::query_as(
					"SELECT * FROM titles WHERE name LIKE ? ORDER BY name LIMIT ? OFFSET ?",
				)
				.bind(&pattern)
				.bind(page.limit)
				.bind(page.offset)
				.fetch_all(pool)
				.await?;
				let count =
					sqlx::query_scalar("SELECT COUNT(*) FROM titles WHERE name LIKE ?")
						.bind(&pattern)
						.fetch_one(pool)
						.await?;
				Ok((rows, count))
			}
			None => {
				let rows = sqlx::query_as("SELECT * FROM titles ORDER BY name LIMIT ? OFFSET ?")
					.bind(page.limit)
					.bind(page.offset)
					.fetch_all(pool)
					.await?;
				let count = sqlx::query_scalar("SELECT COUNT(*) FROM titles")
					.fetch_one(pool)
					.await?;
				Ok((rows, count))
			}
		}
	}

	/// Derived rating: arithmetic mean of review scores, `None` when the
	/// title has no reviews.
	pub async fn rating(&self, pool: &SqlitePool) -> sqlx::Result<Option<f64>> {
		sqlx::query_scalar("SELECT AVG(score) FROM reviews WHERE title_id = ?")
			.bind(self.id)
			.fetch_one(pool)
			.await
	}

	pub async fn category(&self, pool: &SqlitePool) -> sqlx::Result<Option<Category>> {
		match self.category_id {
			None => Ok(None),
			Some(category_id) => {
				sqlx::query_as("SELECT * FROM categories WHERE id = ?")
					.bind(category_id)
					.fetch_optional(pool)
					.await
			}
		}
	}

	pub async fn genres(&self, pool: &SqlitePool) -> sqlx::Result<Vec<Genre>> {
		sqlx::query_as(
			"SELECT g.* FROM genres g \
			 JOIN title_genres tg ON tg.genre_id = g.id \
			 WHERE tg.title_id = ? ORDER BY g.name",
		)
		.bind(self.id)
		.fetch_all(pool)
		.await
	}
}
