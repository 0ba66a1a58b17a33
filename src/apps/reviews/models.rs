//! Review and comment models.
//!
//! Every query is scoped to its parent: a review is only reachable
//! through its title, a comment only through its review. A stray id
//! from another branch of the tree is treated as absent.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::pagination::PageParams;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Review {
	pub id: i64,
	pub title_id: i64,
	pub author_id: i64,
	pub text: String,
	pub score: i64,
	pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
	pub id: i64,
	pub review_id: i64,
	pub author_id: i64,
	pub text: String,
	pub pub_date: DateTime<Utc>,
}

impl Review {
	pub async fn find_in_title(
		pool: &SqlitePool,
		title_id: i64,
		review_id: i64,
	) -> sqlx::Result<Option<Review>> {
		sqlx::query_as("SELECT * FROM reviews WHERE id = ? AND title_id = ?")
			.bind(review_id)
			.bind(title_id)
			.fetch_optional(pool)
			.await
	}

	pub async fn exists_for_author(
		pool: &SqlitePool,
		title_id: i64,
		author_id: i64,
	) -> sqlx::Result<bool> {
		let count: i64 =
			sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = ? AND author_id = ?")
				.bind(title_id)
				.bind(author_id)
				.fetch_one(pool)
				.await?;
		Ok(count > 0)
	}

	pub async fn create(
		pool: &SqlitePool,
		title_id: i64,
		author_id: i64,
		text: &str,
		score: i64,
	) -> sqlx::Result<Review> {
		sqlx::query_as(
			"INSERT INTO reviews (title_id, author_id, text, score) \
			 VALUES (?, ?, ?, ?) RETURNING *",
		)
		.bind(title_id)
		.bind(author_id)
		.bind(text)
		.bind(score)
		.fetch_one(pool)
		.await
	}

	pub async fn save(&self, pool: &SqlitePool) -> sqlx::Result<Review> {
		sqlx::query_as("UPDATE reviews SET text = ?, score = ? WHERE id = ? RETURNING *")
			.bind(&self.text)
			.bind(self.score)
			.bind(self.id)
			.fetch_one(pool)
			.await
	}

	pub async fn delete(&self, pool: &SqlitePool) -> sqlx::Result<()> {
		sqlx::query("DELETE FROM reviews WHERE id = ?")
			.bind(self.id)
			.execute(pool)
			.await?;
		Ok(())
	}

	/// Newest first, the order readers expect for a review feed.
	pub async fn list(
		pool: &SqlitePool,
		title_id: i64,
		page: PageParams,
	) -> sqlx::Result<(Vec<Review>, i64)> {
		let rows = sqlx::query_as(
			"SELECT * FROM reviews WHERE title_id = ? \
			 ORDER BY pub_date DESC, id DESC LIMIT ? OFFSET ?",
		)
		.bind(title_id)
		.bind(page.limit)
		.bind(page.offset)
		.fetch_all(pool)
		.await?;
		let count = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = ?")
			.bind(title_id)
			.fetch_one(pool)
			.await?;
		Ok((rows, count))
	}
}

impl Comment {
	pub async fn find_in_review(
		pool: &SqlitePool,
		review_id: i64,
		comment_id: i64,
	) -> sqlx::Result<Option<Comment>> {
		sqlx::query_as("SELECT * FROM comments WHERE id = ? AND review_id = ?")
			.bind(comment_id)
			.bind(review_id)
			.fetch_optional(pool)
			.await
	}

	pub async fn create(
		pool: &SqlitePool,
		review_id: i64,
		author_id: i64,
		text: &str,
	) -> sqlx::Result<Comment> {
		sqlx::query_as(
			"INSERT INTO comments (review_id, author_id, text) VALUES (?, ?, ?) RETURNING *",
		)
		.bind(review_id)
		.bind(author_id)
		.bind(text)
		.fetch_one(pool)
		.await
	}

	pub async fn save(&self, pool: &SqlitePool) -> sqlx::Result<Comment> {
		sqlx::query_as("UPDATE comments SET text = ? WHERE id = ? RETURNING *")
			.bind(&self.text)
			.bind(self.id)
			.fetch_one(pool)
			.await
	}

	pub async fn delete(&self, pool: &SqlitePool) -> sqlx::Result<()> {
		sqlx::query("DELETE FROM comments WHERE id = ?")
			.bind(self.id)
			.execute(pool)
			.await?;
		Ok(())
	}

	pub async fn list(
		pool: &SqlitePool,
		review_id: i64,
		page: PageParams,
	) -> sqlx::Result<(Vec<Comment>, i64)> {
		let rows = sqlx::query_as(
			"SELECT * FROM comments WHERE review_id = ? \
			 ORDER BY pub_date ASC, id ASC LIMIT ? OFFSET ?",
		)
		.bind(review_id)
		.bind(page.limit)
		.bind(page.offset)
		.fetch_all(pool)
		.await?;
		let count = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = ?")
			.bind(review_id)
			.fetch_one(pool)
			.await?;
		Ok((rows, count))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::apps::catalog::models::Title;
	use crate::apps::users::models::User;

	async fn pool() -> SqlitePool {
		crate::db::connect("sqlite::memory:").await.unwrap()
	}

	async fn fixture(pool: &SqlitePool) -> (Title, User) {
		let title = Title::create(pool, "Dune", 1965, None, &[]).await.unwrap();
		let (user, _) = User::get_or_create(pool, "reader", "reader@example.com")
			.await
			.unwrap();
		(title, user)
	}

	#[tokio::test]
	async fn second_review_by_same_author_violates_uniqueness() {
		let pool = pool().await;
		let (title, user) = fixture(&pool).await;

		Review::create(&pool, title.id, user.id, "Great.", 9)
			.await
			.unwrap();
		let err = Review::create(&pool, title.id, user.id, "Still great.", 10)
			.await
			.unwrap_err();
		assert!(
			err.as_database_error()
				.is_some_and(|db_err| db_err.is_unique_violation())
		);
	}

	#[tokio::test]
	async fn review_lookup_is_scoped_to_its_title() {
		let pool = pool().await;
		let (title, user) = fixture(&pool).await;
		let other = Title::create(&pool, "Solaris", 1961, None, &[]).await.unwrap();
		let review = Review::create(&pool, title.id, user.id, "Great.", 9)
			.await
			.unwrap();

		assert!(
			Review::find_in_title(&pool, title.id, review.id)
				.await
				.unwrap()
				.is_some()
		);
		assert!(
			Review::find_in_title(&pool, other.id, review.id)
				.await
				.unwrap()
				.is_none()
		);
	}

	#[tokio::test]
	async fn deleting_review_cascades_to_comments() {
		let pool = pool().await;
		let (title, user) = fixture(&pool).await;
		let review = Review::create(&pool, title.id, user.id, "Great.", 9)
			.await
			.unwrap();
		let comment = Comment::create(&pool, review.id, user.id, "Agreed.")
			.await
			.unwrap();

		review.delete(&pool).await.unwrap();
		assert!(
			Comment::find_in_review(&pool, review.id, comment.id)
				.await
				.unwrap()
				.is_none()
		);
	}

	#[tokio::test]
	async fn deleting_title_cascades_to_reviews() {
		let pool = pool().await;
		let (title, user) = fixture(&pool).await;
		let review = Review::create(&pool, title.id, user.id, "Great.", 9)
			.await
			.unwrap();

		assert!(Title::delete(&pool, title.id).await.unwrap());
		assert!(
			Review::find_in_title(&pool, title.id, review.id)
				.await
				.unwrap()
				.is_none()
		);
	}
}
