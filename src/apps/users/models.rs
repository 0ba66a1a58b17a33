//! User model and role derivations.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::pagination::PageParams;

/// Stored account role. Orthogonal to the superuser flag.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
	#[default]
	User,
	Moderator,
	Admin,
}

impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Role::User => "user",
			Role::Moderator => "moderator",
			Role::Admin => "admin",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"user" => Some(Role::User),
			"moderator" => Some(Role::Moderator),
			"admin" => Some(Role::Admin),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub username: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub bio: String,
	pub role: Role,
	pub is_superuser: bool,
}

impl User {
	/// Admin capability: the admin role or the superuser escape hatch.
	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin || self.is_superuser
	}

	/// Moderator capability. Does not subsume admin; predicates that
	/// accept moderators check admin capability separately.
	pub fn is_moderator(&self) -> bool {
		self.role == Role::Moderator
	}

	pub fn is_user(&self) -> bool {
		self.role == Role::User
	}

	pub async fn find_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<User>> {
		sqlx::query_as("SELECT * FROM users WHERE id = ?")
			.bind(id)
			.fetch_optional(pool)
			.await
	}

	pub async fn find_by_username(pool: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
		sqlx::query_as("SELECT * FROM users WHERE username = ?")
			.bind(username)
			.fetch_optional(pool)
			.await
	}

	/// True when `email` is registered under a username other than
	/// `username` (signup pair-collision rule).
	pub async fn email_taken_by_other(
		pool: &SqlitePool,
		email: &str,
		username: &str,
	) -> sqlx::Result<bool> {
		let count: i64 =
			sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ? AND username != ?")
				.bind(email)
				.bind(username)
				.fetch_one(pool)
				.await?;
		Ok(count > 0)
	}

	/// True when `username` is registered under an email other than
	/// `email`.
	pub async fn username_taken_by_other(
		pool: &SqlitePool,
		username: &str,
		email: &str,
	) -> sqlx::Result<bool> {
		let count: i64 =
			sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? AND email != ?")
				.bind(username)
				.bind(email)
				.fetch_one(pool)
				.await?;
		Ok(count > 0)
	}

	/// Idempotent lookup-or-insert keyed by the exact (username, email)
	/// pair. Returns the user and whether it was created.
	pub async fn get_or_create(
		pool: &SqlitePool,
		username: &str,
		email: &str,
	) -> sqlx::Result<(User, bool)> {
		let existing: Option<User> =
			sqlx::query_as("SELECT * FROM users WHERE username = ? AND email = ?")
				.bind(username)
				.bind(email)
				.fetch_optional(pool)
				.await?;
		if let Some(user) = existing {
			return Ok((user, false));
		}
		let user = sqlx::query_as(
			"INSERT INTO users (username, email) VALUES (?, ?) RETURNING *",
		)
		.bind(username)
		.bind(email)
		.fetch_one(pool)
		.await?;
		Ok((user, true))
	}

	pub async fn create(
		pool: &SqlitePool,
		username: &str,
		email: &str,
		first_name: &str,
		last_name: &str,
		bio: &str,
		role: Role,
	) -> sqlx::Result<User> {
		sqlx::query_as(
			"INSERT INTO users (username, email, first_name, last_name, bio, role) \
			 VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
		)
		.bind(username)
		.bind(email)
		.bind(first_name)
		.bind(last_name)
		.bind(bio)
		.bind(role)
		.fetch_one(pool)
		.await
	}

	/// Persist all mutable fields of this instance.
	pub async fn save(&self, pool: &SqlitePool) -> sqlx::Result<()> {
		sqlx::query(
			"UPDATE users SET username = ?, email = ?, first_name = ?, last_name = ?, \
			 bio = ?, role = ? WHERE id = ?",
		)
		.bind(&self.username)
		.bind(&self.email)
		.bind(&self.first_name)
		.bind(&self.last_name)
		.bind(&self.bio)
		.bind(self.role)
		.bind(self.id)
		.execute(pool)
		.await?;
		Ok(())
	}

	pub async fn delete_by_username(pool: &SqlitePool, username: &str) -> sqlx::Result<bool> {
		let result = sqlx::query("DELETE FROM users WHERE username = ?")
			.bind(username)
			.execute(pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Username-ordered listing with optional substring search, plus the
	/// unpaginated total for the envelope.
	pub async fn list(
		pool: &SqlitePool,
		search: Option<&str>,
		page: PageParams,
	) -> sqlx::Result<(Vec<User>, i64)> {
		let pattern = search.map(|term| format!("%{term}%"));
		let (users, count) = match &pattern {
			Some(pattern) => {
				let users = sqlx::query_as(
					"SELECT * FROM users WHERE username LIKE ? ORDER BY username LIMIT ? OFFSET ?",
				)
				.bind(pattern)
				.bind(page.limit)
				.bind(page.offset)
				.fetch_all(pool)
				.await?;
				let count =
					sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username LIKE ?")
						.bind(pattern)
						.fetch_one(pool)
						.await?;
				(users, count)
			}
			None => {
				let users =
					sqlx::query_as("SELECT * FROM users ORDER BY username LIMIT ? OFFSET ?")
						.bind(page.limit)
						.bind(page.offset)
						.fetch_all(pool)
						.await?;
				let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
					.fetch_one(pool)
					.await?;
				(users, count)
			}
		};
		Ok((users, count))
	}
}
