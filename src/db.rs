//! Database pool construction and embedded migrations.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::exceptions::{ApiError, FieldErrors};

/// Migrations embedded from `migrations/` at compile time.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Open a pool against `database_url` and run pending migrations.
///
/// Foreign keys are enforced per connection; the cascade and SET NULL
/// behavior in the schema depends on it. In-memory databases get a
/// single connection so every query sees the same database.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
	let options = SqliteConnectOptions::from_str(database_url)?
		.create_if_missing(true)
		.foreign_keys(true);

	let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
	let pool = SqlitePoolOptions::new()
		.max_connections(max_connections)
		.connect_with(options)
		.await?;

	MIGRATOR.run(&pool).await.map_err(sqlx::Error::from)?;
	Ok(pool)
}

/// Map a unique-constraint violation on a write to a field-level
/// validation error; anything else stays a database error. The schema
/// constraints backstop the serializer pre-checks under concurrent
/// writes.
pub fn map_unique_violation(field: &'static str) -> impl Fn(sqlx::Error) -> ApiError {
	move |err| {
		let unique = err
			.as_database_error()
			.is_some_and(|db_err| db_err.is_unique_violation());
		if unique {
			ApiError::Validation(FieldErrors::single(field, "must be unique"))
		} else {
			ApiError::Database(err)
		}
	}
}
