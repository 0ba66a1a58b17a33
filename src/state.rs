//! Shared application state threaded through every view.

use std::sync::Arc;

use chrono::Duration;
use sqlx::SqlitePool;

use crate::auth::{ConfirmationCodeGenerator, JwtAuth};
use crate::config::Settings;
use crate::mail::EmailBackend;

pub struct AppState {
	pub settings: Settings,
	pub pool: SqlitePool,
	pub jwt: JwtAuth,
	pub confirmations: ConfirmationCodeGenerator,
	pub mailer: Arc<dyn EmailBackend>,
}

impl AppState {
	/// Connect the pool and wire the auth components from settings.
	pub async fn new(settings: Settings) -> Result<Self, sqlx::Error> {
		let pool = crate::db::connect(&settings.database_url).await?;
		let mailer = crate::mail::backend_from_settings(&settings);
		Ok(Self::with_parts(settings, pool, mailer))
	}

	/// Assemble state from pre-built parts. Tests use this to keep a
	/// handle on the memory mail backend.
	pub fn with_parts(
		settings: Settings,
		pool: SqlitePool,
		mailer: Arc<dyn EmailBackend>,
	) -> Self {
		let jwt = JwtAuth::new(
			settings.secret_key.as_bytes(),
			Duration::hours(settings.token_ttl_hours),
		);
		let confirmations = ConfirmationCodeGenerator::new(
			settings.secret_key.as_bytes(),
			Duration::minutes(settings.confirmation_ttl_minutes),
		);
		Self {
			settings,
			pool,
			jwt,
			confirmations,
			mailer,
		}
	}
}
