//! Environment-driven settings.
//!
//! Every value has a development default; missing variables are logged at
//! startup rather than failing, except for the signing secret which must
//! not fall back silently in production (`CRITIQUE_INSECURE_DEFAULTS=1`
//! opts in for local runs and tests).

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Settings {
	pub port: u16,
	pub database_url: String,
	/// HMAC/JWT signing key, injected into the auth flow at startup.
	pub secret_key: String,
	/// Bearer-token lifetime in hours.
	pub token_ttl_hours: i64,
	/// Confirmation-code lifetime in minutes.
	pub confirmation_ttl_minutes: i64,
	/// Email backend: "console", "smtp", or "memory".
	pub email_backend: String,
	pub smtp_host: String,
	pub smtp_port: u16,
	pub from_email: String,
	pub default_page_limit: i64,
	pub max_page_limit: i64,
}

impl Settings {
	pub fn from_env() -> anyhow::Result<Self> {
		let secret_key = match env::var("SECRET_KEY") {
			Ok(value) if !value.is_empty() => value,
			_ => {
				if env::var("CRITIQUE_INSECURE_DEFAULTS").as_deref() != Ok("1") {
					anyhow::bail!(
						"SECRET_KEY is not set; refusing to start with an insecure default"
					);
				}
				warn!("SECRET_KEY not set, using insecure development default");
				"insecure-development-key".to_string()
			}
		};

		Ok(Self {
			port: try_load("PORT", "8000"),
			database_url: try_load("DATABASE_URL", "sqlite://critique.db"),
			secret_key,
			token_ttl_hours: try_load("TOKEN_TTL_HOURS", "24"),
			confirmation_ttl_minutes: try_load("CONFIRMATION_TTL_MINUTES", "1440"),
			email_backend: try_load("EMAIL_BACKEND", "console"),
			smtp_host: try_load("SMTP_HOST", "localhost"),
			smtp_port: try_load("SMTP_PORT", "25"),
			from_email: try_load("FROM_EMAIL", "noreply@critique.local"),
			default_page_limit: try_load("PAGE_LIMIT", "10"),
			max_page_limit: try_load("MAX_PAGE_LIMIT", "100"),
		})
	}

	/// Settings for tests: in-memory database, memory mailer, short TTLs.
	pub fn for_tests() -> Self {
		Self {
			port: 0,
			database_url: "sqlite::memory:".to_string(),
			secret_key: "test-secret-key".to_string(),
			token_ttl_hours: 1,
			confirmation_ttl_minutes: 10,
			email_backend: "memory".to_string(),
			smtp_host: "localhost".to_string(),
			smtp_port: 25,
			from_email: "noreply@critique.local".to_string(),
			default_page_limit: 10,
			max_page_limit: 100,
		}
	}
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
	T::Err: Display,
{
	let raw = match env::var(key) {
		Ok(value) => value,
		Err(_) => {
			info!("{key} not set, using default: {default}");
			default.to_string()
		}
	};
	match raw.parse() {
		Ok(value) => value,
		Err(err) => {
			warn!("Invalid {key} value ({err}), using default: {default}");
			default
				.parse()
				.unwrap_or_else(|err| panic!("invalid built-in default for {key}: {err}"))
		}
	}
}
