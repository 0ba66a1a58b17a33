//! Input validation and output shapes for the users app.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::models::{Role, User};
use crate::exceptions::{ApiResult, FieldErrors};

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;

static USERNAME_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username pattern"));
static EMAIL_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// Field checks shared by signup and admin user creation.
pub fn validate_username(errors: &mut FieldErrors, username: &str) {
	if username.is_empty() {
		errors.add("username", "This field may not be blank.");
		return;
	}
	if username.len() > USERNAME_MAX_LENGTH {
		errors.add(
			"username",
			format!("Ensure this field has no more than {USERNAME_MAX_LENGTH} characters."),
		);
	}
	if !USERNAME_RE.is_match(username) {
		errors.add(
			"username",
			"Enter a valid username: letters, digits and @/./+/-/_ only.",
		);
	}
	if username.eq_ignore_ascii_case("me") {
		errors.add("username", "\"me\" is a reserved alias.");
	}
}

pub fn validate_email(errors: &mut FieldErrors, email: &str) {
	if email.is_empty() {
		errors.add("email", "This field may not be blank.");
		return;
	}
	if email.len() > EMAIL_MAX_LENGTH {
		errors.add(
			"email",
			format!("Ensure this field has no more than {EMAIL_MAX_LENGTH} characters."),
		);
	}
	if !EMAIL_RE.is_match(email) {
		errors.add("email", "Enter a valid email address.");
	}
}

/// The (username, email) pair must not partially collide with an
/// existing account: an email on file under a different username, or a
/// username on file under a different email, both reject. The exact pair
/// matching an existing account is allowed (idempotent signup).
pub async fn validate_pair_collision(
	pool: &SqlitePool,
	errors: &mut FieldErrors,
	username: &str,
	email: &str,
) -> ApiResult<()> {
	if User::email_taken_by_other(pool, email, username).await? {
		errors.add("email", "This email is already registered.");
	}
	if User::username_taken_by_other(pool, username, email).await? {
		errors.add("username", "This username is already taken.");
	}
	Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SignUpData {
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub email: String,
}

impl SignUpData {
	pub async fn validate(&self, pool: &SqlitePool) -> ApiResult<()> {
		let mut errors = FieldErrors::new();
		validate_username(&mut errors, &self.username);
		validate_email(&mut errors, &self.email);
		if errors.is_empty() {
			validate_pair_collision(pool, &mut errors, &self.username, &self.email).await?;
		}
		errors.into_result()
	}
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub confirmation_code: String,
}

impl TokenRequest {
	pub fn validate(&self) -> ApiResult<()> {
		let mut errors = FieldErrors::new();
		if self.username.is_empty() {
			errors.add("username", "This field is required.");
		}
		if self.confirmation_code.is_empty() {
			errors.add("confirmation_code", "This field is required.");
		}
		errors.into_result()
	}
}

/// Admin-facing create payload; role defaults to `user`.
#[derive(Debug, Deserialize)]
pub struct UserCreateData {
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub email: String,
	#[serde(default)]
	pub first_name: String,
	#[serde(default)]
	pub last_name: String,
	#[serde(default)]
	pub bio: String,
	pub role: Option<String>,
}

impl UserCreateData {
	pub async fn validate(&self, pool: &SqlitePool) -> ApiResult<Role> {
		let mut errors = FieldErrors::new();
		validate_username(&mut errors, &self.username);
		validate_email(&mut errors, &self.email);
		let role = match &self.role {
			None => Role::User,
			Some(raw) => match Role::parse(raw) {
				Some(role) => role,
				None => {
					errors.add("role", format!("\"{raw}\" is not a valid choice."));
					Role::User
				}
			},
		};
		if errors.is_empty() {
			validate_pair_collision(pool, &mut errors, &self.username, &self.email).await?;
		}
		errors.into_result()?;
		Ok(role)
	}
}

/// Partial update payload for both admin edits and `/users/me`.
#[derive(Debug, Default, Deserialize)]
pub struct UserPatchData {
	pub username: Option<String>,
	pub email: Option<String>,
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub bio: Option<String>,
	pub role: Option<String>,
}

impl UserPatchData {
	/// Apply the patch to `user`. `allow_role_change` is false for
	/// self-service updates: a submitted role is then silently ignored
	/// and the stored role preserved.
	pub async fn apply(
		&self,
		pool: &SqlitePool,
		user: &mut User,
		allow_role_change: bool,
	) -> ApiResult<()> {
		let mut errors = FieldErrors::new();

		let username = self.username.as_deref().unwrap_or(&user.username);
		let email = self.email.as_deref().unwrap_or(&user.email);
		if self.username.is_some() {
			validate_username(&mut errors, username);
		}
		if self.email.is_some() {
			validate_email(&mut errors, email);
		}

		let role = match (&self.role, allow_role_change) {
			(Some(raw), true) => match Role::parse(raw) {
				Some(role) => role,
				None => {
					errors.add("role", format!("\"{raw}\" is not a valid choice."));
					user.role
				}
			},
			_ => user.role,
		};

		if errors.is_empty() && (self.username.is_some() || self.email.is_some()) {
			// Uniqueness against accounts other than the one being edited.
			if self.email.is_some() && User::email_taken_by_other(pool, email, username).await? {
				errors.add("email", "This email is already registered.");
			}
			if self.username.is_some()
				&& User::username_taken_by_other(pool, username, email).await?
			{
				errors.add("username", "This username is already taken.");
			}
		}
		errors.into_result()?;

		user.username = username.to_string();
		user.email = email.to_string();
		if let Some(first_name) = &self.first_name {
			user.first_name = first_name.clone();
		}
		if let Some(last_name) = &self.last_name {
			user.last_name = last_name.clone();
		}
		if let Some(bio) = &self.bio {
			user.bio = bio.clone();
		}
		user.role = role;
		Ok(())
	}
}

/// Public representation of a user account.
#[derive(Debug, Serialize)]
pub struct UserOut {
	pub username: String,
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub bio: String,
	pub role: Role,
}

impl From<&User> for UserOut {
	fn from(user: &User) -> Self {
		Self {
			username: user.username.clone(),
			email: user.email.clone(),
			first_name: user.first_name.clone(),
			last_name: user.last_name.clone(),
			bio: user.bio.clone(),
			role: user.role,
		}
	}
}
