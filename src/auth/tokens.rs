//! JWT bearer tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
	pub sub: String, // Subject (user ID)
	pub exp: i64,    // Expiration time
	pub iat: i64,    // Issued at
	pub username: String,
}

impl Claims {
	pub fn new(user_id: i64, username: String, expires_in: Duration) -> Self {
		let now = Utc::now();
		Self {
			sub: user_id.to_string(),
			username,
			iat: now.timestamp(),
			exp: (now + expires_in).timestamp(),
		}
	}

	pub fn user_id(&self) -> Option<i64> {
		self.sub.parse().ok()
	}
}

/// Token signing and verification, keyed by the injected secret.
pub struct JwtAuth {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	token_ttl: Duration,
}

impl JwtAuth {
	pub fn new(secret: &[u8], token_ttl: Duration) -> Self {
		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			validation: Validation::default(),
			token_ttl,
		}
	}

	/// Mint a fresh access token for the user.
	pub fn generate_token(
		&self,
		user_id: i64,
		username: String,
	) -> Result<String, jsonwebtoken::errors::Error> {
		let claims = Claims::new(user_id, username, self.token_ttl);
		encode(&Header::default(), &claims, &self.encoding_key)
	}

	/// Verify a token and return its claims. Expiry is enforced by the
	/// default validation.
	pub fn decode_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
		decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
	}
}
