//! Bearer access token issued by the client-credentials exchange.

// self
use crate::{_prelude::*, auth::Secret};

/// Access token plus the bookkeeping the platform returned with it.
///
/// Expiry is informational only: the client discovers staleness when the platform answers 401,
/// never by consulting `expires_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken {
	/// Bearer secret; callers must avoid logging it.
	pub secret: Secret,
	/// Instant the token was stored locally.
	pub acquired_at: OffsetDateTime,
	/// Expiry advertised through `expires_in`, when the platform sent one.
	pub expires_at: Option<OffsetDateTime>,
}
impl AccessToken {
	/// Wraps a token acquired now, with no advertised expiry.
	pub fn new(secret: impl Into<Secret>) -> Self {
		Self { secret: secret.into(), acquired_at: OffsetDateTime::now_utc(), expires_at: None }
	}

	/// Records the platform's `expires_in` hint relative to `acquired_at`.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_at = Some(self.acquired_at + expires_in);

		self
	}

	/// `Authorization` header value: `Bearer <token>`.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.secret.expose())
	}

	/// Whether the advertised expiry has passed at `now`. Tokens without a hint never expire here.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| now >= expires_at)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn bearer_header_embeds_the_secret() {
		assert_eq!(AccessToken::new("abc123").bearer(), "Bearer abc123");
	}

	#[test]
	fn expiry_hint_is_relative_to_acquisition() {
		let token = AccessToken::new("abc123").with_expires_in(Duration::seconds(3600));

		assert!(!token.is_expired_at(token.acquired_at + Duration::seconds(3599)));
		assert!(token.is_expired_at(token.acquired_at + Duration::seconds(3600)));
		assert!(!AccessToken::new("abc123").is_expired_at(OffsetDateTime::now_utc()));
	}
}
