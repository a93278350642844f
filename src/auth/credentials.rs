//! OAuth 2.0 client-credentials pair and its HTTP Basic rendering.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{_prelude::*, auth::Secret};

/// Client identifier and secret issued by the platform. Immutable for a client's lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
	client_id: String,
	client_secret: Secret,
}
impl ClientCredentials {
	/// Pairs an identifier with its secret.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// OAuth client secret.
	pub fn client_secret(&self) -> &Secret {
		&self.client_secret
	}

	/// `Authorization` header value for the token endpoint: `Basic base64(id:secret)`.
	pub fn basic_authorization(&self) -> String {
		let pair = format!("{}:{}", self.client_id, self.client_secret.expose());

		format!("Basic {}", STANDARD.encode(pair))
	}
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &self.client_secret)
			.finish()
	}
}
