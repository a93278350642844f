//! Client construction parameters and their validation.

mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Construction parameters for a platform client.
///
/// Deserializable so callers can keep it in their own configuration files; only `client_id` and
/// `client_secret` are required.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// Platform root; the token endpoint and API paths hang off it.
	#[serde(default = "default_base_path")]
	pub base_path: Url,
	/// API version segment inserted after `/api/`.
	#[serde(default = "default_api_version")]
	pub api_version: String,
	/// Whether a 401 triggers one token refresh and a single retry.
	#[serde(default)]
	pub auto_refresh_token: bool,
	/// Previously issued token; skips the cold-start exchange when present.
	#[serde(default)]
	pub initial_access_token: Option<Secret>,
	/// Whole-request timeout, in seconds, for the default reqwest transport.
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}
impl ClientConfig {
	/// Production platform root.
	pub const DEFAULT_BASE_PATH: &str = "https://platform.pokitdok.com";
	/// API version used when none is configured.
	pub const DEFAULT_API_VERSION: &str = "v4";
	/// Request timeout used when none is configured.
	pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

	/// Creates a config with default base path, API version, and auto-refresh disabled.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			base_path: default_base_path(),
			api_version: default_api_version(),
			auto_refresh_token: false,
			initial_access_token: None,
			request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
		}
	}

	/// Validates invariants for the config.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::EmptyCredential { field: "client id" });
		}
		if self.client_secret.is_blank() {
			return Err(ConfigError::EmptyCredential { field: "client secret" });
		}
		if !matches!(self.base_path.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: self.base_path.to_string() });
		}
		if self.base_path.cannot_be_a_base() {
			return Err(ConfigError::CannotBeABase { url: self.base_path.to_string() });
		}
		if self.api_version.trim().is_empty() || self.api_version.contains('/') {
			return Err(ConfigError::InvalidApiVersion { version: self.api_version.clone() });
		}
		if self.request_timeout_secs == 0 {
			return Err(ConfigError::ZeroRequestTimeout);
		}

		Ok(())
	}

	/// [`Self::request_timeout_secs`] as a std duration.
	pub fn request_timeout(&self) -> std::time::Duration {
		std::time::Duration::from_secs(self.request_timeout_secs)
	}

	/// `{base_path}/oauth2/token`.
	pub fn token_url(&self) -> Result<Url, ConfigError> {
		let raw = format!("{}/oauth2/token", self.root());

		Url::parse(&raw).map_err(|_| ConfigError::CannotBeABase { url: raw })
	}

	/// `{base_path}/api/{api_version}`, without a trailing slash.
	pub fn api_base(&self) -> String {
		format!("{}/api/{}", self.root(), self.api_version)
	}

	fn root(&self) -> &str {
		self.base_path.as_str().trim_end_matches('/')
	}
}

fn default_base_path() -> Url {
	Url::parse(ClientConfig::DEFAULT_BASE_PATH).expect("Default base path is a valid URL.")
}

fn default_api_version() -> String {
	ClientConfig::DEFAULT_API_VERSION.into()
}

fn default_request_timeout_secs() -> u64 {
	ClientConfig::DEFAULT_REQUEST_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_match_the_production_platform() {
		let config = ClientConfig::new("id", "secret");

		assert_eq!(config.api_base(), "https://platform.pokitdok.com/api/v4");
		assert_eq!(
			config.token_url().expect("Token URL should build.").as_str(),
			"https://platform.pokitdok.com/oauth2/token"
		);
		assert!(!config.auto_refresh_token);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn deserializes_with_defaults() {
		let config: ClientConfig = serde_json::from_str(
			"{\"client_id\":\"id\",\"client_secret\":\"secret\",\"base_path\":\"http://localhost:5002\",\"auto_refresh_token\":true}",
		)
		.expect("Config should deserialize.");

		assert_eq!(config.api_base(), "http://localhost:5002/api/v4");
		assert!(config.auto_refresh_token);
		assert!(config.initial_access_token.is_none());
		assert_eq!(config.request_timeout_secs, ClientConfig::DEFAULT_REQUEST_TIMEOUT_SECS);
	}

	#[test]
	fn validation_rejects_bad_parameters() {
		let blank = ClientConfig::new(" ", "secret");

		assert!(matches!(blank.validate(), Err(ConfigError::EmptyCredential { field: "client id" })));

		let mut ftp = ClientConfig::new("id", "secret");

		ftp.base_path = Url::parse("ftp://platform.test").expect("FTP URL should parse.");

		assert!(matches!(ftp.validate(), Err(ConfigError::UnsupportedScheme { .. })));

		let mut version = ClientConfig::new("id", "secret");

		version.api_version = "v4/extra".into();

		assert!(matches!(version.validate(), Err(ConfigError::InvalidApiVersion { .. })));

		let mut unbounded = ClientConfig::new("id", "secret");

		unbounded.request_timeout_secs = 0;

		assert!(matches!(unbounded.validate(), Err(ConfigError::ZeroRequestTimeout)));
	}
}
