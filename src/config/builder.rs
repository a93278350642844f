// self
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;
use crate::{
	_prelude::*,
	auth::Secret,
	client::Client,
	config::ClientConfig,
	error::ConfigError,
	http::ApiHttpClient,
};

/// Builder for [`Client`] values.
#[derive(Clone, Debug)]
pub struct ClientBuilder {
	/// Config being assembled.
	pub config: ClientConfig,
}
impl ClientBuilder {
	/// Creates a builder seeded with the client credentials and default settings.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self { config: ClientConfig::new(client_id, client_secret) }
	}

	/// Starts from an existing config.
	pub fn from_config(config: ClientConfig) -> Self {
		Self { config }
	}

	/// Overrides the platform root (defaults to the production platform).
	pub fn base_path(mut self, url: Url) -> Self {
		self.config.base_path = url;

		self
	}

	/// Overrides the API version segment (defaults to `v4`).
	pub fn api_version(mut self, version: impl Into<String>) -> Self {
		self.config.api_version = version.into();

		self
	}

	/// Enables or disables the one-shot refresh-and-retry on 401.
	pub fn auto_refresh_token(mut self, enabled: bool) -> Self {
		self.config.auto_refresh_token = enabled;

		self
	}

	/// Seeds a previously issued access token so the first request skips the token exchange.
	pub fn access_token(mut self, token: impl Into<Secret>) -> Self {
		self.config.initial_access_token = Some(token.into());

		self
	}

	/// Overrides the whole-request timeout of the default transport (defaults to 60 seconds).
	///
	/// Ignored by [`Self::build_with_http_client`]; custom transports bring their own.
	pub fn request_timeout_secs(mut self, secs: u64) -> Self {
		self.config.request_timeout_secs = secs;

		self
	}

	/// Validates the config and builds a client over the caller-provided transport.
	pub fn build_with_http_client<C>(
		self,
		http_client: impl Into<Arc<C>>,
	) -> Result<Client<C>, ConfigError>
	where
		C: ?Sized + ApiHttpClient,
	{
		Client::with_http_client(self.config, http_client)
	}

	/// Validates the config and builds a client over a default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn build(self) -> Result<Client<ReqwestHttpClient>, ConfigError> {
		self.config.validate()?;

		let http_client = ReqwestHttpClient::with_timeout(self.config.request_timeout())?;

		self.build_with_http_client(http_client)
	}
}
