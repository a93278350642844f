//! Token lifecycle owner: stores the current access token and performs the client-credentials
//! exchange.
//!
//! The manager is the only writer of token state. A refresh either replaces the stored token
//! wholesale or leaves it untouched and returns [`AuthError`]; it never retries internally.
//! Refreshes are serialized with an async mutex, and [`TokenManager::refresh_stale`] lets callers
//! that raced on the same rejected token piggy-back on whichever refresh finished first.

mod metrics;

pub use metrics::{RefreshMetrics, RefreshSnapshot};

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientCredentials},
	error::AuthError,
	http::{self, ApiHttpClient, ApiResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
	params::Params,
	request::{APPLICATION_FORM, AUTHORIZATION, CONTENT_TYPE, Method, RequestBuilder},
};

/// Owns the access token shared by every request issued through one client.
pub struct TokenManager<C>
where
	C: ?Sized + ApiHttpClient,
{
	credentials: ClientCredentials,
	token_url: Url,
	http_client: Arc<C>,
	state: RwLock<Option<AccessToken>>,
	refresh_guard: AsyncMutex<()>,
	metrics: RefreshMetrics,
}
impl<C> TokenManager<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a manager that exchanges `credentials` at `token_url`.
	pub fn new(
		credentials: ClientCredentials,
		token_url: Url,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self {
			credentials,
			token_url,
			http_client: http_client.into(),
			state: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			metrics: RefreshMetrics::default(),
		}
	}

	/// Seeds the manager with a previously issued token, skipping the cold-start exchange.
	pub fn with_initial_token(self, token: AccessToken) -> Self {
		*self.state.write() = Some(token);

		self
	}

	/// Token endpoint this manager calls.
	pub fn token_url(&self) -> &Url {
		&self.token_url
	}

	/// Counters for token exchanges performed by this manager.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.metrics
	}

	/// Returns the stored token, if any exchange has succeeded (or one was seeded).
	pub fn current_token(&self) -> Option<AccessToken> {
		self.state.read().clone()
	}

	/// Performs the client-credentials exchange unconditionally.
	///
	/// On success the stored token is replaced; on failure it is left as it was.
	pub async fn refresh(&self) -> Result<AccessToken, AuthError> {
		let _singleflight = self.refresh_guard.lock().await;

		self.exchange().await
	}

	/// Refreshes only if the stored token is still `rejected` (or absent when `rejected` is
	/// `None`).
	///
	/// Callers that observed the same stale token wait on the first refresh and then reuse its
	/// result instead of calling the token endpoint again.
	pub async fn refresh_stale(
		&self,
		rejected: Option<&AccessToken>,
	) -> Result<AccessToken, AuthError> {
		let _singleflight = self.refresh_guard.lock().await;

		if let Some(current) = self.current_token()
			&& Some(&current) != rejected
		{
			obs::trace_decision(CallKind::TokenRefresh, "reuse_concurrent_refresh");

			return Ok(current);
		}

		self.exchange().await
	}

	async fn exchange(&self) -> Result<AccessToken, AuthError> {
		const KIND: CallKind = CallKind::TokenRefresh;

		let span = CallSpan::new(KIND, "client_credentials");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.metrics.record_attempt();

		let result: Result<AccessToken, AuthError> = span
			.instrument(async {
				let form = Params::new().with("grant_type", "client_credentials");
				let request = RequestBuilder::new(Method::Post, self.token_url.clone())
					.header(AUTHORIZATION, self.credentials.basic_authorization())
					.header(CONTENT_TYPE, APPLICATION_FORM)
					.params(Some(&form))
					.build()
					.map_err(AuthError::Encoding)?;
				let response = http::execute(self.http_client.as_ref(), request).await;
				let token = token_from_response(response)?;

				*self.state.write() = Some(token.clone());

				Ok(token)
			})
			.await;

		match &result {
			Ok(_) => {
				self.metrics.record_stored();
				obs::record_call_outcome(KIND, CallOutcome::Success);
			},
			Err(err) => {
				self.metrics.record_error(err);
				obs::record_call_outcome(KIND, CallOutcome::Failure);
				obs::trace_failure(KIND, err);
			},
		}

		result
	}
}
impl<C> Debug for TokenManager<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenManager")
			.field("credentials", &self.credentials)
			.field("token_url", &self.token_url.as_str())
			.field("token_set", &self.state.read().is_some())
			.finish()
	}
}

fn token_from_response(response: ApiResponse) -> Result<AccessToken, AuthError> {
	let ApiResponse { succeeded, status, json, parse_error, transport_error, .. } = response;

	if let Some(err) = transport_error {
		return Err(AuthError::Transport(err));
	}
	if !succeeded {
		return Err(AuthError::Rejected { status: status.unwrap_or_default(), body: json });
	}
	if let Some(source) = parse_error {
		return Err(AuthError::MalformedResponse { source });
	}

	let Some(secret) = json
		.as_ref()
		.and_then(|body| body.get("access_token"))
		.and_then(JsonValue::as_str)
		.filter(|secret| !secret.is_empty())
	else {
		return Err(AuthError::MissingAccessToken { body: json });
	};
	let mut token = AccessToken::new(secret);

	if let Some(expires_in) = json
		.as_ref()
		.and_then(|body| body.get("expires_in"))
		.and_then(JsonValue::as_i64)
		.filter(|secs| *secs > 0)
	{
		token = token.with_expires_in(Duration::seconds(expires_in));
	}

	Ok(token)
}
