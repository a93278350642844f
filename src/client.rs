//! Authenticated request engine.
//!
//! [`Client::request`] obtains a bearer token (fetching one on cold start), encodes and sends the
//! request, and, when the platform answers 401 and auto-refresh is enabled, refreshes the token
//! and re-sends exactly once. The second response is returned whatever its outcome.

// self
#[cfg(feature = "reqwest")]
use crate::{auth::Secret, config::ClientBuilder, http::ReqwestHttpClient};
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientCredentials, TokenManager},
	config::ClientConfig,
	endpoints::ApiCall,
	error::{ConfigError, EncodingError},
	http::{self, ApiHttpClient, ApiResponse},
	multipart::FileAttachment,
	obs::{self, CallKind, CallOutcome, CallSpan},
	params::Params,
	request::{AUTHORIZATION, Headers, Method, RequestBuilder},
};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestPlatformClient = Client<ReqwestHttpClient>;

/// Async platform client.
///
/// Cloning is cheap; clones share the transport and the token, so a refresh performed through
/// one clone is visible to all of them.
pub struct Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	http_client: Arc<C>,
	tokens: Arc<TokenManager<C>>,
	api_base: Arc<str>,
	auto_refresh_token: bool,
}
impl<C> Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Validates `config` and creates a client over the caller-provided transport.
	pub fn with_http_client(
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self, ConfigError> {
		config.validate()?;

		let http_client = http_client.into();
		let credentials = ClientCredentials::new(config.client_id.clone(), config.client_secret.clone());
		let mut tokens = TokenManager::new(credentials, config.token_url()?, http_client.clone());

		if let Some(secret) = config.initial_access_token.clone() {
			tokens = tokens.with_initial_token(AccessToken::new(secret));
		}

		Ok(Self {
			http_client,
			tokens: Arc::new(tokens),
			api_base: config.api_base().into(),
			auto_refresh_token: config.auto_refresh_token,
		})
	}

	/// Whether a 401 triggers one refresh-and-retry.
	pub fn auto_refresh_token(&self) -> bool {
		self.auto_refresh_token
	}

	/// `{base_path}/api/{version}` prefix applied to request paths.
	pub fn api_base(&self) -> &str {
		&self.api_base
	}

	/// Token lifecycle owner shared by this client and its clones.
	pub fn tokens(&self) -> &TokenManager<C> {
		&self.tokens
	}

	/// Currently stored access token, if any.
	pub fn access_token(&self) -> Option<AccessToken> {
		self.tokens.current_token()
	}

	/// Forces a client-credentials exchange and stores the new token.
	pub async fn refresh_token(&self) -> Result<AccessToken> {
		Ok(self.tokens.refresh().await?)
	}

	/// Resolves an API path (e.g. `/eligibility/`) against the API base.
	///
	/// Paths without a leading `/` are joined with one.
	pub fn url_for(&self, path: &str) -> Result<Url, EncodingError> {
		let separator = if path.starts_with('/') { "" } else { "/" };
		let raw = format!("{}{separator}{path}", self.api_base);

		Url::parse(&raw).map_err(|source| EncodingError::InvalidUrl { url: raw, source })
	}

	/// Issues an authenticated request.
	///
	/// Non-2xx answers come back as `Ok` with `succeeded == false`; `Err` is reserved for a
	/// failed cold-start token exchange and for requests that cannot be encoded.
	pub async fn request(
		&self,
		path: &str,
		method: Method,
		params: Option<&Params>,
		files: &[FileAttachment],
	) -> Result<ApiResponse> {
		self.request_with_headers(path, method, &Headers::new(), params, files).await
	}

	/// Issues an authenticated request with extra headers.
	///
	/// Caller headers override defaults such as `Content-Type`, except that attachments always
	/// force multipart encoding and `Authorization` always carries the client's bearer token.
	pub async fn request_with_headers(
		&self,
		path: &str,
		method: Method,
		headers: &Headers,
		params: Option<&Params>,
		files: &[FileAttachment],
	) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Request;

		let span = CallSpan::new(KIND, "request");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result: Result<ApiResponse> = span
			.instrument(async {
				let url = self.url_for(path)?;
				let attempt = Attempt { url: &url, method, headers, params, files };
				let token = match self.tokens.current_token() {
					Some(token) => token,
					None => {
						obs::trace_decision(KIND, "cold_start");

						self.tokens.refresh_stale(None).await?
					},
				};
				let response = self.send(&attempt, &token).await?;

				if !response.token_expired || !self.auto_refresh_token {
					return Ok(response);
				}

				obs::record_call_outcome(KIND, CallOutcome::Retry);
				obs::trace_decision(KIND, "token_expired_retry");

				let token = match self.tokens.refresh_stale(Some(&token)).await {
					Ok(token) => token,
					Err(err) => {
						obs::trace_failure(KIND, &err);

						return Ok(response);
					},
				};

				self.send(&attempt, &token).await
			})
			.await;

		match &result {
			Ok(response) if response.succeeded =>
				obs::record_call_outcome(KIND, CallOutcome::Success),
			_ => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Issues the request described by an [`ApiCall`].
	pub async fn call(&self, call: &ApiCall) -> Result<ApiResponse> {
		self.request_with_headers(
			&call.path,
			call.method,
			&call.headers,
			call.params.as_ref(),
			&call.files,
		)
		.await
	}

	/// Convenience `GET`.
	pub async fn get(&self, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
		self.request(path, Method::Get, params, &[]).await
	}

	/// Convenience `POST`.
	pub async fn post(&self, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
		self.request(path, Method::Post, params, &[]).await
	}

	/// Convenience `PUT`.
	pub async fn put(&self, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
		self.request(path, Method::Put, params, &[]).await
	}

	/// Convenience `DELETE`.
	pub async fn delete(&self, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
		self.request(path, Method::Delete, params, &[]).await
	}

	async fn send(&self, attempt: &Attempt<'_>, token: &AccessToken) -> Result<ApiResponse> {
		let request = RequestBuilder::new(attempt.method, attempt.url.clone())
			.headers(attempt.headers)
			.header(AUTHORIZATION, token.bearer())
			.params(attempt.params)
			.files(attempt.files)
			.build()?;
		let response = http::execute(self.http_client.as_ref(), request).await;

		obs::record_response(&response);

		Ok(response)
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Creates a client over a default reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
		ClientBuilder::from_config(config).build()
	}

	/// Starts a [`ClientBuilder`] for the given credentials.
	pub fn builder(
		client_id: impl Into<String>,
		client_secret: impl Into<Secret>,
	) -> ClientBuilder {
		ClientBuilder::new(client_id, client_secret)
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			tokens: self.tokens.clone(),
			api_base: self.api_base.clone(),
			auto_refresh_token: self.auto_refresh_token,
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("api_base", &self.api_base)
			.field("auto_refresh_token", &self.auto_refresh_token)
			.field("tokens", &self.tokens)
			.finish()
	}
}

/// Inputs reused verbatim when an attempt is rebuilt with a fresh token.
struct Attempt<'a> {
	url: &'a Url,
	method: Method,
	headers: &'a Headers,
	params: Option<&'a Params>,
	files: &'a [FileAttachment],
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{Scripted, ScriptedHttpClient, build_scripted_client},
		error::{AuthError, Error},
	};

	const TOKEN_PATH: &str = "/oauth2/token";
	const ELIGIBILITY_PATH: &str = "/api/v4/eligibility/";

	fn token_body(token: &str) -> Scripted {
		Scripted::Respond(200, format!("{{\"access_token\":\"{token}\"}}"))
	}

	#[tokio::test]
	async fn cold_start_fetches_a_token_before_the_request() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, token_body("t-1"));
		transport.push(ELIGIBILITY_PATH, Scripted::Respond(200, "{\"data\":{}}".into()));

		let client = build_scripted_client(transport.clone(), false);
		let params = Params::new().with("trading_partner_id", "MOCKPAYER");
		let response = client
			.post("/eligibility/", Some(&params))
			.await
			.expect("Request should resolve.");
		let requests = transport.requests();

		assert!(response.succeeded);
		assert_eq!(requests.len(), 2);
		assert_eq!(requests[0].url.path(), TOKEN_PATH);
		assert_eq!(requests[1].headers.get(AUTHORIZATION), Some("Bearer t-1"));
	}

	#[tokio::test]
	async fn cold_start_failure_is_an_auth_error() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, Scripted::Respond(401, String::new()));

		let client = build_scripted_client(transport.clone(), true);
		let err = client.get("/payers/", None).await.expect_err("Token fetch failure must surface.");

		assert!(matches!(err, Error::Auth(AuthError::Rejected { status: 401, .. })));
		assert_eq!(transport.calls("/api/v4/payers/"), 0);
	}

	#[tokio::test]
	async fn expired_token_is_refreshed_and_retried_once() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, token_body("t-1"));
		transport.push(TOKEN_PATH, token_body("t-2"));
		transport.push(ELIGIBILITY_PATH, Scripted::Respond(401, String::new()));
		transport.push(ELIGIBILITY_PATH, Scripted::Respond(200, "{\"data\":{\"ok\":\"yes\"}}".into()));

		let client = build_scripted_client(transport.clone(), true);
		let response = client.post("/eligibility/", None).await.expect("Request should resolve.");
		let retried = transport
			.requests()
			.into_iter()
			.filter(|request| request.url.path() == ELIGIBILITY_PATH)
			.map(|request| request.headers.get(AUTHORIZATION).map(str::to_owned))
			.collect::<Vec<_>>();

		assert!(response.succeeded);
		assert_eq!(response.json_or_empty()["data"]["ok"], "yes");
		assert_eq!(retried, [Some("Bearer t-1".to_owned()), Some("Bearer t-2".to_owned())]);
		assert_eq!(transport.calls(TOKEN_PATH), 2);
		assert_eq!(client.access_token().map(|token| token.secret), Some("t-2".into()));
	}

	#[tokio::test]
	async fn second_expiry_is_returned_without_another_retry() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, token_body("t-1"));
		transport.push(TOKEN_PATH, token_body("t-2"));
		transport.push(ELIGIBILITY_PATH, Scripted::Respond(401, String::new()));
		transport.push(ELIGIBILITY_PATH, Scripted::Respond(401, String::new()));

		let client = build_scripted_client(transport.clone(), true);
		let response = client.post("/eligibility/", None).await.expect("Request should resolve.");

		assert!(!response.succeeded);
		assert!(response.token_expired);
		assert_eq!(transport.calls(ELIGIBILITY_PATH), 2);
		assert_eq!(transport.calls(TOKEN_PATH), 2);
	}

	#[tokio::test]
	async fn expiry_without_auto_refresh_is_terminal() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, token_body("t-1"));
		transport.push(ELIGIBILITY_PATH, Scripted::Respond(401, String::new()));

		let client = build_scripted_client(transport.clone(), false);
		let response = client.post("/eligibility/", None).await.expect("Request should resolve.");

		assert!(!response.succeeded);
		assert!(response.token_expired);
		assert_eq!(transport.calls(ELIGIBILITY_PATH), 1);
		assert_eq!(transport.calls(TOKEN_PATH), 1);
	}

	#[tokio::test]
	async fn failed_refresh_returns_the_original_expiry() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, token_body("t-1"));
		transport.push(TOKEN_PATH, Scripted::Fail("token endpoint down".into()));
		transport.push(ELIGIBILITY_PATH, Scripted::Respond(401, String::new()));

		let client = build_scripted_client(transport.clone(), true);
		let response = client.post("/eligibility/", None).await.expect("Request should resolve.");

		assert!(response.token_expired);
		assert_eq!(transport.calls(ELIGIBILITY_PATH), 1);
		assert_eq!(client.access_token().map(|token| token.secret), Some("t-1".into()));
	}

	#[tokio::test]
	async fn encoding_failures_are_not_sent() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, token_body("t-1"));

		let client = build_scripted_client(transport.clone(), true);
		let files = [FileAttachment::from_path("/missing/claims.837", "application/EDI-X12")];
		let err = client
			.request("/claims/convert", Method::Post, None, &files)
			.await
			.expect_err("Unreadable attachments must fail the attempt.");

		assert!(matches!(err, Error::Encoding(EncodingError::FileRead { .. })));
		assert_eq!(transport.calls("/api/v4/claims/convert"), 0);
	}

	#[tokio::test]
	async fn paths_without_leading_slash_are_joined() {
		let transport = Arc::new(ScriptedHttpClient::default());
		let client = build_scripted_client(transport, false);

		assert_eq!(
			client.url_for("identity/abc/history/").expect("URL should build.").path(),
			"/api/v4/identity/abc/history/"
		);
	}
}
