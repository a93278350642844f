//! Transport primitives for platform calls.
//!
//! [`ApiHttpClient`] is the client's only dependency on an HTTP stack: it sends one
//! [`WireRequest`] and yields the status plus raw body, or a [`TransportError`]. [`execute`]
//! folds that outcome into an [`ApiResponse`], which is where status classification lives, so
//! custom transports never have to reproduce it.

// std
#[cfg(feature = "reqwest")] use std::{ops::Deref, time::Duration as StdDuration};
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{
	_prelude::*,
	error::TransportError,
	request::{Method, WireRequest},
};

/// Boxed future returned by [`ApiHttpClient::send`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + 'a + Send>>;

/// Parse failure recorded when a response body is not valid JSON.
pub type JsonParseError = serde_path_to_error::Error<serde_json::Error>;

/// Abstraction over HTTP transports capable of executing one platform request.
///
/// Implementations must resolve exactly once per call and must not retry on their own; the
/// client owns the single expiry retry. Timeouts are whatever the underlying stack applies.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the status code and full body.
	fn send(&self, request: WireRequest) -> HttpFuture<'_>;
}

/// Status code and body of a completed exchange, before classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}

/// Structured result of one request attempt.
///
/// - `succeeded` is `true` exactly when `status` is in `200..=299`.
/// - `token_expired` is `true` exactly when `status` is `401`; the body is then kept raw and not
///   parsed.
/// - `transport_error` is set, and `status` absent, when the exchange never completed.
#[derive(Debug, Default)]
pub struct ApiResponse {
	/// Whether the platform answered 2xx.
	pub succeeded: bool,
	/// HTTP status code, when a response arrived.
	pub status: Option<u16>,
	/// Raw response body, when a response arrived.
	pub body: Option<Vec<u8>>,
	/// Parsed JSON body, when the body was non-empty valid JSON.
	pub json: Option<JsonValue>,
	/// JSON parse failure for a non-empty body.
	pub parse_error: Option<JsonParseError>,
	/// Network failure that prevented a response.
	pub transport_error: Option<TransportError>,
	/// Whether the platform rejected the bearer token (HTTP 401).
	pub token_expired: bool,
}
impl ApiResponse {
	/// Classifies a transport outcome.
	pub fn from_outcome(outcome: Result<RawResponse, TransportError>) -> Self {
		let RawResponse { status, body } = match outcome {
			Ok(raw) => raw,
			Err(err) => return Self { transport_error: Some(err), ..Default::default() },
		};

		if status == 401 {
			return Self {
				status: Some(status),
				body: Some(body),
				token_expired: true,
				..Default::default()
			};
		}

		let (json, parse_error) = match parse_json(&body) {
			Ok(json) => (json, None),
			Err(err) => (None, Some(err)),
		};

		Self {
			succeeded: (200..=299).contains(&status),
			status: Some(status),
			body: Some(body),
			json,
			parse_error,
			transport_error: None,
			token_expired: false,
		}
	}

	/// Returns the parsed JSON body, or an empty object when there is none.
	pub fn json_or_empty(&self) -> JsonValue {
		self.json.clone().unwrap_or_else(|| JsonValue::Object(Default::default()))
	}

	/// Returns the body as UTF-8 text, when it is valid UTF-8.
	pub fn body_text(&self) -> Option<&str> {
		self.body.as_deref().and_then(|body| std::str::from_utf8(body).ok())
	}
}

/// Sends `request` through `client` and classifies the outcome.
pub async fn execute<C>(client: &C, request: WireRequest) -> ApiResponse
where
	C: ?Sized + ApiHttpClient,
{
	ApiResponse::from_outcome(client.send(request).await)
}

fn parse_json(body: &[u8]) -> Result<Option<JsonValue>, JsonParseError> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(None);
	}

	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de).map(Some)
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestHttpClient::with_timeout`] is what the client builder uses; every request then
/// resolves within the timeout. Proxies and TLS settings come from the wrapped client; configure
/// them on a custom [`ReqwestClient`] and pass it to [`ReqwestHttpClient::with_client`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Upper bound on connection establishment for clients built by [`Self::with_timeout`].
	pub const CONNECT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client whose requests fail with a transport error once `timeout` elapses.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.connect_timeout(timeout.min(Self::CONNECT_TIMEOUT))
			.build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	fn send(&self, request: WireRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let mut builder = self.0.request(reqwest_method(request.method), request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Delete => reqwest::Method::DELETE,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn raw(status: u16, body: &str) -> Result<RawResponse, TransportError> {
		Ok(RawResponse { status, body: body.as_bytes().to_vec() })
	}

	#[test]
	fn success_parses_json() {
		let response = ApiResponse::from_outcome(raw(200, "{\"data\":{\"valid\":true}}"));

		assert!(response.succeeded);
		assert!(!response.token_expired);
		assert_eq!(response.status, Some(200));
		assert_eq!(response.json, Some(serde_json::json!({ "data": { "valid": true } })));
		assert!(response.parse_error.is_none());
	}

	#[test]
	fn unauthorized_flags_expiry_and_skips_parsing() {
		let response = ApiResponse::from_outcome(raw(401, "{\"message\":\"TOKEN_EXPIRED\"}"));

		assert!(!response.succeeded);
		assert!(response.token_expired);
		assert!(response.json.is_none());
		assert_eq!(response.body_text(), Some("{\"message\":\"TOKEN_EXPIRED\"}"));
	}

	#[test]
	fn error_statuses_keep_error_detail() {
		let response = ApiResponse::from_outcome(raw(422, "{\"errors\":{\"npi\":\"invalid\"}}"));

		assert!(!response.succeeded);
		assert!(!response.token_expired);
		assert_eq!(response.json_or_empty()["errors"]["npi"], "invalid");
	}

	#[test]
	fn malformed_json_is_reported_not_thrown() {
		let response = ApiResponse::from_outcome(raw(200, "{\"data\": [1, }"));

		assert!(response.succeeded);
		assert!(response.json.is_none());
		assert!(response.parse_error.is_some());
		assert_eq!(response.json_or_empty(), serde_json::json!({}));
	}

	#[test]
	fn empty_bodies_are_not_parse_errors() {
		let response = ApiResponse::from_outcome(raw(204, ""));

		assert!(response.succeeded);
		assert!(response.json.is_none());
		assert!(response.parse_error.is_none());
	}

	#[test]
	fn transport_failures_carry_no_status() {
		let response = ApiResponse::from_outcome(Err(TransportError::Abandoned));

		assert!(!response.succeeded);
		assert_eq!(response.status, None);
		assert!(matches!(response.transport_error, Some(TransportError::Abandoned)));
	}
}
