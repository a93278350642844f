//! Client-level error types shared across encoding, transport, and token management.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Non-2xx responses (including an expired token) are not errors; they arrive as an
/// [`ApiResponse`](crate::http::ApiResponse) with `succeeded == false`.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token exchange failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Request could not be encoded.
	#[error(transparent)]
	Encoding(#[from] EncodingError),
	/// Transport failure outside of a resolved response.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Failures raised by the client-credentials exchange.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Token endpoint answered with a non-2xx status.
	#[error("Token endpoint rejected the client credentials with HTTP {status}.")]
	Rejected {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Parsed error body, when the endpoint returned JSON.
		body: Option<JsonValue>,
	},
	/// Token endpoint answered 2xx without a usable `access_token` field.
	#[error("Token endpoint response is missing the access_token field.")]
	MissingAccessToken {
		/// Parsed body, when the endpoint returned JSON.
		body: Option<JsonValue>,
	},
	/// Token endpoint answered 2xx with a body that is not JSON.
	#[error("Token endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Token endpoint could not be reached.
	#[error("Network error occurred while calling the token endpoint.")]
	Transport(#[source] TransportError),
	/// Token request could not be encoded.
	#[error("Token request could not be encoded.")]
	Encoding(#[source] EncodingError),
}

/// Configuration and validation failures raised while constructing or driving a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A required credential was empty.
	#[error("The {field} must not be empty.")]
	EmptyCredential {
		/// Which credential failed validation.
		field: &'static str,
	},
	/// Base path does not use HTTP(S).
	#[error("Base path must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base path that failed validation.
		url: String,
	},
	/// Base path cannot carry path segments.
	#[error("Base path cannot be used as a base URL: {url}.")]
	CannotBeABase {
		/// Base path that failed validation.
		url: String,
	},
	/// API version was empty or contained a path separator.
	#[error("API version `{version}` is invalid.")]
	InvalidApiVersion {
		/// Rejected version string.
		version: String,
	},
	/// Request timeout was zero, which would leave calls unbounded or failing instantly.
	#[error("Request timeout must be at least one second.")]
	ZeroRequestTimeout,
	/// Runtime backing the blocking facade could not be started.
	#[error("Blocking runtime could not be started.")]
	RuntimeBuild {
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Blocking facade was driven from inside an async runtime.
	#[error("Blocking client cannot be used from within an async runtime.")]
	BlockingInAsyncContext,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures that prevent a request from being encoded. None of them are retried.
#[derive(Debug, ThisError)]
pub enum EncodingError {
	/// A parameter value has a shape outside strings, string maps, and string arrays.
	#[error("Parameter `{key}` has an unsupported value shape.")]
	UnsupportedParam {
		/// Dotted path of the offending key.
		key: String,
	},
	/// The top-level parameter value was not a JSON object.
	#[error("Parameters must be a JSON object.")]
	ParamsNotObject,
	/// Parameters were supplied for a content type that has no encoder.
	#[error("Content type `{content_type}` cannot carry request parameters.")]
	UnsupportedContentType {
		/// Declared content type.
		content_type: String,
	},
	/// An attachment could not be read from disk.
	#[error("Attachment `{}` could not be read.", path.display())]
	FileRead {
		/// Path of the attachment.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// JSON serialization of the body failed.
	#[error("Request body could not be serialized as JSON.")]
	Json(#[from] serde_json::Error),
	/// Request URL could not be assembled.
	#[error("Request URL `{url}` is invalid.")]
	InvalidUrl {
		/// URL text that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Transport-level failures (network, IO, lost completion).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the platform.")]
	Io(#[from] std::io::Error),
	/// The in-flight request finished without signaling a result.
	#[error("Request completed without producing a response.")]
	Abandoned,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn auth_errors_convert_into_client_errors() {
		let err: Error = AuthError::Rejected { status: 400, body: None }.into();

		assert!(matches!(err, Error::Auth(AuthError::Rejected { status: 400, .. })));
		assert_eq!(
			err.to_string(),
			"Token endpoint rejected the client credentials with HTTP 400."
		);
	}

	#[test]
	fn file_read_errors_name_the_path() {
		let err = EncodingError::FileRead {
			path: PathBuf::from("/tmp/claims.837"),
			source: std::io::Error::from(std::io::ErrorKind::NotFound),
		};

		assert_eq!(err.to_string(), "Attachment `/tmp/claims.837` could not be read.");
	}
}
