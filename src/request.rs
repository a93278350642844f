//! Wire request model and the encoder that picks a body strategy per request.
//!
//! [`RequestBuilder`] applies, in priority order:
//!
//! 1. files present: `multipart/form-data` with a fresh boundary, overriding any caller
//!    `Content-Type`;
//! 2. `GET`: parameters query-encoded onto the URL, no body;
//! 3. anything else: the effective `Content-Type` (default `application/json`) selects JSON or
//!    form encoding; other content types cannot carry parameters.

// std
use std::collections::btree_map;
// self
use crate::{
	_prelude::*,
	error::EncodingError,
	multipart::{FILE_FIELD, FileAttachment, MultipartBody},
	params::{self, Params},
};

/// `Authorization` header name.
pub const AUTHORIZATION: &str = "authorization";
/// `Content-Type` header name.
pub const CONTENT_TYPE: &str = "content-type";
/// JSON media type, the default for body-bearing requests.
pub const APPLICATION_JSON: &str = "application/json";
/// Form media type used by the token exchange.
pub const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";

/// HTTP verbs used by the platform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`
	#[default]
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Header map with case-insensitive names (stored lowercased).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);
impl Headers {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a header, returning the map for chaining.
	pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
		self.insert(name, value);

		self
	}

	/// Inserts or replaces a header.
	pub fn insert(&mut self, name: &str, value: impl Into<String>) {
		self.0.insert(name.to_ascii_lowercase(), value.into());
	}

	/// Looks up a header by name, ignoring case.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Removes a header by name, ignoring case.
	pub fn remove(&mut self, name: &str) -> Option<String> {
		self.0.remove(&name.to_ascii_lowercase())
	}

	/// Overlays `other` onto `self`; entries from `other` win.
	pub fn merge(&mut self, other: &Headers) {
		for (name, value) in other {
			self.0.insert(name.clone(), value.clone());
		}
	}

	/// Iterates over `(lowercased name, value)` pairs.
	pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
		self.0.iter()
	}
}
impl<'a> IntoIterator for &'a Headers {
	type IntoIter = btree_map::Iter<'a, String, String>;
	type Item = (&'a String, &'a String);

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Fully encoded request handed to a transport. Built fresh for every attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireRequest {
	/// Absolute URL, including any query string.
	pub url: Url,
	/// HTTP verb.
	pub method: Method,
	/// Request headers.
	pub headers: Headers,
	/// Encoded body, if any.
	pub body: Option<Vec<u8>>,
}
impl WireRequest {
	/// Returns the body as UTF-8 text, when it is valid UTF-8.
	pub fn body_text(&self) -> Option<&str> {
		self.body.as_deref().and_then(|body| std::str::from_utf8(body).ok())
	}
}

/// Builder for [`WireRequest`] values.
#[derive(Debug)]
pub struct RequestBuilder<'a> {
	method: Method,
	url: Url,
	headers: Headers,
	params: Option<&'a Params>,
	files: &'a [FileAttachment],
}
impl<'a> RequestBuilder<'a> {
	/// Starts a request for `method` against the absolute `url`.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Headers::new(), params: None, files: &[] }
	}

	/// Overlays caller headers; later calls win over earlier ones.
	pub fn headers(mut self, headers: &Headers) -> Self {
		self.headers.merge(headers);

		self
	}

	/// Sets a single header.
	pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Attaches request parameters.
	pub fn params(mut self, params: Option<&'a Params>) -> Self {
		self.params = params;

		self
	}

	/// Attaches files, switching the request to multipart encoding when non-empty.
	pub fn files(mut self, files: &'a [FileAttachment]) -> Self {
		self.files = files;

		self
	}

	/// Encodes the request.
	pub fn build(self) -> Result<WireRequest, EncodingError> {
		let Self { method, mut url, mut headers, params, files } = self;

		if !files.is_empty() {
			let mut body = MultipartBody::new();

			if let Some(params) = params {
				for (key, value) in params {
					body.field(key, &value.to_query_value());
				}
			}
			for file in files {
				body.file(FILE_FIELD, file)?;
			}

			headers.insert(CONTENT_TYPE, body.content_type());

			return Ok(WireRequest { url, method, headers, body: Some(body.finish()) });
		}

		if method == Method::Get {
			if let Some(params) = params {
				append_query(&mut url, &params::encode_query(params));
			}

			return Ok(WireRequest { url, method, headers, body: None });
		}

		let content_type = headers.get(CONTENT_TYPE).unwrap_or(APPLICATION_JSON).to_owned();
		let body = match params {
			None => None,
			Some(params) => Some(match media_type(&content_type).as_str() {
				APPLICATION_JSON => params::encode_json_body(params)?,
				APPLICATION_FORM => params::encode_query(params).into_bytes(),
				_ => return Err(EncodingError::UnsupportedContentType { content_type }),
			}),
		};

		if body.is_some() && headers.get(CONTENT_TYPE).is_none() {
			headers.insert(CONTENT_TYPE, APPLICATION_JSON);
		}

		Ok(WireRequest { url, method, headers, body })
	}
}

fn append_query(url: &mut Url, query: &str) {
	if query.is_empty() {
		return;
	}

	let merged = match url.query() {
		Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
		_ => query.to_owned(),
	};

	url.set_query(Some(&merged));
}

fn media_type(content_type: &str) -> String {
	content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn url(path: &str) -> Url {
		Url::parse(&format!("https://platform.test/api/v4{path}")).expect("Test URL should parse.")
	}

	#[test]
	fn get_appends_query_and_omits_body() {
		let params = Params::new().with("cpt_code", "99385").with("zip_code", "29485");
		let request = RequestBuilder::new(Method::Get, url("/prices/cash"))
			.params(Some(&params))
			.build()
			.expect("GET request should build.");

		assert_eq!(request.url.path(), "/api/v4/prices/cash");
		assert_eq!(request.url.query(), Some("cpt_code=99385&zip_code=29485"));
		assert_eq!(request.body, None);
	}

	#[test]
	fn get_without_params_keeps_url_clean() {
		let empty = Params::new();
		let request = RequestBuilder::new(Method::Get, url("/providers/1467560003"))
			.params(Some(&empty))
			.build()
			.expect("GET request should build.");

		assert_eq!(request.url.as_str(), "https://platform.test/api/v4/providers/1467560003");
	}

	#[test]
	fn post_defaults_to_json() {
		let params = Params::new().with("trading_partner_id", "MOCKPAYER");
		let request = RequestBuilder::new(Method::Post, url("/eligibility/"))
			.params(Some(&params))
			.build()
			.expect("POST request should build.");
		let body: JsonValue =
			serde_json::from_slice(request.body.as_deref().expect("JSON body should be set."))
				.expect("Body should be JSON.");

		assert_eq!(body, json!({ "trading_partner_id": "MOCKPAYER" }));
		assert_eq!(request.headers.get("Content-Type"), Some(APPLICATION_JSON));
	}

	#[test]
	fn form_content_type_encodes_params_as_query_body() {
		let params = Params::new().with("grant_type", "client_credentials");
		let request = RequestBuilder::new(Method::Post, url("/token"))
			.header("Content-Type", APPLICATION_FORM)
			.params(Some(&params))
			.build()
			.expect("Form request should build.");

		assert_eq!(request.body_text(), Some("grant_type=client_credentials"));
	}

	#[test]
	fn unknown_content_type_with_params_is_rejected() {
		let params = Params::new().with("a", "b");
		let err = RequestBuilder::new(Method::Put, url("/ccd/"))
			.header(CONTENT_TYPE, "text/xml")
			.params(Some(&params))
			.build()
			.expect_err("text/xml has no parameter encoder.");

		assert!(matches!(err, EncodingError::UnsupportedContentType { ref content_type } if content_type == "text/xml"));
	}

	#[test]
	fn files_force_multipart_over_caller_content_type() {
		let params = Params::new().with("trading_partner_id", "MOCKPAYER");
		let files = [FileAttachment::from_bytes("snapshot.834", b"ISA~".to_vec(), "application/EDI-X12")];
		let request = RequestBuilder::new(Method::Post, url("/enrollment/snapshot"))
			.header(CONTENT_TYPE, APPLICATION_JSON)
			.params(Some(&params))
			.files(&files)
			.build()
			.expect("Multipart request should build.");
		let content_type = request.headers.get(CONTENT_TYPE).expect("Content type should be set.");
		let boundary = content_type
			.strip_prefix("multipart/form-data; boundary=")
			.expect("Content type should be multipart.");
		let body = request.body_text().expect("Multipart body should be UTF-8 here.");

		assert!(body.starts_with(&format!("--{boundary}\r\n")));
		assert!(body.contains("name=\"trading_partner_id\"\r\n\r\nMOCKPAYER\r\n"));
		assert!(body.contains("name=\"file\"; filename=\"snapshot.834\""));
		assert!(body.ends_with(&format!("ISA~\r\n--{boundary}--\r\n")));
	}

	#[test]
	fn headers_are_case_insensitive_and_mergeable() {
		let mut base = Headers::new().with("Content-Type", APPLICATION_JSON).with("X-Trace", "1");

		base.merge(&Headers::new().with("content-type", APPLICATION_FORM));

		assert_eq!(base.get("CONTENT-TYPE"), Some(APPLICATION_FORM));
		assert_eq!(base.get("x-trace"), Some("1"));
	}
}
