//! Request parameter trees and their query-string / JSON encodings.
//!
//! Parameters form a closed tree: every leaf is a string or a list of strings, and every inner
//! node is a string-keyed map. Richer shapes (numbers, booleans, null) must be rendered to
//! strings by the caller; [`Params::try_from`] rejects them instead of coercing.

// std
use std::collections::btree_map;
// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, error::EncodingError};

/// One parameter value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// Plain string.
	String(String),
	/// Array of strings; joined with `,` in query strings.
	List(Vec<String>),
	/// Nested map; query-encoded recursively in query strings.
	Map(Params),
}
impl ParamValue {
	/// Renders the value for placement on the right-hand side of a query pair.
	pub fn to_query_value(&self) -> String {
		match self {
			Self::String(value) => value.clone(),
			Self::List(items) => items.join(","),
			Self::Map(child) => encode_query(child),
		}
	}
}
impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}
impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}
impl From<Vec<String>> for ParamValue {
	fn from(items: Vec<String>) -> Self {
		Self::List(items)
	}
}
impl From<Vec<&str>> for ParamValue {
	fn from(items: Vec<&str>) -> Self {
		Self::List(items.into_iter().map(str::to_owned).collect())
	}
}
impl From<Params> for ParamValue {
	fn from(child: Params) -> Self {
		Self::Map(child)
	}
}

/// String-keyed parameter map.
///
/// Keys are kept sorted; the platform treats parameter order as insignificant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);
impl Params {
	/// Creates an empty map.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a value, returning the map for chaining.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.insert(key, value);

		self
	}

	/// Inserts or replaces a value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
		self.0.insert(key.into(), value.into());
	}

	/// Looks up a value by key.
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.0.get(key)
	}

	/// Returns `true` when no parameters are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of top-level keys.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Iterates over top-level pairs in key order.
	pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
		self.0.iter()
	}
}
impl<'a> IntoIterator for &'a Params {
	type IntoIter = btree_map::Iter<'a, String, ParamValue>;
	type Item = (&'a String, &'a ParamValue);

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: Into<ParamValue>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}
impl TryFrom<JsonValue> for Params {
	type Error = EncodingError;

	fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
		match value {
			JsonValue::Object(map) => object_to_params(map, ""),
			_ => Err(EncodingError::ParamsNotObject),
		}
	}
}

/// Encodes `params` as an `application/x-www-form-urlencoded` string (`k=v&k2=v2`).
///
/// Both keys and values are percent-encoded, so the reserved characters produced by nested
/// maps and lists survive a decode unchanged. An empty map yields an empty string.
pub fn encode_query(params: &Params) -> String {
	let mut serializer = form_urlencoded::Serializer::new(String::new());

	for (key, value) in params {
		serializer.append_pair(key, &value.to_query_value());
	}

	serializer.finish()
}

/// Serializes `params` as a JSON object.
pub fn encode_json_body(params: &Params) -> Result<Vec<u8>, EncodingError> {
	Ok(serde_json::to_vec(params)?)
}

fn object_to_params(
	map: serde_json::Map<String, JsonValue>,
	prefix: &str,
) -> Result<Params, EncodingError> {
	let mut params = Params::new();

	for (key, value) in map {
		let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
		let converted = match value {
			JsonValue::String(value) => ParamValue::String(value),
			JsonValue::Object(child) => ParamValue::Map(object_to_params(child, &path)?),
			JsonValue::Array(items) => ParamValue::List(
				items
					.into_iter()
					.map(|item| match item {
						JsonValue::String(value) => Ok(value),
						_ => Err(EncodingError::UnsupportedParam { key: path.clone() }),
					})
					.collect::<Result<_, _>>()?,
			),
			_ => return Err(EncodingError::UnsupportedParam { key: path }),
		};

		params.0.insert(key, converted);
	}

	Ok(params)
}
