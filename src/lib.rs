//! PokitDok platform client: OAuth 2.0 client-credentials authentication, a one-shot token
//! refresh when the platform reports an expired token, and JSON/form/multipart request encoding.
//!
//! The async [`client::Client`] is the engine; [`blocking::BlockingClient`] wraps it for callers
//! that want a single resolved result per call without touching an executor.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
#[cfg(feature = "blocking")] pub mod blocking;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod multipart;
pub mod obs;
pub mod params;
pub mod request;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and a scripted transport for tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use std::collections::HashMap;

	pub use parking_lot::Mutex;

	pub use crate::{_prelude::*, error::Error};

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		client::Client,
		config::ClientBuilder,
		error::TransportError,
		http::{ApiHttpClient, HttpFuture, RawResponse},
		request::WireRequest,
	};

	/// Base URL used by clients built with [`build_scripted_client`].
	pub const SCRIPTED_BASE: &str = "https://platform.test";

	/// Outcome replayed by [`ScriptedHttpClient`] for one request.
	#[derive(Debug)]
	pub enum Scripted {
		/// Respond with the given status and body.
		Respond(u16, String),
		/// Fail at the network layer.
		Fail(String),
	}

	/// Fake transport that replays scripted outcomes per path and records every request.
	#[derive(Debug, Default)]
	pub struct ScriptedHttpClient {
		routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
		seen: Mutex<Vec<WireRequest>>,
	}
	impl ScriptedHttpClient {
		/// Queues an outcome for the next request whose URL path equals `path`.
		pub fn push(&self, path: &str, outcome: Scripted) {
			self.routes.lock().entry(path.into()).or_default().push_back(outcome);
		}

		/// Returns every request observed so far.
		pub fn requests(&self) -> Vec<WireRequest> {
			self.seen.lock().clone()
		}

		/// Counts the requests observed for `path`.
		pub fn calls(&self, path: &str) -> usize {
			self.seen.lock().iter().filter(|request| request.url.path() == path).count()
		}
	}
	impl ApiHttpClient for ScriptedHttpClient {
		fn send(&self, request: WireRequest) -> HttpFuture<'_> {
			Box::pin(async move {
				let path = request.url.path().to_owned();

				self.seen.lock().push(request);

				let next = self.routes.lock().get_mut(&path).and_then(VecDeque::pop_front);

				match next {
					Some(Scripted::Respond(status, body)) =>
						Ok(RawResponse { status, body: body.into_bytes() }),
					Some(Scripted::Fail(message)) => Err(TransportError::network(
						std::io::Error::new(std::io::ErrorKind::ConnectionRefused, message),
					)),
					None => Ok(RawResponse {
						status: 404,
						body: format!("{{\"error\":\"no scripted response for {path}\"}}")
							.into_bytes(),
					}),
				}
			})
		}
	}

	/// Builds a client against [`SCRIPTED_BASE`] that talks to `transport`.
	pub fn build_scripted_client(
		transport: Arc<ScriptedHttpClient>,
		auto_refresh: bool,
	) -> Client<ScriptedHttpClient> {
		ClientBuilder::new("scripted-id", "scripted-secret")
			.base_path(Url::parse(SCRIPTED_BASE).expect("Scripted base URL should parse."))
			.auto_refresh_token(auto_refresh)
			.build_with_http_client(transport)
			.expect("Scripted client should build.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::Result;
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
