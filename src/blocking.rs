//! Blocking facade over the async [`Client`].
//!
//! Every call is spawned onto a runtime owned by the facade and the calling thread parks on a
//! one-shot channel until the task reports its single result. Nothing here adds timeouts; a call
//! is bounded by whatever the transport applies.
//!
//! The facade may be dropped anywhere, including from async code; the runtime then shuts down
//! in the background instead of blocking the caller's worker.

// crates.io
use tokio::{
	runtime::{Builder, Handle, Runtime},
	sync::oneshot,
};
// self
#[cfg(feature = "reqwest")] use crate::{config::ClientConfig, http::ReqwestHttpClient};
use crate::{
	_prelude::*,
	auth::AccessToken,
	client::Client,
	endpoints::ApiCall,
	error::{ConfigError, TransportError},
	http::{ApiHttpClient, ApiResponse},
	multipart::FileAttachment,
	params::Params,
	request::{Headers, Method},
};

/// Synchronous platform client.
///
/// Must not be used from inside an async runtime; such calls fail with
/// [`ConfigError::BlockingInAsyncContext`] instead of deadlocking.
pub struct BlockingClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	inner: Client<C>,
	runtime: Arc<OwnedRuntime>,
}
impl<C> BlockingClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Wraps an async client, starting a dedicated single-worker runtime.
	pub fn from_async(inner: Client<C>) -> Result<Self, ConfigError> {
		let runtime = Builder::new_multi_thread()
			.worker_threads(1)
			.thread_name("pokitdok-blocking")
			.enable_all()
			.build()
			.map_err(|source| ConfigError::RuntimeBuild { source })?;

		Ok(Self { inner, runtime: Arc::new(OwnedRuntime::new(runtime)) })
	}

	/// Underlying async client; shares its token with this facade.
	pub fn as_async(&self) -> &Client<C> {
		&self.inner
	}

	/// Currently stored access token, if any.
	pub fn access_token(&self) -> Option<AccessToken> {
		self.inner.access_token()
	}

	/// Forces a client-credentials exchange and stores the new token.
	pub fn refresh_token(&self) -> Result<AccessToken> {
		let client = self.inner.clone();

		self.resolve(async move { client.refresh_token().await })
	}

	/// Blocking form of [`Client::request`].
	pub fn request(
		&self,
		path: &str,
		method: Method,
		params: Option<&Params>,
		files: &[FileAttachment],
	) -> Result<ApiResponse> {
		self.call(&ApiCall {
			path: path.into(),
			method,
			headers: Headers::new(),
			params: params.cloned(),
			files: files.to_vec(),
		})
	}

	/// Blocking form of [`Client::call`].
	pub fn call(&self, call: &ApiCall) -> Result<ApiResponse> {
		let client = self.inner.clone();
		let call = call.clone();

		self.resolve(async move { client.call(&call).await })
	}

	/// Convenience `GET`.
	pub fn get(&self, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
		self.request(path, Method::Get, params, &[])
	}

	/// Convenience `POST`.
	pub fn post(&self, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
		self.request(path, Method::Post, params, &[])
	}

	/// Convenience `PUT`.
	pub fn put(&self, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
		self.request(path, Method::Put, params, &[])
	}

	/// Convenience `DELETE`.
	pub fn delete(&self, path: &str, params: Option<&Params>) -> Result<ApiResponse> {
		self.request(path, Method::Delete, params, &[])
	}

	fn resolve<T, F>(&self, fut: F) -> Result<T>
	where
		T: 'static + Send,
		F: 'static + Send + Future<Output = Result<T>>,
	{
		if Handle::try_current().is_ok() {
			return Err(ConfigError::BlockingInAsyncContext.into());
		}

		let (tx, rx) = oneshot::channel();

		self.runtime.handle.spawn(async move {
			// The receiver only disappears if the caller's thread is gone.
			let _ = tx.send(fut.await);
		});

		rx.blocking_recv().map_err(|_| TransportError::Abandoned)?
	}
}
#[cfg(feature = "reqwest")]
impl BlockingClient<ReqwestHttpClient> {
	/// Creates a blocking client over a default reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
		Self::from_async(Client::new(config)?)
	}
}
impl<C> Clone for BlockingClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone(), runtime: self.runtime.clone() }
	}
}
impl<C> Debug for BlockingClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BlockingClient").field("inner", &self.inner).finish()
	}
}

struct OwnedRuntime {
	handle: Handle,
	runtime: Option<Runtime>,
}
impl OwnedRuntime {
	fn new(runtime: Runtime) -> Self {
		Self { handle: runtime.handle().clone(), runtime: Some(runtime) }
	}
}
impl Drop for OwnedRuntime {
	fn drop(&mut self) {
		let Some(runtime) = self.runtime.take() else { return };

		// Blocking shutdown panics on an async worker.
		if Handle::try_current().is_ok() {
			runtime.shutdown_background();
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{Scripted, ScriptedHttpClient, build_scripted_client},
		error::Error,
		request::AUTHORIZATION,
	};

	const TOKEN_PATH: &str = "/oauth2/token";

	fn blocking(
		transport: Arc<ScriptedHttpClient>,
		auto_refresh: bool,
	) -> BlockingClient<ScriptedHttpClient> {
		BlockingClient::from_async(build_scripted_client(transport, auto_refresh))
			.expect("Blocking runtime should start.")
	}

	#[test]
	fn request_resolves_on_the_calling_thread() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, Scripted::Respond(200, "{\"access_token\":\"t-1\"}".into()));
		transport.push("/api/v4/providers/1467560003", Scripted::Respond(200, "{\"data\":{}}".into()));

		let client = blocking(transport.clone(), false);
		let response = client.get("/providers/1467560003", None).expect("Request should resolve.");
		let requests = transport.requests();

		assert!(response.succeeded);
		assert_eq!(requests[1].method, Method::Get);
		assert_eq!(requests[1].body, None);
		assert_eq!(requests[1].headers.get(AUTHORIZATION), Some("Bearer t-1"));
	}

	#[test]
	fn retry_protocol_matches_the_async_client() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, Scripted::Respond(200, "{\"access_token\":\"t-1\"}".into()));
		transport.push(TOKEN_PATH, Scripted::Respond(200, "{\"access_token\":\"t-2\"}".into()));
		transport.push("/api/v4/payers/", Scripted::Respond(401, String::new()));
		transport.push("/api/v4/payers/", Scripted::Respond(200, "{\"data\":[]}".into()));

		let client = blocking(transport.clone(), true);
		let response = client.call(&ApiCall::payers(None)).expect("Call should resolve.");

		assert!(response.succeeded);
		assert_eq!(transport.calls("/api/v4/payers/"), 2);
		assert_eq!(transport.calls(TOKEN_PATH), 2);
		assert_eq!(client.access_token().map(|token| token.secret), Some("t-2".into()));
	}

	#[test]
	fn cold_start_failures_are_returned() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, Scripted::Fail("unreachable".into()));

		let err = blocking(transport, true).post("/claims/", None).expect_err("Token fetch fails.");

		assert!(matches!(err, Error::Auth(_)));
	}

	#[test]
	fn use_inside_a_runtime_is_refused() {
		let client = blocking(Arc::new(ScriptedHttpClient::default()), false);
		let outer = Builder::new_current_thread().build().expect("Outer runtime should start.");
		let err = outer
			.block_on(async { client.refresh_token() })
			.expect_err("Blocking from async context must fail.");

		assert!(matches!(err, Error::Config(ConfigError::BlockingInAsyncContext)));
	}

	#[test]
	fn dropping_inside_a_runtime_does_not_panic() {
		let client = blocking(Arc::new(ScriptedHttpClient::default()), false);
		let copy = client.clone();
		let outer = Builder::new_current_thread().build().expect("Outer runtime should start.");

		outer.block_on(async move { drop(client) });

		assert!(copy.access_token().is_none());

		outer.block_on(async move { drop(copy) });
	}

	#[test]
	fn dropping_outside_a_runtime_still_works_after_calls() {
		let transport = Arc::new(ScriptedHttpClient::default());

		transport.push(TOKEN_PATH, Scripted::Respond(200, "{\"access_token\":\"t-1\"}".into()));

		let client = blocking(transport, false);

		client.refresh_token().expect("Refresh should resolve.");

		drop(client);
	}
}
