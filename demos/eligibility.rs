//! Checks a member's eligibility against a mock platform with the async client and the default
//! reqwest transport, refreshing the token once when the seeded one is reported expired.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use pokitdok::{
	client::Client, endpoints::ApiCall, http::ReqwestHttpClient, params::Params, reqwest, url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":3600}");
		})
		.await;
	let expired_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/eligibility/").header("authorization", "Bearer expired");
			then.status(401).body("{\"message\":\"TOKEN_EXPIRED\"}");
		})
		.await;
	let eligibility_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v4/eligibility/").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"data\":{\"coverage\":{\"active\":true,\"plan_description\":\"PPO\"}}}");
		})
		.await;
	let http_client = ReqwestHttpClient::with_client(
		reqwest::Client::builder().user_agent("pokitdok-demo").build()?,
	);
	let client = Client::builder("demo-client", "demo-secret")
		.base_path(Url::parse(&server.base_url())?)
		.auto_refresh_token(true)
		.access_token("expired")
		.build_with_http_client(http_client)?;
	let params = Params::try_from(json!({
		"member": {
			"id": "W000000000",
			"first_name": "Jane",
			"last_name": "Doe",
			"birth_date": "1970-01-25"
		},
		"provider": { "npi": "1467560003" },
		"trading_partner_id": "MOCKPAYER"
	}))?;
	let response = client.call(&ApiCall::eligibility(params)).await?;

	println!(
		"Eligibility answered HTTP {:?}; active coverage: {}.",
		response.status,
		response.json_or_empty()["data"]["coverage"]["active"]
	);

	token_mock.assert_async().await;
	expired_mock.assert_async().await;
	eligibility_mock.assert_async().await;

	Ok(())
}
