//! Uploads an X12 837 claims file through the blocking client and prints the converted claims.

// std
use std::{env, fs};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use pokitdok::{blocking::BlockingClient, config::ClientConfig, endpoints::ApiCall, url::Url};

fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start();
	let token_mock = server.mock(|when, then| {
		when.method(POST).path("/oauth2/token");
		then.status(200).body("{\"access_token\":\"demo-access\"}");
	});
	let convert_mock = server.mock(|when, then| {
		when.method(POST).path("/api/v4/claims/convert").header("authorization", "Bearer demo-access");
		then.status(200)
			.header("content-type", "application/json")
			.body("{\"data\":{\"claims\":[{\"claim_number\":\"26403774\"}]}}");
	});
	let claims_file = env::temp_dir().join("pokitdok-demo-claims.837");

	fs::write(&claims_file, "ISA*00*          *00*          *ZZ*SUBMITTERID    *ZZ*RECEIVERID     ~")?;

	let mut config = ClientConfig::new("demo-client", "demo-secret");

	config.base_path = Url::parse(&server.base_url())?;

	let client = BlockingClient::new(config)?;
	let response = client.call(&ApiCall::claims_convert(&claims_file))?;

	fs::remove_file(&claims_file)?;

	println!("Converted claims: {}.", response.json_or_empty()["data"]["claims"]);

	token_mock.assert();
	convert_mock.assert();

	Ok(())
}
