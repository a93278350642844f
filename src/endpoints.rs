//! Platform endpoint catalog.
//!
//! Each constructor only fixes a path template and a verb; issuing the call goes through
//! [`Client::call`](crate::client::Client::call) like any other request.

// std
use std::path::PathBuf;
// self
use crate::{
	multipart::FileAttachment,
	params::Params,
	request::{Headers, Method},
};

/// Media type of X12 EDI uploads.
pub const APPLICATION_EDI_X12: &str = "application/EDI-X12";

/// Path, verb, and payload of one platform call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCall {
	/// Path relative to the API base, e.g. `/eligibility/`.
	pub path: String,
	/// HTTP verb.
	pub method: Method,
	/// Extra headers layered over the client defaults.
	pub headers: Headers,
	/// Request parameters.
	pub params: Option<Params>,
	/// Files uploaded as `multipart/form-data`.
	pub files: Vec<FileAttachment>,
}
impl ApiCall {
	/// Describes a call without parameters.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { path: path.into(), method, headers: Headers::new(), params: None, files: Vec::new() }
	}

	/// Attaches parameters.
	pub fn with_params(mut self, params: Params) -> Self {
		self.params = Some(params);

		self
	}

	/// Attaches parameters when present.
	pub fn with_optional_params(mut self, params: Option<Params>) -> Self {
		self.params = params;

		self
	}

	/// Adds a file upload.
	pub fn with_file(mut self, file: FileAttachment) -> Self {
		self.files.push(file);

		self
	}

	/// Sets a header, e.g. `Content-Type: application/x-www-form-urlencoded` for a form post.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Platform activity information.
	pub fn activities(activity_id: Option<&str>, params: Option<Params>) -> Self {
		Self::new(Method::Get, format!("/activities/{}", segment(activity_id)))
			.with_optional_params(params)
	}

	/// Submits an authorization request.
	pub fn authorizations(params: Option<Params>) -> Self {
		Self::new(Method::Post, "/authorizations/").with_optional_params(params)
	}

	/// Cash prices for a procedure in a geographic area.
	pub fn cash_prices(cpt_code: &str, zip_code: &str) -> Self {
		Self::new(Method::Get, "/prices/cash").with_params(price_query(cpt_code, zip_code))
	}

	/// Retrieves a continuity of care document.
	pub fn ccd(params: Params) -> Self {
		Self::new(Method::Post, "/ccd/").with_params(params)
	}

	/// Submits a claim.
	pub fn claims(params: Params) -> Self {
		Self::new(Method::Post, "/claims/").with_params(params)
	}

	/// Checks the status of a submitted claim.
	pub fn claims_status(params: Params) -> Self {
		Self::new(Method::Post, "/claims/status").with_params(params)
	}

	/// Converts an X12 837 file into JSON claims.
	pub fn claims_convert(x12_claims_file: impl Into<PathBuf>) -> Self {
		Self::new(Method::Post, "/claims/convert")
			.with_file(FileAttachment::from_path(x12_claims_file, APPLICATION_EDI_X12))
	}

	/// Determines eligibility for a member and provider.
	pub fn eligibility(params: Params) -> Self {
		Self::new(Method::Post, "/eligibility/").with_params(params)
	}

	/// Submits a benefits enrollment.
	pub fn enrollment(params: Params) -> Self {
		Self::new(Method::Post, "/enrollment").with_params(params)
	}

	/// Establishes an X12 834 file as a trading partner's current enrollment snapshot.
	pub fn enrollment_snapshot(trading_partner_id: &str, x12_file: impl Into<PathBuf>) -> Self {
		Self::new(Method::Post, "/enrollment/snapshot")
			.with_params(Params::new().with("trading_partner_id", trading_partner_id))
			.with_file(FileAttachment::from_path(x12_file, APPLICATION_EDI_X12))
	}

	/// Lists enrollment snapshots, or fetches one.
	pub fn enrollment_snapshots(snapshot_id: Option<&str>, params: Option<Params>) -> Self {
		Self::new(Method::Get, format!("/enrollment/snapshot/{}", segment(snapshot_id)))
			.with_optional_params(params)
	}

	/// Enrollment records extracted from a snapshot.
	pub fn enrollment_snapshot_data(snapshot_id: &str) -> Self {
		Self::new(Method::Get, format!("/enrollment/snapshot/{snapshot_id}/data"))
	}

	/// Maps an ICD-9 code to ICD-10.
	pub fn icd_convert(code: &str) -> Self {
		Self::new(Method::Get, format!("/icd/convert/{code}"))
	}

	/// Insurance prices for a procedure in a geographic area.
	pub fn insurance_prices(cpt_code: &str, zip_code: &str) -> Self {
		Self::new(Method::Get, "/prices/insurance").with_params(price_query(cpt_code, zip_code))
	}

	/// Medical procedure code information, looked up by code or searched by name/description.
	pub fn mpc(code: Option<&str>, name: Option<&str>, description: Option<&str>) -> Self {
		let mut params = Params::new();

		if let Some(name) = name {
			params.insert("name", name);
		}
		if let Some(description) = description {
			params.insert("description", description);
		}

		Self::new(Method::Get, format!("/mpc/{}", segment(code))).with_params(params)
	}

	/// Loads insurance prices used by out-of-pocket estimates.
	pub fn oop_load_price(params: Option<Params>) -> Self {
		Self::new(Method::Post, "/oop/insurance-load-price").with_optional_params(params)
	}

	/// Estimates a member's out-of-pocket cost.
	pub fn oop_estimate(params: Option<Params>) -> Self {
		Self::new(Method::Post, "/oop/insurance-estimate").with_optional_params(params)
	}

	/// Payer directory.
	pub fn payers(params: Option<Params>) -> Self {
		Self::new(Method::Get, "/payers/").with_optional_params(params)
	}

	/// Insurance plan search.
	pub fn plans(params: Option<Params>) -> Self {
		Self::new(Method::Get, "/plans").with_optional_params(params)
	}

	/// Provider search, or a single provider by NPI.
	pub fn providers(npi: Option<&str>, params: Option<Params>) -> Self {
		Self::new(Method::Get, format!("/providers/{}", segment(npi))).with_optional_params(params)
	}

	/// Trading partner directory, or a single trading partner.
	pub fn trading_partners(trading_partner_id: Option<&str>) -> Self {
		Self::new(Method::Get, format!("/tradingpartners/{}", segment(trading_partner_id)))
	}

	/// Submits a referral request.
	pub fn referrals(params: Option<Params>) -> Self {
		Self::new(Method::Post, "/referrals/").with_optional_params(params)
	}

	/// Scheduling systems, or one by UUID.
	pub fn schedulers(scheduler_uuid: Option<&str>) -> Self {
		Self::new(Method::Get, format!("/schedule/schedulers/{}", segment(scheduler_uuid)))
	}

	/// Appointment types, or one by UUID.
	pub fn appointment_types(appointment_type_uuid: Option<&str>) -> Self {
		Self::new(
			Method::Get,
			format!("/schedule/appointmenttypes/{}", segment(appointment_type_uuid)),
		)
	}

	/// Creates open appointment slots.
	pub fn schedule_slots(params: Option<Params>) -> Self {
		Self::new(Method::Post, "/schedule/slots/").with_optional_params(params)
	}

	/// Appointment search, or one appointment by UUID.
	pub fn appointments(appointment_uuid: Option<&str>, params: Option<Params>) -> Self {
		Self::new(Method::Get, format!("/schedule/appointments/{}", segment(appointment_uuid)))
			.with_optional_params(params)
	}

	/// Books an open slot.
	pub fn book_appointment(appointment_uuid: &str, params: Params) -> Self {
		Self::new(Method::Put, format!("/schedule/appointments/{appointment_uuid}"))
			.with_params(params)
	}

	/// Updates a booked appointment.
	pub fn update_appointment(appointment_uuid: &str, params: Params) -> Self {
		Self::new(Method::Put, format!("/schedule/appointments/{appointment_uuid}"))
			.with_params(params)
	}

	/// Cancels an appointment.
	pub fn cancel_appointment(appointment_uuid: &str) -> Self {
		Self::new(Method::Delete, format!("/schedule/appointments/{appointment_uuid}"))
	}

	/// Creates an identity resource.
	pub fn create_identity(params: Params) -> Self {
		Self::new(Method::Post, "/identity/").with_params(params)
	}

	/// Updates an identity resource.
	pub fn update_identity(identity_uuid: &str, params: Params) -> Self {
		Self::new(Method::Put, format!("/identity/{identity_uuid}")).with_params(params)
	}

	/// Identity search, or one identity by UUID.
	pub fn identity(identity_uuid: Option<&str>, params: Option<Params>) -> Self {
		Self::new(Method::Get, format!("/identity/{}", segment(identity_uuid)))
			.with_optional_params(params)
	}

	/// Change history of an identity, or one historical version.
	pub fn identity_history(identity_uuid: &str, historical_version: Option<&str>) -> Self {
		Self::new(
			Method::Get,
			format!("/identity/{identity_uuid}/history/{}", segment(historical_version)),
		)
	}

	/// Matches identity data against stored identities.
	pub fn identity_match(params: Params) -> Self {
		Self::new(Method::Post, "/identity/match").with_params(params)
	}

	/// Pharmacy benefit plan information.
	pub fn pharmacy_plans(params: Option<Params>) -> Self {
		Self::new(Method::Get, "/pharmacy/plans").with_optional_params(params)
	}

	/// Drug formulary information.
	pub fn pharmacy_formulary(params: Option<Params>) -> Self {
		Self::new(Method::Get, "/pharmacy/formulary").with_optional_params(params)
	}

	/// In-network pharmacies, or one pharmacy by NPI.
	pub fn pharmacy_network(npi: Option<&str>, params: Option<Params>) -> Self {
		Self::new(Method::Get, format!("/pharmacy/network/{}", segment(npi)))
			.with_optional_params(params)
	}
}

fn segment(value: Option<&str>) -> &str {
	value.unwrap_or_default()
}

fn price_query(cpt_code: &str, zip_code: &str) -> Params {
	Params::new().with("cpt_code", cpt_code).with("zip_code", zip_code)
}
