// self
use crate::{
	http::ApiResponse,
	obs::{CallKind, CallOutcome},
};

/// Counter bumped once per call outcome, labeled by `call` and `outcome`.
pub const CALL_COUNTER: &str = "pokitdok_call_total";
/// Counter bumped once per platform answer, labeled by `class`.
pub const RESPONSE_COUNTER: &str = "pokitdok_response_total";

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	metrics::counter!(CALL_COUNTER, "call" => kind.as_str(), "outcome" => outcome.as_str())
		.increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = (kind, outcome);
}

/// Records which class of answer a platform request produced.
pub fn record_response(response: &ApiResponse) {
	let class = response_class(response);

	#[cfg(feature = "metrics")]
	metrics::counter!(RESPONSE_COUNTER, "class" => class).increment(1);

	#[cfg(not(feature = "metrics"))]
	let _ = class;
}

/// `expired` for a 401, `transport` when nothing was received, else the status family.
pub fn response_class(response: &ApiResponse) -> &'static str {
	if response.token_expired {
		return "expired";
	}

	match response.status {
		None => "transport",
		Some(200..=299) => "2xx",
		Some(300..=399) => "3xx",
		Some(400..=499) => "4xx",
		Some(500..=599) => "5xx",
		Some(_) => "other",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn answered(status: u16) -> ApiResponse {
		ApiResponse { status: Some(status), token_expired: status == 401, ..Default::default() }
	}

	#[test]
	fn responses_are_bucketed_by_status_family() {
		assert_eq!(response_class(&answered(204)), "2xx");
		assert_eq!(response_class(&answered(401)), "expired");
		assert_eq!(response_class(&answered(422)), "4xx");
		assert_eq!(response_class(&answered(503)), "5xx");
		assert_eq!(response_class(&ApiResponse::default()), "transport");
	}

	#[test]
	fn recording_without_an_installed_recorder_is_harmless() {
		record_call_outcome(CallKind::TokenRefresh, CallOutcome::Retry);
		record_response(&answered(500));
	}
}
