// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client calls.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("pokitdok.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for a client decision (retry, cold start, skipped refresh).
pub fn trace_decision(kind: CallKind, decision: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(call = kind.as_str(), decision, "client decision");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, decision);
	}
}

/// Emits a warning for a failure the client absorbed or surfaced.
pub fn trace_failure(kind: CallKind, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(call = kind.as_str(), error = %error, "call failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::Request, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn trace_helpers_accept_any_error() {
		let err = std::io::Error::other("boom");

		trace_decision(CallKind::TokenRefresh, "cold_start");
		trace_failure(CallKind::TokenRefresh, &err);
	}
}
