//! Per-manager counters for client-credentials exchanges, split by why an exchange failed.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::error::AuthError;

/// Live exchange counters owned by one [`TokenManager`](super::TokenManager).
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	stored: AtomicU64,
	rejected: AtomicU64,
	unreadable: AtomicU64,
	unreachable: AtomicU64,
}
impl RefreshMetrics {
	/// Point-in-time copy of every counter.
	pub fn snapshot(&self) -> RefreshSnapshot {
		RefreshSnapshot {
			attempts: self.attempts.load(Ordering::Relaxed),
			stored: self.stored.load(Ordering::Relaxed),
			rejected: self.rejected.load(Ordering::Relaxed),
			unreadable: self.unreadable.load(Ordering::Relaxed),
			unreachable: self.unreachable.load(Ordering::Relaxed),
		}
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_stored(&self) {
		self.stored.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_error(&self, err: &AuthError) {
		let counter = match err {
			AuthError::Rejected { .. } => &self.rejected,
			AuthError::MissingAccessToken { .. } | AuthError::MalformedResponse { .. } =>
				&self.unreadable,
			AuthError::Transport(_) | AuthError::Encoding(_) => &self.unreachable,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}

/// Exchange counters captured by [`RefreshMetrics::snapshot`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshSnapshot {
	/// Token endpoint calls started.
	pub attempts: u64,
	/// Exchanges that replaced the stored token.
	pub stored: u64,
	/// Non-2xx answers from the token endpoint.
	pub rejected: u64,
	/// 2xx answers without a usable `access_token`.
	pub unreadable: u64,
	/// Exchanges that never produced an HTTP answer, including unencodable requests.
	pub unreachable: u64,
}
impl RefreshSnapshot {
	/// Every exchange that left the stored token untouched.
	pub fn failures(&self) -> u64 {
		self.rejected + self.unreadable + self.unreachable
	}
}
