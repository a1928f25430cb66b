//! Atomic configuration store with single-flight refresh.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	config::{ConfigSnapshot, ConfigSource},
};

/// Cooperative cancellation handle for an in-flight configuration fetch.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);
impl CancelToken {
	/// Creates a fresh, un-cancelled token.
	pub fn new() -> Self {
		Self::default()
	}

	/// Requests cancellation of the fetch this token was passed to.
	pub fn cancel(&self) {
		self.0.store(true, Ordering::Release);
	}

	/// Returns whether cancellation has been requested.
	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}
}

/// Shared configuration store publishing whole snapshots with a replace-then-publish discipline.
///
/// Readers never lock beyond cloning the published [`Arc`]; writers build the replacement
/// snapshot off-lock and swap it in one move, so a reader observes either the previous or the new
/// snapshot and never a mixture. Overlapping refreshes are collapsed to one in-flight fetch;
/// ordering across refresh calls is last-writer-wins.
pub struct ConfigStore {
	source: Arc<dyn ConfigSource>,
	snapshot: RwLock<Arc<ConfigSnapshot>>,
	built_in: Arc<ConfigSnapshot>,
	use_built_in: AtomicBool,
	last_refreshed: Mutex<Option<OffsetDateTime>>,
	inflight: AsyncMutex<()>,
}
impl ConfigStore {
	/// Creates a store seeded with the built-in snapshot.
	pub fn new(source: Arc<dyn ConfigSource>) -> Self {
		Self::with_built_in(source, ConfigSnapshot::built_in())
	}

	/// Creates a store with a caller-supplied fallback snapshot.
	pub fn with_built_in(source: Arc<dyn ConfigSource>, built_in: ConfigSnapshot) -> Self {
		let built_in = Arc::new(built_in);

		Self {
			source,
			snapshot: RwLock::new(built_in.clone()),
			built_in,
			use_built_in: AtomicBool::new(false),
			last_refreshed: Mutex::new(None),
			inflight: AsyncMutex::new(()),
		}
	}

	/// Returns the active snapshot; never blocks, never fails.
	pub fn current(&self) -> Arc<ConfigSnapshot> {
		self.snapshot.read().clone()
	}

	/// Returns when a fetched snapshot was last published.
	pub fn last_refreshed(&self) -> Option<OffsetDateTime> {
		*self.last_refreshed.lock()
	}

	/// Forces permanent use of the built-in snapshot, bypassing the source entirely.
	pub fn use_built_in(&self, enable: bool) {
		self.use_built_in.store(enable, Ordering::Release);

		if enable {
			*self.snapshot.write() = self.built_in.clone();
		}
	}

	/// Fetches and publishes the latest snapshot, keeping the previous one on any failure.
	///
	/// Idempotent and cheap to call from every entry point: while a fetch is already in flight,
	/// concurrent callers return immediately instead of queueing a second request.
	pub async fn refresh(&self) {
		self.refresh_with_cancel(&CancelToken::new()).await;
	}

	/// [`refresh`](Self::refresh) variant whose in-flight fetch can be abandoned.
	///
	/// A fetch that completes after cancellation discards its result instead of publishing it.
	pub async fn refresh_with_cancel(&self, token: &CancelToken) {
		if self.use_built_in.load(Ordering::Acquire) {
			return;
		}

		let Some(_guard) = self.inflight.try_lock() else {
			return;
		};

		match self.source.fetch().await {
			Ok(snapshot) if !token.is_cancelled() => {
				*self.snapshot.write() = Arc::new(snapshot);
				*self.last_refreshed.lock() = Some(OffsetDateTime::now_utc());
			},
			Ok(_) => {
				#[cfg(feature = "tracing")]
				tracing::debug!("Discarding a configuration snapshot fetched after cancellation.");
			},
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::debug!(
					error = %_e,
					"Keeping the previous configuration snapshot after a fetch failure."
				);
			},
		}
	}
}
impl Debug for ConfigStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConfigStore")
			.field("use_built_in", &self.use_built_in.load(Ordering::Acquire))
			.field("last_refreshed", &self.last_refreshed())
			.finish()
	}
}
