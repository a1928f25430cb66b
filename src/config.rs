//! Server-driven recipe configuration: the snapshot model, the fetch contract, and the store.

pub mod snapshot;
pub mod store;

pub use snapshot::*;
pub use store::*;

// self
use crate::{_prelude::*, error::FetchError};

/// Boxed future returned by [`ConfigSource`] implementations.
pub type SourceFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ConfigSnapshot, FetchError>> + 'a + Send>>;

/// Remote configuration source contract.
///
/// The store treats every failure as "keep the previous snapshot"; implementations only need to
/// surface what went wrong so the failure can be logged.
pub trait ConfigSource
where
	Self: Send + Sync,
{
	/// Fetches the latest configuration snapshot.
	fn fetch(&self) -> SourceFuture<'_>;
}

/// [`ConfigSource`] serving a fixed snapshot, for local development and tests.
#[derive(Clone, Debug)]
pub struct StaticConfigSource(ConfigSnapshot);
impl StaticConfigSource {
	/// Creates a source that always serves `snapshot`.
	pub fn new(snapshot: ConfigSnapshot) -> Self {
		Self(snapshot)
	}
}
impl ConfigSource for StaticConfigSource {
	fn fetch(&self) -> SourceFuture<'_> {
		let snapshot = self.0.clone();

		Box::pin(async move { Ok(snapshot) })
	}
}
