//! Reqwest-backed transport for the remote configuration source.
//!
//! The module is the crate's only dependency on an HTTP stack; everything else reaches the
//! network through the [`ConfigSource`] seam. Deployments with their own HTTP machinery can skip
//! the `reqwest` feature and implement the trait directly.

// self
use crate::{
	_prelude::*,
	config::{ConfigSnapshot, ConfigSource, SourceFuture},
	error::FetchError,
};

/// [`ConfigSource`] fetching the configuration document from an HTTPS endpoint.
///
/// Configuration documents are plain GET targets; redirects are left to the client defaults and
/// every non-success status is surfaced as [`FetchError::Status`] rather than being read.
#[derive(Clone, Debug)]
pub struct ReqwestConfigSource {
	client: ReqwestClient,
	endpoint: Url,
}
impl ReqwestConfigSource {
	/// Creates a source fetching from `endpoint` with a default client.
	pub fn new(endpoint: Url) -> Self {
		Self::with_client(ReqwestClient::default(), endpoint)
	}

	/// Creates a source reusing an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, endpoint: Url) -> Self {
		Self { client, endpoint }
	}

	/// Returns the endpoint the source fetches from.
	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn fetch_now(client: ReqwestClient, endpoint: Url) -> Result<ConfigSnapshot, FetchError> {
		let response = client.get(endpoint).send().await?;
		let status = response.status();

		if !status.is_success() {
			return Err(FetchError::Status { status: status.as_u16() });
		}

		let bytes = response.bytes().await?;
		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| FetchError::Parse { source })
	}
}
impl ConfigSource for ReqwestConfigSource {
	fn fetch(&self) -> SourceFuture<'_> {
		let client = self.client.clone();
		let endpoint = self.endpoint.clone();

		Box::pin(async move { Self::fetch_now(client, endpoint).await })
	}
}
