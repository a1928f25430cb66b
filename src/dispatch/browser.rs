//! Browser invocation building and the return-path registration seam.

// self
use crate::{
	_prelude::*,
	error::PayloadError,
	recipe::ProtocolVersion,
	request::ConsentRequest,
};

/// Platform hook confirming the caller can receive browser round-trips.
///
/// The check is the manifest-declaration equivalent: before a browser hand-off is declared
/// successful, the return scheme must be registered for the handler that will receive the
/// deep link back.
pub trait ReturnPathValidator
where
	Self: Send + Sync,
{
	/// Returns whether `scheme` deep links are registered for `handler`.
	fn is_return_path_registered(&self, scheme: &str, handler: &str) -> bool;
}

/// [`ReturnPathValidator`] answering a fixed verdict, for local development and tests.
#[derive(Clone, Copy, Debug)]
pub struct StaticReturnPath(bool);
impl StaticReturnPath {
	/// Creates a validator that always answers `registered`.
	pub const fn new(registered: bool) -> Self {
		Self(registered)
	}
}
impl ReturnPathValidator for StaticReturnPath {
	fn is_return_path_registered(&self, _: &str, _: &str) -> bool {
		self.0
	}
}

/// Browser hand-off descriptor: the fully-qualified URL to open plus the deep links back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserInvocation {
	/// Protocol version the endpoint speaks.
	pub protocol: ProtocolVersion,
	/// URL the system browser should open.
	pub url: Url,
	/// Deep link the endpoint redirects to on success.
	pub return_uri: Url,
	/// Deep link the endpoint redirects to on cancellation.
	pub cancel_uri: Url,
}

/// Builds the browser descriptor from the recipe endpoint plus URL-encoded request parameters.
pub(crate) fn build_browser_invocation(
	request: &ConsentRequest,
	protocol: ProtocolVersion,
	endpoint: &Url,
	client_metadata_id: &str,
) -> Result<BrowserInvocation, PayloadError> {
	let return_uri = deep_link(request.return_scheme(), "success")?;
	let cancel_uri = deep_link(request.return_scheme(), "cancel")?;
	let mut url = endpoint.clone();

	{
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("version", protocol.as_wire());
		pairs.append_pair("request_type", request.kind().as_str());
		pairs.append_pair("client_id", request.client_id());
		pairs.append_pair("environment", request.environment());
		pairs.append_pair("pairing_id", request.pairing_id().as_ref());
		pairs.append_pair("client_metadata_id", client_metadata_id);

		for (key, value) in request.params() {
			pairs.append_pair(key, value);
		}

		pairs.append_pair("return_uri", return_uri.as_str());
		pairs.append_pair("cancel_uri", cancel_uri.as_str());
	}

	Ok(BrowserInvocation { protocol, url, return_uri, cancel_uri })
}

fn deep_link(scheme: &str, leg: &str) -> Result<Url, PayloadError> {
	Url::parse(&format!("{scheme}://onetouch/v1/{leg}"))
		.map_err(|source| PayloadError::InvalidReturnScheme { scheme: scheme.to_owned(), source })
}
