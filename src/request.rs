//! Typed consent requests and their kind-specific wire attributes.

// self
use crate::{_prelude::*, ids::PairingId};

/// Consent flow kinds understood by the switchboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
	/// One-off payment authorization.
	Checkout,
	/// Standing billing agreement consent.
	BillingAgreement,
}
impl RequestKind {
	/// Returns the stable label used in invocation descriptors and tracking attributes.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestKind::Checkout => "checkout",
			RequestKind::BillingAgreement => "billing_agreement",
		}
	}

	/// Returns the query parameter a browser return uses to echo the pairing identifier.
	pub const fn correlation_param(self) -> &'static str {
		match self {
			RequestKind::Checkout => "token",
			RequestKind::BillingAgreement => "ba_token",
		}
	}
}
impl Display for RequestKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A single consent attempt, correlated end-to-end by its pairing identifier.
///
/// The pairing identifier is fixed at construction. The client metadata id starts unset and is
/// assigned exactly once during dispatch; the [`OnceLock`] makes re-dispatching the same instance
/// reuse the original value instead of silently rotating it.
#[derive(Debug)]
pub struct ConsentRequest {
	kind: RequestKind,
	pairing_id: PairingId,
	client_id: String,
	environment: String,
	return_scheme: String,
	params: BTreeMap<String, String>,
	client_metadata_id: OnceLock<String>,
}
impl ConsentRequest {
	/// Creates a checkout request for the provided pairing identifier.
	pub fn checkout(
		pairing_id: PairingId,
		client_id: impl Into<String>,
		environment: impl Into<String>,
		return_scheme: impl Into<String>,
	) -> Self {
		Self::new(RequestKind::Checkout, pairing_id, client_id, environment, return_scheme)
	}

	/// Creates a billing agreement request for the provided pairing identifier.
	pub fn billing_agreement(
		pairing_id: PairingId,
		client_id: impl Into<String>,
		environment: impl Into<String>,
		return_scheme: impl Into<String>,
	) -> Self {
		Self::new(RequestKind::BillingAgreement, pairing_id, client_id, environment, return_scheme)
	}

	fn new(
		kind: RequestKind,
		pairing_id: PairingId,
		client_id: impl Into<String>,
		environment: impl Into<String>,
		return_scheme: impl Into<String>,
	) -> Self {
		Self {
			kind,
			pairing_id,
			client_id: client_id.into(),
			environment: environment.into(),
			return_scheme: return_scheme.into(),
			params: BTreeMap::new(),
			client_metadata_id: OnceLock::new(),
		}
	}

	/// Adds one protocol parameter carried verbatim into the invocation descriptor.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(key.into(), value.into());

		self
	}

	/// Returns the request kind.
	pub const fn kind(&self) -> RequestKind {
		self.kind
	}

	/// Returns the pairing identifier correlating this attempt with its return.
	pub const fn pairing_id(&self) -> &PairingId {
		&self.pairing_id
	}

	/// Returns the client identifier presented to the transport.
	pub fn client_id(&self) -> &str {
		&self.client_id
	}

	/// Returns the named environment the flow runs against.
	pub fn environment(&self) -> &str {
		&self.environment
	}

	/// Returns the scheme browser round-trips deep-link back to.
	pub fn return_scheme(&self) -> &str {
		&self.return_scheme
	}

	/// Returns the protocol parameters in insertion-independent order.
	pub const fn params(&self) -> &BTreeMap<String, String> {
		&self.params
	}

	/// Returns the client metadata id once dispatch has assigned it.
	pub fn client_metadata_id(&self) -> Option<&str> {
		self.client_metadata_id.get().map(String::as_str)
	}

	/// Assigns the client metadata id on first use, returning the stable value.
	pub(crate) fn ensure_client_metadata_id(&self, generate: impl FnOnce() -> String) -> &str {
		self.client_metadata_id.get_or_init(generate)
	}
}
