//! Response reconciliation: raw transport returns back into typed outcomes.

mod browser;
mod wallet;

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{
	_prelude::*,
	recipe::{ProtocolVersion, UnknownProtocolError},
	request::ConsentRequest,
	track::{TrackingPoint, TrackingSink},
};

/// Raw return payload handed back by the launch glue.
///
/// Browser round-trips produce a deep-link URI; companion authenticators produce a flat field
/// map. An empty value — neither shape present — is the canonical cancellation signal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawReturn {
	/// Deep-link URI, when the transport returned one.
	pub uri: Option<Url>,
	/// Flat field map, when the companion authenticator returned one.
	pub fields: BTreeMap<String, String>,
}
impl RawReturn {
	/// Creates the canonical empty return.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Creates a URI-shaped return.
	pub fn from_uri(uri: Url) -> Self {
		Self { uri: Some(uri), fields: BTreeMap::new() }
	}

	/// Creates a payload-shaped return.
	pub fn from_fields<I, K, V>(fields: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			uri: None,
			fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}

	/// Returns whether neither shape is present.
	pub fn is_empty(&self) -> bool {
		self.uri.is_none() && self.fields.is_empty()
	}
}

/// Parsed successful return.
#[derive(Clone, Debug, PartialEq)]
pub struct ApprovalPayload {
	/// Protocol version that produced the return.
	pub protocol: ProtocolVersion,
	/// Environment label echoed by the transport, when present.
	pub environment: Option<String>,
	/// Parsed response body.
	pub body: serde_json::Map<String, serde_json::Value>,
}

/// Causes surfaced by [`SwitchOutcome::Error`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ReconcileError {
	/// Return URI scheme does not match the request's return scheme.
	#[error("Return URI scheme `{actual}` does not match the expected `{expected}` scheme.")]
	SchemeMismatch {
		/// Scheme the request registered for round-trips.
		expected: String,
		/// Scheme the return URI actually carried.
		actual: String,
	},
	/// Return URI does not name a known leg of the round-trip.
	#[error("Return URI path `{path}` does not name a known return leg.")]
	UnknownReturnPath {
		/// Path of the offending URI.
		path: String,
	},
	/// Required field is missing from the return.
	#[error("Return is missing the required `{field}` field.")]
	MissingField {
		/// Name of the missing field.
		field: &'static str,
		/// Protocol version the return claimed, when already known.
		protocol: Option<ProtocolVersion>,
	},
	/// Version label in the return names no supported protocol.
	#[error(transparent)]
	UnsupportedProtocol(#[from] UnknownProtocolError),
	/// Packed payload blob could not be decoded.
	#[error("Return payload could not be decoded: {detail}.")]
	MalformedPayload {
		/// What the decoder rejected.
		detail: String,
		/// Protocol version the return claimed, when already known.
		protocol: Option<ProtocolVersion>,
	},
	/// Correlation value in the return does not match the request.
	#[error("Return correlation value `{actual}` does not match the request.")]
	CorrelationMismatch {
		/// Correlation value the return carried.
		actual: String,
		/// Protocol version the return claimed, when already known.
		protocol: Option<ProtocolVersion>,
	},
	/// Transport reported an explicit remote error.
	#[error("Transport reported an error: {message}.")]
	Remote {
		/// Remote-supplied message, retained verbatim.
		message: String,
		/// Protocol version the return claimed, when already known.
		protocol: Option<ProtocolVersion>,
	},
}
impl ReconcileError {
	/// Returns the protocol version the failure was attributed to, when known.
	pub const fn protocol(&self) -> Option<ProtocolVersion> {
		match self {
			ReconcileError::MissingField { protocol, .. }
			| ReconcileError::MalformedPayload { protocol, .. }
			| ReconcileError::CorrelationMismatch { protocol, .. }
			| ReconcileError::Remote { protocol, .. } => *protocol,
			ReconcileError::SchemeMismatch { .. }
			| ReconcileError::UnknownReturnPath { .. }
			| ReconcileError::UnsupportedProtocol(_) => None,
		}
	}
}

/// Typed outcome of reconciling one raw return.
#[derive(Debug, PartialEq)]
pub enum SwitchOutcome {
	/// The transport completed the flow; the payload carries what it returned.
	Success(ApprovalPayload),
	/// The user abandoned the flow.
	Cancel,
	/// The return could not be understood, or the transport reported a failure.
	Error {
		/// What went wrong.
		cause: ReconcileError,
		/// Original raw return, retained for diagnostics.
		raw: RawReturn,
	},
}
impl SwitchOutcome {
	/// Returns the protocol version that produced the outcome, when known.
	pub fn protocol(&self) -> Option<ProtocolVersion> {
		match self {
			SwitchOutcome::Success(payload) => Some(payload.protocol),
			SwitchOutcome::Cancel => None,
			SwitchOutcome::Error { cause, .. } => cause.protocol(),
		}
	}

	/// Returns whether the outcome is a success.
	pub const fn is_success(&self) -> bool {
		matches!(self, SwitchOutcome::Success(_))
	}

	/// Returns whether the outcome is a cancellation.
	pub const fn is_cancel(&self) -> bool {
		matches!(self, SwitchOutcome::Cancel)
	}
}

/// Reconciles a raw return against its originating request.
///
/// Shape discrimination is fixed and checked payload-before-URI: a non-empty field map is an
/// app-switch return, else a URI is a browser return, else the empty return is the canonical
/// cancellation signal.
pub(crate) fn reconcile(
	request: &ConsentRequest,
	raw: &RawReturn,
	tracker: &dyn TrackingSink,
) -> SwitchOutcome {
	if !raw.fields.is_empty() {
		return wallet::parse_wallet_return(request, raw, tracker);
	}
	if let Some(uri) = raw.uri.clone() {
		return browser::parse_browser_return(request, &uri, raw, tracker);
	}

	tracker.emit(TrackingPoint::Cancel, None, &BTreeMap::new());

	SwitchOutcome::Cancel
}

pub(crate) fn fail(cause: ReconcileError, raw: &RawReturn) -> SwitchOutcome {
	SwitchOutcome::Error { cause, raw: raw.clone() }
}

pub(crate) fn decode_packed(
	packed: &str,
) -> Result<serde_json::Map<String, serde_json::Value>, String> {
	let bytes = URL_SAFE_NO_PAD.decode(packed).map_err(|e| e.to_string())?;
	let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| e.to_string())?;

	match value {
		serde_json::Value::Object(map) => Ok(map),
		_ => Err("payload is not a JSON object".to_owned()),
	}
}
