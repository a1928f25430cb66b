//! Switchboard-level error types shared across configuration, dispatch, and reconciliation.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical switchboard error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Switchboard construction failure.
	#[error(transparent)]
	Build(#[from] BuildError),
	/// Configuration fetch failure.
	#[error(transparent)]
	Fetch(#[from] FetchError),
	/// Identifier validation failure.
	#[error(transparent)]
	Identifier(#[from] crate::ids::IdentifierError),
	/// Invocation payload construction failure.
	#[error(transparent)]
	Payload(#[from] PayloadError),
}

/// Failures raised while fetching a remote configuration snapshot.
///
/// The configuration store swallows these — the last known-good snapshot is retained — but
/// [`ConfigSource`](crate::config::ConfigSource) implementations surface them so the failure can
/// be logged with full context.
#[derive(Debug, ThisError)]
pub enum FetchError {
	/// Underlying transport reported a network failure.
	#[error("Network error occurred while fetching the configuration document.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Remote endpoint answered with a non-success status.
	#[error("Configuration endpoint returned HTTP status {status}.")]
	Status {
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration document is malformed.")]
	Parse {
		/// Structured parsing failure, including the JSON path that failed.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// In-flight fetch was cancelled via its [`CancelToken`](crate::config::CancelToken).
	#[error("Configuration fetch was cancelled.")]
	Cancelled,
}
impl FetchError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for FetchError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Failures raised while constructing an invocation payload during dispatch.
///
/// These surface as [`DispatchFailure::MalformedPayload`](crate::dispatch::DispatchFailure)
/// rather than being swallowed, so callers can report why a hand-off never materialized.
#[derive(Debug, ThisError)]
pub enum PayloadError {
	/// Protocol parameters could not be serialized into the wallet payload blob.
	#[error("Request parameters could not be serialized for the {version} wallet payload.")]
	Serialize {
		/// Wire label of the layout being produced.
		version: &'static str,
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Return deep link could not be formed from the request's return scheme.
	#[error("Return scheme `{scheme}` does not form a valid deep link.")]
	InvalidReturnScheme {
		/// Return scheme the request declared.
		scheme: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Failures raised while assembling a [`Switchboard`](crate::switchboard::Switchboard).
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum BuildError {
	/// Client version string was empty.
	#[error("Client version must not be empty.")]
	EmptyClientVersion,
	/// Return handler identity was empty.
	#[error("Return handler identity must not be empty.")]
	EmptyReturnHandler,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn build_error_converts_into_switchboard_error() {
		let error: Error = BuildError::EmptyClientVersion.into();

		assert!(matches!(error, Error::Build(_)));
		assert!(error.to_string().contains("Client version"));
	}

	#[test]
	fn fetch_error_wraps_transport_sources() {
		let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
		let error = FetchError::network(io);

		assert!(matches!(error, FetchError::Network { .. }));
		assert!(std::error::Error::source(&error).is_some());
	}
}
