//! Dispatch building: turning a selected recipe into a transport hand-off descriptor.

pub mod browser;
pub mod wallet;

pub use browser::*;
pub use wallet::*;

// self
use crate::{
	_prelude::*,
	error::PayloadError,
	ids::InstallationId,
	recipe::{ProtocolVersion, Recipe, RecipeTarget},
	request::ConsentRequest,
	track::{TrackingPoint, TrackingSink},
};

/// Opaque invocation descriptor consumed by the caller's launch glue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvocationDescriptor {
	/// Companion-authenticator hand-off.
	Wallet(WalletInvocation),
	/// Browser hand-off.
	Browser(BrowserInvocation),
}
impl InvocationDescriptor {
	/// Returns the transport this descriptor targets.
	pub const fn target(&self) -> RecipeTarget {
		match self {
			InvocationDescriptor::Wallet(_) => RecipeTarget::Wallet,
			InvocationDescriptor::Browser(_) => RecipeTarget::Browser,
		}
	}

	/// Returns the protocol version encoded in the descriptor.
	pub const fn protocol(&self) -> ProtocolVersion {
		match self {
			InvocationDescriptor::Wallet(invocation) => invocation.protocol,
			InvocationDescriptor::Browser(invocation) => invocation.protocol,
		}
	}
}

/// Reasons a dispatch concluded without a launchable descriptor.
///
/// A failed dispatch is an expected business outcome, not an exception; the cause is carried so
/// callers can report *why* rather than just *that* dispatch failed.
#[derive(Debug, ThisError)]
pub enum DispatchFailure {
	/// No transport is currently eligible for the request.
	#[error("No transport is currently eligible for this request.")]
	NoEligibleRecipe,
	/// The return path for browser round-trips is not registered with the platform.
	#[error("Return scheme `{scheme}` is not registered for handler `{handler}`.")]
	ReturnPathUnregistered {
		/// Return scheme the request declared.
		scheme: String,
		/// Handler identity the check was performed against.
		handler: String,
	},
	/// The invocation payload could not be constructed.
	#[error(transparent)]
	MalformedPayload(#[from] PayloadError),
}

/// Outcome of a dispatch attempt; consumed exactly once by the caller to perform the launch.
#[derive(Debug)]
pub struct PendingRequest {
	/// Whether a launchable descriptor was produced.
	pub success: bool,
	/// Transport that was chosen, when the decision got that far.
	pub target: Option<RecipeTarget>,
	/// Correlation id assigned to the request, when the decision got that far.
	pub client_metadata_id: Option<String>,
	/// Descriptor to hand to the launch glue; `None` on failure.
	pub invocation: Option<InvocationDescriptor>,
	/// Why dispatch failed; `None` on success.
	pub failure: Option<DispatchFailure>,
}
impl PendingRequest {
	pub(crate) fn launched(
		target: RecipeTarget,
		client_metadata_id: String,
		invocation: InvocationDescriptor,
	) -> Self {
		Self {
			success: true,
			target: Some(target),
			client_metadata_id: Some(client_metadata_id),
			invocation: Some(invocation),
			failure: None,
		}
	}

	pub(crate) fn failed(
		target: Option<RecipeTarget>,
		client_metadata_id: Option<String>,
		failure: DispatchFailure,
	) -> Self {
		Self { success: false, target, client_metadata_id, invocation: None, failure: Some(failure) }
	}
}

/// Builds the hand-off for `recipe`, emitting the switch-started event on success.
pub(crate) fn build_dispatch(
	request: &ConsentRequest,
	recipe: &Recipe,
	installation_id: &InstallationId,
	client_metadata_id: &str,
	return_path: &dyn ReturnPathValidator,
	return_handler: &str,
	tracker: &dyn TrackingSink,
) -> PendingRequest {
	let target = recipe.target();
	let built = match recipe {
		Recipe::Wallet { protocol } =>
			wallet::build_wallet_invocation(request, *protocol, installation_id, client_metadata_id)
				.map(InvocationDescriptor::Wallet),
		Recipe::Browser { protocol, endpoint } => {
			if !return_path.is_return_path_registered(request.return_scheme(), return_handler) {
				return PendingRequest::failed(
					Some(target),
					Some(client_metadata_id.to_owned()),
					DispatchFailure::ReturnPathUnregistered {
						scheme: request.return_scheme().to_owned(),
						handler: return_handler.to_owned(),
					},
				);
			}

			browser::build_browser_invocation(request, *protocol, endpoint, client_metadata_id)
				.map(InvocationDescriptor::Browser)
		},
	};

	match built {
		Ok(invocation) => {
			emit_switch_started(tracker, request, &invocation);

			PendingRequest::launched(target, client_metadata_id.to_owned(), invocation)
		},
		Err(e) => PendingRequest::failed(
			Some(target),
			Some(client_metadata_id.to_owned()),
			DispatchFailure::MalformedPayload(e),
		),
	}
}

fn emit_switch_started(
	tracker: &dyn TrackingSink,
	request: &ConsentRequest,
	invocation: &InvocationDescriptor,
) {
	let point = match invocation.target() {
		RecipeTarget::Wallet => TrackingPoint::SwitchToWallet,
		RecipeTarget::Browser => TrackingPoint::SwitchToBrowser,
	};
	let attributes = BTreeMap::from_iter([
		("flow".to_owned(), request.kind().as_str().to_owned()),
		("environment".to_owned(), request.environment().to_owned()),
	]);

	tracker.emit(point, Some(invocation.protocol()), &attributes);
}
