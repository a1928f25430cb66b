//! The switchboard facade: one constructed service object owning every collaborator seam.

// self
use crate::{
	_prelude::*,
	config::{ConfigSnapshot, ConfigSource, ConfigStore},
	correlation,
	dispatch::{self, DispatchFailure, PendingRequest, ReturnPathValidator},
	error::BuildError,
	ids::PairingId,
	obs::{self, EngineOp, OpOutcome, OpSpan},
	probe::{EnvironmentProbe, InstallationIdSource, SecurityCheck, WalletDetector},
	recipe,
	reconcile::{self, RawReturn, SwitchOutcome},
	request::ConsentRequest,
	track::{NoopTracker, TrackingSink},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestConfigSource;

/// Dispatch and response-reconciliation engine for third-party consent flows.
///
/// One instance is constructed at the application's composition root and passed by reference to
/// every entry point; there is no global state. Every public operation refreshes the
/// configuration store first, so callers never need to remember to.
pub struct Switchboard {
	source: Arc<dyn ConfigSource>,
	config: ConfigStore,
	probe: EnvironmentProbe,
	tracker: Arc<dyn TrackingSink>,
	return_path: Arc<dyn ReturnPathValidator>,
	return_handler: String,
	client_version: String,
}
impl Switchboard {
	/// Creates a switchboard that reuses the caller-provided configuration source.
	pub fn with_config_source(
		source: Arc<dyn ConfigSource>,
		detector: Arc<dyn WalletDetector>,
		id_source: Arc<dyn InstallationIdSource>,
		return_path: Arc<dyn ReturnPathValidator>,
		client_version: impl Into<String>,
		return_handler: impl Into<String>,
	) -> Result<Self, BuildError> {
		let client_version = client_version.into();
		let return_handler = return_handler.into();

		if client_version.is_empty() {
			return Err(BuildError::EmptyClientVersion);
		}
		if return_handler.is_empty() {
			return Err(BuildError::EmptyReturnHandler);
		}

		Ok(Self {
			config: ConfigStore::new(source.clone()),
			source,
			probe: EnvironmentProbe::new(detector, id_source),
			tracker: Arc::new(NoopTracker),
			return_path,
			return_handler,
			client_version,
		})
	}

	/// Replaces the tracking sink (defaults to [`NoopTracker`]).
	pub fn with_tracker(mut self, tracker: Arc<dyn TrackingSink>) -> Self {
		self.tracker = tracker;

		self
	}

	/// Replaces the built-in fallback snapshot the configuration store starts from.
	pub fn with_built_in_config(mut self, snapshot: ConfigSnapshot) -> Self {
		self.config = ConfigStore::with_built_in(self.source.clone(), snapshot);

		self
	}

	/// Returns the configuration store (e.g. for cancellable refreshes).
	pub fn config(&self) -> &ConfigStore {
		&self.config
	}

	/// Forces permanent use of the built-in configuration snapshot, bypassing fetches.
	pub fn use_built_in_config(&self, enable: bool) {
		self.config.use_built_in(enable);
	}

	/// Probes whether any companion authenticator is installed.
	///
	/// Always emits the per-protocol presence tracking events; downstream analytics rely on the
	/// signal regardless of the answer.
	pub async fn is_companion_app_installed(&self, security: SecurityCheck) -> bool {
		self.config.refresh().await;

		self.probe.findings(security, self.tracker.as_ref()).any()
	}

	/// Dispatches `request`: decides the transport and builds its hand-off descriptor.
	///
	/// "Nothing is available" is a normal business outcome, reported through
	/// [`PendingRequest::success`] and [`PendingRequest::failure`] rather than an error.
	pub async fn dispatch(
		&self,
		request: &ConsentRequest,
		security: SecurityCheck,
	) -> PendingRequest {
		const OP: EngineOp = EngineOp::Dispatch;

		let span = OpSpan::new(OP, "dispatch");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let pending = span
			.instrument(async move {
				self.config.refresh().await;

				let findings = self.probe.findings(security, self.tracker.as_ref());
				let snapshot = self.config.current();
				let Some(recipe) = recipe::select_recipe(request.kind(), &snapshot, &findings)
				else {
					return PendingRequest::failed(None, None, DispatchFailure::NoEligibleRecipe);
				};
				let client_metadata_id = request
					.ensure_client_metadata_id(|| {
						correlation::generate_id(
							self.probe.installation_id(),
							&self.client_version,
							Some(request.pairing_id()),
						)
					})
					.to_owned();

				dispatch::build_dispatch(
					request,
					&recipe,
					self.probe.installation_id(),
					&client_metadata_id,
					self.return_path.as_ref(),
					&self.return_handler,
					self.tracker.as_ref(),
				)
			})
			.await;

		obs::record_op_outcome(
			OP,
			if pending.success { OpOutcome::Success } else { OpOutcome::Failure },
		);

		pending
	}

	/// Reconciles a raw transport return against its originating request.
	pub async fn reconcile(&self, request: &ConsentRequest, raw: &RawReturn) -> SwitchOutcome {
		const OP: EngineOp = EngineOp::Reconcile;

		let span = OpSpan::new(OP, "reconcile");

		obs::record_op_outcome(OP, OpOutcome::Attempt);

		let outcome = span
			.instrument(async move {
				self.config.refresh().await;

				reconcile::reconcile(request, raw, self.tracker.as_ref())
			})
			.await;

		obs::record_op_outcome(
			OP,
			match &outcome {
				SwitchOutcome::Error { .. } => OpOutcome::Failure,
				_ => OpOutcome::Success,
			},
		);

		outcome
	}

	/// Derives the correlation id for a prospective flow.
	///
	/// Deterministic for identical inputs. Pass the value to the remote processor alongside the
	/// payment; do not cache or store it across flows.
	pub async fn correlation_id(&self, pairing_id: Option<&PairingId>) -> String {
		self.config.refresh().await;

		correlation::generate_id(self.probe.installation_id(), &self.client_version, pairing_id)
	}
}
#[cfg(feature = "reqwest")]
impl Switchboard {
	/// Creates a switchboard that provisions its own reqwest-backed configuration source.
	pub fn new(
		config_endpoint: Url,
		detector: Arc<dyn WalletDetector>,
		id_source: Arc<dyn InstallationIdSource>,
		return_path: Arc<dyn ReturnPathValidator>,
		client_version: impl Into<String>,
		return_handler: impl Into<String>,
	) -> Result<Self, BuildError> {
		Self::with_config_source(
			Arc::new(ReqwestConfigSource::new(config_endpoint)),
			detector,
			id_source,
			return_path,
			client_version,
			return_handler,
		)
	}
}
impl Debug for Switchboard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Switchboard")
			.field("config", &self.config)
			.field("probe", &self.probe)
			.field("return_handler", &self.return_handler)
			.field("client_version", &self.client_version)
			.finish()
	}
}
