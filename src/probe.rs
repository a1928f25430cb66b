//! Environment probe: companion-authenticator discovery and the cached installation identity.

// self
use crate::{
	_prelude::*,
	ids::InstallationId,
	recipe::ProtocolVersion,
	track::{TrackingPoint, TrackingSink},
};

/// Signature-validation posture for companion-authenticator discovery.
///
/// There is intentionally no `Default`: every call site spells out which posture it probes with,
/// and the unsafe variant is tracked whenever it is used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SecurityCheck {
	/// Presence detection plus cryptographic signature validation.
	Enforced,
	/// Presence detection only; signature validation is skipped.
	///
	/// Controlled test environments only, never production traffic. Probes in this posture carry
	/// a `security_check=disabled` tracking attribute and log a warning.
	DisabledForTesting,
}
impl SecurityCheck {
	/// Returns the stable label recorded in tracking attributes.
	pub const fn as_str(self) -> &'static str {
		match self {
			SecurityCheck::Enforced => "enforced",
			SecurityCheck::DisabledForTesting => "disabled",
		}
	}
}

/// Platform hook answering whether a companion authenticator is installed.
pub trait WalletDetector
where
	Self: Send + Sync,
{
	/// Returns whether a valid companion authenticator for `protocol` is installed.
	///
	/// With [`SecurityCheck::DisabledForTesting`] implementations must still perform presence
	/// detection but skip signature/certificate validation.
	fn is_authenticator_installed(
		&self,
		protocol: ProtocolVersion,
		security: SecurityCheck,
	) -> bool;
}

/// Platform hook producing the device install identifier.
pub trait InstallationIdSource
where
	Self: Send + Sync,
{
	/// Returns the stable per-install identifier.
	fn installation_id(&self) -> InstallationId;
}

/// [`WalletDetector`] answering from a fixed table, for local development and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedWalletDetector {
	/// Whether the v1 authenticator is reported installed.
	pub v1: bool,
	/// Whether the v2 authenticator is reported installed.
	pub v2: bool,
}
impl FixedWalletDetector {
	/// Creates a detector with explicit per-protocol answers.
	pub const fn new(v1: bool, v2: bool) -> Self {
		Self { v1, v2 }
	}
}
impl WalletDetector for FixedWalletDetector {
	fn is_authenticator_installed(&self, protocol: ProtocolVersion, _: SecurityCheck) -> bool {
		match protocol {
			ProtocolVersion::V1 => self.v1,
			ProtocolVersion::V2 => self.v2,
		}
	}
}

/// [`InstallationIdSource`] serving a fixed identifier, for local development and tests.
#[derive(Clone, Debug)]
pub struct FixedInstallationIdSource(InstallationId);
impl FixedInstallationIdSource {
	/// Creates a source that always serves `id`.
	pub const fn new(id: InstallationId) -> Self {
		Self(id)
	}
}
impl InstallationIdSource for FixedInstallationIdSource {
	fn installation_id(&self) -> InstallationId {
		self.0.clone()
	}
}

/// Companion-authenticator availability per protocol version, as observed by one probe pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeFindings {
	v1: bool,
	v2: bool,
}
impl ProbeFindings {
	/// Builds findings from raw per-protocol observations, applying the supersession rule:
	/// when v2 is present, v1 is never reported available.
	pub const fn from_observations(v2: bool, v1: bool) -> Self {
		Self { v1: v1 && !v2, v2 }
	}

	/// Returns whether a companion authenticator speaking `protocol` was observed.
	pub const fn available(&self, protocol: ProtocolVersion) -> bool {
		match protocol {
			ProtocolVersion::V1 => self.v1,
			ProtocolVersion::V2 => self.v2,
		}
	}

	/// Returns whether any companion authenticator was observed.
	pub const fn any(&self) -> bool {
		self.v1 || self.v2
	}
}

/// Probes the device environment and caches what is stable for the process lifetime.
///
/// Presence detection itself is delegated live to the [`WalletDetector`] on every pass, because
/// each pass must emit its presence tracking events; only the installation identifier is cached.
pub struct EnvironmentProbe {
	detector: Arc<dyn WalletDetector>,
	id_source: Arc<dyn InstallationIdSource>,
	installation_id: OnceLock<InstallationId>,
}
impl EnvironmentProbe {
	/// Creates a probe over the provided platform hooks.
	pub fn new(detector: Arc<dyn WalletDetector>, id_source: Arc<dyn InstallationIdSource>) -> Self {
		Self { detector, id_source, installation_id: OnceLock::new() }
	}

	/// Returns the device install identifier, computing it once per process.
	pub fn installation_id(&self) -> &InstallationId {
		self.installation_id.get_or_init(|| self.id_source.installation_id())
	}

	/// Probes authenticator availability, emitting one presence event per protocol attempted.
	///
	/// v2 supersedes v1: the v1 authenticator is only probed (and only tracked) when v2 is
	/// absent, which also skips the redundant signature verification cost.
	pub fn findings(&self, security: SecurityCheck, tracker: &dyn TrackingSink) -> ProbeFindings {
		let v2 = self.probe_one(ProtocolVersion::V2, security, tracker);
		let v1 = if v2 { false } else { self.probe_one(ProtocolVersion::V1, security, tracker) };

		ProbeFindings::from_observations(v2, v1)
	}

	fn probe_one(
		&self,
		protocol: ProtocolVersion,
		security: SecurityCheck,
		tracker: &dyn TrackingSink,
	) -> bool {
		let mut attributes = BTreeMap::new();

		if matches!(security, SecurityCheck::DisabledForTesting) {
			attributes.insert("security_check".to_owned(), security.as_str().to_owned());

			#[cfg(feature = "tracing")]
			tracing::warn!(
				protocol = %protocol,
				"Probing with signature validation disabled; test environments only."
			);
		}

		let installed = self.detector.is_authenticator_installed(protocol, security);
		let point =
			if installed { TrackingPoint::WalletPresent } else { TrackingPoint::WalletAbsent };

		tracker.emit(point, Some(protocol), &attributes);

		installed
	}
}
impl Debug for EnvironmentProbe {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EnvironmentProbe")
			.field("installation_id", &self.installation_id.get())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::track::MemoryTracker;

	struct CountingDetector {
		inner: FixedWalletDetector,
		calls: AtomicUsize,
	}
	impl WalletDetector for CountingDetector {
		fn is_authenticator_installed(
			&self,
			protocol: ProtocolVersion,
			security: SecurityCheck,
		) -> bool {
			self.calls.fetch_add(1, Ordering::Relaxed);

			self.inner.is_authenticator_installed(protocol, security)
		}
	}

	fn probe_over(detector: FixedWalletDetector) -> (EnvironmentProbe, Arc<CountingDetector>) {
		let counting =
			Arc::new(CountingDetector { inner: detector, calls: AtomicUsize::new(0) });
		let id_source = Arc::new(FixedInstallationIdSource::new(
			InstallationId::new("install-guid-1").expect("Installation fixture should be valid."),
		));

		(EnvironmentProbe::new(counting.clone(), id_source), counting)
	}

	#[test]
	fn v2_presence_short_circuits_the_v1_probe() {
		let (probe, counting) = probe_over(FixedWalletDetector::new(true, true));
		let tracker = MemoryTracker::default();
		let findings = probe.findings(SecurityCheck::Enforced, &tracker);

		assert!(findings.available(ProtocolVersion::V2));
		assert!(!findings.available(ProtocolVersion::V1));
		assert_eq!(counting.calls.load(Ordering::Relaxed), 1);
		assert_eq!(tracker.points(), vec![TrackingPoint::WalletPresent]);
	}

	#[test]
	fn v2_absence_probes_and_tracks_both_protocols() {
		let (probe, counting) = probe_over(FixedWalletDetector::new(true, false));
		let tracker = MemoryTracker::default();
		let findings = probe.findings(SecurityCheck::Enforced, &tracker);

		assert!(!findings.available(ProtocolVersion::V2));
		assert!(findings.available(ProtocolVersion::V1));
		assert_eq!(counting.calls.load(Ordering::Relaxed), 2);
		assert_eq!(
			tracker.points(),
			vec![TrackingPoint::WalletAbsent, TrackingPoint::WalletPresent]
		);
	}

	#[test]
	fn disabled_security_check_is_tracked_explicitly() {
		let (probe, _) = probe_over(FixedWalletDetector::new(false, false));
		let tracker = MemoryTracker::default();

		probe.findings(SecurityCheck::DisabledForTesting, &tracker);

		let events = tracker.events();

		assert!(!events.is_empty());
		assert!(events.iter().all(|event| {
			event.attributes.get("security_check").map(String::as_str) == Some("disabled")
		}));
	}

	#[test]
	fn installation_id_is_computed_once() {
		let (probe, _) = probe_over(FixedWalletDetector::default());
		let first = probe.installation_id().clone();
		let second = probe.installation_id().clone();

		assert_eq!(first, second);
		assert_eq!(first.as_ref(), "install-guid-1");
	}

	#[test]
	fn findings_constructor_enforces_supersession() {
		let findings = ProbeFindings::from_observations(true, true);

		assert!(findings.available(ProtocolVersion::V2));
		assert!(!findings.available(ProtocolVersion::V1));
		assert!(findings.any());
		assert!(!ProbeFindings::from_observations(false, false).any());
	}
}
