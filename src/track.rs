//! Tracking seam: fire-and-forget analytics events emitted by the engine.

// self
use crate::{_prelude::*, recipe::ProtocolVersion};

/// Analytics points emitted by the switchboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackingPoint {
	/// A companion authenticator was observed installed.
	WalletPresent,
	/// No companion authenticator was observed.
	WalletAbsent,
	/// A wallet hand-off descriptor was produced.
	SwitchToWallet,
	/// A browser hand-off descriptor was produced.
	SwitchToBrowser,
	/// A transport return reconciled to a success.
	Return,
	/// A transport return reconciled to a cancellation.
	Cancel,
	/// A transport return reported an explicit remote error.
	Error,
}
impl TrackingPoint {
	/// Returns the stable label suitable for sink attributes.
	pub const fn as_str(self) -> &'static str {
		match self {
			TrackingPoint::WalletPresent => "wallet_present",
			TrackingPoint::WalletAbsent => "wallet_absent",
			TrackingPoint::SwitchToWallet => "switch_to_wallet",
			TrackingPoint::SwitchToBrowser => "switch_to_browser",
			TrackingPoint::Return => "return",
			TrackingPoint::Cancel => "cancel",
			TrackingPoint::Error => "error",
		}
	}
}
impl Display for TrackingPoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fire-and-forget tracking sink.
///
/// Implementations must never block and must never fail the caller; the engine treats emission as
/// an observable side effect, not an outcome it depends on.
pub trait TrackingSink
where
	Self: Send + Sync,
{
	/// Emits one tracking event.
	fn emit(
		&self,
		point: TrackingPoint,
		protocol: Option<ProtocolVersion>,
		attributes: &BTreeMap<String, String>,
	);
}

/// [`TrackingSink`] that drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracker;
impl TrackingSink for NoopTracker {
	fn emit(
		&self,
		_: TrackingPoint,
		_: Option<ProtocolVersion>,
		_: &BTreeMap<String, String>,
	) {
	}
}

/// Recorded tracking event, kept by [`MemoryTracker`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedEvent {
	/// Emitted point.
	pub point: TrackingPoint,
	/// Protocol version the event was attributed to.
	pub protocol: Option<ProtocolVersion>,
	/// Event attributes.
	pub attributes: BTreeMap<String, String>,
}

/// [`TrackingSink`] recording events in-process, for local development and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryTracker(Arc<Mutex<Vec<TrackedEvent>>>);
impl MemoryTracker {
	/// Returns a copy of every event emitted so far.
	pub fn events(&self) -> Vec<TrackedEvent> {
		self.0.lock().clone()
	}

	/// Returns the emitted points in order.
	pub fn points(&self) -> Vec<TrackingPoint> {
		self.0.lock().iter().map(|event| event.point).collect()
	}
}
impl TrackingSink for MemoryTracker {
	fn emit(
		&self,
		point: TrackingPoint,
		protocol: Option<ProtocolVersion>,
		attributes: &BTreeMap<String, String>,
	) {
		self.0.lock().push(TrackedEvent { point, protocol, attributes: attributes.clone() });
	}
}
