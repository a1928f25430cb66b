// std
use std::sync::Arc;
// self
use consent_switch::{
	config::{ConfigSnapshot, StaticConfigSource},
	dispatch::StaticReturnPath,
	ids::{InstallationId, PairingId},
	probe::{FixedInstallationIdSource, FixedWalletDetector},
	switchboard::Switchboard,
	track::MemoryTracker,
};

pub fn pairing(value: &str) -> PairingId {
	PairingId::new(value).expect("Pairing fixture should be valid.")
}

pub fn switchboard_with(
	detector: FixedWalletDetector,
	snapshot: ConfigSnapshot,
	return_path_registered: bool,
) -> (Switchboard, MemoryTracker) {
	let tracker = MemoryTracker::default();
	let board = Switchboard::with_config_source(
		Arc::new(StaticConfigSource::new(snapshot)),
		Arc::new(detector),
		Arc::new(FixedInstallationIdSource::new(
			InstallationId::new("install-guid-1").expect("Installation fixture should be valid."),
		)),
		Arc::new(StaticReturnPath::new(return_path_registered)),
		"1.2.3",
		"demo.ReturnHandler",
	)
	.expect("Switchboard fixture should build.")
	.with_tracker(Arc::new(tracker.clone()));

	(board, tracker)
}
