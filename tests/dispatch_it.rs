mod common;

// self
use consent_switch::{
	config::ConfigSnapshot,
	dispatch::{DispatchFailure, InvocationDescriptor},
	probe::{FixedWalletDetector, SecurityCheck},
	recipe::{ProtocolVersion, RecipeTarget},
	request::ConsentRequest,
	track::TrackingPoint,
};

fn checkout() -> ConsentRequest {
	ConsentRequest::checkout(common::pairing("EC-1234"), "client-1", "sandbox", "demo-app")
		.with_param("locale", "en_US")
}

fn billing_agreement() -> ConsentRequest {
	ConsentRequest::billing_agreement(common::pairing("BA-77"), "client-1", "live", "demo-app")
}

#[tokio::test]
async fn billing_agreement_without_wallet_falls_back_to_the_browser() {
	let (board, tracker) = common::switchboard_with(
		FixedWalletDetector::new(false, false),
		ConfigSnapshot::built_in(),
		true,
	);
	let request = billing_agreement();
	let pending = board.dispatch(&request, SecurityCheck::Enforced).await;

	assert!(pending.success);
	assert_eq!(pending.target, Some(RecipeTarget::Browser));

	let Some(InvocationDescriptor::Browser(invocation)) = pending.invocation else {
		panic!("The fallback dispatch should produce a browser descriptor.");
	};

	assert!(invocation.url.as_str().contains("pairing_id=BA-77"));
	assert!(tracker.points().contains(&TrackingPoint::SwitchToBrowser));
}

#[tokio::test]
async fn v2_wallet_wins_when_installed() {
	let (board, tracker) = common::switchboard_with(
		FixedWalletDetector::new(true, true),
		ConfigSnapshot::built_in(),
		true,
	);
	let request = checkout();
	let pending = board.dispatch(&request, SecurityCheck::Enforced).await;

	assert!(pending.success);
	assert_eq!(pending.target, Some(RecipeTarget::Wallet));
	assert_eq!(
		pending.invocation.as_ref().map(InvocationDescriptor::protocol),
		Some(ProtocolVersion::V2)
	);
	// One presence event for the short-circuited probe, then the switch event.
	assert_eq!(
		tracker.points(),
		vec![TrackingPoint::WalletPresent, TrackingPoint::SwitchToWallet]
	);
}

#[tokio::test]
async fn client_metadata_id_is_stable_across_re_dispatch() {
	let (board, _) = common::switchboard_with(
		FixedWalletDetector::new(false, true),
		ConfigSnapshot::built_in(),
		true,
	);
	let request = checkout();

	assert_eq!(request.client_metadata_id(), None);

	let first = board.dispatch(&request, SecurityCheck::Enforced).await;
	let second = board.dispatch(&request, SecurityCheck::Enforced).await;

	assert_eq!(first.client_metadata_id, second.client_metadata_id);
	assert_eq!(request.client_metadata_id(), first.client_metadata_id.as_deref());
}

#[tokio::test]
async fn an_empty_recipe_list_yields_a_failed_pending_request() {
	let snapshot = ConfigSnapshot {
		file_timestamp: None,
		checkout_recipes: Vec::new(),
		billing_agreement_recipes: Vec::new(),
	};
	let (board, _) =
		common::switchboard_with(FixedWalletDetector::new(true, true), snapshot, true);
	let pending = board.dispatch(&checkout(), SecurityCheck::Enforced).await;

	assert!(!pending.success);
	assert_eq!(pending.target, None);
	assert!(pending.client_metadata_id.is_none());
	assert!(matches!(pending.failure, Some(DispatchFailure::NoEligibleRecipe)));
}

#[tokio::test]
async fn unregistered_return_paths_fail_with_the_browser_target() {
	let (board, tracker) = common::switchboard_with(
		FixedWalletDetector::new(false, false),
		ConfigSnapshot::built_in(),
		false,
	);
	let pending = board.dispatch(&checkout(), SecurityCheck::Enforced).await;

	assert!(!pending.success);
	assert_eq!(pending.target, Some(RecipeTarget::Browser));
	assert!(matches!(pending.failure, Some(DispatchFailure::ReturnPathUnregistered { .. })));
	assert!(
		!tracker.points().contains(&TrackingPoint::SwitchToBrowser),
		"A failed dispatch must not report a switch."
	);
}

#[tokio::test]
async fn probing_without_a_wallet_tracks_both_protocols() {
	let (board, tracker) = common::switchboard_with(
		FixedWalletDetector::new(false, false),
		ConfigSnapshot::built_in(),
		true,
	);

	assert!(!board.is_companion_app_installed(SecurityCheck::Enforced).await);
	assert_eq!(
		tracker.points(),
		vec![TrackingPoint::WalletAbsent, TrackingPoint::WalletAbsent]
	);

	let events = tracker.events();

	assert_eq!(events[0].protocol, Some(ProtocolVersion::V2));
	assert_eq!(events[1].protocol, Some(ProtocolVersion::V1));
}
