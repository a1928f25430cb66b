//! Simulates a full flow: dispatch a billing agreement, let a pretend transport echo a success
//! payload, and reconcile it back into a typed outcome.

// std
use std::sync::Arc;
// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
// self
use consent_switch::{
	config::{ConfigSnapshot, StaticConfigSource},
	dispatch::StaticReturnPath,
	ids::{InstallationId, PairingId},
	probe::{FixedInstallationIdSource, FixedWalletDetector, SecurityCheck},
	reconcile::{RawReturn, SwitchOutcome},
	request::ConsentRequest,
	switchboard::Switchboard,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let board = Switchboard::with_config_source(
		Arc::new(StaticConfigSource::new(ConfigSnapshot::built_in())),
		Arc::new(FixedWalletDetector::new(false, true)),
		Arc::new(FixedInstallationIdSource::new(InstallationId::new("demo-install-guid")?)),
		Arc::new(StaticReturnPath::new(true)),
		"1.2.3",
		"demo.ReturnHandler",
	)?;
	let request = ConsentRequest::billing_agreement(
		PairingId::new("BA-8XK12345MN678901L")?,
		"demo-client-id",
		"sandbox",
		"demo-app",
	);
	let pending = board.dispatch(&request, SecurityCheck::Enforced).await;
	let cmid = pending.client_metadata_id.clone().unwrap_or_default();

	// A well-behaved v2 authenticator echoes the metadata id back as `msg_guid`.
	let packed =
		URL_SAFE_NO_PAD.encode(serde_json::json!({ "msg_guid": cmid, "code": "C-42" }).to_string());
	let raw = RawReturn::from_fields([
		("version", "3.0"),
		("environment", "sandbox"),
		("payload", packed.as_str()),
	]);

	match board.reconcile(&request, &raw).await {
		SwitchOutcome::Success(payload) => {
			println!("Approved over protocol {}.", payload.protocol);
			println!("Body: {}.", serde_json::Value::Object(payload.body));
		},
		SwitchOutcome::Cancel => println!("The user walked away."),
		SwitchOutcome::Error { cause, .. } => println!("Reconciliation failed: {cause}."),
	}

	// An empty return is the canonical cancellation signal.
	assert!(matches!(board.reconcile(&request, &RawReturn::empty()).await, SwitchOutcome::Cancel));

	Ok(())
}
