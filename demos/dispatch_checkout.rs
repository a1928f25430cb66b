//! Walks through dispatching a checkout request against a fixed environment and printing the
//! hand-off descriptor the launch glue would consume.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use consent_switch::{
	config::{ConfigSnapshot, StaticConfigSource},
	dispatch::{InvocationDescriptor, StaticReturnPath},
	ids::{InstallationId, PairingId},
	probe::{FixedInstallationIdSource, FixedWalletDetector, SecurityCheck},
	request::ConsentRequest,
	switchboard::Switchboard,
	track::MemoryTracker,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let tracker = Arc::new(MemoryTracker::default());
	let board = Switchboard::with_config_source(
		Arc::new(StaticConfigSource::new(ConfigSnapshot::built_in())),
		// Pretend only the modern authenticator is installed.
		Arc::new(FixedWalletDetector::new(false, true)),
		Arc::new(FixedInstallationIdSource::new(InstallationId::new("demo-install-guid")?)),
		Arc::new(StaticReturnPath::new(true)),
		"1.2.3",
		"demo.ReturnHandler",
	)?
	.with_tracker(tracker.clone());
	let request = ConsentRequest::checkout(
		PairingId::new("EC-6WW17184665016425")?,
		"demo-client-id",
		"sandbox",
		"demo-app",
	)
	.with_param("locale", "en_US");
	let pending = board.dispatch(&request, SecurityCheck::Enforced).await;

	println!("Dispatch succeeded: {}.", pending.success);
	println!("Chosen target: {:?}.", pending.target);
	println!("Client metadata id: {:?}.", pending.client_metadata_id);

	match pending.invocation {
		Some(InvocationDescriptor::Wallet(invocation)) => {
			println!("Wallet hand-off ({}):", invocation.protocol);

			for (key, value) in &invocation.fields {
				println!("  {key} = {value}");
			}
		},
		Some(InvocationDescriptor::Browser(invocation)) =>
			println!("Browser hand-off: open {}.", invocation.url),
		None => println!("Nothing to launch: {:?}.", pending.failure),
	}

	println!("Tracked points: {:?}.", tracker.points());

	Ok(())
}
