//! Shows the configuration lifecycle: a reqwest-backed switchboard keeps serving its built-in
//! snapshot when the remote document cannot be fetched, and can be pinned to it explicitly.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use consent_switch::{
	config::CancelToken,
	dispatch::StaticReturnPath,
	ids::InstallationId,
	probe::{FixedInstallationIdSource, FixedWalletDetector},
	request::RequestKind,
	switchboard::Switchboard,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	// Nothing listens here; every refresh fails and the built-in snapshot stays active.
	let board = Switchboard::new(
		Url::parse("https://127.0.0.1:9/v1/configuration")?,
		Arc::new(FixedWalletDetector::default()),
		Arc::new(FixedInstallationIdSource::new(InstallationId::new("demo-install-guid")?)),
		Arc::new(StaticReturnPath::new(true)),
		"1.2.3",
		"demo.ReturnHandler",
	)?;

	board.config().refresh().await;
	println!(
		"Recipes after a failed refresh: {} checkout candidates.",
		board.config().current().recipes(RequestKind::Checkout).len()
	);
	println!("Last successful refresh: {:?}.", board.config().last_refreshed());

	// An in-flight fetch can be abandoned; a cancelled fetch never publishes.
	let token = CancelToken::new();

	token.cancel();
	board.config().refresh_with_cancel(&token).await;

	// Pin the built-in snapshot for offline operation.
	board.use_built_in_config(true);
	println!("Pinned to the built-in snapshot.");

	Ok(())
}
