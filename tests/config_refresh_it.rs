#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use tokio::time::{Duration, sleep};
use url::Url;
// self
use consent_switch::{
	config::{ConfigSnapshot, ConfigSource, ConfigStore, SourceFuture},
	http::ReqwestConfigSource,
};

const DOCUMENT: &str = r#"{
	"file_timestamp": "2026-03-01T00:00:00Z",
	"checkout_recipes_in_decreasing_priority_order": [
		{ "target": "wallet", "protocol": "3.0" },
		{ "target": "browser", "protocol": "3.0", "endpoint": "https://switch.example.com/begin" }
	],
	"billing_agreement_recipes_in_decreasing_priority_order": [
		{ "target": "browser", "protocol": "3.0", "endpoint": "https://switch.example.com/begin" }
	]
}"#;

fn source_for(server: &MockServer) -> Arc<ReqwestConfigSource> {
	let endpoint =
		Url::parse(&server.url("/v1/configuration")).expect("Mock endpoint should parse.");

	Arc::new(ReqwestConfigSource::new(endpoint))
}

#[tokio::test]
async fn refresh_publishes_the_fetched_document() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/configuration");
			then.status(200).header("content-type", "application/json").body(DOCUMENT);
		})
		.await;
	let store = ConfigStore::new(source_for(&server));

	store.refresh().await;
	mock.assert_async().await;

	let current = store.current();

	assert_eq!(current.file_timestamp.as_deref(), Some("2026-03-01T00:00:00Z"));
	assert_eq!(current.checkout_recipes.len(), 2);
	assert!(store.last_refreshed().is_some());
}

#[tokio::test]
async fn server_failures_keep_the_previous_snapshot() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/configuration");
			then.status(503);
		})
		.await;

	let store = ConfigStore::new(source_for(&server));

	store.refresh().await;

	assert_eq!(*store.current(), ConfigSnapshot::built_in());
	assert_eq!(store.last_refreshed(), None);
}

#[tokio::test]
async fn malformed_documents_keep_the_previous_snapshot() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/configuration");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{ "checkout_recipes_in_decreasing_priority_order": "oops" }"#);
		})
		.await;

	let store = ConfigStore::new(source_for(&server));

	store.refresh().await;

	assert_eq!(*store.current(), ConfigSnapshot::built_in());
}

struct SlowSource {
	snapshot: ConfigSnapshot,
	delay: Duration,
}
impl ConfigSource for SlowSource {
	fn fetch(&self) -> SourceFuture<'_> {
		let snapshot = self.snapshot.clone();
		let delay = self.delay;

		Box::pin(async move {
			sleep(delay).await;

			Ok(snapshot)
		})
	}
}

#[tokio::test]
async fn overlapping_refreshes_never_publish_a_torn_snapshot() {
	let fetched = ConfigSnapshot {
		file_timestamp: Some("2026-03-02T00:00:00Z".to_owned()),
		..ConfigSnapshot::built_in()
	};
	let store = Arc::new(ConfigStore::new(Arc::new(SlowSource {
		snapshot: fetched.clone(),
		delay: Duration::from_millis(50),
	})));
	let slow = {
		let store = store.clone();

		tokio::spawn(async move { store.refresh().await })
	};

	// The second refresh overlaps the in-flight fetch and must return without queueing.
	store.refresh().await;

	let during = store.current();

	assert!(
		*during == ConfigSnapshot::built_in() || *during == fetched,
		"A reader must observe a whole snapshot, never a mixture."
	);

	slow.await.expect("The in-flight refresh should complete.");

	let after = store.current();

	assert!(*after == ConfigSnapshot::built_in() || *after == fetched);
	assert_eq!(*after, fetched, "The in-flight fetch should win once it lands.");
}
