//! Configuration snapshot wire model and the built-in fallback.

// self
use crate::{
	_prelude::*,
	recipe::{ProtocolVersion, RecipeTarget},
	request::RequestKind,
};

/// Browser endpoint baked into the built-in fallback snapshot.
///
/// Deployments that serve a real configuration document override this on the first successful
/// refresh; offline installations can swap the whole fallback via
/// [`Switchboard::with_built_in_config`](crate::switchboard::Switchboard::with_built_in_config).
const BUILT_IN_BROWSER_ENDPOINT: &str = "https://checkout.example.com/one-touch-login/";

/// One recipe candidate as declared by the configuration document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSpec {
	/// Transport this candidate hands the flow to.
	pub target: RecipeTarget,
	/// Protocol version spoken over that transport.
	pub protocol: ProtocolVersion,
	/// Browser endpoint template; ignored for wallet candidates.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,
}

/// Immutable configuration snapshot, replaced wholesale on every successful refresh.
///
/// The JSON field names mirror the server document: candidate lists are declared per request
/// kind, highest priority first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
	/// Opaque server-side document timestamp, echoed for diagnostics.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_timestamp: Option<String>,
	/// Checkout candidates in decreasing priority order.
	#[serde(rename = "checkout_recipes_in_decreasing_priority_order")]
	pub checkout_recipes: Vec<RecipeSpec>,
	/// Billing agreement candidates in decreasing priority order.
	#[serde(rename = "billing_agreement_recipes_in_decreasing_priority_order")]
	pub billing_agreement_recipes: Vec<RecipeSpec>,
}
impl ConfigSnapshot {
	/// Returns the candidate list for `kind`, highest priority first.
	pub fn recipes(&self, kind: RequestKind) -> &[RecipeSpec] {
		match kind {
			RequestKind::Checkout => &self.checkout_recipes,
			RequestKind::BillingAgreement => &self.billing_agreement_recipes,
		}
	}

	/// Built-in fallback used before any fetch succeeds: wallet-v2, wallet-v1, then browser.
	pub fn built_in() -> Self {
		let recipes = vec![
			RecipeSpec { target: RecipeTarget::Wallet, protocol: ProtocolVersion::V2, endpoint: None },
			RecipeSpec { target: RecipeTarget::Wallet, protocol: ProtocolVersion::V1, endpoint: None },
			RecipeSpec {
				target: RecipeTarget::Browser,
				protocol: ProtocolVersion::V2,
				endpoint: Some(BUILT_IN_BROWSER_ENDPOINT.to_owned()),
			},
		];

		Self {
			file_timestamp: None,
			checkout_recipes: recipes.clone(),
			billing_agreement_recipes: recipes,
		}
	}
}
