//! Recipe values and the pure selection function that picks one per request.

// self
use crate::{_prelude::*, config::ConfigSnapshot, probe::ProbeFindings, request::RequestKind};

/// Protocol versions spoken by companion authenticators and browser endpoints.
///
/// The wire labels (`1.0`, `3.0`) are a fixed external contract shared with the companion app and
/// the browser endpoint; they appear verbatim in invocation descriptors and return payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ProtocolVersion {
	/// Legacy companion-app protocol.
	V1,
	/// Modern companion-app protocol.
	V2,
}
impl ProtocolVersion {
	/// Returns the wire label used in descriptors and return payloads.
	pub const fn as_wire(self) -> &'static str {
		match self {
			ProtocolVersion::V1 => "1.0",
			ProtocolVersion::V2 => "3.0",
		}
	}

	/// Parses a wire label back into a protocol version.
	pub fn from_wire(value: &str) -> Option<Self> {
		match value {
			"1.0" => Some(ProtocolVersion::V1),
			"3.0" => Some(ProtocolVersion::V2),
			_ => None,
		}
	}
}
impl TryFrom<String> for ProtocolVersion {
	type Error = UnknownProtocolError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::from_wire(&value).ok_or(UnknownProtocolError { version: value })
	}
}
impl From<ProtocolVersion> for String {
	fn from(value: ProtocolVersion) -> Self {
		value.as_wire().to_owned()
	}
}
impl Display for ProtocolVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_wire())
	}
}

/// Error returned when a wire label names no supported protocol version.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown protocol version `{version}`.")]
pub struct UnknownProtocolError {
	/// Offending wire label.
	pub version: String,
}

/// Transports a recipe can hand a flow to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeTarget {
	/// Installed companion authenticator.
	Wallet,
	/// System browser.
	Browser,
}
impl RecipeTarget {
	/// Returns the stable label used in tracking attributes.
	pub const fn as_str(self) -> &'static str {
		match self {
			RecipeTarget::Wallet => "wallet",
			RecipeTarget::Browser => "browser",
		}
	}
}
impl Display for RecipeTarget {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Immutable description of one executable path for a request.
///
/// Produced by [`select_recipe`] and consumed by the dispatch builder within the same decision;
/// never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recipe {
	/// Hand the flow to the companion authenticator.
	Wallet {
		/// Protocol version the authenticator speaks.
		protocol: ProtocolVersion,
	},
	/// Hand the flow to the system browser.
	Browser {
		/// Protocol version the endpoint speaks.
		protocol: ProtocolVersion,
		/// Endpoint the browser navigates to.
		endpoint: Url,
	},
}
impl Recipe {
	/// Returns the transport this recipe hands the flow to.
	pub const fn target(&self) -> RecipeTarget {
		match self {
			Recipe::Wallet { .. } => RecipeTarget::Wallet,
			Recipe::Browser { .. } => RecipeTarget::Browser,
		}
	}

	/// Returns the protocol version spoken over the transport.
	pub const fn protocol(&self) -> ProtocolVersion {
		match self {
			Recipe::Wallet { protocol } | Recipe::Browser { protocol, .. } => *protocol,
		}
	}
}

/// Picks the first eligible recipe for `kind` in the snapshot's declared priority order.
///
/// Wallet candidates are eligible only when the probe confirmed a companion authenticator
/// speaking their protocol version. Browser candidates are eligible whenever their endpoint
/// parses as a URL, which makes the browser the universal fallback; `None` therefore means the
/// browser path itself is disabled or misconfigured server-side.
pub fn select_recipe(
	kind: RequestKind,
	config: &ConfigSnapshot,
	findings: &ProbeFindings,
) -> Option<Recipe> {
	config.recipes(kind).iter().find_map(|spec| match spec.target {
		RecipeTarget::Wallet =>
			findings.available(spec.protocol).then_some(Recipe::Wallet { protocol: spec.protocol }),
		RecipeTarget::Browser => {
			let endpoint = Url::parse(spec.endpoint.as_deref()?).ok()?;

			Some(Recipe::Browser { protocol: spec.protocol, endpoint })
		},
	})
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::RecipeSpec;

	fn wallet(protocol: ProtocolVersion) -> RecipeSpec {
		RecipeSpec { target: RecipeTarget::Wallet, protocol, endpoint: None }
	}

	fn browser(endpoint: Option<&str>) -> RecipeSpec {
		RecipeSpec {
			target: RecipeTarget::Browser,
			protocol: ProtocolVersion::V2,
			endpoint: endpoint.map(str::to_owned),
		}
	}

	fn snapshot(recipes: Vec<RecipeSpec>) -> ConfigSnapshot {
		ConfigSnapshot {
			file_timestamp: None,
			checkout_recipes: recipes.clone(),
			billing_agreement_recipes: recipes,
		}
	}

	#[test]
	fn wire_labels_round_trip() {
		assert_eq!(ProtocolVersion::from_wire("1.0"), Some(ProtocolVersion::V1));
		assert_eq!(ProtocolVersion::from_wire("3.0"), Some(ProtocolVersion::V2));
		assert_eq!(ProtocolVersion::from_wire("2.0"), None);
		assert_eq!(ProtocolVersion::V2.as_wire(), "3.0");
	}

	#[test]
	fn first_eligible_candidate_wins() {
		let config = snapshot(vec![
			wallet(ProtocolVersion::V2),
			wallet(ProtocolVersion::V1),
			browser(Some("https://switch.example.com/begin")),
		]);
		let findings = ProbeFindings::from_observations(true, true);
		let recipe = select_recipe(RequestKind::Checkout, &config, &findings)
			.expect("A wallet candidate should be eligible.");

		assert_eq!(recipe, Recipe::Wallet { protocol: ProtocolVersion::V2 });
	}

	#[test]
	fn v1_is_never_selected_while_v2_is_available() {
		// Even when the server-driven order lists v1 first, the probe's supersession rule keeps
		// the v1 authenticator invisible whenever v2 is present.
		let config = snapshot(vec![
			wallet(ProtocolVersion::V1),
			wallet(ProtocolVersion::V2),
			browser(Some("https://switch.example.com/begin")),
		]);
		let findings = ProbeFindings::from_observations(true, true);
		let recipe = select_recipe(RequestKind::BillingAgreement, &config, &findings)
			.expect("A wallet candidate should be eligible.");

		assert_eq!(recipe.protocol(), ProtocolVersion::V2);
	}

	#[test]
	fn falls_back_to_v1_when_v2_is_absent() {
		let config = snapshot(vec![
			wallet(ProtocolVersion::V2),
			wallet(ProtocolVersion::V1),
			browser(Some("https://switch.example.com/begin")),
		]);
		let findings = ProbeFindings::from_observations(false, true);
		let recipe = select_recipe(RequestKind::Checkout, &config, &findings)
			.expect("The v1 wallet candidate should be eligible.");

		assert_eq!(recipe, Recipe::Wallet { protocol: ProtocolVersion::V1 });
	}

	#[test]
	fn browser_is_the_universal_fallback() {
		let config = snapshot(vec![
			wallet(ProtocolVersion::V2),
			wallet(ProtocolVersion::V1),
			browser(Some("https://switch.example.com/begin")),
		]);
		let findings = ProbeFindings::from_observations(false, false);

		for kind in [RequestKind::Checkout, RequestKind::BillingAgreement] {
			let recipe = select_recipe(kind, &config, &findings)
				.expect("The browser candidate should always be eligible.");

			assert_eq!(recipe.target(), RecipeTarget::Browser);
		}
	}

	#[test]
	fn misconfigured_browser_candidates_are_skipped() {
		let config = snapshot(vec![browser(None)]);
		let findings = ProbeFindings::from_observations(false, false);

		assert_eq!(select_recipe(RequestKind::Checkout, &config, &findings), None);

		let config = snapshot(vec![browser(Some("not a url"))]);

		assert_eq!(select_recipe(RequestKind::Checkout, &config, &findings), None);
	}
}
