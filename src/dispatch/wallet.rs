//! Companion-authenticator invocation encodings for the v1 and v2 wire layouts.

// self
use crate::{
	_prelude::*,
	error::PayloadError,
	ids::InstallationId,
	recipe::ProtocolVersion,
	request::ConsentRequest,
};

/// Companion-authenticator hand-off descriptor: a flat field map in the protocol's fixed layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletInvocation {
	/// Protocol version the layout follows.
	pub protocol: ProtocolVersion,
	/// Wire fields, laid out per the protocol version.
	pub fields: BTreeMap<String, String>,
}

/// Builds the wallet descriptor for `protocol`, using its fixed wire layout.
///
/// The layouts are an external contract, not negotiable here: v1 keeps every request parameter
/// flat and predates the client metadata id; v2 packs the parameters into a single JSON `payload`
/// blob and carries the metadata id explicitly.
pub(crate) fn build_wallet_invocation(
	request: &ConsentRequest,
	protocol: ProtocolVersion,
	installation_id: &InstallationId,
	client_metadata_id: &str,
) -> Result<WalletInvocation, PayloadError> {
	let mut fields = BTreeMap::from_iter([
		("version".to_owned(), protocol.as_wire().to_owned()),
		("app_guid".to_owned(), installation_id.as_ref().to_owned()),
		("client_id".to_owned(), request.client_id().to_owned()),
		("environment".to_owned(), request.environment().to_owned()),
		("request_type".to_owned(), request.kind().as_str().to_owned()),
	]);

	match protocol {
		ProtocolVersion::V1 =>
			for (key, value) in request.params() {
				fields.insert(key.clone(), value.clone());
			},
		ProtocolVersion::V2 => {
			let payload = serde_json::to_string(request.params()).map_err(|source| {
				PayloadError::Serialize { version: protocol.as_wire(), source }
			})?;

			fields.insert("client_metadata_id".to_owned(), client_metadata_id.to_owned());
			fields.insert("payload".to_owned(), payload);
		},
	}

	Ok(WalletInvocation { protocol, fields })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::ids::PairingId;

	fn request() -> ConsentRequest {
		ConsentRequest::billing_agreement(
			PairingId::new("BA-77").expect("Pairing fixture should be valid."),
			"client-1",
			"live",
			"demo-app",
		)
		.with_param("scope", "future_payments")
	}

	fn install() -> InstallationId {
		InstallationId::new("install-guid-1").expect("Installation fixture should be valid.")
	}

	#[test]
	fn v1_layout_is_flat_and_predates_the_metadata_id() {
		let invocation =
			build_wallet_invocation(&request(), ProtocolVersion::V1, &install(), "cmid-1")
				.expect("The v1 layout should build.");

		assert_eq!(invocation.fields.get("version").map(String::as_str), Some("1.0"));
		assert_eq!(invocation.fields.get("app_guid").map(String::as_str), Some("install-guid-1"));
		assert_eq!(
			invocation.fields.get("request_type").map(String::as_str),
			Some("billing_agreement")
		);
		assert_eq!(invocation.fields.get("scope").map(String::as_str), Some("future_payments"));
		assert!(!invocation.fields.contains_key("client_metadata_id"));
		assert!(!invocation.fields.contains_key("payload"));
	}

	#[test]
	fn v2_layout_packs_parameters_and_carries_the_metadata_id() {
		let invocation =
			build_wallet_invocation(&request(), ProtocolVersion::V2, &install(), "cmid-1")
				.expect("The v2 layout should build.");

		assert_eq!(invocation.fields.get("version").map(String::as_str), Some("3.0"));
		assert_eq!(
			invocation.fields.get("client_metadata_id").map(String::as_str),
			Some("cmid-1")
		);
		assert!(!invocation.fields.contains_key("scope"), "v2 parameters travel packed.");

		let packed = invocation.fields.get("payload").expect("v2 must carry a payload blob.");
		let parsed: BTreeMap<String, String> =
			serde_json::from_str(packed).expect("Packed payload should be JSON.");

		assert_eq!(parsed.get("scope").map(String::as_str), Some("future_payments"));
	}
}
