//! App-switch return parsing, demultiplexed by the protocol version the authenticator claims.

// self
use crate::{
	_prelude::*,
	recipe::{ProtocolVersion, UnknownProtocolError},
	reconcile::{self, ApprovalPayload, RawReturn, ReconcileError, SwitchOutcome},
	request::ConsentRequest,
	track::{TrackingPoint, TrackingSink},
};

pub(crate) fn parse_wallet_return(
	request: &ConsentRequest,
	raw: &RawReturn,
	tracker: &dyn TrackingSink,
) -> SwitchOutcome {
	let Some(version) = raw.fields.get("version") else {
		return reconcile::fail(
			ReconcileError::MissingField { field: "version", protocol: None },
			raw,
		);
	};
	let Some(protocol) = ProtocolVersion::from_wire(version) else {
		return reconcile::fail(
			UnknownProtocolError { version: version.clone() }.into(),
			raw,
		);
	};

	if let Some(message) = raw.fields.get("error").filter(|message| !message.is_empty()) {
		tracker.emit(TrackingPoint::Error, Some(protocol), &BTreeMap::new());

		return reconcile::fail(
			ReconcileError::Remote { message: message.clone(), protocol: Some(protocol) },
			raw,
		);
	}
	if raw.fields.get("user_canceled").is_some_and(|flag| flag == "true") {
		tracker.emit(TrackingPoint::Cancel, Some(protocol), &BTreeMap::new());

		return SwitchOutcome::Cancel;
	}

	match protocol {
		ProtocolVersion::V1 => parse_v1_success(raw, tracker),
		ProtocolVersion::V2 => parse_v2_success(request, raw, tracker),
	}
}

/// v1 authenticators answer flat: the access token and environment travel as plain fields.
fn parse_v1_success(raw: &RawReturn, tracker: &dyn TrackingSink) -> SwitchOutcome {
	const PROTOCOL: ProtocolVersion = ProtocolVersion::V1;

	let Some(access_token) = raw.fields.get("access_token") else {
		return reconcile::fail(
			ReconcileError::MissingField { field: "access_token", protocol: Some(PROTOCOL) },
			raw,
		);
	};
	let Some(environment) = raw.fields.get("environment") else {
		return reconcile::fail(
			ReconcileError::MissingField { field: "environment", protocol: Some(PROTOCOL) },
			raw,
		);
	};
	let mut body = serde_json::Map::new();

	body.insert("access_token".to_owned(), serde_json::Value::String(access_token.clone()));

	if let Some(email) = raw.fields.get("email") {
		body.insert("email".to_owned(), serde_json::Value::String(email.clone()));
	}

	tracker.emit(TrackingPoint::Return, Some(PROTOCOL), &BTreeMap::new());

	SwitchOutcome::Success(ApprovalPayload {
		protocol: PROTOCOL,
		environment: Some(environment.clone()),
		body,
	})
}

/// v2 authenticators answer packed: a base64url JSON blob whose `msg_guid` must echo the
/// client metadata id assigned at dispatch.
fn parse_v2_success(
	request: &ConsentRequest,
	raw: &RawReturn,
	tracker: &dyn TrackingSink,
) -> SwitchOutcome {
	const PROTOCOL: ProtocolVersion = ProtocolVersion::V2;

	let Some(environment) = raw.fields.get("environment") else {
		return reconcile::fail(
			ReconcileError::MissingField { field: "environment", protocol: Some(PROTOCOL) },
			raw,
		);
	};
	let Some(packed) = raw.fields.get("payload") else {
		return reconcile::fail(
			ReconcileError::MissingField { field: "payload", protocol: Some(PROTOCOL) },
			raw,
		);
	};
	let body = match reconcile::decode_packed(packed) {
		Ok(body) => body,
		Err(detail) =>
			return reconcile::fail(
				ReconcileError::MalformedPayload { detail, protocol: Some(PROTOCOL) },
				raw,
			),
	};
	let Some(msg_guid) = body.get("msg_guid").and_then(serde_json::Value::as_str) else {
		return reconcile::fail(
			ReconcileError::MissingField { field: "msg_guid", protocol: Some(PROTOCOL) },
			raw,
		);
	};

	if request.client_metadata_id() != Some(msg_guid) {
		return reconcile::fail(
			ReconcileError::CorrelationMismatch {
				actual: msg_guid.to_owned(),
				protocol: Some(PROTOCOL),
			},
			raw,
		);
	}

	tracker.emit(TrackingPoint::Return, Some(PROTOCOL), &BTreeMap::new());

	SwitchOutcome::Success(ApprovalPayload {
		protocol: PROTOCOL,
		environment: Some(environment.clone()),
		body,
	})
}
