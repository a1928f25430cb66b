//! Browser-switch return parsing: deep-link URIs matched against the request's contract.

// self
use crate::{
	_prelude::*,
	recipe::{ProtocolVersion, UnknownProtocolError},
	reconcile::{self, ApprovalPayload, RawReturn, ReconcileError, SwitchOutcome},
	request::ConsentRequest,
	track::{TrackingPoint, TrackingSink},
};

pub(crate) fn parse_browser_return(
	request: &ConsentRequest,
	uri: &Url,
	raw: &RawReturn,
	tracker: &dyn TrackingSink,
) -> SwitchOutcome {
	if uri.scheme() != request.return_scheme() {
		return reconcile::fail(
			ReconcileError::SchemeMismatch {
				expected: request.return_scheme().to_owned(),
				actual: uri.scheme().to_owned(),
			},
			raw,
		);
	}

	let leg = uri.path_segments().and_then(|mut segments| segments.next_back()).unwrap_or("");

	match leg {
		"cancel" => {
			tracker.emit(TrackingPoint::Cancel, None, &BTreeMap::new());

			SwitchOutcome::Cancel
		},
		"success" => parse_success(request, uri, raw, tracker),
		_ => reconcile::fail(
			ReconcileError::UnknownReturnPath { path: uri.path().to_owned() },
			raw,
		),
	}
}

fn parse_success(
	request: &ConsentRequest,
	uri: &Url,
	raw: &RawReturn,
	tracker: &dyn TrackingSink,
) -> SwitchOutcome {
	let query: BTreeMap<String, String> =
		uri.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
	let Some(version) = query.get("version") else {
		return reconcile::fail(
			ReconcileError::MissingField { field: "version", protocol: None },
			raw,
		);
	};
	let Some(protocol) = ProtocolVersion::from_wire(version) else {
		return reconcile::fail(UnknownProtocolError { version: version.clone() }.into(), raw);
	};
	let param = request.kind().correlation_param();
	let Some(echo) = query.get(param) else {
		return reconcile::fail(
			ReconcileError::MissingField { field: param, protocol: Some(protocol) },
			raw,
		);
	};

	if echo != request.pairing_id().as_ref() {
		return reconcile::fail(
			ReconcileError::CorrelationMismatch {
				actual: echo.clone(),
				protocol: Some(protocol),
			},
			raw,
		);
	}

	let mut body = serde_json::Map::new();

	body.insert(param.to_owned(), serde_json::Value::String(echo.clone()));

	if let Some(packed) = query.get("payload") {
		match reconcile::decode_packed(packed) {
			Ok(decoded) =>
				for (key, value) in decoded {
					body.insert(key, value);
				},
			Err(detail) =>
				return reconcile::fail(
					ReconcileError::MalformedPayload { detail, protocol: Some(protocol) },
					raw,
				),
		}
	}

	tracker.emit(TrackingPoint::Return, Some(protocol), &BTreeMap::new());

	SwitchOutcome::Success(ApprovalPayload {
		protocol,
		environment: query.get("environment").cloned(),
		body,
	})
}
