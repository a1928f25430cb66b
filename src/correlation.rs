//! Deterministic correlation/tracking id derivation.

// crates.io
use sha2::{Digest, Sha256};
// self
use crate::ids::{InstallationId, PairingId};

/// Hex characters exposed by generated ids; the width the remote processor expects.
const ID_LEN: usize = 32;

/// Field separator keeping `("ab", "c")` and `("a", "bc")` from colliding.
const SEPARATOR: [u8; 1] = [0x1f];

/// Derives the correlation id sent to the remote processor and used as the dispatch key.
///
/// Deterministic for identical inputs; a differing pairing id always yields a differing value.
/// Callers must derive a fresh value per consent flow rather than caching one across flows.
pub fn generate_id(
	installation_id: &InstallationId,
	client_version: &str,
	pairing_id: Option<&PairingId>,
) -> String {
	let mut hasher = Sha256::new();

	hasher.update(installation_id.as_ref().as_bytes());
	hasher.update(SEPARATOR);
	hasher.update(client_version.as_bytes());
	hasher.update(SEPARATOR);

	if let Some(pairing) = pairing_id {
		hasher.update(pairing.as_ref().as_bytes());
	}

	hasher.finalize().iter().take(ID_LEN / 2).fold(
		String::with_capacity(ID_LEN),
		|mut id, byte| {
			id.push_str(&format!("{byte:02x}"));

			id
		},
	)
}
