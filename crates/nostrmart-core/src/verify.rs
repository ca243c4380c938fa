//! Event verification: id integrity and BIP-340 signature checks.

use crate::error::VerifyError;
use crate::event::Event;

/// Verify an event, returning `true` only if every check passes.
///
/// Never panics. Malformed input, an id mismatch and a bad signature all
/// read as `false`; use [`verify_event_detailed`] when the reason matters.
pub fn verify_event(event: &Event) -> bool {
    verify_event_detailed(event).is_ok()
}

/// Verify an event and report why it failed.
///
/// Steps, each a hard precondition for the next:
/// 1. `id`, `pubkey` and `sig` are well-formed hex of 64, 64 and 128 chars
/// 2. The recomputed canonical id equals the claimed id
/// 3. The signature over the id verifies under the public key
pub fn verify_event_detailed(event: &Event) -> Result<(), VerifyError> {
    // 1. Parse wire fields
    let claimed = event.event_id()?;
    let public_key = event.public_key()?;
    let signature = event.signature()?;

    // 2. Recompute id; no signature math on mismatch
    let computed = event.compute_id();
    if computed != claimed {
        return Err(VerifyError::IdMismatch {
            claimed: claimed.to_hex(),
            computed: computed.to_hex(),
        });
    }

    // 3. Schnorr verification over the 32-byte id
    public_key
        .verify(computed.as_bytes(), &signature)
        .map_err(|_| VerifyError::SignatureFailed)
}
