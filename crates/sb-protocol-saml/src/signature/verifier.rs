//! Signature verification against a resolved inbound trust policy.

use crate::trust::InboundPolicy;

use super::SignedXml;

/// Checks enveloped signatures with the policy's trust engine.
///
/// Embedded `KeyInfo` certificates are ignored; only credentials the trust
/// engine was configured with from metadata count.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Returns true when the signature covers the whole document, references
    /// the expected element and verifies under the policy's trust engine.
    ///
    /// Callers check that a signature is present before asking.
    #[must_use]
    pub fn is_signature_good(signed: &SignedXml, policy: &InboundPolicy) -> bool {
        Self::is_signature_good_for(signed, policy, None)
    }

    /// Like [`is_signature_good`](Self::is_signature_good), additionally
    /// requiring the reference to name `expected_id`.
    #[must_use]
    pub fn is_signature_good_for(
        signed: &SignedXml,
        policy: &InboundPolicy,
        expected_id: Option<&str>,
    ) -> bool {
        let Some(engine) = policy.verification_trust_engine.as_ref() else {
            tracing::warn!(idp = %policy.idp_entity_id, "no trust engine for signed issuer");
            return false;
        };

        let signature = signed.signature();
        if let Some(expected) = expected_id {
            if signature.reference_id() != expected {
                tracing::debug!(
                    idp = %policy.idp_entity_id,
                    reference = signature.reference_id(),
                    expected,
                    "signature references another element"
                );
                return false;
            }
        }

        if let Err(e) = signed.verify_digest() {
            tracing::debug!(idp = %policy.idp_entity_id, error = %e, "digest check failed");
            return false;
        }

        let Ok(signature_bytes) = signed.signature_bytes() else {
            return false;
        };

        let signed_info = match signature.canonical_signed_info() {
            Ok(signed_info) => signed_info,
            Err(e) => {
                tracing::debug!(idp = %policy.idp_entity_id, error = %e, "SignedInfo canonicalization failed");
                return false;
            }
        };

        engine.validate(
            signed_info.as_bytes(),
            &signature_bytes,
            signature.algorithm,
            &policy.signature_criteria,
        )
    }
}
