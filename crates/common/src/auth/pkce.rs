//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 for secure OAuth authorization without client secrets.
//! Used for local applications where client secrets cannot be safely stored.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

fn random_urlsafe_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a cryptographically secure code verifier.
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43 chars).
/// Per RFC 7636, verifiers must be 43-128 characters long.
#[must_use]
pub fn generate_code_verifier() -> String {
    random_urlsafe_token()
}

/// Derive the code challenge from a verifier.
///
/// Per RFC 7636, the challenge is `BASE64URL(SHA256(ASCII(code_verifier)))`.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate a random state token for CSRF protection.
#[must_use]
pub fn generate_state() -> String {
    random_urlsafe_token()
}

/// PKCE challenge triple for one authorization attempt.
///
/// The verifier is kept by the caller until the token exchange; the challenge
/// goes into the authorization request; the state binds request and callback.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// Random string (43-128 chars, base64url). Kept secret until exchange.
    pub code_verifier: String,
    /// SHA-256 hash of the verifier, base64url encoded.
    pub code_challenge: String,
    /// Random anti-forgery token.
    pub state: String,
}

impl PkceChallenge {
    /// Generate a fresh challenge with cryptographically secure random values.
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        let state = generate_state();
        Self { code_verifier, code_challenge, state }
    }

    /// Challenge method identifier (always "S256").
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::pkce.
    use super::*;

    #[test]
    fn verifier_length_within_rfc_bounds() {
        let challenge = PkceChallenge::generate();
        assert!(challenge.code_verifier.len() >= 43);
        assert!(challenge.code_verifier.len() <= 128);
        assert!(!challenge.code_challenge.is_empty());
        assert!(!challenge.state.is_empty());
    }

    #[test]
    fn challenges_are_unique() {
        let a = PkceChallenge::generate();
        let b = PkceChallenge::generate();
        assert_ne!(a.code_verifier, b.code_verifier);
        assert_ne!(a.code_challenge, b.code_challenge);
        assert_ne!(a.state, b.state);
    }

    #[test]
    fn challenge_is_deterministic_for_a_verifier() {
        let challenge = PkceChallenge::generate();
        assert_eq!(challenge.code_challenge, generate_code_challenge(&challenge.code_verifier));
    }

    #[test]
    fn tokens_are_urlsafe_without_padding() {
        let challenge = PkceChallenge::generate();
        for value in [&challenge.code_verifier, &challenge.code_challenge, &challenge.state] {
            assert!(!value.contains('='));
            assert!(!value.contains('+'));
            assert!(!value.contains('/'));
        }
    }

    #[test]
    fn known_verifier_hashes_to_known_challenge() {
        // RFC 7636 appendix B test vector.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            generate_code_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }
}
