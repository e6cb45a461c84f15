//! Webhook signature verification
//!
//! LINE signs every webhook body with the channel secret:
//! `X-Line-Signature = base64(HMAC-SHA256(channel_secret, body))`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{MessagingError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Verifies webhook bodies against the channel secret
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier").finish_non_exhaustive()
    }
}

impl SignatureVerifier {
    pub fn new(channel_secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: channel_secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, body: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| MessagingError::Config(format!("channel secret: {e}")))?;
        mac.update(body);
        Ok(mac)
    }

    /// Signature LINE would send for `body`
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        Ok(STANDARD.encode(self.mac(body)?.finalize().into_bytes()))
    }

    /// Check `signature` against `body` in constant time
    pub fn verify(&self, body: &[u8], signature: &str) -> Result<()> {
        let expected = STANDARD
            .decode(signature.trim())
            .map_err(|_| MessagingError::InvalidSignature("not base64".into()))?;

        self.mac(body)?
            .verify_slice(&expected)
            .map_err(|_| MessagingError::InvalidSignature("mismatch".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"destination":"U0","events":[]}"#;

    #[test]
    fn test_sign_then_verify() {
        let verifier = SignatureVerifier::new("channel-secret");
        let signature = verifier.sign(BODY).unwrap();

        assert!(verifier.verify(BODY, &signature).is_ok());
        assert!(verifier.verify(BODY, &format!(" {signature} ")).is_ok());
    }

    #[test]
    fn test_rejects_tampered_body() {
        let verifier = SignatureVerifier::new("channel-secret");
        let signature = verifier.sign(BODY).unwrap();

        let err = verifier.verify(b"{\"events\":[]}", &signature).unwrap_err();
        assert!(matches!(err, MessagingError::InvalidSignature(_)));
    }

    #[test]
    fn test_rejects_other_secret_and_garbage() {
        let signature = SignatureVerifier::new("other").sign(BODY).unwrap();
        let verifier = SignatureVerifier::new("channel-secret");

        assert!(verifier.verify(BODY, &signature).is_err());
        assert!(verifier.verify(BODY, "%%%").is_err());
        assert!(verifier.verify(BODY, "").is_err());
    }

    #[test]
    fn test_known_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let verifier = SignatureVerifier::new("key");
        assert_eq!(
            verifier.sign(b"The quick brown fox jumps over the lazy dog").unwrap(),
            "97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg="
        );
    }
}
