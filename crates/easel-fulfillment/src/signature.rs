//! Webhook signature verification.
//!
//! Shopify signs each webhook delivery with HMAC-SHA256 over the raw request
//! body, base64-encoded into the `X-Shopify-Hmac-Sha256` header. Verification
//! MUST run against the exact bytes received on the wire — re-serializing a
//! parsed body produces a different digest and false rejections.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::FulfillmentError;

type HmacSha256 = Hmac<Sha256>;

/// Verifier for inbound webhook signatures.
///
/// The secret is only optional in development: a missing secret there
/// disables verification with a startup warning so local webhook replays
/// don't need signing. In any other environment construction fails — the
/// server refuses to start rather than accept unsigned order events.
pub struct WebhookVerifier {
    secret: Option<Vec<u8>>,
}

impl WebhookVerifier {
    /// Builds a verifier from the configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`FulfillmentError::SecretRequired`] when `secret` is `None`
    /// and `is_development` is `false`.
    pub fn new(secret: Option<&str>, is_development: bool) -> Result<Self, FulfillmentError> {
        match secret {
            Some(s) if !s.is_empty() => Ok(Self {
                secret: Some(s.as_bytes().to_vec()),
            }),
            _ if is_development => {
                tracing::warn!(
                    "EASEL_SHOPIFY_WEBHOOK_SECRET not set; webhook signature verification \
                     disabled in development environment"
                );
                Ok(Self { secret: None })
            }
            _ => Err(FulfillmentError::SecretRequired),
        }
    }

    /// Whether signatures are actually checked.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// Checks a delivery against its signature header.
    ///
    /// Disabled verifier ⇒ always valid. Enabled verifier ⇒ the header must
    /// be present, base64-decodable, and match the digest of `raw_body` under
    /// constant-time comparison.
    #[must_use]
    pub fn is_valid(&self, raw_body: &[u8], header: Option<&str>) -> bool {
        let Some(secret) = &self.secret else {
            return true;
        };
        let Some(header) = header else {
            return false;
        };

        let Ok(claimed) = BASE64.decode(header) else {
            return false;
        };

        let expected = hmac_digest(secret, raw_body);
        expected.ct_eq(&claimed).into()
    }
}

/// Computes the base64-encoded HMAC-SHA256 signature of `body`.
///
/// This is what the sender computes; exposed for tests and webhook replay
/// tooling.
#[must_use]
pub fn sign(secret: &str, body: &[u8]) -> String {
    BASE64.encode(hmac_digest(secret.as_bytes(), body))
}

fn hmac_digest(secret: &[u8], body: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(body);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_verifier(secret: &str) -> WebhookVerifier {
        WebhookVerifier::new(Some(secret), false).expect("verifier with secret")
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let body = br#"{"id":123,"line_items":[]}"#;
        let signature = sign("hush", body);
        assert!(enabled_verifier("hush").is_valid(body, Some(&signature)));
    }

    #[test]
    fn flipping_any_body_byte_invalidates_signature() {
        let body = b"{\"id\":123}".to_vec();
        let signature = sign("hush", &body);
        let verifier = enabled_verifier("hush");

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            assert!(
                !verifier.is_valid(&tampered, Some(&signature)),
                "byte {i} flip should invalidate the signature"
            );
        }
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let body = b"payload";
        let signature = sign("other-secret", body);
        assert!(!enabled_verifier("hush").is_valid(body, Some(&signature)));
    }

    #[test]
    fn missing_header_is_invalid_when_enabled() {
        assert!(!enabled_verifier("hush").is_valid(b"payload", None));
    }

    #[test]
    fn undecodable_header_is_invalid() {
        assert!(!enabled_verifier("hush").is_valid(b"payload", Some("not base64!!!")));
    }

    #[test]
    fn missing_secret_in_development_disables_verification() {
        let verifier = WebhookVerifier::new(None, true).expect("dev verifier");
        assert!(!verifier.enabled());
        assert!(verifier.is_valid(b"anything", None));
    }

    #[test]
    fn missing_secret_outside_development_fails_closed() {
        let result = WebhookVerifier::new(None, false);
        assert!(matches!(result, Err(FulfillmentError::SecretRequired)));
    }

    #[test]
    fn empty_secret_is_treated_as_missing() {
        let result = WebhookVerifier::new(Some(""), false);
        assert!(matches!(result, Err(FulfillmentError::SecretRequired)));
    }
}
