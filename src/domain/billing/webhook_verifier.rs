//! Webhook signature verification.
//!
//! Verifies vendor webhook deliveries with HMAC-SHA256 over the raw body,
//! with timestamp bounds to reject replayed deliveries.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Oldest delivery accepted (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Tolerated clock skew for deliveries stamped in the future (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components of the Stripe-Signature header.
///
/// Format: `t=<timestamp>,v1=<hex>[,v0=<hex>]`. Unknown keys are ignored
/// for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp the sender stamped on the delivery.
    pub timestamp: i64,
    /// Current-scheme HMAC-SHA256 digest.
    pub v1_signature: Vec<u8>,
    /// Legacy-scheme digest, present on some deliveries. Never trusted.
    pub v0_signature: Option<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses the signature header string.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` when the timestamp or v1 digest
    /// is missing or not decodable.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;
        let mut v0_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("malformed signature header".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("non-numeric timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("v1 digest is not valid hex".to_string())
                    })?);
                }
                "v0" => {
                    v0_signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("v0 digest is not valid hex".to_string())
                    })?);
                }
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        let v1_signature = v1_signature
            .ok_or_else(|| WebhookError::ParseError("missing v1 digest".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
            v0_signature,
        })
    }
}

/// Verifies webhook deliveries against the endpoint signing secret.
pub struct StripeWebhookVerifier {
    /// Signing secret issued for the webhook endpoint (whsec_ prefixed).
    secret: String,
}

impl StripeWebhookVerifier {
    /// Creates a verifier for the given signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the delivery and parses the event envelope.
    ///
    /// The digest is computed over `"{timestamp}.{raw_body}"`, so the body
    /// must be the exact bytes received on the wire. Comparison is
    /// constant-time.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` when the digest does not match
    /// - `StaleEvent` when the delivery is older than the replay window
    /// - `InvalidTimestamp` when the delivery is stamped too far in the future
    /// - `ParseError` when the header or body cannot be parsed
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp)?;

        let expected = self.compute_signature(header.timestamp, payload);
        if !constant_time_compare(&expected, &header.v1_signature) {
            return Err(WebhookError::InvalidSignature);
        }

        let event: StripeEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(event)
    }

    /// Enforces the replay window and clock skew bounds.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::StaleEvent);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }

    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Vec<u8> {
        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));

        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(signed_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Constant-time equality for signature digests.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a valid v1 digest for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
    let signed_payload = format!("{}.{}", timestamp, payload);
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_v1_only() {
        let signature = "a".repeat(64);
        let header_str = format!("t=1234567890,v1={}", signature);

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signature.len(), 32);
        assert!(header.v0_signature.is_none());
    }

    #[test]
    fn parse_header_with_legacy_v0() {
        let header_str = format!("t=1234567890,v1={},v0={}", "a".repeat(64), "b".repeat(64));

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert!(header.v0_signature.is_some());
    }

    #[test]
    fn parse_header_ignores_unknown_keys() {
        let header_str = format!("t=1234567890,v1={},v2=future,scheme=hmac", "a".repeat(64));

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.timestamp, 1234567890);
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let result = SignatureHeader::parse(&format!("v1={}", "a".repeat(64)));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_missing_v1_fails() {
        let result = SignatureHeader::parse("t=1234567890");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_non_numeric_timestamp_fails() {
        let result = SignatureHeader::parse(&format!("t=soon,v1={}", "a".repeat(64)));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        let result = SignatureHeader::parse("t=1234567890,v1=not_valid_hex");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = r#"{"id":"evt_test123","type":"customer.subscription.updated","created":1704067200,"data":{"object":{}},"livemode":false}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, payload);
        let header = format!("t={},v1={}", timestamp, signature);

        let event = verifier.verify_and_parse(payload.as_bytes(), &header).unwrap();

        assert_eq!(event.id, "evt_test123");
        assert_eq!(event.event_type, "customer.subscription.updated");
    }

    #[test]
    fn verify_forged_signature_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let header = format!("t={},v1={}", timestamp, "a".repeat(64));

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let verifier = StripeWebhookVerifier::new("wrong_secret");
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, payload);
        let header = format!("t={},v1={}", timestamp, signature);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_single_byte_flip_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, payload);

        // Flip the last hex digit of an otherwise valid digest.
        let mut flipped = signature.into_bytes();
        let last = flipped.last_mut().unwrap();
        *last = if *last == b'0' { b'1' } else { b'0' };
        let flipped = String::from_utf8(flipped).unwrap();
        let header = format!("t={},v1={}", timestamp, flipped);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let original = r#"{"id":"evt_test"}"#;
        let tampered = r#"{"id":"evt_forged"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, original);
        let header = format!("t={},v1={}", timestamp, signature);

        let result = verifier.verify_and_parse(tampered.as_bytes(), &header);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn timestamp_within_window_succeeds() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() - 120;

        assert!(verifier.validate_timestamp(timestamp).is_ok());
    }

    #[test]
    fn timestamp_too_old_is_stale() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() - 600;

        let result = verifier.validate_timestamp(timestamp);

        assert!(matches!(result, Err(WebhookError::StaleEvent)));
    }

    #[test]
    fn timestamp_at_window_boundary_succeeds() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() - 300;

        assert!(verifier.validate_timestamp(timestamp).is_ok());
    }

    #[test]
    fn timestamp_future_within_skew_succeeds() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() + 30;

        assert!(verifier.validate_timestamp(timestamp).is_ok());
    }

    #[test]
    fn timestamp_future_beyond_skew_fails() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let timestamp = chrono::Utc::now().timestamp() + 120;

        let result = verifier.validate_timestamp(timestamp);

        assert!(matches!(result, Err(WebhookError::InvalidTimestamp)));
    }

    // ══════════════════════════════════════════════════════════════
    // Payload Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn valid_signature_over_invalid_json_fails_parse() {
        let verifier = StripeWebhookVerifier::new(TEST_SECRET);
        let payload = "not valid json";
        let timestamp = chrono::Utc::now().timestamp();
        let signature = compute_test_signature(TEST_SECRET, timestamp, payload);
        let header = format!("t={},v1={}", timestamp, signature);

        let result = verifier.verify_and_parse(payload.as_bytes(), &header);

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn compare_equal_digests() {
        assert!(constant_time_compare(&[1, 2, 3, 4], &[1, 2, 3, 4]));
    }

    #[test]
    fn compare_unequal_digests() {
        assert!(!constant_time_compare(&[1, 2, 3, 4], &[1, 2, 3, 5]));
    }

    #[test]
    fn compare_mismatched_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }

    // ══════════════════════════════════════════════════════════════
    // Header Parsing Properties
    // ══════════════════════════════════════════════════════════════

    proptest::proptest! {
        #[test]
        fn parse_never_panics_on_arbitrary_headers(header in ".{0,128}") {
            let _ = SignatureHeader::parse(&header);
        }

        #[test]
        fn well_formed_headers_roundtrip(timestamp in 0i64..=4_102_444_800, sig in "[0-9a-f]{64}") {
            let header = format!("t={},v1={}", timestamp, sig);
            let parsed = SignatureHeader::parse(&header).unwrap();
            proptest::prop_assert_eq!(parsed.timestamp, timestamp);
            proptest::prop_assert_eq!(hex::encode(&parsed.v1_signature), sig);
        }
    }
}
