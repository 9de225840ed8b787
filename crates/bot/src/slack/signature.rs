//! Slack request signature verification.
//!
//! Implements Slack's signing scheme:
//! <https://api.slack.com/authentication/verifying-requests-from-slack>
//!
//! The signature is `v0=` followed by the hex HMAC-SHA256 of
//! `v0:{timestamp}:{raw body}` keyed with the app's signing secret. A request
//! is accepted only when its timestamp is inside the freshness window and the
//! signature matches.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, instrument};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Header carrying the request timestamp (unix seconds).
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Signature version prefix.
const VERSION: &str = "v0";

/// Default freshness window.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(5 * 60);

/// Reasons a request fails authentication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// A required header is absent or not ASCII.
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    /// The timestamp header is not an integer.
    #[error("invalid timestamp")]
    InvalidTimestamp,

    /// The timestamp is outside the freshness window.
    #[error("request timestamp outside tolerance")]
    StaleTimestamp,

    /// The signature header is not `v0=<hex>`.
    #[error("malformed signature")]
    Malformed,

    /// The signature does not match the body.
    #[error("signature mismatch")]
    Mismatch,
}

/// A request body proven to come from Slack within the freshness window.
///
/// Only [`SignatureVerifier`] can construct one, so anything that takes a
/// `VerifiedBody` cannot observe an unauthenticated request.
#[derive(Debug, Clone)]
pub struct VerifiedBody {
    bytes: Bytes,
}

impl VerifiedBody {
    /// The exact bytes that were signed.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A cheap clone of the underlying buffer.
    #[must_use]
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

/// Verifies inbound Slack requests against the signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    signing_secret: SecretString,
    tolerance: Duration,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("signing_secret", &"[REDACTED]")
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl SignatureVerifier {
    /// Create a verifier with the default five minute window.
    #[must_use]
    pub const fn new(signing_secret: SecretString) -> Self {
        Self::with_tolerance(signing_secret, DEFAULT_TOLERANCE)
    }

    /// Create a verifier with a custom freshness window.
    #[must_use]
    pub const fn with_tolerance(signing_secret: SecretString, tolerance: Duration) -> Self {
        Self {
            signing_secret,
            tolerance,
        }
    }

    /// Verify a request against the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] if a header is missing, the timestamp is
    /// stale, or the signature does not match.
    pub fn verify(&self, headers: &HeaderMap, body: Bytes) -> Result<VerifiedBody, SignatureError> {
        self.verify_at(headers, body, SystemTime::now())
    }

    /// Verify a request as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// See [`SignatureVerifier::verify`].
    #[instrument(skip_all)]
    pub fn verify_at(
        &self,
        headers: &HeaderMap,
        body: Bytes,
        now: SystemTime,
    ) -> Result<VerifiedBody, SignatureError> {
        let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
        let signature = header_str(headers, SIGNATURE_HEADER)?;

        let ts: u64 = timestamp
            .trim()
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp)?;
        let now = now
            .duration_since(UNIX_EPOCH)
            .map_err(|_| SignatureError::InvalidTimestamp)?
            .as_secs();

        if now.abs_diff(ts) > self.tolerance.as_secs() {
            return Err(SignatureError::StaleTimestamp);
        }

        let provided = signature
            .strip_prefix("v0=")
            .and_then(|hex_sig| hex::decode(hex_sig).ok())
            .ok_or(SignatureError::Malformed)?;

        let mac = self.mac_for(timestamp, &body)?;

        // verify_slice compares in constant time
        mac.verify_slice(&provided)
            .map_err(|_| SignatureError::Mismatch)?;

        debug!("Slack signature verified");

        Ok(VerifiedBody { bytes: body })
    }

    /// Compute the `v0=` signature for a body, as Slack would send it.
    #[must_use]
    pub fn sign(&self, timestamp: &str, body: &[u8]) -> String {
        sign(self.signing_secret.expose_secret(), timestamp, body)
    }

    fn mac_for(&self, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.signing_secret.expose_secret().as_bytes())
            .map_err(|_| SignatureError::Malformed)?;
        feed(&mut mac, timestamp, body);
        Ok(mac)
    }
}

/// Compute the `v0=` signature for `body` with a raw signing secret.
///
/// Used by tests and by the CLI to produce requests a running bot accepts.
#[must_use]
pub fn sign(signing_secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    feed(&mut mac, timestamp, body);
    format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes()))
}

/// Stream the base string `v0:{timestamp}:{body}` into the MAC without
/// copying the body.
fn feed(mac: &mut HmacSha256, timestamp: &str, body: &[u8]) {
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(SignatureError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::from(SECRET))
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn signed_headers(timestamp: &str, body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            TIMESTAMP_HEADER,
            HeaderValue::from_str(timestamp).expect("ascii timestamp"),
        );
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&sign(SECRET, timestamp, body)).expect("ascii signature"),
        );
        headers
    }

    #[test]
    fn test_sign_format() {
        let signature = sign(SECRET, "1531420618", b"token=abc");
        let hex_part = signature.strip_prefix("v0=").expect("version prefix");

        assert_eq!(hex_part.len(), 64);
        assert!(hex_part.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(signature, sign(SECRET, "1531420618", b"token=abc"));
        assert_ne!(signature, sign(SECRET, "1531420619", b"token=abc"));
    }

    #[test]
    fn test_valid_signature_passes_and_keeps_body() {
        let body = Bytes::from_static(br#"{"type":"url_verification","challenge":"abc123"}"#);
        let headers = signed_headers("1700000000", &body);

        let verified = verifier()
            .verify_at(&headers, body.clone(), at(1_700_000_010))
            .expect("valid signature");

        assert_eq!(verified.as_bytes(), body.as_ref());
        assert_eq!(verified.bytes(), body);
    }

    #[test]
    fn test_tampered_body_fails() {
        let headers = signed_headers("1700000000", b"original=body");

        let result = verifier().verify_at(
            &headers,
            Bytes::from_static(b"original=bodY"),
            at(1_700_000_000),
        );
        assert_eq!(result.map(|_| ()), Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_altered_signature_fails() {
        let body = Bytes::from_static(b"payload=1");
        let mut headers = signed_headers("1700000000", &body);
        let mut altered = sign(SECRET, "1700000000", &body);
        let flipped = if altered.get(3..4) == Some("0") { "1" } else { "0" };
        altered.replace_range(3..4, flipped);
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&altered).expect("ascii"),
        );

        let result = verifier().verify_at(&headers, body, at(1_700_000_000));
        assert_eq!(result.map(|_| ()), Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = Bytes::from_static(b"payload=1");
        let headers = signed_headers("1700000000", &body);
        let other = SignatureVerifier::new(SecretString::from("a-different-signing-secret"));

        let result = other.verify_at(&headers, body, at(1_700_000_000));
        assert_eq!(result.map(|_| ()), Err(SignatureError::Mismatch));
    }

    #[test]
    fn test_stale_timestamp_fails_even_with_valid_signature() {
        let body = Bytes::from_static(b"payload=1");
        let headers = signed_headers("1700000000", &body);

        let result = verifier().verify_at(&headers, body.clone(), at(1_700_000_000 + 301));
        assert_eq!(result.map(|_| ()), Err(SignatureError::StaleTimestamp));

        // Clock skew in the other direction is rejected too
        let result = verifier().verify_at(&headers, body, at(1_700_000_000 - 301));
        assert_eq!(result.map(|_| ()), Err(SignatureError::StaleTimestamp));
    }

    #[test]
    fn test_edge_of_window_passes() {
        let body = Bytes::from_static(b"payload=1");
        let headers = signed_headers("1700000000", &body);

        assert!(
            verifier()
                .verify_at(&headers, body, at(1_700_000_300))
                .is_ok()
        );
    }

    #[test]
    fn test_missing_headers() {
        let result = verifier().verify_at(&HeaderMap::new(), Bytes::new(), at(0));
        assert_eq!(
            result.map(|_| ()),
            Err(SignatureError::MissingHeader(TIMESTAMP_HEADER))
        );

        let mut headers = HeaderMap::new();
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static("1700000000"));
        let result = verifier().verify_at(&headers, Bytes::new(), at(1_700_000_000));
        assert_eq!(
            result.map(|_| ()),
            Err(SignatureError::MissingHeader(SIGNATURE_HEADER))
        );
    }

    #[test]
    fn test_invalid_timestamp() {
        let mut headers = signed_headers("1700000000", b"");
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static("not-a-number"));

        let result = verifier().verify_at(&headers, Bytes::new(), at(1_700_000_000));
        assert_eq!(result.map(|_| ()), Err(SignatureError::InvalidTimestamp));
    }

    #[test]
    fn test_malformed_signature() {
        let mut headers = signed_headers("1700000000", b"");
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("v1=abcdef"));
        let result = verifier().verify_at(&headers, Bytes::new(), at(1_700_000_000));
        assert_eq!(result.map(|_| ()), Err(SignatureError::Malformed));

        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("v0=not-hex"));
        let result = verifier().verify_at(&headers, Bytes::new(), at(1_700_000_000));
        assert_eq!(result.map(|_| ()), Err(SignatureError::Malformed));
    }

    #[test]
    fn test_non_utf8_body_is_signed_byte_for_byte() {
        let body = Bytes::from_static(&[0xff, 0xfe, 0x00, 0x41]);
        let headers = signed_headers("1700000000", &body);

        let verified = verifier()
            .verify_at(&headers, body.clone(), at(1_700_000_000))
            .expect("valid");
        assert_eq!(verified.as_bytes(), body.as_ref());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug_output = format!("{:?}", verifier());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(SECRET));
    }
}
