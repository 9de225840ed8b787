//! Request signing.
//!
//! # Environment Variables
//!
//! - `SLACK_SIGNING_SECRET` - Signing secret shared with the bot

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use gohan_bot::slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER, sign};
use secrecy::{ExposeSecret, SecretString};

use super::CliError;

/// Sign a body and return the two Slack headers, one per line.
///
/// # Errors
///
/// Returns an error if the secret is not set, no body was given, or the
/// body file cannot be read.
pub fn run(
    body: Option<String>,
    body_file: Option<&Path>,
    timestamp: Option<u64>,
) -> Result<String, CliError> {
    dotenvy::dotenv().ok();

    let secret = std::env::var("SLACK_SIGNING_SECRET")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("SLACK_SIGNING_SECRET"))?;

    let body = match (body, body_file) {
        (Some(body), _) => body.into_bytes(),
        (None, Some(path)) => std::fs::read(path).map_err(|source| CliError::ReadBody {
            path: path.display().to_string(),
            source,
        })?,
        (None, None) => return Err(CliError::MissingBody),
    };

    let timestamp = match timestamp {
        Some(ts) => ts,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
    };

    tracing::debug!(bytes = body.len(), timestamp, "Signing body");
    Ok(headers(secret.expose_secret(), timestamp, &body))
}

/// Format the signature headers for `body`.
fn headers(secret: &str, timestamp: u64, body: &[u8]) -> String {
    let timestamp = timestamp.to_string();
    let signature = sign(secret, &timestamp, body);
    format!("{TIMESTAMP_HEADER}: {timestamp}\n{SIGNATURE_HEADER}: {signature}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_format() {
        let out = headers("8f3a9c1e7b2d4f6a", 1_625_097_600, b"{}");
        let mut lines = out.lines();

        assert_eq!(lines.next(), Some("x-slack-request-timestamp: 1625097600"));
        let signature = lines
            .next()
            .and_then(|l| l.strip_prefix("x-slack-signature: v0="))
            .expect("signature line");
        assert_eq!(signature.len(), 64);
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_headers_match_library_signature() {
        let out = headers("8f3a9c1e7b2d4f6a", 1_625_097_600, b"payload");
        let expected = sign("8f3a9c1e7b2d4f6a", "1625097600", b"payload");
        assert!(out.ends_with(&expected));
    }
}
