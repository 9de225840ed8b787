//! Message id to timestamp conversion.

use gohan_core::MessageTs;

use super::CliError;

/// Convert a message id and return the timestamp.
///
/// # Errors
///
/// Returns [`CliError::MessageTs`] if the id is empty, not numeric, or
/// shorter than six digits.
pub fn run(id: &str) -> Result<String, CliError> {
    // Message links prefix the id with `p`
    let digits = id.strip_prefix('p').unwrap_or(id);
    Ok(MessageTs::from_message_id(digits)?.into_inner())
}
