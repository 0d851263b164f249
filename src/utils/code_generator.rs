//! Short code generation.
//!
//! Codes are drawn from the OS CSPRNG so they cannot be predicted and used
//! to enumerate other users' links.

use crate::error::AppError;
use serde_json::json;

/// Alphabet for generated short codes: 62 alphanumeric symbols.
pub const CODE_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 6;

// Largest multiple of the alphabet size that fits in a byte; bytes at or
// above this are rejected to keep every symbol equally likely.
const REJECTION_LIMIT: u8 = (u8::MAX / CODE_ALPHABET.len() as u8) * CODE_ALPHABET.len() as u8;

/// Generates a random short code of `length` characters.
///
/// Each character is an independent, uniform draw from [`CODE_ALPHABET`].
/// Stateless and reentrant; safe to call concurrently.
///
/// # Errors
///
/// Returns [`AppError::Internal`] only if the OS randomness source fails.
pub fn generate_code(length: usize) -> Result<String, AppError> {
    let mut code = String::with_capacity(length);
    let mut buffer = [0u8; 64];

    while code.len() < length {
        getrandom::fill(&mut buffer).map_err(|e| {
            AppError::internal(
                "Random number generator failure",
                json!({ "source": e.to_string() }),
            )
        })?;

        for &byte in buffer.iter() {
            if code.len() == length {
                break;
            }
            if byte < REJECTION_LIMIT {
                code.push(CODE_ALPHABET[(byte % CODE_ALPHABET.len() as u8) as usize] as char);
            }
        }
    }

    Ok(code)
}
