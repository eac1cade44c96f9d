//! Bucket hash used by the game to look up AnimData records by COF name

use crate::ValidationError;

/// Number of hash buckets in an AnimData.D2 container
pub const BUCKET_COUNT: usize = 256;

/// Computes the bucket index of a COF name.
///
/// The game sums the ASCII values of the upper-cased name and keeps the low
/// byte. Empty and non-ASCII names are rejected.
pub fn hash_cof_name(name: &str) -> Result<u8, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::NameLength(name.to_string()));
    }
    if !name.is_ascii() {
        return Err(ValidationError::NameNotAscii(name.to_string()));
    }
    Ok(bucket_of(name.as_bytes()))
}

/// Hash of a name already known to be valid ASCII
pub(crate) fn bucket_of(name: &[u8]) -> u8 {
    name.iter()
        .fold(0u8, |sum, byte| sum.wrapping_add(byte.to_ascii_uppercase()))
}
