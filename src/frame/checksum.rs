//! # Frame Checksum
//!
//! 16-bit additive checksum over the five numeric data fields.
//!
//! **Algorithm**: unsigned sum of the decoded field values, truncated to 16 bits
//! with silent wraparound. This matches the sensor firmware bit for bit.
//!
//! All functions here are pure and safe to call from any context.

use super::fields::{parse_fields, ParsedFields, REQUIRED_DATA_FIELDS, REQUIRED_VALIDATION_FIELDS};
use super::protocol::RawFrame;
use crate::error::{Result, WxIngestError};

/// Sum field values into a 16-bit checksum with wraparound
///
/// # Examples
///
/// ```
/// use wx_ingest::frame::checksum::sum16;
///
/// assert_eq!(sum16(&[2000, 10132, 0, 0, 115]), 0x2FD7);
/// assert_eq!(sum16(&[65535, 1]), 0);
/// ```
pub fn sum16(values: &[u32]) -> u16 {
    values
        .iter()
        .fold(0u16, |acc, &value| acc.wrapping_add(value as u16))
}

/// Compute the checksum of a frame's five data fields
///
/// A trailing checksum field, if present, is ignored. The input does not need
/// to carry the end marker, so the simulator can checksum a partial frame.
///
/// # Errors
///
/// Returns `FieldsMissing` if fewer than five data fields decode
pub fn compute_checksum(frame: &[u8]) -> Result<u16> {
    let fields = parse_fields(frame, REQUIRED_DATA_FIELDS)?;
    Ok(sum16(&fields.data_values()))
}

/// Decode a frame and check its reported checksum
///
/// # Returns
///
/// * `Result<ParsedFields>` - Decoded fields if the checksum matches
///
/// # Errors
///
/// Returns error if:
/// - Fewer than six fields decode (`FieldsMissing`)
/// - The computed checksum differs from the reported one (`ChecksumMismatch`)
pub fn verify(frame: &RawFrame) -> Result<ParsedFields> {
    let fields = parse_fields(frame.as_bytes(), REQUIRED_VALIDATION_FIELDS)?;
    let computed = sum16(&fields.data_values());
    let reported = fields.reported_checksum.unwrap_or_default();

    if computed != reported {
        return Err(WxIngestError::ChecksumMismatch { computed, reported });
    }

    Ok(fields)
}

/// Whether a frame's reported checksum matches its data fields
///
/// Anything short of six decoded fields is `false`.
pub fn validate(frame: &RawFrame) -> bool {
    verify(frame).is_ok()
}
