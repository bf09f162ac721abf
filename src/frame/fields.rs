//! # Frame Field Decoder
//!
//! Decodes the fixed-width numeric fields of a weather frame.
//!
//! Fields are read left to right with a maximum width each, the way a
//! `%5u.%5u.%4u.%5u.%3u.%4x` scan pattern would. Decoding stops at the first
//! field that does not match; callers decide how many fields they need.

use super::protocol::*;
use crate::error::{Result, WxIngestError};

/// Fields required before a checksum can be computed
pub const REQUIRED_DATA_FIELDS: usize = DATA_FIELD_COUNT;

/// Fields required to validate a frame (five data fields plus the checksum)
pub const REQUIRED_VALIDATION_FIELDS: usize = DATA_FIELD_COUNT + 1;

/// Numeric fields decoded from a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedFields {
    /// Temperature ADC counts (0.01 °C per count)
    pub temperature_adc: u32,

    /// Barometric ADC counts (0.1 hPa per count)
    pub barometric_adc: u32,

    /// Wind direction in tenths of a degree
    pub wind_direction_tenths: u32,

    /// Wind speed in raw sensor units
    pub wind_speed: u32,

    /// Supply voltage in mV
    pub voltage_mv: u32,

    /// Checksum reported by the sensor, if the field was present
    pub reported_checksum: Option<u16>,
}

impl ParsedFields {
    /// Data fields in wire order
    pub fn data_values(&self) -> [u32; DATA_FIELD_COUNT] {
        [
            self.temperature_adc,
            self.barometric_adc,
            self.wind_direction_tenths,
            self.wind_speed,
            self.voltage_mv,
        ]
    }

    /// Number of fields that were decoded, checksum included
    pub fn field_count(&self) -> usize {
        DATA_FIELD_COUNT + usize::from(self.reported_checksum.is_some())
    }
}

/// Result of scanning a frame, before any count requirement is applied
#[derive(Debug, Default)]
struct FieldScan {
    values: [u32; DATA_FIELD_COUNT],
    data_count: usize,
    checksum: Option<u16>,
}

impl FieldScan {
    fn field_count(&self) -> usize {
        self.data_count + usize::from(self.checksum.is_some())
    }
}

/// Byte cursor over a frame
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn literal(&mut self, expected: &[u8]) -> bool {
        if self.data[self.pos..].starts_with(expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    /// Read up to `width` digits in `radix`; `None` if no digit is present
    fn number(&mut self, width: usize, radix: u32) -> Option<u32> {
        let mut value: u32 = 0;
        let mut digits = 0;

        while digits < width {
            let Some(digit) = self
                .data
                .get(self.pos)
                .and_then(|&b| char::from(b).to_digit(radix))
            else {
                break;
            };
            value = value * radix + digit;
            self.pos += 1;
            digits += 1;
        }

        (digits > 0).then_some(value)
    }
}

fn scan(frame: &[u8]) -> FieldScan {
    let mut result = FieldScan::default();
    let mut cursor = Cursor::new(frame);

    if !cursor.literal(START_MARKER) {
        return result;
    }

    for (index, &width) in DATA_FIELD_WIDTHS.iter().enumerate() {
        if index > 0 && !cursor.literal(&[FIELD_SEPARATOR]) {
            return result;
        }
        match cursor.number(width, 10) {
            Some(value) => {
                result.values[index] = value;
                result.data_count += 1;
            }
            None => return result,
        }
    }

    if cursor.literal(&[FIELD_SEPARATOR]) {
        // At most four hex digits, so the value always fits
        result.checksum = cursor.number(CHECKSUM_WIDTH, 16).map(|v| v as u16);
    }

    result
}

/// Decode the fields of a frame, requiring at least `required` of them
///
/// `required` counts the checksum as the sixth field, so `5` accepts a frame
/// without a checksum and `6` demands one.
///
/// # Errors
///
/// Returns `FieldsMissing` if fewer than `required` fields decode
pub fn parse_fields(frame: &[u8], required: usize) -> Result<ParsedFields> {
    let scan = scan(frame);

    if scan.data_count < DATA_FIELD_COUNT || scan.field_count() < required {
        return Err(WxIngestError::FieldsMissing {
            parsed: scan.field_count(),
            required,
        });
    }

    let [temperature_adc, barometric_adc, wind_direction_tenths, wind_speed, voltage_mv] =
        scan.values;

    Ok(ParsedFields {
        temperature_adc,
        barometric_adc,
        wind_direction_tenths,
        wind_speed,
        voltage_mv,
        reported_checksum: scan.checksum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_frame() {
        let fields = parse_fields(b"UUU$02000.10132.0000.00000.115.2FD7*QQQ", 6).unwrap();
        assert_eq!(fields.temperature_adc, 2000);
        assert_eq!(fields.barometric_adc, 10132);
        assert_eq!(fields.wind_direction_tenths, 0);
        assert_eq!(fields.wind_speed, 0);
        assert_eq!(fields.voltage_mv, 115);
        assert_eq!(fields.reported_checksum, Some(0x2FD7));
        assert_eq!(fields.field_count(), 6);
    }

    #[test]
    fn test_parse_without_checksum() {
        let fields = parse_fields(b"UUU$02000.10132.0000.00000.115", 5).unwrap();
        assert_eq!(fields.reported_checksum, None);
        assert_eq!(fields.data_values(), [2000, 10132, 0, 0, 115]);

        let result = parse_fields(b"UUU$02000.10132.0000.00000.115", 6);
        assert!(matches!(
            result,
            Err(WxIngestError::FieldsMissing { parsed: 5, required: 6 })
        ));
    }

    #[test]
    fn test_parse_short_fields() {
        // Fewer digits than the maximum width are accepted
        let fields = parse_fields(b"UUU$1.2.3.4.5.F*QQQ", 6).unwrap();
        assert_eq!(fields.data_values(), [1, 2, 3, 4, 5]);
        assert_eq!(fields.reported_checksum, Some(0xF));
    }

    #[test]
    fn test_parse_lowercase_hex_checksum() {
        let fields = parse_fields(b"UUU$02000.10132.0000.00000.115.2fd7*QQQ", 6).unwrap();
        assert_eq!(fields.reported_checksum, Some(0x2FD7));
    }

    #[test]
    fn test_parse_missing_field() {
        let result = parse_fields(b"UUU$02000.10132.0000*QQQ", 5);
        match result {
            Err(WxIngestError::FieldsMissing { parsed, required }) => {
                assert_eq!(parsed, 3);
                assert_eq!(required, 5);
            }
            other => panic!("Expected FieldsMissing, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_overwide_field_stops_scan() {
        // Six digits: the width limit leaves a digit where a separator belongs
        let result = parse_fields(b"UUU$020001.10132.0000.00000.115.2FD7*QQQ", 5);
        assert!(matches!(
            result,
            Err(WxIngestError::FieldsMissing { parsed: 1, .. })
        ));
    }

    #[test]
    fn test_parse_missing_start_marker() {
        let result = parse_fields(b"XXX$02000.10132.0000.00000.115.2FD7*QQQ", 5);
        assert!(matches!(
            result,
            Err(WxIngestError::FieldsMissing { parsed: 0, .. })
        ));
    }

    #[test]
    fn test_parse_non_numeric_field() {
        // "1O132": the scan takes "1" and then fails on the missing separator
        let result = parse_fields(b"UUU$02000.1O132.0000.00000.115.2FD7*QQQ", 5);
        assert!(matches!(
            result,
            Err(WxIngestError::FieldsMissing { parsed: 2, .. })
        ));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_fields(b"", 5).is_err());
    }
}
