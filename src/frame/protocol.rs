//! # Weather Frame Protocol Constants and Types
//!
//! Core definitions for the ASCII weather telemetry frame:
//!
//! ```text
//! UUU$TTTTT.BBBBB.DDDD.SSSSS.VVV.CCCC*QQQ
//! ```

use std::fmt;

use crate::error::{Result, WxIngestError};

/// Literal start-of-frame marker
pub const START_MARKER: &[u8; 4] = b"UUU$";

/// Literal end-of-frame marker
pub const END_MARKER: &[u8; 4] = b"*QQQ";

/// Length of both frame markers
pub const MARKER_LEN: usize = 4;

/// Maximum frame length in bytes, including the terminator slot
pub const MAX_FRAME_LEN: usize = 128;

/// Maximum number of frame bytes (one slot is reserved for the terminator)
pub const MAX_FRAME_PAYLOAD: usize = MAX_FRAME_LEN - 1;

/// Separator between numeric fields
pub const FIELD_SEPARATOR: u8 = b'.';

/// Maximum decimal digits per data field, in wire order:
/// temperature ADC, barometric ADC, wind direction (tenths), wind speed, voltage (mV)
pub const DATA_FIELD_WIDTHS: [usize; DATA_FIELD_COUNT] = [5, 5, 4, 5, 3];

/// Number of numeric data fields covered by the checksum
pub const DATA_FIELD_COUNT: usize = 5;

/// Number of hex digits in the checksum field
pub const CHECKSUM_WIDTH: usize = 4;

/// A complete frame as assembled by the synchronizer or the simulator.
///
/// Stored inline so that every queue slot has the same fixed size.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl RawFrame {
    /// Create a frame from raw bytes
    ///
    /// # Errors
    ///
    /// Returns `FrameTooLong` if `data` exceeds [`MAX_FRAME_PAYLOAD`]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() > MAX_FRAME_PAYLOAD {
            return Err(WxIngestError::FrameTooLong {
                len: data.len(),
                max: MAX_FRAME_PAYLOAD,
            });
        }

        let mut bytes = [0u8; MAX_FRAME_LEN];
        bytes[..data.len()].copy_from_slice(data);

        Ok(Self {
            bytes,
            len: data.len(),
        })
    }

    /// Frame bytes without the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Frame length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the frame holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the frame carries both literal markers
    pub fn is_delimited(&self) -> bool {
        let bytes = self.as_bytes();
        bytes.len() >= 2 * MARKER_LEN
            && bytes.starts_with(START_MARKER)
            && bytes.ends_with(END_MARKER)
    }
}

impl std::str::FromStr for RawFrame {
    type Err = WxIngestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bytes(s.as_bytes())
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFrame")
            .field("len", &self.len)
            .field("text", &String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(START_MARKER, b"UUU$");
        assert_eq!(END_MARKER, b"*QQQ");
        assert_eq!(MAX_FRAME_LEN, 128);
        assert_eq!(MAX_FRAME_PAYLOAD, 127);
        assert_eq!(DATA_FIELD_WIDTHS.iter().sum::<usize>(), 22);
    }

    #[test]
    fn test_raw_frame_from_str() {
        let frame: RawFrame = "UUU$02000.10132.0000.00000.115.2FD7*QQQ".parse().unwrap();
        assert_eq!(frame.len(), 39);
        assert!(frame.is_delimited());
        assert_eq!(frame.to_string(), "UUU$02000.10132.0000.00000.115.2FD7*QQQ");
    }

    #[test]
    fn test_raw_frame_max_length() {
        let frame = RawFrame::from_bytes(&[b'x'; MAX_FRAME_PAYLOAD]).unwrap();
        assert_eq!(frame.len(), MAX_FRAME_PAYLOAD);
    }

    #[test]
    fn test_raw_frame_too_long() {
        let result = RawFrame::from_bytes(&[b'x'; MAX_FRAME_LEN]);
        match result {
            Err(WxIngestError::FrameTooLong { len, max }) => {
                assert_eq!(len, 128);
                assert_eq!(max, 127);
            }
            other => panic!("Expected FrameTooLong, got: {:?}", other),
        }
    }

    #[test]
    fn test_raw_frame_not_delimited() {
        let frame = RawFrame::from_bytes(b"UUU$*QQ").unwrap();
        assert!(!frame.is_delimited());
        assert!(!RawFrame::from_bytes(b"").unwrap().is_delimited());
        assert!(RawFrame::from_bytes(b"").unwrap().is_empty());
    }
}
