use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const FILENAME_FORMAT: &str = "%Y%m%d_%H%M%S";
const EXIF_SHAPE: &[u8; 19] = b"dddd:dd:dd dd:dd:dd";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("capture time {0:?} is not in YYYY:MM:DD HH:MM:SS form")]
    Shape(String),
    #[error("capture time {0:?} is not a valid date/time")]
    OutOfRange(String),
}

/// Capture time as written by the camera. No timezone is attached or applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaptureTimestamp(NaiveDateTime);

impl CaptureTimestamp {
    /// Parses the literal EXIF form `YYYY:MM:DD HH:MM:SS`. Zero padding is
    /// mandatory and no surrounding text is tolerated.
    pub fn parse_exif(raw: &str) -> Result<Self, TimestampError> {
        if !has_exif_shape(raw) {
            return Err(TimestampError::Shape(raw.to_string()));
        }
        NaiveDateTime::parse_from_str(raw, EXIF_FORMAT)
            .map(Self)
            .map_err(|_| TimestampError::OutOfRange(raw.to_string()))
    }

    /// `YYYYMMDD_HHMMSS`, the timestamp part of a generated file name.
    pub fn filename_stamp(&self) -> String {
        self.0.format(FILENAME_FORMAT).to_string()
    }
}

impl fmt::Display for CaptureTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(EXIF_FORMAT))
    }
}

fn has_exif_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == EXIF_SHAPE.len()
        && bytes
            .iter()
            .zip(EXIF_SHAPE.iter())
            .all(|(actual, expected)| match expected {
                b'd' => actual.is_ascii_digit(),
                other => actual == other,
            })
}

#[cfg(test)]
mod tests {
    use super::{CaptureTimestamp, TimestampError};

    #[test]
    fn parses_and_formats_for_filename() {
        let ts = CaptureTimestamp::parse_exif("2023:06:15 09:30:00").expect("must parse");
        assert_eq!(ts.filename_stamp(), "20230615_093000");
        assert_eq!(ts.to_string(), "2023:06:15 09:30:00");
    }

    #[test]
    fn keeps_24_hour_clock() {
        let ts = CaptureTimestamp::parse_exif("2024:01:15 23:05:09").expect("must parse");
        assert_eq!(ts.filename_stamp(), "20240115_230509");
    }

    #[test]
    fn rejects_garbage() {
        let err = CaptureTimestamp::parse_exif("garbage").expect_err("must fail");
        assert!(matches!(err, TimestampError::Shape(_)));
    }

    #[test]
    fn rejects_other_layouts() {
        for raw in [
            "2023-06-15 09:30:00",
            "2023:6:15 09:30:00",
            "2023:06:15T09:30:00",
            " 2023:06:15 09:30:00",
            "2023:06:15 09:30:00 ",
            "2023:06:15",
            "",
        ] {
            assert!(
                matches!(
                    CaptureTimestamp::parse_exif(raw),
                    Err(TimestampError::Shape(_))
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_impossible_calendar_values() {
        let err = CaptureTimestamp::parse_exif("2023:02:30 10:00:00").expect_err("must fail");
        assert!(matches!(err, TimestampError::OutOfRange(_)));

        // Cameras without a set clock write all zeros.
        let err = CaptureTimestamp::parse_exif("0000:00:00 00:00:00").expect_err("must fail");
        assert!(matches!(err, TimestampError::OutOfRange(_)));
    }
}
