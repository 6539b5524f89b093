//! Logical type decode transforms.
//!
//! A logical type reinterprets the value decoded for its base schema. The
//! transform runs after the raw value has been read (and promoted to the
//! reader's base type), so it never touches the wire.

use crate::error::DecodeError;
use crate::reader::value::AvroValue;
use crate::schema::LogicalTypeName;

const MILLIS_PER_DAY: i32 = 86_400_000;
const MICROS_PER_DAY: i64 = 86_400_000_000;

impl LogicalTypeName {
    /// Turn a raw decoded value into this logical type's value.
    ///
    /// Values whose shape the logical type does not apply to are returned
    /// unchanged.
    ///
    /// # Errors
    /// `DecodeError::InvalidData` for a time of day outside one day, or a
    /// uuid string that is not 36 characters long.
    pub fn decode(&self, raw: AvroValue) -> Result<AvroValue, DecodeError> {
        let value = match (self, raw) {
            (LogicalTypeName::Date, AvroValue::Int(days)) => AvroValue::Date(days),
            (LogicalTypeName::TimeMillis, AvroValue::Int(millis)) => {
                if !(0..MILLIS_PER_DAY).contains(&millis) {
                    return Err(DecodeError::InvalidData(format!(
                        "Invalid time-millis value: {} (must be in range [0, {}))",
                        millis, MILLIS_PER_DAY
                    )));
                }
                AvroValue::TimeMillis(millis)
            }
            (LogicalTypeName::TimeMicros, AvroValue::Long(micros)) => {
                if !(0..MICROS_PER_DAY).contains(&micros) {
                    return Err(DecodeError::InvalidData(format!(
                        "Invalid time-micros value: {} (must be in range [0, {}))",
                        micros, MICROS_PER_DAY
                    )));
                }
                AvroValue::TimeMicros(micros)
            }
            (LogicalTypeName::TimestampMillis, AvroValue::Long(v)) => AvroValue::TimestampMillis(v),
            (LogicalTypeName::TimestampMicros, AvroValue::Long(v)) => AvroValue::TimestampMicros(v),
            (LogicalTypeName::LocalTimestampMillis, AvroValue::Long(v)) => {
                AvroValue::LocalTimestampMillis(v)
            }
            (LogicalTypeName::LocalTimestampMicros, AvroValue::Long(v)) => {
                AvroValue::LocalTimestampMicros(v)
            }
            (
                LogicalTypeName::Decimal { precision, scale },
                AvroValue::Bytes(unscaled) | AvroValue::Fixed(unscaled),
            ) => AvroValue::Decimal {
                unscaled,
                precision: *precision,
                scale: *scale,
            },
            (LogicalTypeName::Uuid, AvroValue::String(s)) => {
                if s.len() != 36 {
                    return Err(DecodeError::InvalidData(format!(
                        "Invalid UUID string length: expected 36, got {}",
                        s.len()
                    )));
                }
                AvroValue::Uuid(s)
            }
            (LogicalTypeName::Uuid, AvroValue::Fixed(b)) if b.len() == 16 => {
                AvroValue::Uuid(format_uuid(&b))
            }
            (LogicalTypeName::Duration, AvroValue::Fixed(b)) if b.len() == 12 => {
                let le = |i: usize| u32::from_le_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]]);
                AvroValue::Duration {
                    months: le(0),
                    days: le(4),
                    milliseconds: le(8),
                }
            }
            (_, other) => other,
        };
        Ok(value)
    }
}

fn format_uuid(bytes: &[u8]) -> String {
    let hex = hex::encode(bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_wrap_longs() {
        assert_eq!(
            LogicalTypeName::TimestampMillis
                .decode(AvroValue::Long(1_700_000_000_000))
                .unwrap(),
            AvroValue::TimestampMillis(1_700_000_000_000)
        );
        assert_eq!(
            LogicalTypeName::LocalTimestampMicros
                .decode(AvroValue::Long(-1))
                .unwrap(),
            AvroValue::LocalTimestampMicros(-1)
        );
    }

    #[test]
    fn test_time_of_day_range() {
        assert_eq!(
            LogicalTypeName::TimeMillis
                .decode(AvroValue::Int(1000))
                .unwrap(),
            AvroValue::TimeMillis(1000)
        );
        assert!(LogicalTypeName::TimeMillis
            .decode(AvroValue::Int(MILLIS_PER_DAY))
            .is_err());
        assert!(LogicalTypeName::TimeMicros
            .decode(AvroValue::Long(-5))
            .is_err());
    }

    #[test]
    fn test_decimal_from_bytes_and_fixed() {
        let logical = LogicalTypeName::Decimal {
            precision: 5,
            scale: 2,
        };
        let expected = AvroValue::Decimal {
            unscaled: vec![0x30, 0x39],
            precision: 5,
            scale: 2,
        };
        assert_eq!(logical.decode(AvroValue::Bytes(vec![0x30, 0x39])).unwrap(), expected);
        assert_eq!(logical.decode(AvroValue::Fixed(vec![0x30, 0x39])).unwrap(), expected);
    }

    #[test]
    fn test_uuid_from_fixed() {
        let bytes: Vec<u8> = (0u8..16).collect();
        assert_eq!(
            LogicalTypeName::Uuid.decode(AvroValue::Fixed(bytes)).unwrap(),
            AvroValue::Uuid("00010203-0405-0607-0809-0a0b0c0d0e0f".to_string())
        );
        assert!(LogicalTypeName::Uuid
            .decode(AvroValue::String("short".to_string()))
            .is_err());
    }

    #[test]
    fn test_duration() {
        let mut raw = 1u32.to_le_bytes().to_vec();
        raw.extend_from_slice(&2u32.to_le_bytes());
        raw.extend_from_slice(&3u32.to_le_bytes());
        assert_eq!(
            LogicalTypeName::Duration.decode(AvroValue::Fixed(raw)).unwrap(),
            AvroValue::Duration {
                months: 1,
                days: 2,
                milliseconds: 3
            }
        );
    }

    #[test]
    fn test_other_shapes_pass_through() {
        assert_eq!(
            LogicalTypeName::Date.decode(AvroValue::Long(3)).unwrap(),
            AvroValue::Long(3)
        );
        assert_eq!(
            LogicalTypeName::TimestampMillis
                .decode(AvroValue::Double(1.5))
                .unwrap(),
            AvroValue::Double(1.5)
        );
    }
}
