//! Decoded Avro values.

use std::collections::HashMap;

use base64::Engine;
use serde_json::{json, Map, Value};

/// Key under which a record's union member index appears in its JSON form.
pub const UNION_MEMBER_INDEX: &str = "__union_member_index";

/// Represents a decoded Avro value.
#[derive(Debug, Clone, PartialEq)]
pub enum AvroValue {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit signed integer
    Long(i64),
    /// 32-bit floating point
    Float(f32),
    /// 64-bit floating point
    Double(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Fixed-size byte array
    Fixed(Vec<u8>),
    /// Enum symbol with its index in the reader's symbol list
    Enum(usize, String),
    /// Array of values
    Array(Vec<AvroValue>),
    /// Map with string keys
    Map(HashMap<String, AvroValue>),
    /// Record with named fields
    Record(Record),

    // Logical type values
    /// Decimal value (unscaled bytes, precision, scale)
    Decimal {
        /// The unscaled value as big-endian two's complement bytes
        unscaled: Vec<u8>,
        /// The precision (total number of digits)
        precision: u32,
        /// The scale (number of digits after decimal point)
        scale: u32,
    },
    /// UUID value (as string)
    Uuid(String),
    /// Days since Unix epoch, 1970-01-01
    Date(i32),
    /// Time in milliseconds since midnight
    TimeMillis(i32),
    /// Time in microseconds since midnight
    TimeMicros(i64),
    /// Milliseconds since Unix epoch, UTC
    TimestampMillis(i64),
    /// Microseconds since Unix epoch, UTC
    TimestampMicros(i64),
    /// Milliseconds since Unix epoch, local time
    LocalTimestampMillis(i64),
    /// Microseconds since Unix epoch, local time
    LocalTimestampMicros(i64),
    /// Duration (months, days, milliseconds)
    Duration {
        /// Number of months
        months: u32,
        /// Number of days
        days: u32,
        /// Number of milliseconds
        milliseconds: u32,
    },
}

/// A decoded record: named field values plus the union member index that
/// selected it, when it was read through a union.
///
/// Fields keep the order in which they were inserted. Inserting an existing
/// name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, AvroValue)>,
    union_member_index: Option<usize>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record already tagged with a union member index.
    pub fn with_union_member_index(index: usize) -> Self {
        Self {
            fields: Vec::new(),
            union_member_index: Some(index),
        }
    }

    /// Reserve room for `additional` more fields.
    pub fn reserve(&mut self, additional: usize) {
        self.fields.reserve(additional);
    }

    /// Set a field, looking for an existing name only among the first
    /// `prefix` fields. Fields past the prefix must not share the name.
    pub(crate) fn insert_after(&mut self, prefix: usize, name: String, value: AvroValue) {
        match self.fields.iter_mut().take(prefix).find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// The union member index, if this record was selected through a union.
    pub fn union_member_index(&self) -> Option<usize> {
        self.union_member_index
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: AvroValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&AvroValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Whether a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of fields (the union member index is not counted).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AvroValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, AvroValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (S, AvroValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl AvroValue {
    /// The record payload, if this value is a record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            AvroValue::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The union member index carried by a record value.
    pub fn union_member_index(&self) -> Option<usize> {
        self.as_record().and_then(Record::union_member_index)
    }

    /// Convert to a `serde_json::Value`.
    ///
    /// Bytes and fixed become base64 strings, decimals become decimal
    /// strings, and a record's union member index is emitted under
    /// [`UNION_MEMBER_INDEX`].
    pub fn to_json(&self) -> Value {
        match self {
            AvroValue::Null => Value::Null,
            AvroValue::Boolean(b) => Value::Bool(*b),
            AvroValue::Int(i) => Value::from(*i),
            AvroValue::Long(l) => Value::from(*l),
            AvroValue::Float(f) => float_json(f64::from(*f)),
            AvroValue::Double(d) => float_json(*d),
            AvroValue::Bytes(b) | AvroValue::Fixed(b) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            AvroValue::String(s) | AvroValue::Uuid(s) => Value::String(s.clone()),
            AvroValue::Enum(_, symbol) => Value::String(symbol.clone()),
            AvroValue::Array(items) => Value::Array(items.iter().map(AvroValue::to_json).collect()),
            AvroValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            AvroValue::Record(record) => {
                let mut map = Map::new();
                if let Some(index) = record.union_member_index {
                    map.insert(UNION_MEMBER_INDEX.to_string(), Value::from(index));
                }
                for (name, value) in record.iter() {
                    map.insert(name.to_string(), value.to_json());
                }
                Value::Object(map)
            }
            AvroValue::Decimal {
                unscaled, scale, ..
            } => Value::String(decimal_to_string(unscaled, *scale)),
            AvroValue::Date(days) => Value::from(*days),
            AvroValue::TimeMillis(ms) => Value::from(*ms),
            AvroValue::TimeMicros(us)
            | AvroValue::TimestampMillis(us)
            | AvroValue::TimestampMicros(us)
            | AvroValue::LocalTimestampMillis(us)
            | AvroValue::LocalTimestampMicros(us) => Value::from(*us),
            AvroValue::Duration {
                months,
                days,
                milliseconds,
            } => json!({
                "months": months,
                "days": days,
                "milliseconds": milliseconds
            }),
        }
    }
}

fn float_json(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Render big-endian two's complement bytes as a decimal with `scale` digits
/// after the point.
fn decimal_to_string(bytes: &[u8], scale: u32) -> String {
    if bytes.is_empty() {
        return "0".to_string();
    }

    let negative = bytes[0] & 0x80 != 0;
    let mut value: i128 = if negative { -1 } else { 0 };
    for &byte in bytes {
        value = (value << 8) | i128::from(byte);
    }

    if scale == 0 {
        return value.to_string();
    }

    let digits = value.unsigned_abs().to_string();
    let scale = scale as usize;
    let padded = format!("{:0>width$}", digits, width = scale + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    let sign = if value < 0 { "-" } else { "" };
    format!("{}{}.{}", sign, int_part, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_insert_replaces() {
        let mut record = Record::new();
        record.insert("a", AvroValue::Int(1));
        record.insert("b", AvroValue::Int(2));
        record.insert("a", AvroValue::Int(3));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&AvroValue::Int(3)));
        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_record_insert_after_prefix() {
        let mut record: Record = [("seed", AvroValue::Int(0))].into_iter().collect();
        record.insert_after(1, "a".to_string(), AvroValue::Int(1));
        record.insert_after(1, "seed".to_string(), AvroValue::Int(2));
        record.insert_after(1, "b".to_string(), AvroValue::Int(3));

        assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["seed", "a", "b"]);
        assert_eq!(record.get("seed"), Some(&AvroValue::Int(2)));
    }

    #[test]
    fn test_record_json_carries_member_index() {
        let mut record = Record::with_union_member_index(2);
        record.insert("name", AvroValue::String("x".to_string()));
        let json = AvroValue::Record(record).to_json();

        assert_eq!(json[UNION_MEMBER_INDEX], 2);
        assert_eq!(json["name"], "x");
    }

    #[test]
    fn test_plain_record_json_has_no_member_index() {
        let record: Record = [("n", AvroValue::Long(5))].into_iter().collect();
        let json = AvroValue::Record(record).to_json();
        assert!(json.get(UNION_MEMBER_INDEX).is_none());
    }

    #[test]
    fn test_bytes_json_is_base64() {
        let json = AvroValue::Bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]).to_json();
        assert_eq!(json, "3q2+7w==");
    }

    #[test]
    fn test_decimal_to_string() {
        assert_eq!(decimal_to_string(&[0x30, 0x39], 2), "123.45");
        assert_eq!(decimal_to_string(&[0xCF, 0xC7], 2), "-123.45");
        assert_eq!(decimal_to_string(&[0x05], 3), "0.005");
        assert_eq!(decimal_to_string(&[0x7B], 0), "123");
        assert_eq!(decimal_to_string(&[], 2), "0");
    }
}
