//! Property-based tests for the datum reader.
//!
//! These tests use proptest to check decoding properties across many
//! generated values and schema shapes.

mod common;

use proptest::prelude::*;

use common::{encode, Bytes};
use crosswind::reader::{AvroValue, DatumReader, Record};
use crosswind::schema::{parse_schema, AvroSchema, SchemaResolutionContext};

const SAMPLE: &str = r#"{
    "type": "record",
    "name": "Sample",
    "namespace": "prop",
    "fields": [
        {"name": "flag", "type": "boolean"},
        {"name": "count", "type": "int"},
        {"name": "total", "type": "long"},
        {"name": "ratio", "type": "double"},
        {"name": "name", "type": "string"},
        {"name": "blob", "type": "bytes"},
        {"name": "tags", "type": {"type": "array", "items": "string"}},
        {"name": "choice", "type": ["null", "long", "string"]},
        {"name": "color", "type": {"type": "enum", "name": "Color", "symbols": ["RED", "GREEN", "BLUE"]}},
        {"name": "hash", "type": {"type": "fixed", "name": "Hash", "size": 4}}
    ]
}"#;

const SYMBOLS: [&str; 3] = ["RED", "GREEN", "BLUE"];

// ============================================================================
// Value Generators
// ============================================================================

fn arb_choice() -> impl Strategy<Value = AvroValue> {
    prop_oneof![
        Just(AvroValue::Null),
        any::<i64>().prop_map(AvroValue::Long),
        "[a-z]{0,8}".prop_map(AvroValue::String),
    ]
}

fn arb_sample() -> impl Strategy<Value = AvroValue> {
    (
        any::<bool>(),
        any::<i32>(),
        any::<i64>(),
        -1.0e12f64..1.0e12,
        "\\PC{0,16}",
        prop::collection::vec(any::<u8>(), 0..32),
        prop::collection::vec("[a-z]{1,6}", 0..6),
        arb_choice(),
        0usize..3,
        prop::array::uniform4(any::<u8>()),
    )
        .prop_map(
            |(flag, count, total, ratio, name, blob, tags, choice, color, hash)| {
                let record: Record = vec![
                    ("flag", AvroValue::Boolean(flag)),
                    ("count", AvroValue::Int(count)),
                    ("total", AvroValue::Long(total)),
                    ("ratio", AvroValue::Double(ratio)),
                    ("name", AvroValue::String(name)),
                    ("blob", AvroValue::Bytes(blob)),
                    (
                        "tags",
                        AvroValue::Array(tags.into_iter().map(AvroValue::String).collect()),
                    ),
                    ("choice", choice),
                    ("color", AvroValue::Enum(color, SYMBOLS[color].to_string())),
                    ("hash", AvroValue::Fixed(hash.to_vec())),
                ]
                .into_iter()
                .collect();
                AvroValue::Record(record)
            },
        )
}

fn sample_schema() -> (AvroSchema, SchemaResolutionContext) {
    let schema = parse_schema(SAMPLE).expect("sample schema");
    let names = SchemaResolutionContext::build_from_schema(&schema);
    (schema, names)
}

/// Reader schema keeping only the writer fields selected by `mask`.
fn projected_reader(mask: &[bool]) -> AvroSchema {
    let (schema, _) = sample_schema();
    let AvroSchema::Record(mut record) = schema else {
        unreachable!("sample is a record");
    };
    record.fields = record
        .fields
        .into_iter()
        .zip(mask)
        .filter_map(|(field, keep)| keep.then_some(field))
        .collect();
    AvroSchema::Record(record)
}

fn member(i: usize) -> String {
    format!(
        r#"{{"type": "record", "name": "M{}", "fields": [{{"name": "v", "type": "int"}}]}}"#,
        i
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Decoding with the writer's own schema consumes exactly the encoded
    /// bytes and re-encodes to the same bytes.
    #[test]
    fn prop_identity_resolution_round_trips(value in arb_sample()) {
        let (schema, names) = sample_schema();
        let bytes = encode(&value, &schema, &names);

        let reader = DatumReader::new(schema.clone(), schema.clone());
        let mut cursor = bytes.as_slice();
        let decoded = reader.read(&mut cursor).unwrap();

        prop_assert!(cursor.is_empty());
        prop_assert_eq!(&decoded, &value);
        prop_assert_eq!(encode(&decoded, &schema, &names), bytes);
    }

    /// Dropping any subset of fields from the reader keeps the cursor
    /// aligned: the value that follows still decodes.
    #[test]
    fn prop_projection_keeps_cursor_aligned(
        value in arb_sample(),
        mask in prop::collection::vec(any::<bool>(), 10),
        trailer in any::<i64>(),
    ) {
        let (schema, names) = sample_schema();
        let mut bytes = encode(&value, &schema, &names);
        bytes.extend(Bytes::new().long(trailer).build());

        let reader = DatumReader::new(schema, projected_reader(&mask));
        let mut cursor = bytes.as_slice();
        let decoded = reader.read(&mut cursor).unwrap();

        let original = value.as_record().unwrap();
        let projected = decoded.as_record().unwrap();
        let expected: Vec<&str> = original
            .field_names()
            .zip(&mask)
            .filter_map(|(name, keep)| keep.then_some(name))
            .collect();
        prop_assert_eq!(projected.field_names().collect::<Vec<_>>(), expected);
        for (name, field) in projected.iter() {
            prop_assert_eq!(Some(field), original.get(name));
        }

        let tail = DatumReader::new(AvroSchema::Long, AvroSchema::Long);
        prop_assert_eq!(tail.read(&mut cursor).unwrap(), AvroValue::Long(trailer));
        prop_assert!(cursor.is_empty());
    }

    /// The recorded member index follows the null-elision rules for every
    /// union width and selected member.
    #[test]
    fn prop_union_member_index(
        (width, selected) in (1usize..6).prop_flat_map(|w| (Just(w), 0..w)),
        null_first in any::<bool>(),
        v in any::<i32>(),
    ) {
        let mut alternatives: Vec<String> = (0..width).map(member).collect();
        if null_first {
            alternatives.insert(0, r#""null""#.to_string());
        }
        let reader_schema = parse_schema(&format!("[{}]", alternatives.join(","))).unwrap();
        let writer_schema = parse_schema(&member(selected)).unwrap();

        let reader = DatumReader::new(writer_schema, reader_schema);
        let data = Bytes::new().int(v).build();
        let mut cursor = data.as_slice();
        let decoded = reader.read(&mut cursor).unwrap();

        let expected = match (null_first, width) {
            (true, 1) => None,
            _ => Some(selected),
        };
        prop_assert_eq!(decoded.union_member_index(), expected);
        prop_assert_eq!(decoded.as_record().unwrap().get("v"), Some(&AvroValue::Int(v)));
    }

    /// Promoted ints keep their numeric value.
    #[test]
    fn prop_int_promotions(v in any::<i32>()) {
        let data = Bytes::new().int(v).build();

        let mut cursor = data.as_slice();
        let long = DatumReader::new(AvroSchema::Int, AvroSchema::Long).read(&mut cursor).unwrap();
        prop_assert_eq!(long, AvroValue::Long(i64::from(v)));

        let mut cursor = data.as_slice();
        let double = DatumReader::new(AvroSchema::Int, AvroSchema::Double).read(&mut cursor).unwrap();
        prop_assert_eq!(double, AvroValue::Double(f64::from(v)));
    }

    /// Arbitrary bytes never panic the reader; they decode or fail cleanly.
    #[test]
    fn prop_garbage_input_does_not_panic(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let (schema, _) = sample_schema();
        let reader = DatumReader::new(schema.clone(), schema);
        let mut cursor = data.as_slice();
        let _ = reader.read(&mut cursor);
    }
}
