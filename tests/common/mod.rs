//! Test-side Avro binary encoder.
//!
//! The crate only decodes, so tests build their inputs here.

#![allow(dead_code)]

use crosswind::reader::{encode_zigzag, AvroValue};
use crosswind::schema::{AvroSchema, SchemaResolutionContext};

/// Chainable builder for Avro-encoded bytes.
#[derive(Debug, Default, Clone)]
pub struct Bytes {
    buf: Vec<u8>,
}

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boolean(mut self, b: bool) -> Self {
        self.buf.push(u8::from(b));
        self
    }

    pub fn int(self, i: i32) -> Self {
        self.long(i64::from(i))
    }

    pub fn long(mut self, l: i64) -> Self {
        self.buf.extend(encode_zigzag(l));
        self
    }

    pub fn float(mut self, f: f32) -> Self {
        self.buf.extend_from_slice(&f.to_le_bytes());
        self
    }

    pub fn double(mut self, d: f64) -> Self {
        self.buf.extend_from_slice(&d.to_le_bytes());
        self
    }

    pub fn bytes(self, b: &[u8]) -> Self {
        self.long(b.len() as i64).raw(b)
    }

    pub fn string(self, s: &str) -> Self {
        self.bytes(s.as_bytes())
    }

    pub fn raw(mut self, b: &[u8]) -> Self {
        self.buf.extend_from_slice(b);
        self
    }

    /// Union branch or enum symbol index.
    pub fn index(self, i: usize) -> Self {
        self.long(i as i64)
    }

    /// Open an array/map block of `count` items.
    pub fn block(self, count: usize) -> Self {
        self.long(count as i64)
    }

    /// Terminate an array/map.
    pub fn end(self) -> Self {
        self.long(0)
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// Re-encode a decoded value under the schema it was decoded with.
///
/// Union branches are chosen by the first alternative whose kind fits the
/// value, which is unambiguous for the schemas the tests use.
pub fn encode(value: &AvroValue, schema: &AvroSchema, names: &SchemaResolutionContext) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(value, schema, names, &mut out);
    out
}

fn encode_into(
    value: &AvroValue,
    schema: &AvroSchema,
    names: &SchemaResolutionContext,
    out: &mut Vec<u8>,
) {
    let schema = names.resolve_ref(schema).expect("named type").base();
    match (schema, value) {
        (AvroSchema::Null, AvroValue::Null) => {}
        (AvroSchema::Boolean, AvroValue::Boolean(b)) => out.push(u8::from(*b)),
        (AvroSchema::Int, AvroValue::Int(i)) => out.extend(encode_zigzag(i64::from(*i))),
        (AvroSchema::Long, AvroValue::Long(l)) => out.extend(encode_zigzag(*l)),
        (AvroSchema::Float, AvroValue::Float(f)) => out.extend_from_slice(&f.to_le_bytes()),
        (AvroSchema::Double, AvroValue::Double(d)) => out.extend_from_slice(&d.to_le_bytes()),
        (AvroSchema::Bytes, AvroValue::Bytes(b)) => {
            out.extend(encode_zigzag(b.len() as i64));
            out.extend_from_slice(b);
        }
        (AvroSchema::String, AvroValue::String(s)) => {
            out.extend(encode_zigzag(s.len() as i64));
            out.extend_from_slice(s.as_bytes());
        }
        (AvroSchema::Fixed(_), AvroValue::Fixed(b)) => out.extend_from_slice(b),
        (AvroSchema::Enum(e), AvroValue::Enum(_, symbol)) => {
            let index = e.symbol_index(symbol).expect("symbol in writer enum");
            out.extend(encode_zigzag(index as i64));
        }
        (AvroSchema::Array(items), AvroValue::Array(values)) => {
            if !values.is_empty() {
                out.extend(encode_zigzag(values.len() as i64));
                for v in values {
                    encode_into(v, items, names, out);
                }
            }
            out.push(0);
        }
        (AvroSchema::Map(item), AvroValue::Map(entries)) => {
            if !entries.is_empty() {
                out.extend(encode_zigzag(entries.len() as i64));
                for (k, v) in entries {
                    out.extend(encode_zigzag(k.len() as i64));
                    out.extend_from_slice(k.as_bytes());
                    encode_into(v, item, names, out);
                }
            }
            out.push(0);
        }
        (AvroSchema::Record(r), AvroValue::Record(rec)) => {
            for field in &r.fields {
                let v = rec.get(&field.name).expect("field present");
                encode_into(v, &field.schema, names, out);
            }
        }
        (AvroSchema::Union(variants), v) => {
            let index = variants
                .iter()
                .position(|alt| fits(v, names.resolve_ref(alt).expect("named type").base()))
                .expect("a union branch fits the value");
            out.extend(encode_zigzag(index as i64));
            encode_into(v, &variants[index], names, out);
        }
        (schema, value) => panic!("cannot encode {:?} as {:?}", value, schema),
    }
}

fn fits(value: &AvroValue, schema: &AvroSchema) -> bool {
    matches!(
        (schema, value),
        (AvroSchema::Null, AvroValue::Null)
            | (AvroSchema::Boolean, AvroValue::Boolean(_))
            | (AvroSchema::Int, AvroValue::Int(_))
            | (AvroSchema::Long, AvroValue::Long(_))
            | (AvroSchema::Float, AvroValue::Float(_))
            | (AvroSchema::Double, AvroValue::Double(_))
            | (AvroSchema::Bytes, AvroValue::Bytes(_))
            | (AvroSchema::String, AvroValue::String(_))
            | (AvroSchema::Fixed(_), AvroValue::Fixed(_))
            | (AvroSchema::Enum(_), AvroValue::Enum(..))
            | (AvroSchema::Array(_), AvroValue::Array(_))
            | (AvroSchema::Map(_), AvroValue::Map(_))
            | (AvroSchema::Record(_), AvroValue::Record(_))
    )
}
