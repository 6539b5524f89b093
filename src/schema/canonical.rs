//! Canonical schema forms and fingerprints.
//!
//! The parsing canonical form keeps only what affects the binary encoding.
//! The resolution canonical form additionally keeps field defaults and
//! aliases, which change how a reader resolves data, so two schemas that
//! differ only there are registered separately.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::schema::{AvroSchema, RecordKind};

/// Avro Parsing Canonical Form of a schema.
///
/// # Example
/// ```
/// use crosswind::schema::{parse_schema, parsing_canonical_form};
///
/// let schema = parse_schema(r#"{"type": "array", "items": {"type": "int"}}"#).unwrap();
/// assert_eq!(parsing_canonical_form(&schema), r#"{"type":"array","items":"int"}"#);
/// ```
pub fn parsing_canonical_form(schema: &AvroSchema) -> String {
    let mut out = String::new();
    CanonicalWriter::new(false).write(schema, &mut out);
    out
}

/// Parsing canonical form plus field defaults and aliases.
pub fn resolution_canonical_form(schema: &AvroSchema) -> String {
    let mut out = String::new();
    CanonicalWriter::new(true).write(schema, &mut out);
    out
}

/// SHA-256 over the resolution canonical form.
pub fn sha256_resolution_fingerprint(schema: &AvroSchema) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(resolution_canonical_form(schema).as_bytes());
    let digest = hasher.finalize();
    let mut fingerprint = [0u8; 32];
    fingerprint.copy_from_slice(&digest);
    fingerprint
}

/// Render a fingerprint as a base-16 integer (no leading zeros).
pub fn fingerprint_hex(fingerprint: &[u8; 32]) -> String {
    let full = hex::encode(fingerprint);
    let trimmed = full.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

struct CanonicalWriter {
    resolution: bool,
    seen: HashSet<String>,
}

impl CanonicalWriter {
    fn new(resolution: bool) -> Self {
        Self {
            resolution,
            seen: HashSet::new(),
        }
    }

    fn write(&mut self, schema: &AvroSchema, out: &mut String) {
        match schema {
            AvroSchema::Null
            | AvroSchema::Boolean
            | AvroSchema::Int
            | AvroSchema::Long
            | AvroSchema::Float
            | AvroSchema::Double
            | AvroSchema::Bytes
            | AvroSchema::String => push_str_literal(schema.type_name(), out),
            AvroSchema::Logical(logical) => self.write(&logical.base, out),
            AvroSchema::Named(name) => push_str_literal(name, out),
            AvroSchema::Array(items) => {
                out.push_str(r#"{"type":"array","items":"#);
                self.write(items, out);
                out.push('}');
            }
            AvroSchema::Map(values) => {
                out.push_str(r#"{"type":"map","values":"#);
                self.write(values, out);
                out.push('}');
            }
            AvroSchema::Union(variants) => {
                out.push('[');
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    self.write(variant, out);
                }
                out.push(']');
            }
            AvroSchema::Record(_) | AvroSchema::Enum(_) | AvroSchema::Fixed(_) => {
                self.write_named(schema, out)
            }
        }
    }

    fn write_named(&mut self, schema: &AvroSchema, out: &mut String) {
        let fullname = schema.fullname().unwrap_or_default();
        if !self.seen.insert(fullname.clone()) {
            push_str_literal(&fullname, out);
            return;
        }

        out.push_str(r#"{"name":"#);
        push_str_literal(&fullname, out);

        match schema {
            AvroSchema::Record(record) => {
                let kind = match record.kind {
                    RecordKind::Record => "record",
                    RecordKind::Error => "error",
                };
                out.push_str(r#","type":"#);
                push_str_literal(kind, out);
                out.push_str(r#","fields":["#);
                for (i, field) in record.fields.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(r#"{"name":"#);
                    push_str_literal(&field.name, out);
                    out.push_str(r#","type":"#);
                    self.write(&field.schema, out);
                    if self.resolution {
                        if let Some(default) = &field.default {
                            out.push_str(r#","default":"#);
                            out.push_str(&default.to_string());
                        }
                        push_aliases(&field.aliases, out);
                    }
                    out.push('}');
                }
                out.push(']');
            }
            AvroSchema::Enum(enum_schema) => {
                out.push_str(r#","type":"enum","symbols":["#);
                for (i, symbol) in enum_schema.symbols.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    push_str_literal(symbol, out);
                }
                out.push(']');
                if self.resolution {
                    if let Some(default) = &enum_schema.default {
                        out.push_str(r#","default":"#);
                        push_str_literal(default, out);
                    }
                }
            }
            AvroSchema::Fixed(fixed) => {
                out.push_str(r#","type":"fixed","size":"#);
                out.push_str(&fixed.size.to_string());
            }
            _ => {}
        }

        if self.resolution {
            push_aliases(&schema.qualified_aliases(), out);
        }
        out.push('}');
    }
}

fn push_aliases(aliases: &[String], out: &mut String) {
    if aliases.is_empty() {
        return;
    }
    out.push_str(r#","aliases":["#);
    for (i, alias) in aliases.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_str_literal(alias, out);
    }
    out.push(']');
}

fn push_str_literal(s: &str, out: &mut String) {
    out.push_str(&serde_json::Value::from(s).to_string());
}
