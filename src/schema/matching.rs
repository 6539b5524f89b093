//! Writer/reader compatibility matching.
//!
//! [`matches`] answers a single question: can bytes written under the writer
//! node be interpreted under the reader node? It compares the current pair of
//! nodes, tries each alternative of a reader union, and descends into the
//! item and value schemas of arrays and maps. Record fields are left to the
//! decoder.

use crate::schema::{AvroSchema, RecordKind};

/// Type promotions supported by Avro schema resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePromotion {
    /// int → long
    IntToLong,
    /// int → float
    IntToFloat,
    /// int → double
    IntToDouble,
    /// long → float
    LongToFloat,
    /// long → double
    LongToDouble,
    /// float → double
    FloatToDouble,
}

impl TypePromotion {
    /// The promotion that widens a writer primitive to the reader's, if any.
    ///
    /// Identical types need no promotion and return `None`, as do pairs that
    /// cannot be promoted at all. Strings and bytes are never promoted into
    /// each other.
    pub fn between(writer: &AvroSchema, reader: &AvroSchema) -> Option<Self> {
        match (writer.base(), reader.base()) {
            (AvroSchema::Int, AvroSchema::Long) => Some(TypePromotion::IntToLong),
            (AvroSchema::Int, AvroSchema::Float) => Some(TypePromotion::IntToFloat),
            (AvroSchema::Int, AvroSchema::Double) => Some(TypePromotion::IntToDouble),
            (AvroSchema::Long, AvroSchema::Float) => Some(TypePromotion::LongToFloat),
            (AvroSchema::Long, AvroSchema::Double) => Some(TypePromotion::LongToDouble),
            (AvroSchema::Float, AvroSchema::Double) => Some(TypePromotion::FloatToDouble),
            _ => None,
        }
    }
}

/// Decide whether the writer node's encoding can be read as the reader node.
///
/// A reader union matches if any alternative matches. A writer union always
/// passes here; the branch actually written is checked when it is decoded.
///
/// # Example
/// ```
/// use crosswind::schema::{matches, AvroSchema};
///
/// assert!(matches(&AvroSchema::Int, &AvroSchema::Double));
/// assert!(!matches(&AvroSchema::String, &AvroSchema::Bytes));
/// assert!(matches(
///     &AvroSchema::String,
///     &AvroSchema::Union(vec![AvroSchema::Null, AvroSchema::String]),
/// ));
/// ```
pub fn matches(writer: &AvroSchema, reader: &AvroSchema) -> bool {
    let writer = writer.base();
    let reader = reader.base();

    if let AvroSchema::Union(alternatives) = reader {
        return alternatives.iter().any(|alt| matches(writer, alt));
    }

    match (writer, reader) {
        (AvroSchema::Union(_), _) => true,

        (AvroSchema::Null, AvroSchema::Null)
        | (AvroSchema::Boolean, AvroSchema::Boolean)
        | (AvroSchema::Int, AvroSchema::Int)
        | (AvroSchema::Long, AvroSchema::Long)
        | (AvroSchema::Float, AvroSchema::Float)
        | (AvroSchema::Double, AvroSchema::Double)
        | (AvroSchema::Bytes, AvroSchema::Bytes)
        | (AvroSchema::String, AvroSchema::String) => true,

        (AvroSchema::Array(w), AvroSchema::Array(r)) | (AvroSchema::Map(w), AvroSchema::Map(r)) => {
            matches(w, r)
        }

        (AvroSchema::Record(w), AvroSchema::Record(r)) => {
            w.kind == r.kind && names_match(writer, reader)
        }
        (AvroSchema::Enum(_), AvroSchema::Enum(_)) => names_match(writer, reader),
        (AvroSchema::Fixed(w), AvroSchema::Fixed(r)) => {
            w.size == r.size && names_match(writer, reader)
        }

        // References carry only a name; the definitions are compared once
        // the decoder has followed them.
        (AvroSchema::Named(_), r) if r.is_named() || matches!(r, AvroSchema::Named(_)) => {
            names_match(writer, reader)
        }
        (w, AvroSchema::Named(_)) if w.is_named() => {
            // a protocol error record never resolves into a plain reference
            !matches!(w, AvroSchema::Record(rec) if rec.kind == RecordKind::Error)
                && names_match(writer, reader)
        }

        (w, r) => TypePromotion::between(w, r).is_some(),
    }
}

/// Fullnames are equal, or one of the reader's aliases names the writer.
fn names_match(writer: &AvroSchema, reader: &AvroSchema) -> bool {
    match (writer.fullname(), reader.fullname()) {
        (Some(w), Some(r)) if w == r => true,
        (Some(w), Some(_)) => reader.qualified_aliases().contains(&w),
        _ => false,
    }
}
