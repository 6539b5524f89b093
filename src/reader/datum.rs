//! Schema-resolving datum reader.
//!
//! [`DatumReader`] walks the writer and reader schema trees in lock-step,
//! consuming exactly the bytes the writer produced and returning a value
//! shaped by the reader schema.
//!
//! When the writer wrote a plain value and the reader expects a union, the
//! first reader alternative that matches is chosen and its position is
//! recorded on the resulting record:
//!
//! | reader union          | recorded index      |
//! |-----------------------|---------------------|
//! | `[null, T]`           | none                |
//! | `[null, A, B, ...]`   | position - 1        |
//! | `[A, B, ...]`         | position            |
//!
//! Only records carry the index. A scalar selected through a union is
//! returned as is.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::reader::decode::{
    decode_block_count, decode_boolean, decode_bytes, decode_double, decode_enum_index,
    decode_fixed, decode_float, decode_int, decode_long, decode_null, decode_string,
    decode_union_index, is_zero_sized, skip_value,
};
use crate::reader::value::{AvroValue, Record};
use crate::schema::{matches, AvroSchema, SchemaResolutionContext, TypePromotion};

/// Pending annotation for the next record built while resolving into a
/// reader union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnionSeed {
    /// Nothing to record.
    #[default]
    None,
    /// The selected union member index.
    MemberIndex(usize),
}

impl UnionSeed {
    /// Pick the seed for `union` when its alternative `position` was
    /// selected.
    pub fn for_alternative(union: &AvroSchema, position: usize) -> Self {
        let leading_null = matches!(
            union.union_variants().and_then(<[AvroSchema]>::first),
            Some(AvroSchema::Null)
        );
        if union.is_optional() {
            UnionSeed::None
        } else if leading_null {
            // the leading null itself has no member index
            position
                .checked_sub(1)
                .map_or(UnionSeed::None, UnionSeed::MemberIndex)
        } else {
            UnionSeed::MemberIndex(position)
        }
    }

    /// The initial record this seed stands for.
    pub fn into_record(self) -> Option<Record> {
        match self {
            UnionSeed::None => None,
            UnionSeed::MemberIndex(index) => Some(Record::with_union_member_index(index)),
        }
    }
}

/// Decodes values written with one schema into the shape of another.
///
/// A reader owns both schema trees and their named-type registries and holds
/// no per-call state, so one instance can be shared across threads.
///
/// # Example
/// ```
/// use crosswind::reader::DatumReader;
/// use crosswind::reader::AvroValue;
/// use crosswind::schema::AvroSchema;
///
/// let reader = DatumReader::new(AvroSchema::Int, AvroSchema::Long);
/// let mut cursor: &[u8] = &[0x54];
/// assert_eq!(reader.read(&mut cursor).unwrap(), AvroValue::Long(42));
/// ```
#[derive(Debug, Clone)]
pub struct DatumReader {
    writer: AvroSchema,
    reader: AvroSchema,
    writer_names: SchemaResolutionContext,
    reader_names: SchemaResolutionContext,
    config: DecoderConfig,
}

impl DatumReader {
    /// Create a reader with the default configuration.
    pub fn new(writer: AvroSchema, reader: AvroSchema) -> Self {
        Self::with_config(writer, reader, DecoderConfig::default())
    }

    /// Create a reader with an explicit configuration.
    pub fn with_config(writer: AvroSchema, reader: AvroSchema, config: DecoderConfig) -> Self {
        let writer_names = SchemaResolutionContext::build_from_schema(&writer);
        let reader_names = SchemaResolutionContext::build_from_schema(&reader);
        debug!(
            writer = writer.type_name(),
            reader = reader.type_name(),
            writer_named_types = writer_names.len(),
            reader_named_types = reader_names.len(),
            "Created datum reader"
        );
        Self {
            writer,
            reader,
            writer_names,
            reader_names,
            config,
        }
    }

    /// The schema the data was written with.
    pub fn writer_schema(&self) -> &AvroSchema {
        &self.writer
    }

    /// The schema values are shaped by.
    pub fn reader_schema(&self) -> &AvroSchema {
        &self.reader
    }

    /// The decoder configuration.
    pub fn config(&self) -> DecoderConfig {
        self.config
    }

    /// Decode one value, advancing the cursor past it.
    ///
    /// # Errors
    /// - `DecodeError::SchemaMismatch` if the schemas cannot be reconciled
    /// - `DecodeError::UnknownSchemaType` for an undefined named reference
    /// - any wire error from the underlying bytes
    pub fn read(&self, data: &mut &[u8]) -> Result<AvroValue, DecodeError> {
        self.read_data(&self.writer, &self.reader, data, None)
    }

    /// Decode one value, starting the top-level record from `seed`.
    ///
    /// The seed's fields and union member index are kept unless the decoded
    /// record overwrites them. With `use_custom_initial_record` off the seed
    /// is ignored.
    pub fn read_with_seed(&self, data: &mut &[u8], seed: Record) -> Result<AvroValue, DecodeError> {
        self.read_data(&self.writer, &self.reader, data, Some(seed))
    }

    fn read_data(
        &self,
        writer: &AvroSchema,
        reader: &AvroSchema,
        data: &mut &[u8],
        seed: Option<Record>,
    ) -> Result<AvroValue, DecodeError> {
        let writer = self.writer_names.resolve_ref(writer)?;
        let reader = self.reader_names.resolve_ref(reader)?;

        if !matches(writer, reader) {
            return Err(DecodeError::mismatch(writer, reader));
        }

        if !writer.is_union() {
            if let Some(alternatives) = reader.union_variants() {
                return self.read_into_union(writer, alternatives, reader, data);
            }
        }

        let raw = match writer.base() {
            AvroSchema::Null => {
                decode_null(data)?;
                AvroValue::Null
            }
            AvroSchema::Boolean => AvroValue::Boolean(decode_boolean(data)?),
            AvroSchema::Int => self.promote(AvroValue::Int(decode_int(data)?), writer, reader),
            AvroSchema::Long => self.promote(AvroValue::Long(decode_long(data)?), writer, reader),
            AvroSchema::Float => self.promote(AvroValue::Float(decode_float(data)?), writer, reader),
            AvroSchema::Double => AvroValue::Double(decode_double(data)?),
            AvroSchema::Bytes => AvroValue::Bytes(decode_bytes(data)?),
            AvroSchema::String => AvroValue::String(decode_string(data)?),
            AvroSchema::Fixed(fixed) => AvroValue::Fixed(decode_fixed(data, fixed.size)?),
            AvroSchema::Enum(_) => self.read_enum(writer, reader, data)?,
            AvroSchema::Array(items) => self.read_array(items, writer, reader, data)?,
            AvroSchema::Map(values) => self.read_map(values, writer, reader, data)?,
            AvroSchema::Union(variants) => {
                // the branch is decoded (and post-processed) against the full reader
                let index = decode_union_index(data, variants.len())?;
                return self.read_data(&variants[index], reader, data, None);
            }
            AvroSchema::Record(_) => self.read_record(writer, reader, data, seed)?,
            AvroSchema::Named(name) => return Err(DecodeError::UnknownSchemaType(name.clone())),
            AvroSchema::Logical(_) => {
                return Err(DecodeError::UnknownSchemaType(writer.type_name().to_string()))
            }
        };

        match reader.logical_type() {
            Some(logical) => logical.decode(raw),
            None => Ok(raw),
        }
    }

    /// Writer is a plain value, reader a union: pick the first matching
    /// alternative and decode into it.
    fn read_into_union(
        &self,
        writer: &AvroSchema,
        alternatives: &[AvroSchema],
        reader: &AvroSchema,
        data: &mut &[u8],
    ) -> Result<AvroValue, DecodeError> {
        let position = alternatives
            .iter()
            .position(|alt| matches(writer, alt))
            .ok_or_else(|| DecodeError::mismatch(writer, reader))?;

        let seed = UnionSeed::for_alternative(reader, position);
        trace!(
            writer = writer.type_name(),
            index = position,
            seed = ?seed,
            "Resolved writer into reader union"
        );
        self.read_data(writer, &alternatives[position], data, seed.into_record())
    }

    fn promote(&self, value: AvroValue, writer: &AvroSchema, reader: &AvroSchema) -> AvroValue {
        match TypePromotion::between(writer, reader) {
            Some(promotion) => apply_promotion(value, promotion),
            None => value,
        }
    }

    fn read_enum(
        &self,
        writer: &AvroSchema,
        reader: &AvroSchema,
        data: &mut &[u8],
    ) -> Result<AvroValue, DecodeError> {
        let (AvroSchema::Enum(writer_enum), AvroSchema::Enum(reader_enum)) =
            (writer.base(), reader.base())
        else {
            return Err(DecodeError::mismatch(writer, reader));
        };

        let index = decode_enum_index(data, writer_enum.symbols.len())?;
        let symbol = &writer_enum.symbols[index];

        if let Some(reader_index) = reader_enum.symbol_index(symbol) {
            return Ok(AvroValue::Enum(reader_index, symbol.clone()));
        }

        match &reader_enum.default {
            Some(default) => {
                let reader_index = reader_enum
                    .symbol_index(default)
                    .ok_or_else(|| DecodeError::mismatch(writer, reader))?;
                trace!(
                    symbol = %symbol,
                    default = %default,
                    "Writer enum symbol unknown to reader, using default"
                );
                Ok(AvroValue::Enum(reader_index, default.clone()))
            }
            None => Err(DecodeError::mismatch(writer, reader)),
        }
    }

    fn read_array(
        &self,
        writer_items: &AvroSchema,
        writer: &AvroSchema,
        reader: &AvroSchema,
        data: &mut &[u8],
    ) -> Result<AvroValue, DecodeError> {
        let AvroSchema::Array(reader_items) = reader.base() else {
            return Err(DecodeError::mismatch(writer, reader));
        };

        let zero_sized = is_zero_sized(writer_items, &self.writer_names);
        let mut items = Vec::new();
        loop {
            let block = decode_block_count(data)?;
            if block.is_end() {
                break;
            }
            block.check(zero_sized, data.len(), items.len())?;
            items.reserve(block.items.min(data.len()));
            for _ in 0..block.items {
                items.push(self.read_data(writer_items, reader_items, data, None)?);
            }
        }
        Ok(AvroValue::Array(items))
    }

    fn read_map(
        &self,
        writer_values: &AvroSchema,
        writer: &AvroSchema,
        reader: &AvroSchema,
        data: &mut &[u8],
    ) -> Result<AvroValue, DecodeError> {
        let AvroSchema::Map(reader_values) = reader.base() else {
            return Err(DecodeError::mismatch(writer, reader));
        };

        let mut entries = HashMap::new();
        loop {
            let block = decode_block_count(data)?;
            if block.is_end() {
                break;
            }
            // every entry carries at least its key length
            block.check(false, data.len(), 0)?;
            for _ in 0..block.items {
                let key = decode_string(data)?;
                let value = self.read_data(writer_values, reader_values, data, None)?;
                entries.insert(key, value);
            }
        }
        Ok(AvroValue::Map(entries))
    }

    /// Decode writer fields in writer order. Fields the reader lacks are
    /// skipped; fields the writer lacks are left out.
    fn read_record(
        &self,
        writer: &AvroSchema,
        reader: &AvroSchema,
        data: &mut &[u8],
        seed: Option<Record>,
    ) -> Result<AvroValue, DecodeError> {
        let (AvroSchema::Record(writer_record), AvroSchema::Record(reader_record)) =
            (writer.base(), reader.base())
        else {
            return Err(DecodeError::mismatch(writer, reader));
        };

        let mut record = match seed {
            Some(seed) if self.config.use_custom_initial_record => seed,
            _ => Record::new(),
        };
        let seeded = record.len();
        record.reserve(writer_record.fields.len());

        // Writer field names are unique, so only seed fields can be replaced.
        // Reader fields are looked up from just past the last hit, a single
        // comparison when both schemas list fields in the same order.
        let mut next = 0;
        for field in &writer_record.fields {
            let found = match reader_record.fields.get(next) {
                Some(candidate) if candidate.name == field.name => Some((next, candidate)),
                _ => reader_record
                    .fields
                    .iter()
                    .enumerate()
                    .find(|(_, f)| f.name == field.name),
            };
            match found {
                Some((at, reader_field)) => {
                    next = at + 1;
                    let value = self.read_data(&field.schema, &reader_field.schema, data, None)?;
                    record.insert_after(seeded, field.name.clone(), value);
                }
                None => {
                    trace!(
                        record = %writer_record.fullname(),
                        field = %field.name,
                        "Skipping writer field absent from reader"
                    );
                    skip_value(data, &field.schema, &self.writer_names)?;
                }
            }
        }

        Ok(AvroValue::Record(record))
    }
}

fn apply_promotion(value: AvroValue, promotion: TypePromotion) -> AvroValue {
    match (value, promotion) {
        (AvroValue::Int(i), TypePromotion::IntToLong) => AvroValue::Long(i64::from(i)),
        (AvroValue::Int(i), TypePromotion::IntToFloat) => AvroValue::Float(i as f32),
        (AvroValue::Int(i), TypePromotion::IntToDouble) => AvroValue::Double(f64::from(i)),
        (AvroValue::Long(l), TypePromotion::LongToFloat) => AvroValue::Float(l as f32),
        (AvroValue::Long(l), TypePromotion::LongToDouble) => AvroValue::Double(l as f64),
        (AvroValue::Float(f), TypePromotion::FloatToDouble) => AvroValue::Double(f64::from(f)),
        (value, _) => value,
    }
}

/// Decode a single value with a throwaway [`DatumReader`].
///
/// Prefer building a `DatumReader` once when decoding many values.
pub fn decode(
    writer: &AvroSchema,
    reader: &AvroSchema,
    data: &mut &[u8],
) -> Result<AvroValue, DecodeError> {
    DatumReader::new(writer.clone(), reader.clone()).read(data)
}
