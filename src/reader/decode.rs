//! Avro binary wire primitives.
//!
//! Scalar readers advance a `&mut &[u8]` cursor past exactly the bytes of one
//! value:
//! - ints and longs are zigzag varints
//! - floats and doubles are little-endian IEEE 754
//! - bytes and strings are length-prefixed
//!
//! [`skip_value`] consumes a whole value of any schema without building it.

use crate::error::DecodeError;
use crate::schema::{AvroSchema, SchemaResolutionContext};

use super::varint;

/// Most items one array may hold when each item occupies no bytes
/// (`null`, `fixed` of size 0, or records made only of those).
pub const MAX_ZERO_SIZED_ITEMS: usize = 1 << 20;

/// Decode a null value. Nulls occupy no bytes.
#[inline]
pub fn decode_null(_data: &mut &[u8]) -> Result<(), DecodeError> {
    Ok(())
}

/// Decode a boolean: a single byte, 0 or 1.
#[inline]
pub fn decode_boolean(data: &mut &[u8]) -> Result<bool, DecodeError> {
    let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
    *data = rest;
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(DecodeError::InvalidData(format!(
            "Invalid boolean value: {}, expected 0 or 1",
            byte
        ))),
    }
}

/// Decode a 32-bit signed integer.
#[inline]
pub fn decode_int(data: &mut &[u8]) -> Result<i32, DecodeError> {
    let long = decode_long(data)?;
    i32::try_from(long).map_err(|_| {
        DecodeError::InvalidData(format!("Integer overflow: {} does not fit in i32", long))
    })
}

/// Decode a 64-bit signed integer.
#[inline]
pub fn decode_long(data: &mut &[u8]) -> Result<i64, DecodeError> {
    varint::decode_zigzag(data)
}

/// Decode a 32-bit float.
#[inline]
pub fn decode_float(data: &mut &[u8]) -> Result<f32, DecodeError> {
    let bytes = take(data, 4)?;
    Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Decode a 64-bit float.
#[inline]
pub fn decode_double(data: &mut &[u8]) -> Result<f64, DecodeError> {
    let bytes = take(data, 8)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok(f64::from_le_bytes(buf))
}

/// Decode a length-prefixed byte sequence.
#[inline]
pub fn decode_bytes(data: &mut &[u8]) -> Result<Vec<u8>, DecodeError> {
    let len = decode_length(data, "bytes")?;
    Ok(take(data, len)?.to_vec())
}

/// Decode a length-prefixed UTF-8 string.
#[inline]
pub fn decode_string(data: &mut &[u8]) -> Result<String, DecodeError> {
    let bytes = decode_bytes(data)?;
    String::from_utf8(bytes).map_err(DecodeError::from)
}

/// Decode exactly `size` raw bytes.
#[inline]
pub fn decode_fixed(data: &mut &[u8], size: usize) -> Result<Vec<u8>, DecodeError> {
    Ok(take(data, size)?.to_vec())
}

/// Header of one block of an array or map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCount {
    /// Number of items in the block; zero terminates the sequence.
    pub items: usize,
    /// Byte length of the block, present when the writer recorded it.
    pub byte_size: Option<usize>,
}

impl BlockCount {
    /// Whether this is the terminating empty block.
    pub fn is_end(&self) -> bool {
        self.items == 0
    }

    /// Reject an item count the input cannot hold.
    ///
    /// Items that occupy at least one byte are bounded by the `remaining`
    /// input. Zero-sized items are bounded by [`MAX_ZERO_SIZED_ITEMS`] across
    /// the whole sequence, `seen` counting those read from earlier blocks.
    pub fn check(&self, zero_sized: bool, remaining: usize, seen: usize) -> Result<(), DecodeError> {
        if zero_sized {
            if seen.saturating_add(self.items) > MAX_ZERO_SIZED_ITEMS {
                return Err(DecodeError::InvalidData(format!(
                    "Block of {} zero-sized items exceeds the limit of {}",
                    self.items, MAX_ZERO_SIZED_ITEMS
                )));
            }
        } else if self.items > remaining {
            return Err(DecodeError::InvalidData(format!(
                "Block count {} exceeds the {} bytes remaining",
                self.items, remaining
            )));
        }
        Ok(())
    }
}

/// Whether values of `schema` are encoded in zero bytes.
pub fn is_zero_sized(schema: &AvroSchema, names: &SchemaResolutionContext) -> bool {
    zero_sized(schema, names, &mut Vec::new())
}

fn zero_sized(
    schema: &AvroSchema,
    names: &SchemaResolutionContext,
    visiting: &mut Vec<String>,
) -> bool {
    match schema {
        AvroSchema::Null => true,
        AvroSchema::Fixed(fixed) => fixed.size == 0,
        AvroSchema::Record(record) => {
            let fullname = record.fullname();
            if visiting.contains(&fullname) {
                return false;
            }
            visiting.push(fullname);
            let empty = record
                .fields
                .iter()
                .all(|field| zero_sized(&field.schema, names, visiting));
            visiting.pop();
            empty
        }
        AvroSchema::Named(_) => names
            .resolve_ref(schema)
            .map(|definition| zero_sized(definition, names, visiting))
            .unwrap_or(false),
        AvroSchema::Logical(logical) => zero_sized(&logical.base, names, visiting),
        _ => false,
    }
}

/// Read the count that opens each array or map block.
///
/// A negative count means the absolute value is the item count and a byte
/// size follows.
pub fn decode_block_count(data: &mut &[u8]) -> Result<BlockCount, DecodeError> {
    let count = decode_long(data)?;
    if count >= 0 {
        return Ok(BlockCount {
            items: count as usize,
            byte_size: None,
        });
    }

    let items = count.checked_neg().ok_or_else(|| {
        DecodeError::InvalidData(format!("Block count out of range: {}", count))
    })? as usize;
    let byte_size = decode_length(data, "block")?;
    Ok(BlockCount {
        items,
        byte_size: Some(byte_size),
    })
}

/// Read a union branch index and check it against the number of alternatives.
pub fn decode_union_index(data: &mut &[u8], num_variants: usize) -> Result<usize, DecodeError> {
    let index = decode_long(data)?;
    if index < 0 || index as usize >= num_variants {
        return Err(DecodeError::InvalidData(format!(
            "Union index {} out of range (0..{})",
            index, num_variants
        )));
    }
    Ok(index as usize)
}

/// Read an enum symbol index and check it against the symbol count.
pub fn decode_enum_index(data: &mut &[u8], num_symbols: usize) -> Result<usize, DecodeError> {
    let index = decode_int(data)?;
    if index < 0 || index as usize >= num_symbols {
        return Err(DecodeError::InvalidData(format!(
            "Enum index {} out of range (0..{})",
            index, num_symbols
        )));
    }
    Ok(index as usize)
}

/// Consume one value of `schema` without materialising it.
///
/// Named references are looked up in `names`, the context of the schema
/// tree `schema` belongs to.
pub fn skip_value(
    data: &mut &[u8],
    schema: &AvroSchema,
    names: &SchemaResolutionContext,
) -> Result<(), DecodeError> {
    match schema {
        AvroSchema::Null => Ok(()),
        AvroSchema::Boolean => skip_fixed(data, 1),
        AvroSchema::Int | AvroSchema::Long | AvroSchema::Enum(_) => varint::skip_varint(data),
        AvroSchema::Float => skip_fixed(data, 4),
        AvroSchema::Double => skip_fixed(data, 8),
        AvroSchema::Bytes | AvroSchema::String => skip_bytes(data),
        AvroSchema::Fixed(fixed) => skip_fixed(data, fixed.size),
        AvroSchema::Array(items) => {
            let zero_sized = is_zero_sized(items, names);
            skip_blocks(data, zero_sized, |data| skip_value(data, items, names))
        }
        AvroSchema::Map(values) => skip_blocks(data, false, |data| {
            skip_bytes(data)?;
            skip_value(data, values, names)
        }),
        AvroSchema::Union(variants) => {
            let index = decode_union_index(data, variants.len())?;
            skip_value(data, &variants[index], names)
        }
        AvroSchema::Record(record) => {
            for field in &record.fields {
                skip_value(data, &field.schema, names)?;
            }
            Ok(())
        }
        AvroSchema::Named(_) => skip_value(data, names.resolve_ref(schema)?, names),
        AvroSchema::Logical(logical) => skip_value(data, &logical.base, names),
    }
}

/// Skip an array or map, jumping whole blocks when their size is known.
fn skip_blocks<F>(data: &mut &[u8], zero_sized: bool, mut skip_item: F) -> Result<(), DecodeError>
where
    F: FnMut(&mut &[u8]) -> Result<(), DecodeError>,
{
    let mut seen = 0usize;
    loop {
        let block = decode_block_count(data)?;
        if block.is_end() {
            return Ok(());
        }
        block.check(zero_sized, data.len(), seen)?;
        seen += block.items;
        match block.byte_size {
            Some(size) => skip_fixed(data, size)?,
            None => {
                for _ in 0..block.items {
                    skip_item(data)?;
                }
            }
        }
    }
}

#[inline]
fn skip_fixed(data: &mut &[u8], size: usize) -> Result<(), DecodeError> {
    take(data, size).map(|_| ())
}

#[inline]
fn skip_bytes(data: &mut &[u8]) -> Result<(), DecodeError> {
    let len = decode_length(data, "bytes")?;
    skip_fixed(data, len)
}

/// Read a non-negative length prefix.
#[inline]
fn decode_length(data: &mut &[u8], what: &str) -> Result<usize, DecodeError> {
    let len = decode_long(data)?;
    usize::try_from(len)
        .map_err(|_| DecodeError::InvalidData(format!("Negative {} length: {}", what, len)))
}

/// Split off the next `len` bytes.
#[inline]
fn take<'a>(data: &mut &'a [u8], len: usize) -> Result<&'a [u8], DecodeError> {
    if data.len() < len {
        return Err(DecodeError::UnexpectedEof);
    }
    let (head, rest) = data.split_at(len);
    *data = rest;
    Ok(head)
}
