//! Datum decoding
//!
//! Wire primitives, decoded value types, logical type transforms and the
//! schema-resolving [`DatumReader`].

mod datum;
pub mod decode;
mod logical;
mod value;
pub mod varint;

pub use datum::{decode, DatumReader, UnionSeed};
pub use decode::{
    decode_block_count, decode_boolean, decode_bytes, decode_double, decode_enum_index,
    decode_fixed, decode_float, decode_int, decode_long, decode_null, decode_string,
    decode_union_index, is_zero_sized, skip_value, BlockCount, MAX_ZERO_SIZED_ITEMS,
};
pub use value::{AvroValue, Record, UNION_MEMBER_INDEX};
// Re-export varint encoding functions for convenience
pub use varint::{encode_varint, encode_zigzag};
