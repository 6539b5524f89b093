//! Avro schema types and parsing.
//!
//! This module defines the Avro schema type system including primitives,
//! complex types and logical types, JSON parsing, the named type registry,
//! writer/reader matching and canonical forms used for fingerprinting.

mod canonical;
mod matching;
mod names;
mod parser;
mod types;

pub use canonical::{
    fingerprint_hex, parsing_canonical_form, resolution_canonical_form,
    sha256_resolution_fingerprint,
};
pub use matching::{matches, TypePromotion};
pub use names::SchemaResolutionContext;
pub use parser::{parse_schema, SchemaParser};
pub use types::*;
