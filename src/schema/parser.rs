//! JSON schema parser for Avro schemas.
//!
//! Turns Avro schema JSON into the [`AvroSchema`] tree. Named types are
//! qualified against the enclosing namespace; the first occurrence of a name
//! is its definition and every later use becomes [`AvroSchema::Named`].

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::schema::types::qualify;
use crate::schema::{
    AvroSchema, EnumSchema, FieldSchema, FixedSchema, LogicalType, LogicalTypeName, RecordKind,
    RecordSchema,
};

/// Parse an Avro schema from a JSON string.
///
/// # Example
/// ```
/// use crosswind::schema::{parse_schema, AvroSchema};
///
/// let schema = parse_schema(r#"["null", "string"]"#).unwrap();
/// assert!(schema.is_optional());
/// ```
pub fn parse_schema(json: &str) -> Result<AvroSchema, SchemaError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| SchemaError::ParseError(format!("Invalid JSON: {}", e)))?;
    SchemaParser::new().parse(&value)
}

/// Parser state: the set of defined fullnames and the namespace in scope.
#[derive(Debug, Default)]
pub struct SchemaParser {
    defined: HashSet<String>,
    namespace: Option<String>,
}

impl SchemaParser {
    /// Create a new parser with no names defined.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON value into an AvroSchema.
    pub fn parse(&mut self, value: &Value) -> Result<AvroSchema, SchemaError> {
        match value {
            Value::String(s) => self.parse_type_name(s),
            Value::Object(obj) => self.parse_object(obj),
            Value::Array(arr) => self.parse_union(arr),
            other => Err(SchemaError::InvalidSchema(format!(
                "Expected string, object, or array, found: {}",
                other
            ))),
        }
    }

    fn parse_type_name(&self, name: &str) -> Result<AvroSchema, SchemaError> {
        Ok(match name {
            "null" => AvroSchema::Null,
            "boolean" => AvroSchema::Boolean,
            "int" => AvroSchema::Int,
            "long" => AvroSchema::Long,
            "float" => AvroSchema::Float,
            "double" => AvroSchema::Double,
            "bytes" => AvroSchema::Bytes,
            "string" => AvroSchema::String,
            reference => AvroSchema::Named(self.resolve_reference(reference)?),
        })
    }

    /// Qualify a reference against the current namespace, falling back to the
    /// null namespace when only the bare name is defined.
    fn resolve_reference(&self, name: &str) -> Result<String, SchemaError> {
        let qualified = qualify(name, self.namespace.as_deref());
        if self.defined.contains(&qualified) {
            Ok(qualified)
        } else if self.defined.contains(name) {
            Ok(name.to_string())
        } else {
            Err(SchemaError::UnsupportedType(format!(
                "Unknown type: {}",
                name
            )))
        }
    }

    fn parse_object(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema("Missing 'type' field".to_string()))?;

        let type_str = match type_value {
            Value::String(s) => s.as_str(),
            // {"type": {...}} or {"type": [...]}: the attribute holds a full schema
            nested => return self.parse(nested),
        };

        let base = match type_str {
            "record" => self.parse_record(obj, RecordKind::Record)?,
            "error" => self.parse_record(obj, RecordKind::Error)?,
            "enum" => self.parse_enum(obj)?,
            "fixed" => self.parse_fixed(obj)?,
            "array" => {
                let items = obj.get("items").ok_or_else(|| {
                    SchemaError::InvalidSchema("Array missing 'items' field".to_string())
                })?;
                AvroSchema::Array(Box::new(self.parse(items)?))
            }
            "map" => {
                let values = obj.get("values").ok_or_else(|| {
                    SchemaError::InvalidSchema("Map missing 'values' field".to_string())
                })?;
                AvroSchema::Map(Box::new(self.parse(values)?))
            }
            other => self.parse_type_name(other)?,
        };

        match obj.get("logicalType").and_then(Value::as_str) {
            Some(logical) => Ok(wrap_logical(base, logical, obj)),
            None => Ok(base),
        }
    }

    fn parse_union(&mut self, arr: &[Value]) -> Result<AvroSchema, SchemaError> {
        if arr.is_empty() {
            return Err(SchemaError::InvalidSchema(
                "Union schema cannot be empty".to_string(),
            ));
        }
        let variants = arr
            .iter()
            .map(|v| self.parse(v))
            .collect::<Result<Vec<_>, _>>()?;
        if variants.iter().any(|v| matches!(v, AvroSchema::Union(_))) {
            return Err(SchemaError::InvalidSchema(
                "Unions may not immediately contain other unions".to_string(),
            ));
        }
        Ok(AvroSchema::Union(variants))
    }

    /// Split a declared name into (short name, namespace) and register its fullname.
    fn define_name(
        &mut self,
        obj: &Map<String, Value>,
        what: &str,
    ) -> Result<(String, Option<String>), SchemaError> {
        let declared = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidSchema(format!("{} missing 'name' field", what)))?;

        let (name, namespace) = match declared.rsplit_once('.') {
            Some((ns, short)) => (short.to_string(), Some(ns.to_string())),
            None => {
                let ns = obj
                    .get("namespace")
                    .and_then(Value::as_str)
                    .map(String::from)
                    .or_else(|| self.namespace.clone())
                    .filter(|ns| !ns.is_empty());
                (declared.to_string(), ns)
            }
        };

        let fullname = qualify(&name, namespace.as_deref());
        if !self.defined.insert(fullname.clone()) {
            return Err(SchemaError::InvalidSchema(format!(
                "Duplicate definition of '{}'",
                fullname
            )));
        }
        Ok((name, namespace))
    }

    fn parse_record(
        &mut self,
        obj: &Map<String, Value>,
        kind: RecordKind,
    ) -> Result<AvroSchema, SchemaError> {
        let (name, namespace) = self.define_name(obj, "Record")?;

        let fields_value = obj
            .get("fields")
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaError::InvalidSchema("Record missing 'fields' array".to_string()))?;

        // Fields resolve names against the record's own namespace
        let outer = std::mem::replace(&mut self.namespace, namespace.clone());
        let fields = fields_value
            .iter()
            .map(|f| self.parse_field(f))
            .collect::<Result<Vec<_>, _>>();
        self.namespace = outer;
        let fields = fields?;

        let mut field_names = HashSet::with_capacity(fields.len());
        if let Some(dup) = fields.iter().find(|f| !field_names.insert(f.name.as_str())) {
            return Err(SchemaError::InvalidSchema(format!(
                "Duplicate field '{}' in record '{}'",
                dup.name, name
            )));
        }

        Ok(AvroSchema::Record(RecordSchema {
            name,
            namespace,
            fields,
            doc: string_attr(obj, "doc"),
            aliases: aliases_attr(obj),
            kind,
        }))
    }

    fn parse_field(&mut self, value: &Value) -> Result<FieldSchema, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::InvalidSchema("Field must be an object".to_string()))?;

        let name = obj
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::InvalidSchema("Field missing 'name'".to_string()))?;

        let type_value = obj
            .get("type")
            .ok_or_else(|| SchemaError::InvalidSchema(format!("Field '{}' missing 'type'", name)))?;

        Ok(FieldSchema {
            name: name.to_string(),
            schema: self.parse(type_value)?,
            default: obj.get("default").cloned(),
            doc: string_attr(obj, "doc"),
            aliases: aliases_attr(obj),
        })
    }

    fn parse_enum(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let (name, namespace) = self.define_name(obj, "Enum")?;

        let symbols = obj
            .get("symbols")
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaError::InvalidSchema("Enum missing 'symbols' array".to_string()))?
            .iter()
            .map(|v| {
                v.as_str().map(String::from).ok_or_else(|| {
                    SchemaError::InvalidSchema("Enum symbols must be strings".to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let default = string_attr(obj, "default");
        if let Some(symbol) = &default {
            if !symbols.contains(symbol) {
                return Err(SchemaError::InvalidSchema(format!(
                    "Enum default '{}' is not one of its symbols",
                    symbol
                )));
            }
        }

        Ok(AvroSchema::Enum(EnumSchema {
            name,
            namespace,
            symbols,
            doc: string_attr(obj, "doc"),
            aliases: aliases_attr(obj),
            default,
        }))
    }

    fn parse_fixed(&mut self, obj: &Map<String, Value>) -> Result<AvroSchema, SchemaError> {
        let (name, namespace) = self.define_name(obj, "Fixed")?;
        let size = obj
            .get("size")
            .and_then(Value::as_u64)
            .ok_or_else(|| SchemaError::InvalidSchema("Fixed missing 'size' field".to_string()))?;

        Ok(AvroSchema::Fixed(FixedSchema {
            name,
            namespace,
            size: size as usize,
            aliases: aliases_attr(obj),
        }))
    }
}

/// Attach a logical type when the base schema can carry it; anything else is
/// left as the plain base type.
fn wrap_logical(base: AvroSchema, logical: &str, obj: &Map<String, Value>) -> AvroSchema {
    let name = match (logical, &base) {
        ("decimal", AvroSchema::Bytes | AvroSchema::Fixed(_)) => {
            let precision = obj.get("precision").and_then(Value::as_u64);
            let scale = obj.get("scale").and_then(Value::as_u64).unwrap_or(0);
            match precision {
                Some(p) if p > 0 && scale <= p => LogicalTypeName::Decimal {
                    precision: p as u32,
                    scale: scale as u32,
                },
                _ => return base,
            }
        }
        ("uuid", AvroSchema::String) => LogicalTypeName::Uuid,
        ("uuid", AvroSchema::Fixed(f)) if f.size == 16 => LogicalTypeName::Uuid,
        ("date", AvroSchema::Int) => LogicalTypeName::Date,
        ("time-millis", AvroSchema::Int) => LogicalTypeName::TimeMillis,
        ("time-micros", AvroSchema::Long) => LogicalTypeName::TimeMicros,
        ("timestamp-millis", AvroSchema::Long) => LogicalTypeName::TimestampMillis,
        ("timestamp-micros", AvroSchema::Long) => LogicalTypeName::TimestampMicros,
        ("local-timestamp-millis", AvroSchema::Long) => LogicalTypeName::LocalTimestampMillis,
        ("local-timestamp-micros", AvroSchema::Long) => LogicalTypeName::LocalTimestampMicros,
        ("duration", AvroSchema::Fixed(f)) if f.size == 12 => LogicalTypeName::Duration,
        _ => {
            tracing::debug!(
                logical_type = logical,
                base = base.type_name(),
                "Ignoring unsupported logical type"
            );
            return base;
        }
    };
    AvroSchema::Logical(LogicalType::new(base, name))
}

fn string_attr(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

fn aliases_attr(obj: &Map<String, Value>) -> Vec<String> {
    obj.get("aliases")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
