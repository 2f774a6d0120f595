//! JSON record schemas and argument decoding
//!
//! Element types are written the way they are displayed (`Int`, `IntArray`,
//! `Array<String>`), with `enum:Name` and `record:Kind` for enum and nested
//! record fields. Arguments are decoded against the declared element type of
//! their field, so `5` becomes a `Long` for a `Long` field and an `Int`
//! otherwise. `{"class": "Name"}` is a class-literal placeholder.

use anyhow::{Context, Result, anyhow, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};
use std::sync::Arc;
use wr_record::{
    ArrayValue, ElementType, FieldDescriptor, FieldSchema, Origin, RecordConstructor,
    RecordInstance, Value,
};

/// JSON key marking a class-literal placeholder
pub const CLASS_KEY: &str = "class";
/// JSON key marking an enum entry
pub const ENUM_KEY: &str = "enum";

/// Where a record type was declared, as written in JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginInput {
    /// Host-platform record
    Native,
    /// Record declared in the language
    #[default]
    Managed,
}

impl From<OriginInput> for Origin {
    fn from(origin: OriginInput) -> Self {
        match origin {
            OriginInput::Native => Self::Native,
            OriginInput::Managed => Self::Managed,
        }
    }
}

/// A record type description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInput {
    /// Record kind name
    pub kind: String,
    /// Declaration origin
    #[serde(default)]
    pub origin: OriginInput,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<FieldInput>,
}

/// One field of a [`SchemaInput`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInput {
    /// Field name
    pub name: String,
    /// Element type, e.g. `Int` or `Array<String>`
    #[serde(rename = "type")]
    pub ty: String,
    /// Declared default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Json>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SchemaFile {
    Many(Vec<SchemaInput>),
    One(SchemaInput),
}

/// Parse an element type name
///
/// # Errors
///
/// Returns an error for names that are not element types.
pub fn parse_element_type(text: &str) -> Result<ElementType> {
    let text = text.trim();
    if let Some(inner) = text.strip_prefix("Array<").and_then(|rest| rest.strip_suffix('>')) {
        return Ok(ElementType::array_of(parse_element_type(inner)?));
    }
    if let Some(name) = text.strip_prefix("enum:") {
        return Ok(ElementType::Enum(name.trim().to_owned()));
    }
    if let Some(kind) = text.strip_prefix("record:") {
        return Ok(ElementType::Record(kind.trim().to_owned()));
    }

    let ty = match text {
        "Boolean" => ElementType::Boolean,
        "Char" => ElementType::Char,
        "Byte" => ElementType::Byte,
        "Short" => ElementType::Short,
        "Int" => ElementType::Int,
        "Long" => ElementType::Long,
        "Float" => ElementType::Float,
        "Double" => ElementType::Double,
        "String" => ElementType::String,
        "Class" => ElementType::Class,
        "Any" => ElementType::Any,
        other => match other.strip_suffix("Array").map(parse_element_type) {
            Some(Ok(element)) if element.is_primitive() => ElementType::array_of(element),
            _ => bail!("unknown element type `{text}`"),
        },
    };
    Ok(ty)
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    schema: Arc<FieldSchema>,
    origin: Origin,
}

/// Record schemas by kind, usable for nested record arguments
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl SchemaCatalog {
    /// Parse one schema or an array of schemas
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON or invalid schemas.
    pub fn from_json(text: &str) -> Result<Self> {
        let inputs = match serde_json::from_str(text).context("invalid schema description")? {
            SchemaFile::Many(inputs) => inputs,
            SchemaFile::One(input) => vec![input],
        };
        Self::from_inputs(&inputs)
    }

    /// Build schemas from their descriptions
    ///
    /// # Errors
    ///
    /// Returns an error for unknown element types, duplicate kinds or
    /// defaults that cannot be decoded. A nested record default may only
    /// name a kind declared before it.
    pub fn from_inputs(inputs: &[SchemaInput]) -> Result<Self> {
        let mut catalog = Self::default();
        for input in inputs {
            if catalog.entries.contains_key(&input.kind) {
                bail!("record `{}` is declared twice", input.kind);
            }
            let entry = CatalogEntry {
                schema: Arc::new(catalog.schema(input)?),
                origin: input.origin.into(),
            };
            catalog.entries.insert(input.kind.clone(), entry);
        }
        Ok(catalog)
    }

    fn schema(&self, input: &SchemaInput) -> Result<FieldSchema> {
        let mut fields = Vec::with_capacity(input.fields.len());
        for field in &input.fields {
            let element_type = parse_element_type(&field.ty)
                .with_context(|| format!("field `{}.{}`", input.kind, field.name))?;
            let default = match &field.default {
                Some(json) => Decoder::new(self, false)
                    .decode(json, &element_type)
                    .with_context(|| format!("default of `{}.{}`", input.kind, field.name))?,
                None => None,
            };

            let descriptor = FieldDescriptor::new(field.name.clone(), element_type);
            fields.push(match default {
                Some(default) => descriptor.with_default(default),
                None => descriptor,
            });
        }
        Ok(FieldSchema::new(input.kind.clone(), fields))
    }

    /// Schema of `kind`
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&Arc<FieldSchema>> {
        self.entries.get(kind).map(|entry| &entry.schema)
    }

    /// Declaration origin of `kind`
    #[must_use]
    pub fn origin(&self, kind: &str) -> Option<Origin> {
        self.entries.get(kind).map(|entry| entry.origin)
    }

    /// Record kinds in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of schemas
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construct a `kind` record from JSON named arguments
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown kind, undecodable arguments, or any
    /// `RecordError` raised by construction (reachable through
    /// `anyhow::Error::downcast_ref`).
    pub fn construct(
        &self,
        kind: &str,
        arguments: &Map<String, Json>,
        allow_defaults: bool,
    ) -> Result<Arc<RecordInstance>> {
        Decoder::new(self, allow_defaults).record(kind, arguments)
    }
}

/// Decodes JSON values against declared element types
struct Decoder<'a> {
    catalog: &'a SchemaCatalog,
    allow_defaults: bool,
}

impl<'a> Decoder<'a> {
    fn new(catalog: &'a SchemaCatalog, allow_defaults: bool) -> Self {
        Self {
            catalog,
            allow_defaults,
        }
    }

    fn record(&self, kind: &str, arguments: &Map<String, Json>) -> Result<Arc<RecordInstance>> {
        let entry = self
            .catalog
            .entries
            .get(kind)
            .ok_or_else(|| anyhow!("unknown record `{kind}`"))?;
        // The call convention is rejected before any argument is decoded
        let constructor =
            RecordConstructor::new(Arc::clone(&entry.schema), self.allow_defaults, entry.origin)?;

        let mut named = IndexMap::with_capacity(arguments.len());
        for (name, json) in arguments {
            // Unknown names are left for the constructor to reject
            let expected = entry
                .schema
                .position(name)
                .map_or(&ElementType::Any, |index| {
                    entry.schema.fields()[index].element_type()
                });
            let value = self
                .decode(json, expected)
                .with_context(|| format!("argument `{name}` of `{kind}`"))?;
            named.insert(name.clone(), value);
        }

        tracing::debug!(kind, arguments = named.len(), "constructing record");
        Ok(constructor.call_by(&named)?)
    }

    /// `None` for JSON null
    fn decode(&self, json: &Json, expected: &ElementType) -> Result<Option<Value>> {
        let value = match json {
            Json::Null => return Ok(None),
            Json::Bool(flag) => Value::Bool(*flag),
            Json::Number(number) => decode_number(number, expected),
            Json::String(text) => decode_string(text, expected),
            Json::Array(items) => self.decode_array(items, expected)?,
            Json::Object(map) => self.decode_object(map, expected)?,
        };
        Ok(Some(value))
    }

    fn decode_array(&self, items: &[Json], expected: &ElementType) -> Result<Value> {
        let element = match expected {
            ElementType::Array(element) => element.as_ref().clone(),
            _ => ElementType::Any,
        };

        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let value = self
                .decode(item, &element)
                .with_context(|| format!("array element #{index}"))?
                .ok_or_else(|| anyhow!("array element #{index} is null"))?;
            values.push(value);
        }

        let array = match primitive_array(&element, &values) {
            Some(array) => array,
            // A mismatching element makes the array fail its type check later
            None => ArrayValue::Object {
                element: if element.is_primitive() {
                    ElementType::Any
                } else {
                    element
                },
                items: values,
            },
        };
        Ok(Value::Array(array))
    }

    fn decode_object(&self, map: &Map<String, Json>, expected: &ElementType) -> Result<Value> {
        // A nested record may itself have `class` or `enum` fields
        if let ElementType::Record(kind) = expected {
            return Ok(Value::Record(self.record(kind, map)?));
        }

        if let Some(Json::String(name)) = map.get(CLASS_KEY) {
            return Ok(Value::TypeRef(name.clone()));
        }

        if let Some(Json::String(entry)) = map.get(ENUM_KEY) {
            let ty = match (map.get("type"), expected) {
                (Some(Json::String(ty)), _) | (None, ElementType::Enum(ty)) => ty.clone(),
                _ => bail!("enum entry `{entry}` needs a `type`"),
            };
            return Ok(Value::Enum {
                ty,
                entry: entry.clone(),
            });
        }

        bail!("cannot decode an object as {expected}")
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "Range is checked before narrowing to f32"
)]
fn decode_number(number: &Number, expected: &ElementType) -> Value {
    let declared = match expected {
        ElementType::Byte => number
            .as_i64()
            .and_then(|int| i8::try_from(int).ok())
            .map(Value::Byte),
        ElementType::Short => number
            .as_i64()
            .and_then(|int| i16::try_from(int).ok())
            .map(Value::Short),
        ElementType::Int => number
            .as_i64()
            .and_then(|int| i32::try_from(int).ok())
            .map(Value::Int),
        ElementType::Long => number.as_i64().map(Value::Long),
        ElementType::Float => number
            .as_f64()
            .filter(|float| float.abs() <= f64::from(f32::MAX))
            .map(|float| Value::Float(float as f32)),
        ElementType::Double => number.as_f64().map(Value::Double),
        _ => None,
    };
    declared.unwrap_or_else(|| natural_number(number))
}

fn natural_number(number: &Number) -> Value {
    match number.as_i64() {
        Some(int) => i32::try_from(int).map_or(Value::Long(int), Value::Int),
        None => Value::Double(number.as_f64().unwrap_or(f64::NAN)),
    }
}

fn decode_string(text: &str, expected: &ElementType) -> Value {
    let mut chars = text.chars();
    match (expected, chars.next(), chars.next()) {
        (ElementType::Char, Some(single), None) => Value::Char(single),
        (ElementType::Enum(ty), _, _) => Value::Enum {
            ty: ty.clone(),
            entry: text.to_owned(),
        },
        _ => Value::String(text.to_owned()),
    }
}

/// Unboxed array when every value has the primitive element kind
fn primitive_array(element: &ElementType, values: &[Value]) -> Option<ArrayValue> {
    macro_rules! collect {
        ($variant:ident) => {
            values
                .iter()
                .map(|value| match value {
                    Value::$variant(item) => Some(*item),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(ArrayValue::$variant)
        };
    }

    match element {
        ElementType::Boolean => collect!(Bool),
        ElementType::Char => collect!(Char),
        ElementType::Byte => collect!(Byte),
        ElementType::Short => collect!(Short),
        ElementType::Int => collect!(Int),
        ElementType::Long => collect!(Long),
        ElementType::Float => collect!(Float),
        ElementType::Double => collect!(Double),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wr_record::RecordError;

    const SCHEMAS: &str = r#"[
        { "kind": "Point",
          "fields": [ { "name": "x", "type": "Int" }, { "name": "y", "type": "String" } ] },
        { "kind": "Shape",
          "fields": [
            { "name": "origin", "type": "record:Point" },
            { "name": "color", "type": "enum:Color", "default": "RED" },
            { "name": "weights", "type": "DoubleArray", "default": [] },
            { "name": "tags", "type": "Array<String>", "default": [] },
            { "name": "handler", "type": "Class", "default": { "class": "Default" } }
          ] },
        { "kind": "Legacy", "origin": "native",
          "fields": [ { "name": "a", "type": "Int" }, { "name": "b", "type": "Int" } ] }
    ]"#;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::from_json(SCHEMAS).unwrap()
    }

    fn arguments(value: &Json) -> Map<String, Json> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_parse_element_types() {
        assert_eq!(parse_element_type("Int").unwrap(), ElementType::Int);
        assert_eq!(
            parse_element_type("LongArray").unwrap(),
            ElementType::array_of(ElementType::Long)
        );
        assert_eq!(
            parse_element_type("Array<Array<String>>").unwrap(),
            ElementType::array_of(ElementType::array_of(ElementType::String))
        );
        assert_eq!(
            parse_element_type("enum:Color").unwrap(),
            ElementType::Enum("Color".into())
        );
        assert!(parse_element_type("StringArray").is_err());
        assert!(parse_element_type("Array").is_err());
        assert!(parse_element_type("Point").is_err());
    }

    #[test]
    fn test_catalog() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.kinds().collect::<Vec<_>>(), ["Point", "Shape", "Legacy"]);
        assert_eq!(catalog.origin("Legacy"), Some(Origin::Native));
        assert_eq!(catalog.origin("Point"), Some(Origin::Managed));
        assert!(catalog.get("Missing").is_none());

        let duplicate = r#"[ { "kind": "A" }, { "kind": "A" } ]"#;
        assert!(SchemaCatalog::from_json(duplicate).is_err());
    }

    #[test]
    fn test_construct_point() {
        let record = catalog()
            .construct("Point", &arguments(&json!({ "y": "hi", "x": 5 })), false)
            .unwrap();
        assert_eq!(record.to_string(), "@Point(x=5, y=hi)");
    }

    #[test]
    fn test_construct_with_defaults_and_nesting() {
        let record = catalog()
            .construct(
                "Shape",
                &arguments(&json!({
                    "origin": { "x": 1, "y": "o" },
                    "weights": [0.5, 2],
                    "tags": null
                })),
                true,
            )
            .unwrap();

        assert_eq!(
            record.to_string(),
            "@Shape(origin=@Point(x=1, y=o), color=RED, weights=[0.5, 2.0], tags=[], handler=Default::class)"
        );
    }

    #[test]
    fn test_numbers_follow_the_declared_type() {
        assert_eq!(decode_number(&Number::from(5), &ElementType::Long), Value::Long(5));
        assert_eq!(decode_number(&Number::from(5), &ElementType::Any), Value::Int(5));
        assert_eq!(
            decode_number(&Number::from(300), &ElementType::Byte),
            Value::Int(300)
        );
        assert_eq!(
            decode_number(&Number::from(1_i64 << 40), &ElementType::Int),
            Value::Long(1 << 40)
        );
    }

    #[test]
    fn test_construction_errors_are_preserved() {
        let catalog = catalog();

        let error = catalog
            .construct("Point", &arguments(&json!({ "x": "five", "y": "hi" })), false)
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<RecordError>(),
            Some(&RecordError::TypeMismatch {
                index: 0,
                name: "x".to_owned(),
                expected: "Int".to_owned(),
            })
        );

        let error = catalog
            .construct("Legacy", &arguments(&json!({ "a": 1, "b": 2 })), false)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RecordError>(),
            Some(RecordError::ArityOrOrder { .. })
        ));

        assert!(catalog.construct("Nope", &Map::new(), true).is_err());
    }

    #[test]
    fn test_native_call_is_rejected_before_decoding() {
        let catalog = SchemaCatalog::from_json(
            r#"[
                { "kind": "Point",
                  "fields": [ { "name": "x", "type": "Int" }, { "name": "y", "type": "String" } ] },
                { "kind": "Anchored", "origin": "native",
                  "fields": [ { "name": "p", "type": "record:Point" }, { "name": "b", "type": "Int" } ] }
            ]"#,
        )
        .unwrap();

        let error = catalog
            .construct(
                "Anchored",
                &arguments(&json!({ "p": { "x": "bad", "y": "o" }, "b": 1 })),
                false,
            )
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RecordError>(),
            Some(RecordError::ArityOrOrder { kind, .. }) if kind == "Anchored"
        ));

        // With defaults allowed the nested argument is what fails
        let error = catalog
            .construct(
                "Anchored",
                &arguments(&json!({ "p": { "x": "bad", "y": "o" }, "b": 1 })),
                true,
            )
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RecordError>(),
            Some(RecordError::TypeMismatch { index: 0, name, .. }) if name == "x"
        ));
    }

    #[test]
    fn test_out_of_range_float_is_not_narrowed() {
        let huge = Number::from_f64(1e300).unwrap();
        assert_eq!(decode_number(&huge, &ElementType::Float), Value::Double(1e300));

        let small = Number::from_f64(0.5).unwrap();
        assert_eq!(decode_number(&small, &ElementType::Float), Value::Float(0.5));

        let error = catalog_with_float()
            .construct("Gauge", &arguments(&json!({ "level": 1e300 })), false)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RecordError>(),
            Some(RecordError::TypeMismatch { index: 0, .. })
        ));
    }

    fn catalog_with_float() -> SchemaCatalog {
        SchemaCatalog::from_json(
            r#"{ "kind": "Gauge", "fields": [ { "name": "level", "type": "Float" } ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_nested_record_with_class_field() {
        let catalog = SchemaCatalog::from_json(
            r#"[
                { "kind": "Styled", "fields": [ { "name": "class", "type": "String" } ] },
                { "kind": "Holder", "fields": [ { "name": "style", "type": "record:Styled" } ] }
            ]"#,
        )
        .unwrap();

        let record = catalog
            .construct("Holder", &arguments(&json!({ "style": { "class": "wide" } })), false)
            .unwrap();
        assert_eq!(record.to_string(), "@Holder(style=@Styled(class=wide))");
    }

    #[test]
    fn test_mismatching_primitive_array_is_rejected() {
        let error = catalog()
            .construct(
                "Shape",
                &arguments(&json!({ "origin": { "x": 1, "y": "o" }, "weights": ["heavy"] })),
                true,
            )
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RecordError>(),
            Some(RecordError::TypeMismatch { index: 2, .. })
        ));
    }
}
