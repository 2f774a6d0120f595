//! Constructed record instances

#![allow(
    clippy::min_ident_chars,
    reason = "Short identifiers like f are conventional in formatting implementations"
)]

use crate::schema::{FieldSchema, RecordView};
use crate::value::Value;
use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::{Arc, OnceLock};

/// An immutable record with one value per schema field
///
/// Hash and rendering are computed on first use and cached. Concurrent
/// first reads may both compute, but every computation yields the same
/// value and only one is kept.
pub struct RecordInstance {
    schema: Arc<FieldSchema>,
    /// Values in schema order
    values: Box<[Value]>,
    hash: OnceLock<u64>,
    rendered: OnceLock<String>,
}

impl RecordInstance {
    /// Assemble a fully coerced record; `values` must follow schema order
    pub(crate) fn assemble(schema: Arc<FieldSchema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.len(), values.len(), "record must be fully populated");
        Self {
            schema,
            values: values.into_boxed_slice(),
            hash: OnceLock::new(),
            rendered: OnceLock::new(),
        }
    }

    /// Schema the record was built from
    #[must_use]
    pub fn schema(&self) -> &Arc<FieldSchema> {
        &self.schema
    }

    /// Record kind name
    #[must_use]
    pub fn kind(&self) -> &str {
        self.schema.kind()
    }

    /// Value of the field called `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.position(name).map(|index| &self.values[index])
    }

    /// Value of the field at `index` in schema order
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// `(name, value)` pairs in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name())
            .zip(self.values.iter())
    }

    /// Compare against any container of the declared interface
    ///
    /// Equal when the kinds match, the other container exposes exactly as
    /// many fields as the schema, and every schema field read through it
    /// equals ours.
    #[must_use]
    pub fn equals(&self, other: &dyn RecordView) -> bool {
        self.kind() == other.record_kind()
            && other.field_count() == self.schema.len()
            && self
                .schema
                .fields()
                .iter()
                .zip(self.values.iter())
                .all(|(field, ours)| field.extract(other).is_some_and(|theirs| ours == theirs))
    }

    /// Sum over fields of `31 * hash(name) ^ hash(value)`, cached
    pub fn hash_code(&self) -> u64 {
        *self.hash.get_or_init(|| {
            self.fields().fold(0_u64, |acc, (name, value)| {
                acc.wrapping_add(31_u64.wrapping_mul(fx_hash(name)) ^ fx_hash(value))
            })
        })
    }

    /// `@Kind(field=value, ...)` in schema order, cached
    pub fn render(&self) -> &str {
        self.rendered.get_or_init(|| {
            let fields: Vec<String> = self
                .fields()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            format!("@{}({})", self.kind(), fields.join(", "))
        })
    }
}

fn fx_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

impl RecordView for RecordInstance {
    fn record_kind(&self) -> &str {
        self.kind()
    }

    fn field_value(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }

    fn field_count(&self) -> usize {
        self.schema.len()
    }
}

impl PartialEq for RecordInstance {
    fn eq(&self, other: &Self) -> bool {
        if ptr::eq(self, other) {
            return true;
        }
        let same_schema =
            Arc::ptr_eq(&self.schema, &other.schema) || *self.schema == *other.schema;
        same_schema && self.values == other.values
    }
}

impl Eq for RecordInstance {}

impl Hash for RecordInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl fmt::Display for RecordInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.render())
    }
}

impl fmt::Debug for RecordInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct(self.kind());
        for (name, value) in self.fields() {
            debug.field(name, value);
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementType;
    use crate::schema::FieldDescriptor;
    use crate::value::ArrayValue;
    use std::collections::HashMap;
    use std::thread;

    fn schema(kind: &str) -> Arc<FieldSchema> {
        Arc::new(FieldSchema::new(
            kind,
            vec![
                FieldDescriptor::new("x", ElementType::Int),
                FieldDescriptor::new("y", ElementType::String),
            ],
        ))
    }

    fn point(kind: &str, x: i32, y: &str) -> RecordInstance {
        RecordInstance::assemble(schema(kind), vec![Value::Int(x), Value::string(y)])
    }

    /// A foreign container implementing the declared interface
    struct Foreign {
        kind: &'static str,
        values: HashMap<&'static str, Value>,
    }

    impl RecordView for Foreign {
        fn record_kind(&self) -> &str {
            self.kind
        }

        fn field_value(&self, name: &str) -> Option<&Value> {
            self.values.get(name)
        }

        fn field_count(&self) -> usize {
            self.values.len()
        }
    }

    #[test]
    fn test_render() {
        assert_eq!(point("Point", 5, "hi").render(), "@Point(x=5, y=hi)");
        let empty = RecordInstance::assemble(Arc::new(FieldSchema::new("Marker", Vec::new())), Vec::new());
        assert_eq!(empty.to_string(), "@Marker()");
    }

    #[test]
    fn test_equal_records_hash_alike() {
        let first = point("Point", 5, "hi");
        let second = point("Point", 5, "hi");
        assert_eq!(first, second);
        assert_eq!(first.hash_code(), second.hash_code());
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn test_single_field_difference() {
        assert_ne!(point("Point", 5, "hi"), point("Point", 6, "hi"));
        assert_ne!(point("Point", 5, "hi"), point("Point", 5, "ho"));
    }

    #[test]
    fn test_kind_is_part_of_identity() {
        assert_ne!(point("Point", 5, "hi"), point("Vector", 5, "hi"));
    }

    #[test]
    fn test_equals_foreign_container() {
        let record = point("Point", 5, "hi");
        let foreign = Foreign {
            kind: "Point",
            values: HashMap::from([("x", Value::Int(5)), ("y", Value::string("hi"))]),
        };
        assert!(record.equals(&foreign));

        let partial = Foreign {
            kind: "Point",
            values: HashMap::from([("x", Value::Int(5))]),
        };
        assert!(!record.equals(&partial));

        let wider = Foreign {
            kind: "Point",
            values: HashMap::from([
                ("x", Value::Int(5)),
                ("y", Value::string("hi")),
                ("z", Value::Int(0)),
            ]),
        };
        assert!(!record.equals(&wider));
    }

    #[test]
    fn test_same_kind_with_different_fields_is_symmetric() {
        let narrow = RecordInstance::assemble(
            Arc::new(FieldSchema::new(
                "Point",
                vec![FieldDescriptor::new("x", ElementType::Int)],
            )),
            vec![Value::Int(5)],
        );
        let wide = point("Point", 5, "hi");

        assert_ne!(narrow, wide);
        assert_ne!(wide, narrow);
        assert!(!narrow.equals(&wide));
        assert!(!wide.equals(&narrow));
    }

    #[test]
    fn test_equal_schemas_from_separate_builds() {
        // Two constructions of the same declaration share no Arc
        let first = point("Point", 5, "hi");
        let second = point("Point", 5, "hi");
        assert!(!Arc::ptr_eq(first.schema(), second.schema()));
        assert_eq!(first, second);
        assert_eq!(first.hash_code(), second.hash_code());
    }

    #[test]
    fn test_nan_and_array_fields() {
        let schema = Arc::new(FieldSchema::new(
            "Range",
            vec![
                FieldDescriptor::new("bound", ElementType::Double),
                FieldDescriptor::new("steps", ElementType::array_of(ElementType::Int)),
            ],
        ));
        let build = || {
            RecordInstance::assemble(
                Arc::clone(&schema),
                vec![
                    Value::Double(f64::NAN),
                    Value::Array(ArrayValue::Int(vec![1, 2, 3])),
                ],
            )
        };
        let first = build();
        let second = build();
        assert_eq!(first, second);
        assert_eq!(first.hash_code(), second.hash_code());
        assert_eq!(first.render(), "@Range(bound=NaN, steps=[1, 2, 3])");
    }

    #[test]
    fn test_concurrent_first_reads_converge() {
        let record = Arc::new(point("Point", 5, "hi"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let record = Arc::clone(&record);
                thread::spawn(move || (record.hash_code(), record.render().to_owned()))
            })
            .collect();

        let results: Vec<(u64, String)> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        assert!(results.iter().all(|result| *result == results[0]));
        assert_eq!(results[0].0, record.hash_code());
    }
}
