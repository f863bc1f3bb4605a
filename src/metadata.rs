//! Screen metadata codec.
//!
//! Clients submit the six metadata fields of a screen either as JSON-encoded
//! strings (multipart forms) or as structured values (JSON bodies). Both are
//! normalized here into the structured value that gets stored. Malformed
//! input never fails a request: it degrades to the field's empty container.

use serde_json::{Map, Value};

/// One of the six structured metadata fields carried by a screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataField {
    Actions,
    Inputs,
    StaticContent,
    Navigations,
    States,
    Data,
}

impl MetadataField {
    pub const ALL: [MetadataField; 6] = [
        MetadataField::Actions,
        MetadataField::Inputs,
        MetadataField::StaticContent,
        MetadataField::Navigations,
        MetadataField::States,
        MetadataField::Data,
    ];

    /// Wire and column name of the field.
    pub fn name(self) -> &'static str {
        match self {
            MetadataField::Actions => "actions",
            MetadataField::Inputs => "inputs",
            MetadataField::StaticContent => "static_content",
            MetadataField::Navigations => "navigations",
            MetadataField::States => "states",
            MetadataField::Data => "data",
        }
    }

    /// `{}` for the key/value `data` field, `[]` for the list-shaped ones.
    pub fn empty(self) -> Value {
        match self {
            MetadataField::Data => Value::Object(Map::new()),
            _ => Value::Array(Vec::new()),
        }
    }
}

/// Converts a submitted value into its stored form.
///
/// Arrays and objects are kept as they are. Strings are parsed as JSON and
/// kept when they decode to an array or object. Everything else, including
/// unparsable strings, becomes `field.empty()`.
pub fn decode_metadata(field: MetadataField, raw: &Value) -> Value {
    match raw {
        Value::Array(_) | Value::Object(_) => raw.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ (Value::Array(_) | Value::Object(_))) => parsed,
            Ok(_) | Err(_) => field.empty(),
        },
        _ => field.empty(),
    }
}

fn submitted(fields: &Map<String, Value>, field: MetadataField) -> Option<&Value> {
    fields.get(field.name()).filter(|value| !value.is_null())
}

/// Metadata for a new screen: every field resolved, absent ones empty.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenMetadata {
    pub actions: Value,
    pub inputs: Value,
    pub static_content: Value,
    pub navigations: Value,
    pub states: Value,
    pub data: Value,
}

impl ScreenMetadata {
    pub fn from_submission(fields: &Map<String, Value>) -> Self {
        let resolve = |field: MetadataField| {
            submitted(fields, field)
                .map(|raw| decode_metadata(field, raw))
                .unwrap_or_else(|| field.empty())
        };

        Self {
            actions: resolve(MetadataField::Actions),
            inputs: resolve(MetadataField::Inputs),
            static_content: resolve(MetadataField::StaticContent),
            navigations: resolve(MetadataField::Navigations),
            states: resolve(MetadataField::States),
            data: resolve(MetadataField::Data),
        }
    }
}

/// Metadata changes for an existing screen. `None` leaves the stored value alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataPatch {
    pub actions: Option<Value>,
    pub inputs: Option<Value>,
    pub static_content: Option<Value>,
    pub navigations: Option<Value>,
    pub states: Option<Value>,
    pub data: Option<Value>,
}

impl MetadataPatch {
    pub fn from_submission(fields: &Map<String, Value>) -> Self {
        let resolve =
            |field: MetadataField| submitted(fields, field).map(|raw| decode_metadata(field, raw));

        Self {
            actions: resolve(MetadataField::Actions),
            inputs: resolve(MetadataField::Inputs),
            static_content: resolve(MetadataField::StaticContent),
            navigations: resolve(MetadataField::Navigations),
            states: resolve(MetadataField::States),
            data: resolve(MetadataField::Data),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == MetadataPatch::default()
    }
}
