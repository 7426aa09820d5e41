//! UI ↔ backend field-name mapping.
//!
//! Every entity declares a static table of [`FieldSpec`]s pairing its UI
//! field name (camelCase, as serialized by the record structs) with the
//! backend field name, plus the value kind used to coerce values in both
//! directions.
//!
//! ```text
//!   record struct ──serde──▶ UI map ──to_backend──▶ backend map ──▶ record API
//!   record struct ◀──serde── UI map ◀──to_ui────── backend map ◀── record API
//! ```

use serde::Serialize;
use serde_json::{Map, Number, Value};

/// How values of a field are represented and coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text.
    Text,
    /// Whole number; strings are parsed, unparsable values become null.
    Integer,
    /// Decimal number; strings are parsed, unparsable values become 0.
    Float,
    /// Date or timestamp, kept as text and parsed on demand.
    Date,
    /// Foreign key: backend id or `{Id, Name}` ↔ UI `{id, name}`.
    Lookup,
    /// UI list of tags ↔ backend comma-separated text.
    Tags,
}

/// Value written on create when the caller left a field empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// Text default.
    Text(&'static str),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
}

impl FieldDefault {
    fn to_value(self) -> Value {
        match self {
            FieldDefault::Text(s) => Value::String(s.to_string()),
            FieldDefault::Integer(i) => Value::from(i),
            FieldDefault::Float(f) => float_value(f),
        }
    }
}

/// One row of an entity's field-mapping table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Field name on the UI side.
    pub ui: &'static str,
    /// Field name on the backend side.
    pub backend: &'static str,
    /// Value kind.
    pub kind: FieldKind,
    /// Whether the backend accepts writes to this field.
    pub writable: bool,
    /// Create-time default for empty values.
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    const fn new(ui: &'static str, backend: &'static str, kind: FieldKind) -> Self {
        Self {
            ui,
            backend,
            kind,
            writable: true,
            default: None,
        }
    }

    /// A writable text field.
    pub const fn text(ui: &'static str, backend: &'static str) -> Self {
        Self::new(ui, backend, FieldKind::Text)
    }

    /// A writable integer field.
    pub const fn integer(ui: &'static str, backend: &'static str) -> Self {
        Self::new(ui, backend, FieldKind::Integer)
    }

    /// A writable float field.
    pub const fn float(ui: &'static str, backend: &'static str) -> Self {
        Self::new(ui, backend, FieldKind::Float)
    }

    /// A writable date field.
    pub const fn date(ui: &'static str, backend: &'static str) -> Self {
        Self::new(ui, backend, FieldKind::Date)
    }

    /// A writable lookup field.
    pub const fn lookup(ui: &'static str, backend: &'static str) -> Self {
        Self::new(ui, backend, FieldKind::Lookup)
    }

    /// A writable tags field.
    pub const fn tags(ui: &'static str, backend: &'static str) -> Self {
        Self::new(ui, backend, FieldKind::Tags)
    }

    /// Marks the field as never written.
    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Attaches a create-time default.
    pub const fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// The fields every entity carries: identity and audit timestamps.
pub const fn system_fields() -> [FieldSpec; 3] {
    [
        FieldSpec::integer("id", "Id").read_only(),
        FieldSpec::date("createdAt", "CreatedOn").read_only(),
        FieldSpec::date("updatedAt", "ModifiedOn").read_only(),
    ]
}

/// Which fields [`to_backend`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSelection {
    /// Writable fields; empty values fall back to create defaults.
    Create,
    /// Writable fields explicitly present in the input (null clears).
    Update,
    /// Every mapped field, read-only ones included.
    All,
}

/// Backend names of every mapped field, for `fields` projections.
pub fn backend_names(fields: &[FieldSpec]) -> Vec<&'static str> {
    fields.iter().map(|f| f.backend).collect()
}

/// Looks up the spec for a UI field name.
pub fn spec_for_ui<'a>(fields: &'a [FieldSpec], ui: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|f| f.ui == ui)
}

/// Converts a UI-shaped map into a backend-shaped map.
///
/// Keys without a mapping are dropped; read-only fields are dropped unless
/// `selection` is [`FieldSelection::All`].
pub fn to_backend(
    fields: &[FieldSpec],
    ui: &Map<String, Value>,
    selection: FieldSelection,
) -> Map<String, Value> {
    let mut out = Map::new();
    for spec in fields {
        if !spec.writable && selection != FieldSelection::All {
            continue;
        }
        let value = ui.get(spec.ui);
        match selection {
            FieldSelection::Update => {
                if let Some(value) = value {
                    out.insert(spec.backend.to_string(), coerce_to_backend(spec.kind, value));
                }
            }
            FieldSelection::Create => {
                let coerced = value
                    .filter(|v| !is_empty_value(v))
                    .map(|v| coerce_to_backend(spec.kind, v));
                match (coerced, spec.default) {
                    (Some(v), _) if !v.is_null() => {
                        out.insert(spec.backend.to_string(), v);
                    }
                    (_, Some(default)) => {
                        out.insert(spec.backend.to_string(), default.to_value());
                    }
                    (Some(v), None) => {
                        out.insert(spec.backend.to_string(), v);
                    }
                    (None, None) => {}
                }
            }
            FieldSelection::All => {
                if let Some(value) = value.filter(|v| !v.is_null()) {
                    out.insert(spec.backend.to_string(), coerce_to_backend(spec.kind, value));
                }
            }
        }
    }
    out
}

/// Converts a backend-shaped map into a UI-shaped map.
///
/// Null and unparsable values are omitted so record structs fall back to
/// their defaults.
pub fn to_ui(fields: &[FieldSpec], backend: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for spec in fields {
        let Some(value) = backend.get(spec.backend) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        if let Some(converted) = coerce_to_ui(spec.kind, value) {
            out.insert(spec.ui.to_string(), converted);
        }
    }
    out
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn lookup_id(value: &Value) -> Option<i64> {
    match value {
        Value::Object(obj) => obj.get("id").or_else(|| obj.get("Id")).and_then(parse_integer),
        other => parse_integer(other),
    }
}

fn coerce_to_backend(kind: FieldKind, value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    match kind {
        FieldKind::Text | FieldKind::Date => match value {
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            other => other.clone(),
        },
        FieldKind::Integer => parse_integer(value).map(Value::from).unwrap_or(Value::Null),
        FieldKind::Float => float_value(parse_float(value).unwrap_or(0.0)),
        FieldKind::Lookup => lookup_id(value).map(Value::from).unwrap_or(Value::Null),
        FieldKind::Tags => match value {
            Value::Array(items) => Value::String(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => other.clone(),
        },
    }
}

fn coerce_to_ui(kind: FieldKind, value: &Value) -> Option<Value> {
    match kind {
        FieldKind::Text | FieldKind::Date => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        FieldKind::Integer => parse_integer(value).map(Value::from),
        FieldKind::Float => parse_float(value).map(float_value),
        FieldKind::Lookup => {
            let id = lookup_id(value)?;
            let mut obj = Map::new();
            obj.insert("id".to_string(), Value::from(id));
            if let Some(name) = value
                .as_object()
                .and_then(|o| o.get("name").or_else(|| o.get("Name")))
                .and_then(Value::as_str)
            {
                obj.insert("name".to_string(), Value::String(name.to_string()));
            }
            Some(Value::Object(obj))
        }
        FieldKind::Tags => match value {
            Value::String(s) => Some(Value::Array(
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| Value::String(t.to_string()))
                    .collect(),
            )),
            Value::Array(_) => Some(value.clone()),
            _ => None,
        },
    }
}

// ============================================================================
// Changes
// ============================================================================

/// A partial set of UI-named field values for an update.
///
/// Only the fields set here are sent to the backend; setting a field to
/// null clears it.
///
/// # Examples
///
/// ```
/// use pipelinehub_core::Changes;
///
/// let changes = Changes::new().set("stage", "Won").set("probability", 100);
/// assert_eq!(changes.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes(Map<String, Value>);

impl Changes {
    /// An empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Clears a field on the backend.
    pub fn clear(mut self, field: impl Into<String>) -> Self {
        self.0.insert(field.into(), Value::Null);
        self
    }

    /// Every serialized field of `record`, for a full-record update.
    pub fn from_record<T: Serialize>(record: &T) -> crate::Result<Self> {
        match serde_json::to_value(record)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(crate::Error::validation("record did not serialize to an object")),
        }
    }

    /// The value set for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Number of fields set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying UI-named map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

// ============================================================================
// Tests
// ============================================================================
