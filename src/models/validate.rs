//! Request body validation against the feature layout

use serde::Serialize;
use serde_json::{Map, Value};

use super::device::DeviceFeatures;
use super::layout::{feature_index, FeatureKind, FEATURE_COUNT, FEATURE_LAYOUT};

/// One offending field in a request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub problem: String,
}

impl FieldError {
    fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self { field: field.into(), problem: problem.into() }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a fractional number",
        Value::Number(n) if n.as_i64().is_none() => "an integer out of range",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn matches_kind(kind: FeatureKind, value: &Value) -> bool {
    match kind {
        FeatureKind::Int => value.as_i64().is_some(),
        FeatureKind::Float => value.is_number(),
        FeatureKind::Bool => value.is_boolean(),
    }
}

/// Check a JSON object against the layout and build the features.
///
/// Every problem is reported, not just the first one: missing fields,
/// wrong JSON types, unknown keys, and a field given under both its name
/// and its alias.
pub fn parse_features(body: &Map<String, Value>) -> Result<DeviceFeatures, Vec<FieldError>> {
    let mut slots: [Option<(&str, &Value)>; FEATURE_COUNT] = [None; FEATURE_COUNT];
    let mut unknown = Vec::new();
    let mut errors = Vec::new();

    for (key, value) in body {
        match feature_index(key) {
            None => unknown.push(FieldError::new(key.as_str(), "unknown field")),
            Some(i) => match slots[i] {
                Some((first, _)) => errors.push(FieldError::new(
                    FEATURE_LAYOUT[i].name,
                    format!("given more than once (as `{}` and `{}`)", first, key),
                )),
                None => slots[i] = Some((key.as_str(), value)),
            },
        }
    }

    for (spec, slot) in FEATURE_LAYOUT.iter().zip(slots.iter()) {
        match slot {
            None => errors.push(FieldError::new(spec.name, "field required")),
            Some((_, value)) if !matches_kind(spec.kind, value) => errors.push(FieldError::new(
                spec.name,
                format!("expected {}, got {}", spec.kind.describe(), json_type(value)),
            )),
            Some(_) => {}
        }
    }

    errors.extend(unknown);
    if !errors.is_empty() {
        return Err(errors);
    }

    let canonical: Map<String, Value> = FEATURE_LAYOUT
        .iter()
        .zip(slots.iter())
        .filter_map(|(spec, slot)| slot.map(|(_, value)| (spec.name.to_string(), value.clone())))
        .collect();

    serde_json::from_value(Value::Object(canonical))
        .map_err(|e| vec![FieldError::new("body", e.to_string())])
}
