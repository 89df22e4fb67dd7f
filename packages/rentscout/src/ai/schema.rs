//! Strict-mode schema generation for structured outputs.
//!
//! Uses the `schemars` crate to generate JSON schemas from Rust types, then
//! adjusts the output for OpenAI's strict `json_schema` response format,
//! which requires:
//!
//! 1. `additionalProperties: false` on every object schema
//! 2. ALL properties listed in `required`
//! 3. no `$schema` or `definitions` sections

use schemars::{schema_for, JsonSchema};
use serde_json::Value;

/// Generate a strict-mode-compatible schema for `T`.
pub fn openai_schema<T: JsonSchema>() -> Value {
    let schema = schema_for!(T);
    let mut value = serde_json::to_value(schema).unwrap_or_default();

    fix_object_schemas(&mut value);

    if let Value::Object(map) = &mut value {
        map.remove("$schema");
        map.remove("definitions");
    }

    value
}

/// Add `additionalProperties: false` and a full `required` list to every
/// object schema, recursively.
fn fix_object_schemas(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type") == Some(&Value::String("object".to_string())) {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                if let Some(Value::Object(props)) = map.get("properties") {
                    let all_keys: Vec<Value> =
                        props.keys().map(|k| Value::String(k.clone())).collect();
                    map.insert("required".to_string(), Value::Array(all_keys));
                }
            }

            for (_, v) in map.iter_mut() {
                fix_object_schemas(v);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                fix_object_schemas(item);
            }
        }
        _ => {}
    }
}
