//! Generic recursive stringify with a per-value replacer hook.
//!
//! Mirrors the host's standard structured-text stringifier: the replacer sees
//! every `(holder, key, value)` triple, starting with the root under an empty
//! key, and the walk recurses into whatever the replacer returns.

use serde_json::{Map, Number, Value as Json};

use crate::host::{HostObject, ObjectRef, Value};

/// Substituted for a property whose getter failed.
pub const UNREADABLE: &str = "[Unreadable]";

/// Substituted once the walk reaches [`MAX_NESTING`].
pub const NESTED_TOO_DEEP: &str = "[Nested too deep]";

pub const MAX_NESTING: usize = 256;

/// Per-value transform invoked before a value is written.
pub trait Replacer {
    fn replace(&mut self, holder: &ObjectRef, key: &str, value: Value) -> Value;
}

impl<F> Replacer for F
where
    F: FnMut(&ObjectRef, &str, Value) -> Value,
{
    fn replace(&mut self, holder: &ObjectRef, key: &str, value: Value) -> Value {
        self(holder, key, value)
    }
}

/// Stringify `value`, returning `None` when the root itself is not representable
/// (`undefined` or a function).
pub fn stringify_with<R: Replacer>(value: Value, replacer: &mut R) -> Option<String> {
    let json = to_json_with(value, replacer)?;
    match serde_json::to_string(&json) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to encode walked value");
            None
        }
    }
}

/// Walk `value` into a JSON tree without encoding it.
pub fn to_json_with<R: Replacer>(value: Value, replacer: &mut R) -> Option<Json> {
    let wrapper = HostObject::builder("Object", crate::host::ObjectKind::Plain)
        .property("", value.clone())
        .build();
    let mut walker = Walker { replacer, depth: 0 };
    walker.property(&wrapper, "", value)
}

struct Walker<'r, R> {
    replacer: &'r mut R,
    depth: usize,
}

impl<R: Replacer> Walker<'_, R> {
    fn property(&mut self, holder: &ObjectRef, key: &str, value: Value) -> Option<Json> {
        let value = self.replacer.replace(holder, key, value);
        match value {
            Value::Undefined => None,
            Value::Null => Some(Json::Null),
            Value::Bool(b) => Some(Json::Bool(b)),
            Value::Number(n) => Some(number(n)),
            Value::String(s) => Some(Json::String(s)),
            Value::Object(object) => {
                if object.function_data().is_some() {
                    return None;
                }
                if self.depth >= MAX_NESTING {
                    return Some(Json::String(NESTED_TOO_DEEP.to_string()));
                }
                self.depth += 1;
                let json = if object.is_array() {
                    self.array(&object)
                } else {
                    self.object(&object)
                };
                self.depth -= 1;
                Some(json)
            }
        }
    }

    fn array(&mut self, array: &ObjectRef) -> Json {
        let mut items = Vec::with_capacity(array.own_len());
        for (key, property) in array.own_entries() {
            let value = read(&key, property.resolve());
            items.push(self.property(array, &key, value).unwrap_or(Json::Null));
        }
        Json::Array(items)
    }

    fn object(&mut self, object: &ObjectRef) -> Json {
        let mut map = Map::new();
        for (key, property) in object.own_entries() {
            let value = read(&key, property.resolve());
            if let Some(json) = self.property(object, &key, value) {
                map.insert(key, json);
            }
        }
        Json::Object(map)
    }
}

fn read(key: &str, result: Result<Value, crate::host::HostError>) -> Value {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(key, error = %e, "Property read failed during serialization");
            Value::String(UNREADABLE.to_string())
        }
    }
}

/// Non-finite numbers become `null`; integral values print without a fraction.
fn number(n: f64) -> Json {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    if !n.is_finite() {
        return Json::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Json::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Json::Null, Json::Number)
}
