use std::rc::Rc;

use serde_json::Value as Json;

use crate::host::{self, HostObject, ObjectKind, ObjectRef, Value};

use super::classify::{HostClassifier, ValueClassifier, ValueKind};
use super::context::VisitFrame;
use super::options::SerializationOptions;
use super::selector::path_to_selector;
use super::walk::{self, UNREADABLE};

const ELLIPSIS: &str = "...";

/// Turns arbitrary host values into bounded structured text without failing.
///
/// Each call owns its own [`VisitFrame`], so a serializer can be shared and
/// re-entered from inside a value's string conversion.
#[derive(Debug, Clone, Default)]
pub struct SafeSerializer<C = HostClassifier> {
    options: SerializationOptions,
    classifier: C,
}

impl SafeSerializer<HostClassifier> {
    pub fn new(options: SerializationOptions) -> Self {
        Self {
            options,
            classifier: HostClassifier,
        }
    }
}

impl<C: ValueClassifier> SafeSerializer<C> {
    pub fn with_classifier(options: SerializationOptions, classifier: C) -> Self {
        Self {
            options,
            classifier,
        }
    }

    pub fn options(&self) -> &SerializationOptions {
        &self.options
    }

    /// Serialize `value`. Unrepresentable roots and contained panics yield `""`.
    pub fn serialize(&self, value: &Value) -> String {
        let mut frame = VisitFrame::new();
        let outcome = host::guarded(|| {
            let mut transform = |holder: &ObjectRef, key: &str, v: Value| {
                self.transform(&mut frame, holder, key, v)
            };
            Ok(walk::stringify_with(value.clone(), &mut transform))
        });
        match outcome {
            Ok(Some(text)) => text,
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Serialization aborted, emitting empty payload");
                String::new()
            }
        }
    }

    /// Same walk as [`serialize`](Self::serialize), stopping at the JSON tree.
    pub fn to_json(&self, value: &Value) -> Option<Json> {
        let mut frame = VisitFrame::new();
        let outcome = host::guarded(|| {
            let mut transform = |holder: &ObjectRef, key: &str, v: Value| {
                self.transform(&mut frame, holder, key, v)
            };
            Ok(walk::to_json_with(value.clone(), &mut transform))
        });
        outcome.ok().flatten()
    }

    fn transform(
        &self,
        frame: &mut VisitFrame,
        holder: &ObjectRef,
        key: &str,
        value: Value,
    ) -> Value {
        if let Some(marker) = frame.enter(holder, key, &value) {
            return Value::String(marker);
        }
        let object = match &value {
            Value::Object(object) => Rc::clone(object),
            _ => return value,
        };

        let kind = self.classifier.classify(&value);
        if self.should_summarize(&object, kind) {
            return Value::String(self.fallback_string(&value));
        }
        match kind {
            ValueKind::TimedEvent => Value::Object(flatten_event(&object)),
            ValueKind::StructuredNode => Value::String(describe_node(&object)),
            ValueKind::ErrorLike => Value::String(describe_error(&object)),
            ValueKind::Plain | ValueKind::Function | ValueKind::Other => value,
        }
    }

    fn should_summarize(&self, object: &ObjectRef, kind: ValueKind) -> bool {
        match kind {
            ValueKind::Plain => {
                object.own_len() > self.options.key_limit
                    || self.too_deep(
                        object,
                        self.options.depth_limit.min(walk::MAX_NESTING),
                        &mut Vec::new(),
                    )
            }
            ValueKind::Function => true,
            // Frameworks emit these continuously; they carry nothing but `isTrusted`.
            ValueKind::TimedEvent => is_untrusted(object) && object.own_len() == 1,
            _ => false,
        }
    }

    /// Whether plain objects nest `limit` levels below `object`.
    ///
    /// Objects already on `path` are skipped: the walk emits a cycle marker for
    /// them, so they add no depth.
    fn too_deep(&self, object: &ObjectRef, limit: usize, path: &mut Vec<ObjectRef>) -> bool {
        if limit == 0 {
            return true;
        }
        path.push(Rc::clone(object));
        let deep = object.own_entries().into_iter().any(|(_, property)| {
            let Ok(child) = property.resolve() else {
                return false;
            };
            match &child {
                Value::Object(nested)
                    if self.classifier.classify(&child) == ValueKind::Plain
                        && !path.iter().any(|seen| Rc::ptr_eq(seen, nested)) =>
                {
                    self.too_deep(nested, limit - 1, path)
                }
                _ => false,
            }
        });
        path.pop();
        deep
    }

    fn fallback_string(&self, value: &Value) -> String {
        let text = match value.to_display_string() {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(error = %e, "String conversion failed during serialization");
                String::new()
            }
        };
        truncate(text, self.options.string_limit())
    }
}

fn truncate(text: String, limit: Option<usize>) -> String {
    match limit {
        Some(limit) if text.chars().count() > limit => {
            let mut cut: String = text.chars().take(limit).collect();
            cut.push_str(ELLIPSIS);
            cut
        }
        _ => text,
    }
}

fn is_untrusted(event: &HostObject) -> bool {
    matches!(event.get("isTrusted"), Ok(Value::Bool(false)))
}

/// Re-emit an event as a plain object, collapsing target-path arrays to a selector.
///
/// Inherited keys are included; hosts usually define `type` and `target` on the prototype.
fn flatten_event(event: &HostObject) -> ObjectRef {
    let mut builder = HostObject::builder("Object", ObjectKind::Plain);
    for (key, property) in event.enumerable_entries() {
        let value = property.resolve().unwrap_or_else(|e| {
            tracing::debug!(key = %key, error = %e, "Event property read failed");
            Value::String(UNREADABLE.to_string())
        });
        let selector = match &value {
            Value::Object(list) if list.is_array() => {
                let first = list.own_property("0").and_then(|p| p.resolve().ok());
                Some(path_to_selector(first.as_ref()))
            }
            _ => None,
        };
        builder = builder.property(key, selector.map_or(value, Value::String));
    }
    builder.build()
}

fn describe_node(object: &HostObject) -> String {
    match object.node() {
        Some(node) if node.is_element() => node.outer_html().unwrap_or_default().to_string(),
        Some(node) => node.node_name().to_string(),
        None => object.class_name().to_string(),
    }
}

fn describe_error(object: &HostObject) -> String {
    match object.error_data() {
        Some(error) => format!("{}: {}", error.name, error.message),
        None => format!("{}: {}", read_text(object, "name"), read_text(object, "message")),
    }
}

fn read_text(object: &HostObject, key: &str) -> String {
    object
        .get(key)
        .and_then(|value| value.to_display_string())
        .unwrap_or_default()
}

/// Serialize with default options.
pub fn serialize(value: &Value) -> String {
    SafeSerializer::new(SerializationOptions::default()).serialize(value)
}

pub fn serialize_with(value: &Value, options: &SerializationOptions) -> String {
    SafeSerializer::new(options.clone()).serialize(value)
}
