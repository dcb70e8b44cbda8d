//! Mapping from host values to the closed set of kinds the serializer acts on.

use crate::host::{ObjectKind, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Plain key/value object, subject to key-count and depth limits.
    Plain,
    Function,
    TimedEvent,
    StructuredNode,
    ErrorLike,
    /// Primitives, arrays and anything else the generic walk handles.
    Other,
}

/// Environment-specific type check. Only this needs adapting to a new host taxonomy.
pub trait ValueClassifier {
    fn classify(&self, value: &Value) -> ValueKind;
}

impl<F> ValueClassifier for F
where
    F: Fn(&Value) -> ValueKind,
{
    fn classify(&self, value: &Value) -> ValueKind {
        self(value)
    }
}

/// Classifier for the built-in [`ObjectKind`] taxonomy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostClassifier;

impl ValueClassifier for HostClassifier {
    fn classify(&self, value: &Value) -> ValueKind {
        let Value::Object(object) = value else {
            return ValueKind::Other;
        };
        match object.kind() {
            ObjectKind::Plain => ValueKind::Plain,
            ObjectKind::Function(_) => ValueKind::Function,
            ObjectKind::Event => ValueKind::TimedEvent,
            ObjectKind::Node(_) => ValueKind::StructuredNode,
            ObjectKind::Error(_) => ValueKind::ErrorLike,
            ObjectKind::Array | ObjectKind::Other => ValueKind::Other,
        }
    }
}
