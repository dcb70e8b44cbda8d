use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::error::HostError;
use super::guarded;
use super::node::NodeData;

/// Shared handle to a host object. Identity is pointer identity.
pub type ObjectRef = Rc<HostObject>;

/// Native implementation behind a function object.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, HostError>>;

/// Accessor invoked when a property is read.
pub type Getter = Rc<dyn Fn() -> Result<Value, HostError>>;

/// Custom string conversion for an object.
pub type ToStringHook = Rc<dyn Fn() -> Result<String, HostError>>;

/// A value in the host graph.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(ObjectRef),
}

impl Value {
    /// Build a plain object from key/value pairs, preserving order.
    pub fn object<K, I>(entries: I) -> Value
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut builder = HostObject::builder("Object", ObjectKind::Plain);
        for (key, value) in entries {
            builder = builder.property(key, value);
        }
        Value::Object(builder.build())
    }

    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> Value {
        Value::Object(HostObject::array(items))
    }

    pub fn function<F>(name: &str, f: F) -> Value
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + 'static,
    {
        Value::Object(HostObject::function(name, f))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.as_object().is_some_and(|o| o.function_data().is_some())
    }

    /// Strict equality: identity for objects, value equality for primitives.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Invoke a function value.
    pub fn call(&self, args: &[Value]) -> Result<Value, HostError> {
        let function = self
            .as_object()
            .and_then(|o| o.function_data())
            .ok_or(HostError::NotCallable)?;
        let native = Rc::clone(&function.call);
        guarded(|| native(args))
    }

    /// The function this value wraps, if it was installed by the patcher.
    pub fn wrapped_original(&self) -> Option<Value> {
        self.as_object()?.function_data()?.original.borrow().clone()
    }

    /// Default string conversion of the value.
    pub fn to_display_string(&self) -> Result<String, HostError> {
        match self {
            Value::Undefined => Ok("undefined".to_string()),
            Value::Null => Ok("null".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(format_number(*n)),
            Value::String(s) => Ok(s.clone()),
            Value::Object(object) => object.to_display_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Object(object) => write!(f, "{object:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// An own property slot.
#[derive(Clone)]
pub enum Property {
    Data(Value),
    Accessor(Getter),
}

impl Property {
    /// Read the property, invoking the getter for accessors.
    pub fn resolve(&self) -> Result<Value, HostError> {
        match self {
            Property::Data(value) => Ok(value.clone()),
            Property::Accessor(getter) => {
                let getter = Rc::clone(getter);
                guarded(|| getter())
            }
        }
    }
}

pub struct FunctionData {
    name: String,
    source: String,
    call: NativeFn,
    original: RefCell<Option<Value>>,
}

impl FunctionData {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tag this function as a wrapper around `original`.
    ///
    /// The tag is write-once: re-marking with the same original is accepted,
    /// a different one is rejected.
    pub fn mark_original(&self, original: Value) -> Result<(), HostError> {
        let mut slot = self.original.borrow_mut();
        if slot.as_ref().is_some_and(|existing| !existing.same(&original)) {
            return Err(HostError::AlreadyWrapped(self.name.clone()));
        }
        *slot = Some(original);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorData {
    pub name: String,
    pub message: String,
}

/// What the host runtime says an object is.
pub enum ObjectKind {
    Plain,
    Array,
    Function(FunctionData),
    /// Something that happened at a point in time (UI interaction and the like).
    Event,
    Node(NodeData),
    Error(ErrorData),
    Other,
}

impl ObjectKind {
    fn label(&self) -> &'static str {
        match self {
            ObjectKind::Plain => "plain",
            ObjectKind::Array => "array",
            ObjectKind::Function(_) => "function",
            ObjectKind::Event => "event",
            ObjectKind::Node(_) => "node",
            ObjectKind::Error(_) => "error",
            ObjectKind::Other => "other",
        }
    }
}

pub struct HostObject {
    class: String,
    kind: ObjectKind,
    properties: RefCell<Vec<(String, Property)>>,
    prototype: Option<ObjectRef>,
    frozen: Cell<bool>,
    to_string: Option<ToStringHook>,
}

impl HostObject {
    pub fn builder(class: impl Into<String>, kind: ObjectKind) -> ObjectBuilder {
        ObjectBuilder {
            class: class.into(),
            kind,
            properties: Vec::new(),
            prototype: None,
            to_string: None,
        }
    }

    pub fn plain() -> ObjectRef {
        Self::builder("Object", ObjectKind::Plain).build()
    }

    pub fn array<I: IntoIterator<Item = Value>>(items: I) -> ObjectRef {
        let properties = items
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), Property::Data(value)))
            .collect();
        let mut builder = Self::builder("Array", ObjectKind::Array);
        builder.properties = properties;
        builder.build()
    }

    pub fn function<F>(name: &str, f: F) -> ObjectRef
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + 'static,
    {
        let data = FunctionData {
            name: name.to_string(),
            source: format!("function {name}() {{ [native code] }}"),
            call: Rc::new(f),
            original: RefCell::new(None),
        };
        Self::builder("Function", ObjectKind::Function(data)).build()
    }

    /// Function object with explicit source text, as returned by its string conversion.
    pub fn function_with_source<F>(name: &str, source: &str, f: F) -> ObjectRef
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + 'static,
    {
        let data = FunctionData {
            name: name.to_string(),
            source: source.to_string(),
            call: Rc::new(f),
            original: RefCell::new(None),
        };
        Self::builder("Function", ObjectKind::Function(data)).build()
    }

    /// Event object whose only own property is `isTrusted`.
    pub fn event(class: &str, is_trusted: bool) -> ObjectBuilder {
        Self::builder(class, ObjectKind::Event).property("isTrusted", Value::Bool(is_trusted))
    }

    pub fn error(name: &str, message: &str) -> ObjectRef {
        let data = ErrorData {
            name: name.to_string(),
            message: message.to_string(),
        };
        Self::builder(name, ObjectKind::Error(data)).build()
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array)
    }

    pub fn function_data(&self) -> Option<&FunctionData> {
        match &self.kind {
            ObjectKind::Function(data) => Some(data),
            _ => None,
        }
    }

    pub fn node(&self) -> Option<&NodeData> {
        match &self.kind {
            ObjectKind::Node(data) => Some(data),
            _ => None,
        }
    }

    pub fn error_data(&self) -> Option<&ErrorData> {
        match &self.kind {
            ObjectKind::Error(data) => Some(data),
            _ => None,
        }
    }

    pub fn prototype(&self) -> Option<&ObjectRef> {
        self.prototype.as_ref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    pub fn own_len(&self) -> usize {
        self.properties.borrow().len()
    }

    pub fn own_keys(&self) -> Vec<String> {
        self.properties
            .borrow()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Snapshot of the own properties, in insertion order.
    pub fn own_entries(&self) -> Vec<(String, Property)> {
        self.properties.borrow().clone()
    }

    pub fn own_property(&self, key: &str) -> Option<Property> {
        self.properties
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, property)| property.clone())
    }

    /// Own then inherited properties, nearest definition first, as a `for..in` sees them.
    pub fn enumerable_entries(&self) -> Vec<(String, Property)> {
        let mut entries = self.own_entries();
        let mut proto = self.prototype.clone();
        while let Some(current) = proto {
            for (key, property) in current.own_entries() {
                if !entries.iter().any(|(seen, _)| *seen == key) {
                    entries.push((key, property));
                }
            }
            proto = current.prototype.clone();
        }
        entries
    }

    fn lookup(&self, key: &str) -> Option<Property> {
        if let Some(property) = self.own_property(key) {
            return Some(property);
        }
        self.prototype.as_ref()?.lookup(key)
    }

    /// Own-or-inherited presence check.
    pub fn has_property(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Read a property through the prototype chain. Missing keys read as `Undefined`.
    pub fn get(&self, key: &str) -> Result<Value, HostError> {
        match self.lookup(key) {
            Some(property) => property.resolve(),
            None => Ok(Value::Undefined),
        }
    }

    /// Assign an own data property.
    pub fn set(&self, key: &str, value: Value) -> Result<(), HostError> {
        if self.is_frozen() {
            return Err(HostError::Frozen(key.to_string()));
        }
        if matches!(self.lookup(key), Some(Property::Accessor(_))) {
            return Err(HostError::ReadOnly(key.to_string()));
        }
        let mut properties = self.properties.borrow_mut();
        match properties.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = Property::Data(value),
            None => properties.push((key.to_string(), Property::Data(value))),
        }
        Ok(())
    }

    pub fn define_getter(&self, key: &str, getter: Getter) -> Result<(), HostError> {
        if self.is_frozen() {
            return Err(HostError::Frozen(key.to_string()));
        }
        let mut properties = self.properties.borrow_mut();
        match properties.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = Property::Accessor(getter),
            None => properties.push((key.to_string(), Property::Accessor(getter))),
        }
        Ok(())
    }

    /// Append an element to an array object.
    pub fn push(&self, value: Value) -> Result<(), HostError> {
        let index = self.own_len().to_string();
        self.set(&index, value)
    }

    /// String conversion: the object's hook if present, else the runtime default.
    pub fn to_display_string(&self) -> Result<String, HostError> {
        if let Some(hook) = &self.to_string {
            let hook = Rc::clone(hook);
            return guarded(|| hook());
        }
        Ok(match &self.kind {
            ObjectKind::Function(data) => data.source.clone(),
            ObjectKind::Error(data) => format!("{}: {}", data.name, data.message),
            _ => format!("[object {}]", self.class),
        })
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: values may point back at this object.
        f.debug_struct("HostObject")
            .field("class", &self.class)
            .field("kind", &self.kind.label())
            .field("keys", &self.own_keys())
            .finish()
    }
}

/// Incremental construction of a [`HostObject`].
pub struct ObjectBuilder {
    class: String,
    kind: ObjectKind,
    properties: Vec<(String, Property)>,
    prototype: Option<ObjectRef>,
    to_string: Option<ToStringHook>,
}

impl ObjectBuilder {
    pub fn property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.push((key.into(), Property::Data(value)));
        self
    }

    pub fn getter<F>(mut self, key: impl Into<String>, getter: F) -> Self
    where
        F: Fn() -> Result<Value, HostError> + 'static,
    {
        self.properties
            .push((key.into(), Property::Accessor(Rc::new(getter))));
        self
    }

    pub fn prototype(mut self, prototype: ObjectRef) -> Self {
        self.prototype = Some(prototype);
        self
    }

    pub fn to_string_with<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> Result<String, HostError> + 'static,
    {
        self.to_string = Some(Rc::new(hook));
        self
    }

    pub fn build(self) -> ObjectRef {
        Rc::new(HostObject {
            class: self.class,
            kind: self.kind,
            properties: RefCell::new(self.properties),
            prototype: self.prototype,
            frozen: Cell::new(false),
            to_string: self.to_string,
        })
    }
}
