//! Failures raised by host callbacks and host object mutation.

/// Error type for operations on the host object graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// A host callback threw (getter, string conversion, wrapper factory, native function).
    #[error("{name}: {message}")]
    Thrown { name: String, message: String },

    /// Assignment to an accessor property that has no setter.
    #[error("Cannot assign to read only property '{0}'")]
    ReadOnly(String),

    /// Assignment to a frozen object.
    #[error("Cannot assign to property '{0}' of a frozen object")]
    Frozen(String),

    /// Attempted to call a value that is not a function.
    #[error("value is not a function")]
    NotCallable,

    /// A tree operation was given a value that is not a node.
    #[error("value is not a node")]
    NotANode,

    /// A wrapper function is already tagged with a different original.
    #[error("function '{0}' already wraps another original")]
    AlreadyWrapped(String),

    /// A host callback panicked; the panic was contained.
    #[error("host callback panicked")]
    Panicked,
}

impl HostError {
    pub fn thrown(name: impl Into<String>, message: impl Into<String>) -> Self {
        HostError::Thrown {
            name: name.into(),
            message: message.into(),
        }
    }
}
