//! Model of the instrumented program's live object graph.
//!
//! Values are reference-counted and may form cycles through interior
//! mutability. Everything that runs "host code" (getters, string conversion,
//! native functions, wrapper factories) goes through [`guarded`], so a
//! failing or panicking callback surfaces as a [`HostError`] instead of
//! unwinding into the instrumentation.

mod error;
mod json;
mod node;
mod value;

use std::panic::{self, AssertUnwindSafe};

pub use error::HostError;
pub use node::{append_child, NodeData};
pub use value::{
    ErrorData, FunctionData, Getter, HostObject, NativeFn, ObjectBuilder, ObjectKind, ObjectRef,
    Property, ToStringHook, Value,
};

/// Run a host callback, converting a panic into [`HostError::Panicked`].
pub fn guarded<T>(f: impl FnOnce() -> Result<T, HostError>) -> Result<T, HostError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(_) => Err(HostError::Panicked),
    }
}
