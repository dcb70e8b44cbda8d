pub mod config;
pub mod host;
pub mod patch;
pub mod serialize;
pub mod util;

pub use config::{Config, ConfigError};
pub use host::{HostError, HostObject, ObjectKind, ObjectRef, Value};
pub use patch::{patch, PatchRecord, PatchSet};
pub use serialize::{
    serialize, serialize_with, HostClassifier, SafeSerializer, SerializationOptions,
    ValueClassifier, ValueKind,
};
