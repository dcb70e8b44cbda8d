//! Safe serializer: arbitrary, possibly cyclic host values to bounded structured text.
//!
//! The walk is a standard stringify ([`walk`]) driven by a single transform that
//! tracks the visit path ([`context`]), breaks cycles, and summarizes values that
//! are too wide, too deep, or environment-specific ([`classify`]).

pub mod classify;
pub mod context;
mod options;
mod safe;
pub mod selector;
pub mod walk;

pub use classify::{HostClassifier, ValueClassifier, ValueKind};
pub use context::{VisitFrame, CIRCULAR_ROOT};
pub use options::{SerializationOptions, DEFAULT_DEPTH_LIMIT, DEFAULT_KEY_LIMIT};
pub use safe::{serialize, serialize_with, SafeSerializer};
pub use selector::path_to_selector;
