//! Reversible, best-effort replacement of named functions on host objects.
//!
//! Patching must never break the host program: a missing target, a failing
//! wrapper factory or a rejected assignment all produce an inert
//! [`PatchRecord`] instead of an error. Two callers patching the same
//! `owner[name]` without coordinating get last-write-wins.

use std::fmt;

use crate::host::{self, HostError, ObjectRef, Value};

/// What is needed to undo one `patch` call.
#[derive(Clone)]
pub struct PatchRecord {
    owner: ObjectRef,
    name: String,
    original: Option<Value>,
}

impl PatchRecord {
    fn inert(owner: &ObjectRef, name: &str) -> Self {
        Self {
            owner: ObjectRef::clone(owner),
            name: name.to_string(),
            original: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value that was bound to `name` before patching, if a patch was installed.
    pub fn original(&self) -> Option<&Value> {
        self.original.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.original.is_some()
    }

    /// Put the original value back. Safe to call any number of times.
    pub fn restore(&self) {
        let Some(original) = &self.original else {
            return;
        };
        if let Err(e) = self.owner.set(&self.name, original.clone()) {
            tracing::debug!(name = %self.name, error = %e, "Failed to restore patched property");
        }
    }
}

impl fmt::Debug for PatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchRecord")
            .field("owner", &self.owner.class_name())
            .field("name", &self.name)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Replace `owner[name]` with `factory(original)`.
///
/// A callable replacement is tagged with a back-reference to the original,
/// readable through [`Value::wrapped_original`].
pub fn patch<F>(owner: &ObjectRef, name: &str, factory: F) -> PatchRecord
where
    F: FnOnce(Value) -> Result<Value, HostError>,
{
    match install(owner, name, factory) {
        Ok(Some(original)) => PatchRecord {
            owner: ObjectRef::clone(owner),
            name: name.to_string(),
            original: Some(original),
        },
        Ok(None) => {
            tracing::debug!(name, "Patch target missing, leaving owner untouched");
            PatchRecord::inert(owner, name)
        }
        Err(e) => {
            tracing::debug!(name, error = %e, "Patch install failed, leaving owner untouched");
            PatchRecord::inert(owner, name)
        }
    }
}

fn install<F>(owner: &ObjectRef, name: &str, factory: F) -> Result<Option<Value>, HostError>
where
    F: FnOnce(Value) -> Result<Value, HostError>,
{
    if !owner.has_property(name) {
        return Ok(None);
    }

    let original = owner.get(name)?;
    let wrapped = host::guarded(|| factory(original.clone()))?;
    if let Some(function) = wrapped.as_object().and_then(|o| o.function_data()) {
        function.mark_original(original.clone())?;
    }
    owner.set(name, wrapped)?;
    Ok(Some(original))
}

/// Restore handles collected at setup time, unwound together.
#[derive(Debug, Default)]
pub struct PatchSet {
    records: Vec<PatchRecord>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch and keep the record. Returns whether a patch was actually installed.
    pub fn patch<F>(&mut self, owner: &ObjectRef, name: &str, factory: F) -> bool
    where
        F: FnOnce(Value) -> Result<Value, HostError>,
    {
        let record = patch(owner, name, factory);
        let active = record.is_active();
        self.records.push(record);
        active
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Restore every record, newest first, so stacked patches end at the first original.
    pub fn restore_all(&mut self) {
        for record in self.records.drain(..).rev() {
            record.restore();
        }
    }
}
