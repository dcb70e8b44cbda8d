use std::rc::Rc;

use crate::host::{ObjectRef, Value};

pub const CIRCULAR_ROOT: &str = "[Circular ~]";

/// Path from the serialization root to the value being visited.
///
/// `containers[0]` is the root; `keys[i]` is the key under which the walk left
/// `containers[i]`, so `keys[..n]` spells the path to `containers[n]`. Owned by a
/// single serialization call.
#[derive(Debug, Default)]
pub struct VisitFrame {
    containers: Vec<ObjectRef>,
    keys: Vec<String>,
}

impl VisitFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.containers.len()
    }

    fn position(&self, object: &ObjectRef) -> Option<usize> {
        self.containers.iter().position(|c| Rc::ptr_eq(c, object))
    }

    /// Record the visit of `value` under `holder[key]`.
    ///
    /// Returns the cycle marker to emit instead of `value` when `value` is already
    /// on the path.
    pub fn enter(&mut self, holder: &ObjectRef, key: &str, value: &Value) -> Option<String> {
        if self.containers.is_empty() {
            if let Value::Object(root) = value {
                self.containers.push(Rc::clone(root));
            }
            return None;
        }

        // Returning to an ancestor drops the finished subtree and replaces its key.
        match self.position(holder) {
            Some(pos) => {
                self.containers.truncate(pos + 1);
                self.keys.truncate(pos);
            }
            None => self.containers.push(Rc::clone(holder)),
        }
        self.keys.push(key.to_string());

        let pos = self.position(value.as_object()?)?;
        if pos == 0 {
            Some(CIRCULAR_ROOT.to_string())
        } else {
            Some(format!("[Circular ~.{}]", self.keys[..pos].join(".")))
        }
    }
}
