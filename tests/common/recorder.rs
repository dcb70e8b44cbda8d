//! Functions that record their calls, for observing wrappers.

use std::cell::RefCell;
use std::rc::Rc;

use wiretap::Value;

pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// A function that appends `label` to `log` and returns the number of arguments.
pub fn recording_fn(label: &'static str, log: &CallLog) -> Value {
    let log = Rc::clone(log);
    Value::function(label, move |args| {
        log.borrow_mut().push(label.to_string());
        Ok(Value::from(args.len() as f64))
    })
}
