//! Patching host functions: observe calls, restore originals.

use std::rc::Rc;

use wiretap::host::HostError;
use wiretap::{patch, HostObject, ObjectKind, PatchSet, Value};

use super::common::recorder::{call_log, recording_fn};

fn console_with_log(log_fn: Value) -> wiretap::ObjectRef {
    HostObject::builder("Console", ObjectKind::Other)
        .property("log", log_fn)
        .build()
}

/// Wrapper factory that records "wrapper" then delegates to the original.
fn observing(log: &super::common::recorder::CallLog) -> impl FnOnce(Value) -> Result<Value, HostError> {
    let log = Rc::clone(log);
    move |original: Value| {
        Ok(Value::function("log", move |args| {
            log.borrow_mut().push("wrapper".to_string());
            original.call(args)
        }))
    }
}

/// Test that patching an absent property is a no-op
#[test]
fn test_patching_a_missing_name_leaves_owner_unchanged() {
    let log = call_log();
    let console = console_with_log(recording_fn("original", &log));

    let record = patch(&console, "missing", observing(&log));
    assert!(!record.is_active());
    assert!(!console.has_property("missing"));

    record.restore();
    assert!(!console.has_property("missing"));
    assert_eq!(console.own_keys(), vec!["log"]);
}

/// Test that the wrapper sees calls and restore reinstalls the original
#[test]
fn test_wrapper_observes_calls_and_restore_brings_back_original() {
    let log = call_log();
    let original = recording_fn("original", &log);
    let console = console_with_log(original.clone());

    let record = patch(&console, "log", observing(&log));
    assert!(record.is_active());

    let installed = console.get("log").unwrap();
    assert!(!installed.same(&original));
    assert_eq!(installed.call(&[Value::from("hi")]), Ok(Value::from(1)));
    assert_eq!(*log.borrow(), vec!["wrapper", "original"]);

    record.restore();
    assert!(console.get("log").unwrap().same(&original));

    console.get("log").unwrap().call(&[]).unwrap();
    assert_eq!(*log.borrow(), vec!["wrapper", "original", "original"]);
}

/// Test that restoring twice leaves the original in place
#[test]
fn test_restore_is_idempotent() {
    let log = call_log();
    let original = recording_fn("original", &log);
    let console = console_with_log(original.clone());

    let record = patch(&console, "log", observing(&log));
    record.restore();
    assert!(console.get("log").unwrap().same(&original));
    record.restore();
    assert!(console.get("log").unwrap().same(&original));
}

/// Test that an installed wrapper exposes the function it wraps
#[test]
fn test_wrapped_function_points_back_at_original() {
    let log = call_log();
    let original = recording_fn("original", &log);
    let console = console_with_log(original.clone());

    let record = patch(&console, "log", observing(&log));
    let installed = console.get("log").unwrap();

    assert!(installed.wrapped_original().unwrap().same(&original));
    assert!(record.original().unwrap().same(&original));
    assert_eq!(original.wrapped_original(), None);
}

/// Test that a failing wrapper factory leaves the original installed
#[test]
fn test_failing_factory_keeps_original_installed() {
    let log = call_log();
    let original = recording_fn("original", &log);
    let console = console_with_log(original.clone());

    let record = patch(&console, "log", |_| {
        Err(HostError::thrown("TypeError", "cannot wrap"))
    });

    assert!(!record.is_active());
    assert!(console.get("log").unwrap().same(&original));
}

/// Test that a patch set restores every patched property
#[test]
fn test_patch_set_restores_every_site() {
    let log = call_log();
    let log_fn = recording_fn("log", &log);
    let warn_fn = recording_fn("warn", &log);
    let console = HostObject::builder("Console", ObjectKind::Other)
        .property("log", log_fn.clone())
        .property("warn", warn_fn.clone())
        .build();

    let mut patches = PatchSet::new();
    for name in ["log", "warn", "error"] {
        patches.patch(&console, name, observing(&log));
    }

    console.get("warn").unwrap().call(&[]).unwrap();
    assert_eq!(*log.borrow(), vec!["wrapper", "warn"]);

    patches.restore_all();
    assert!(console.get("log").unwrap().same(&log_fn));
    assert!(console.get("warn").unwrap().same(&warn_fn));
    assert!(!console.has_property("error"));
}
