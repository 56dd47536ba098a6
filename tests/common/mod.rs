//! Shared setup for integration tests.

#![allow(dead_code)]

use std::rc::Rc;

use rcl_handle::{Binding, CollectingSink, RclRet};

pub use rcl_handle::testing::{addr, Call, Recorder};

pub fn recorder() -> Rc<Recorder> {
    Rc::new(Recorder::default())
}

pub fn failing_recorder(code: RclRet) -> Rc<Recorder> {
    Rc::new(Recorder::failing(code))
}

/// A binding over `lib` whose diagnostics land in the returned sink.
pub fn binding(lib: &Rc<Recorder>) -> (Binding<Rc<Recorder>>, Rc<CollectingSink>) {
    let sink = Rc::new(CollectingSink::new());
    let binding = Binding::new(Rc::clone(lib)).with_sink(sink.clone());
    (binding, sink)
}
