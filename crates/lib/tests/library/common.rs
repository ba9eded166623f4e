//! Shared helpers for library integration tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use purestack_lib::pure::Builder;

/// Records the order in which factories run and how often.
#[derive(Clone, Default)]
pub struct Trace {
  pub order: Rc<RefCell<Vec<String>>>,
  pub calls: Rc<Cell<usize>>,
}

impl Trace {
  pub fn new() -> Self {
    Self::default()
  }

  /// A named builder that records itself and realizes to its identity.
  pub fn resource(&self, identity: &str) -> Builder<String> {
    let trace = self.clone();
    Builder::named(identity, move |_, id| {
      trace.calls.set(trace.calls.get() + 1);
      trace.order.borrow_mut().push(id.to_string());
      Ok(id.to_string())
    })
  }

  pub fn order(&self) -> Vec<String> {
    self.order.borrow().clone()
  }

  pub fn calls(&self) -> usize {
    self.calls.get()
  }
}
