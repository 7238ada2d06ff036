use std::cell::Cell;
use std::rc::Rc;

use crate::{Derived, Readable};

/// The tracking accessor handed to a reactive computation.
///
/// Every store read through [`Evaluation::get`] becomes a dependency of the
/// computation for the rest of its activation period.
pub struct Evaluation {
	parent: Rc<dyn Derived>,
	used: Cell<bool>,
}

impl Evaluation {
	pub(crate) fn new(parent: Rc<dyn Derived>) -> Self {
		Evaluation {
			parent,
			used: Cell::new(false),
		}
	}

	pub(crate) fn used(&self) -> bool {
		self.used.get()
	}

	pub fn get<S: Readable>(&self, store: &S) -> S::Value {
		self.used.set(true);

		let addr = store.addr();
		let dependencies = self.parent.dependencies();
		if !dependencies.contains(addr) {
			// The first delivery happens inside `subscribe`, before the
			// handle is inserted, so it only records the value.
			let parent = Rc::downgrade(&self.parent);
			let subscription = store.subscribe(Box::new(move |value: &S::Value| {
				if let Some(parent) = parent.upgrade() {
					parent.dependency_changed(addr, Box::new(value.clone()));
				}
			}));
			dependencies.insert(addr, subscription);
		}

		match dependencies.value::<S::Value>(addr) {
			Some(value) => value,
			None => panic!("store {:?} did not deliver its value on subscribe", addr),
		}
	}
}
