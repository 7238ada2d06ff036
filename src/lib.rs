pub mod macros;

mod addr;
mod dependencies;
mod evaluation;
mod queue;
mod reactive;
mod store;
mod subscription;
mod writable;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use enclose::enclose;

pub use addr::StoreAddr;
pub use evaluation::Evaluation;
pub use reactive::{reactive, Reactive};
pub use store::{readable, Setter, Store};
pub use subscription::Unsubscriber;
pub use writable::{writable, Toggle, Writable};

use dependencies::Dependencies;

/// Anything that holds a current value and tells subscribers when it changes.
pub trait Readable: 'static {
	type Value: Clone + 'static;

	/// Registers `run`. The current value is delivered before this returns,
	/// then every change until the returned handle is dropped.
	fn subscribe(&self, run: Box<dyn Fn(&Self::Value)>) -> Unsubscriber;

	/// Identity of the underlying store, shared by all of its clones.
	fn addr(&self) -> StoreAddr;

	/// Reads the current value, starting and stopping the store if nobody
	/// is subscribed.
	fn get(&self) -> Self::Value {
		let slot = Rc::new(RefCell::new(None));
		let subscription = self.subscribe(Box::new(enclose!((slot) move |value: &Self::Value| {
			*slot.borrow_mut() = Some(value.clone());
		})));
		subscription.unsubscribe();

		let value = slot.borrow_mut().take();
		match value {
			Some(value) => value,
			None => panic!("store {:?} did not deliver its value on subscribe", self.addr()),
		}
	}

	fn map<R, F>(&self, func: F) -> Reactive<R>
	where
		Self: Clone,
		F: Fn(&Self::Value) -> R + 'static,
		R: Clone + PartialEq + 'static,
	{
		let this = self.clone();
		Reactive::new(move |cx| func(&cx.get(&this)))
	}
}

#[inline]
pub fn get<S: Readable>(store: &S) -> S::Value {
	store.get()
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Phase {
	/// No subscribers, no dependencies.
	Idle,
	/// Running the first evaluation of an activation period.
	Discovering,
	/// Re-evaluating on every dependency change.
	Steady,
}

/// The receiving end of a dependency subscription.
pub(crate) trait Derived: 'static {
	fn dependencies(&self) -> &Dependencies;

	fn dependency_changed(self: Rc<Self>, addr: StoreAddr, value: Box<dyn Any>);
}
