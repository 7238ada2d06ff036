use std::any::Any;
use std::cell::RefCell;

use fxhash::FxHashMap;

use crate::addr::StoreAddr;
use crate::subscription::Unsubscriber;

/// What one activation period of a reactive computation has read so far.
///
/// Both maps only grow until [`Dependencies::clear`].
#[derive(Default)]
pub struct Dependencies {
	subscriptions: RefCell<FxHashMap<StoreAddr, Unsubscriber>>,
	values: RefCell<FxHashMap<StoreAddr, Box<dyn Any>>>,
}

impl Dependencies {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, addr: StoreAddr) -> bool {
		self.subscriptions.borrow().contains_key(&addr)
	}

	pub fn insert(&self, addr: StoreAddr, subscription: Unsubscriber) {
		let previous = self.subscriptions.borrow_mut().insert(addr, subscription);
		std::mem::drop(previous);
	}

	pub fn record(&self, addr: StoreAddr, value: Box<dyn Any>) {
		let previous = self.values.borrow_mut().insert(addr, value);
		std::mem::drop(previous);
	}

	pub fn value<V: Clone + 'static>(&self, addr: StoreAddr) -> Option<V> {
		self.values
			.borrow()
			.get(&addr)
			.and_then(|value| value.downcast_ref::<V>())
			.cloned()
	}

	pub fn len(&self) -> usize {
		self.subscriptions.borrow().len()
	}

	/// Unsubscribes from everything. Handles are dropped with no borrow held.
	pub fn clear(&self) {
		let subscriptions = std::mem::take(&mut *self.subscriptions.borrow_mut());
		let values = std::mem::take(&mut *self.values.borrow_mut());
		std::mem::drop(subscriptions);
		std::mem::drop(values);
	}
}
