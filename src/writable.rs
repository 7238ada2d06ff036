use std::fmt::Debug;

use crate::addr::StoreAddr;
use crate::store::{Setter, Store};
use crate::subscription::Unsubscriber;
use crate::Readable;

/// A source store that can be set from outside.
pub struct Writable<T> {
	store: Store<T>,
	setter: Setter<T>,
}

impl<T> Clone for Writable<T> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			setter: self.setter.clone(),
		}
	}
}

impl<T> Default for Writable<T>
where
	T: Default + Clone + PartialEq + 'static,
{
	fn default() -> Self {
		Writable::new(Default::default())
	}
}

pub fn writable<T>(value: T) -> Writable<T>
where
	T: Clone + PartialEq + 'static,
{
	Writable::new(value)
}

pub trait Toggle {
	fn toggle(&mut self);
}

impl Toggle for bool {
	fn toggle(&mut self) {
		*self = !*self
	}
}

impl<T> Writable<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn new(value: T) -> Self {
		Self::with_start(value, |_| Unsubscriber::noop())
	}

	/// Like [`Writable::new`], with a start function that runs while the
	/// store has subscribers (e.g. to feed it from a timer).
	pub fn with_start(value: T, start: impl Fn(Setter<T>) -> Unsubscriber + 'static) -> Self {
		let store = Store::new(value, start);
		let setter = store.setter();
		Writable { store, setter }
	}

	#[inline]
	pub fn set(&self, value: T) {
		self.setter.set(value)
	}

	#[inline]
	pub fn update(&self, func: impl FnOnce(&mut T)) {
		if let Some(mut value) = self.store.peek() {
			func(&mut value);
			self.set(value)
		}
	}

	#[inline]
	pub fn toggle(&self)
	where
		T: Toggle,
	{
		self.update(T::toggle)
	}

	#[inline]
	pub fn is_active(&self) -> bool {
		self.store.is_active()
	}

	#[inline]
	pub fn subscriber_count(&self) -> usize {
		self.store.subscriber_count()
	}
}

impl<T> Readable for Writable<T>
where
	T: Clone + PartialEq + 'static,
{
	type Value = T;

	fn subscribe(&self, run: Box<dyn Fn(&T)>) -> Unsubscriber {
		self.store.subscribe(run)
	}

	fn addr(&self) -> StoreAddr {
		self.store.addr()
	}
}

impl<T> Debug for Writable<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		self.store.fmt(f)
	}
}
