use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::addr::StoreAddr;
use crate::queue::{self, Delivery};
use crate::subscription::{Subscriber, Unsubscriber};
use crate::Readable;

type Start<T> = Box<dyn Fn(Setter<T>) -> Unsubscriber>;

/// A lazily started observable value.
///
/// `start` runs when the first subscriber arrives and receives a [`Setter`].
/// The [`Unsubscriber`] it returns is dropped when the last subscriber leaves.
pub struct Store<T> {
	body: Rc<StoreBody<T>>,
}

impl<T> Clone for Store<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

pub fn readable<T>(value: T, start: impl Fn(Setter<T>) -> Unsubscriber + 'static) -> Store<T>
where
	T: Clone + PartialEq + 'static,
{
	Store::new(value, start)
}

pub(crate) struct StoreBody<T> {
	value: RefCell<Option<T>>,
	inner: RefCell<StoreInner<T>>,
	start: Start<T>,
}

struct StoreInner<T> {
	subscribers: SmallVec<[Rc<Subscriber<T>>; 2]>,
	stop: Option<Unsubscriber>,
	next_id: u64,
}

/// Write handle given to a store's start function.
pub struct Setter<T> {
	body: Weak<StoreBody<T>>,
}

impl<T> Clone for Setter<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> Setter<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn set(&self, value: T) {
		if let Some(body) = self.body.upgrade() {
			body.set(value)
		}
	}

	pub fn update(&self, func: impl FnOnce(&T) -> T) {
		if let Some(body) = self.body.upgrade() {
			let current = body.value.borrow().clone();
			if let Some(current) = current {
				body.set(func(&current))
			}
		}
	}
}

impl<T> Store<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn new(value: T, start: impl Fn(Setter<T>) -> Unsubscriber + 'static) -> Self {
		Self::build(Some(value), Box::new(start))
	}

	/// Store without a value until `start` sets one.
	pub(crate) fn lazy(start: impl Fn(Setter<T>) -> Unsubscriber + 'static) -> Self {
		Self::build(None, Box::new(start))
	}

	fn build(value: Option<T>, start: Start<T>) -> Self {
		Store {
			body: Rc::new(StoreBody {
				value: RefCell::new(value),
				inner: RefCell::new(StoreInner {
					subscribers: SmallVec::new(),
					stop: None,
					next_id: 0,
				}),
				start,
			}),
		}
	}

	pub(crate) fn setter(&self) -> Setter<T> {
		Setter {
			body: Rc::downgrade(&self.body),
		}
	}

	pub(crate) fn peek(&self) -> Option<T> {
		self.body.value.borrow().clone()
	}

	pub fn is_active(&self) -> bool {
		self.body.inner.borrow().stop.is_some()
	}

	pub fn subscriber_count(&self) -> usize {
		self.body.inner.borrow().subscribers.len()
	}
}

impl<T> StoreBody<T>
where
	T: Clone + PartialEq + 'static,
{
	fn set(&self, value: T) {
		{
			let mut current = self.value.borrow_mut();
			if !changed(current.as_ref(), &value) {
				return;
			}
			*current = Some(value.clone());
		}

		let inner = self.inner.borrow();
		if inner.stop.is_none() {
			return;
		}

		let value = Rc::new(value);
		let deliveries: Vec<Delivery> = inner
			.subscribers
			.iter()
			.map(|subscriber| {
				let subscriber = subscriber.clone();
				let value = value.clone();
				Box::new(move || subscriber.deliver(&value)) as Delivery
			})
			.collect();
		std::mem::drop(inner);

		queue::notify(deliveries);
	}

	fn subscribe(this: &Rc<Self>, run: Box<dyn Fn(&T)>) -> Unsubscriber {
		let needs_start = this.inner.borrow().stop.is_none();
		// Nothing is registered until start returns, so a panicking start
		// leaves the store inactive.
		let stop = if needs_start {
			Some((this.start)(Setter {
				body: Rc::downgrade(this),
			}))
		} else {
			None
		};

		let subscriber = {
			let mut inner = this.inner.borrow_mut();
			if let Some(stop) = stop {
				inner.stop = Some(stop);
			}
			let id = inner.next_id;
			inner.next_id += 1;
			let subscriber = Rc::new(Subscriber::new(id, run));
			inner.subscribers.push(subscriber.clone());
			subscriber
		};

		// Built first so a callback panicking on the initial value detaches again.
		let id = subscriber.id;
		let body = this.clone();
		let unsubscriber = Unsubscriber::new(move || body.unsubscribe(id));

		let current = this.value.borrow().clone();
		if let Some(current) = current {
			subscriber.deliver(&current);
		}

		unsubscriber
	}

	fn unsubscribe(&self, id: u64) {
		let (removed, stop) = {
			let mut inner = self.inner.borrow_mut();
			let index = inner
				.subscribers
				.iter()
				.position(|subscriber| subscriber.id == id);
			let removed = index.map(|index| inner.subscribers.remove(index));
			let stop = if inner.subscribers.is_empty() {
				inner.stop.take()
			} else {
				None
			};
			(removed, stop)
		};

		if let Some(removed) = removed {
			removed.close();
		}
		std::mem::drop(stop);
	}
}

/// Equality gate. Values that are not equal to themselves (NaN) count as
/// equal to each other.
#[allow(clippy::eq_op)]
fn changed<T: PartialEq>(old: Option<&T>, new: &T) -> bool {
	match old {
		None => true,
		Some(old) => old != new && !(old != old && new != new),
	}
}

impl<T> Readable for Store<T>
where
	T: Clone + PartialEq + 'static,
{
	type Value = T;

	fn subscribe(&self, run: Box<dyn Fn(&T)>) -> Unsubscriber {
		StoreBody::subscribe(&self.body, run)
	}

	fn addr(&self) -> StoreAddr {
		StoreAddr::of(&self.body)
	}
}

impl<T> Debug for Store<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.body.inner.borrow();
		f.debug_struct("Store")
			.field("value", &*self.body.value.borrow())
			.field("subscribers", &inner.subscribers.len())
			.field("active", &inner.stop.is_some())
			.finish()
	}
}
