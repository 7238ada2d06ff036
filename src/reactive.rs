use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;

use crate::addr::StoreAddr;
use crate::dependencies::Dependencies;
use crate::queue;
use crate::store::{Setter, Store};
use crate::subscription::Unsubscriber;
use crate::{Derived, Evaluation, Phase, Readable};

/// A store derived from whatever stores its function reads.
///
/// Nothing runs until the first subscriber (or [`Readable::get`]) arrives.
/// The function is then evaluated once to discover the initial dependencies and
/// again on every change of any of them, until the last subscriber leaves.
/// Stores read by a branch that is no longer taken stay subscribed until then.
pub struct Reactive<T> {
	store: Store<T>,
	body: Rc<ReactiveBody<T>>,
}

impl<T> Clone for Reactive<T> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			body: self.body.clone(),
		}
	}
}

pub fn reactive<T, F>(func: F) -> Reactive<T>
where
	T: Clone + PartialEq + 'static,
	F: Fn(&Evaluation) -> T + 'static,
{
	Reactive::new(func)
}

pub(crate) struct ReactiveBody<T> {
	name: &'static str,
	func: Box<dyn Fn(&Evaluation) -> T>,
	phase: Cell<Phase>,
	dependencies: Dependencies,
	setter: RefCell<Option<Setter<T>>>,
}

impl<T> Reactive<T>
where
	T: Clone + PartialEq + 'static,
{
	pub fn new(func: impl Fn(&Evaluation) -> T + 'static) -> Self {
		Self::new_with_name("<unnamed>", func)
	}

	pub fn new_with_name(name: &'static str, func: impl Fn(&Evaluation) -> T + 'static) -> Self {
		let body = Rc::new(ReactiveBody {
			name,
			func: Box::new(func),
			phase: Cell::new(Phase::Idle),
			dependencies: Dependencies::new(),
			setter: RefCell::new(None),
		});

		let store = Store::lazy({
			let body = body.clone();
			move |set| body.clone().activate(set)
		});

		Reactive { store, body }
	}

	pub fn name(&self) -> &'static str {
		self.body.name
	}

	pub fn phase(&self) -> Phase {
		self.body.phase.get()
	}

	pub fn dependency_count(&self) -> usize {
		self.body.dependencies.len()
	}
}

impl<T> ReactiveBody<T>
where
	T: Clone + PartialEq + 'static,
{
	fn activate(self: Rc<Self>, set: Setter<T>) -> Unsubscriber {
		*self.setter.borrow_mut() = Some(set);

		let discovery = Discovery::begin(&self);
		self.sync();
		discovery.finish();

		Unsubscriber::new(move || self.deactivate())
	}

	fn sync(self: &Rc<Self>) {
		let evaluation = Evaluation::new(self.clone());
		let value = (self.func)(&evaluation);
		if !evaluation.used() {
			tracing::warn!(
				name = self.name,
				"reactive function did not read any store, this is likely a mistake"
			);
		}

		let setter = self.setter.borrow().clone();
		if let Some(setter) = setter {
			setter.set(value);
		}
	}

	fn deactivate(&self) {
		tracing::trace!(
			name = self.name,
			dependencies = self.dependencies.len(),
			"deactivating"
		);

		self.phase.set(Phase::Idle);
		let setter = self.setter.borrow_mut().take();
		std::mem::drop(setter);
		self.dependencies.clear();
	}
}

/// The initial evaluation. Deliveries that arrive while it runs only record
/// values; if the evaluation panics the subscriptions made so far are dropped.
struct Discovery<'a, T>
where
	T: Clone + PartialEq + 'static,
{
	body: &'a ReactiveBody<T>,
	finished: bool,
}

impl<'a, T> Discovery<'a, T>
where
	T: Clone + PartialEq + 'static,
{
	fn begin(body: &'a ReactiveBody<T>) -> Self {
		tracing::trace!(name = body.name, "activating");
		body.phase.set(Phase::Discovering);
		Discovery {
			body,
			finished: false,
		}
	}

	fn finish(mut self) {
		self.finished = true;
		self.body.phase.set(Phase::Steady);
	}
}

impl<'a, T> Drop for Discovery<'a, T>
where
	T: Clone + PartialEq + 'static,
{
	fn drop(&mut self) {
		if !self.finished {
			self.body.deactivate();
		}
	}
}

impl<T> Derived for ReactiveBody<T>
where
	T: Clone + PartialEq + 'static,
{
	fn dependencies(&self) -> &Dependencies {
		&self.dependencies
	}

	fn dependency_changed(self: Rc<Self>, addr: StoreAddr, value: Box<dyn Any>) {
		self.dependencies.record(addr, value);

		if self.phase.get() == Phase::Steady && self.dependencies.contains(addr) {
			tracing::trace!(
				name = self.name,
				?addr,
				nested = queue::is_draining(),
				"dependency changed"
			);
			self.sync();
		}
	}
}

impl<T> Readable for Reactive<T>
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

impl<T> Debug for Reactive<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Reactive")
			.field("name", &self.body.name)
			.field("phase", &self.body.phase.get())
			.field("dependencies", &self.body.dependencies.len())
			.field("store", &self.store)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::panic::{catch_unwind, AssertUnwindSafe};
	use std::rc::Rc;

	use crate::{writable, Phase, Readable, Reactive, Unsubscriber, Writable};

	#[test]
	fn discovery_does_not_reenter() {
		let a = writable(1);
		// Starting `b` changes `a`, which is already a dependency by then.
		let b = Writable::with_start(10, {
			let a = a.clone();
			move |_| {
				a.set(2);
				Unsubscriber::noop()
			}
		});
		let runs = Rc::new(Cell::new(0));

		let sum = Reactive::new({
			let (a, b, runs) = (a.clone(), b.clone(), runs.clone());
			move |cx| {
				runs.set(runs.get() + 1);
				cx.get(&a) + cx.get(&b)
			}
		});

		assert_eq!(sum.phase(), Phase::Idle);
		let subscription = sum.subscribe(Box::new(|_: &i32| {}));
		assert_eq!(runs.get(), 1);
		assert_eq!(sum.phase(), Phase::Steady);
		assert_eq!(sum.dependency_count(), 2);

		// The value delivered during discovery was recorded.
		b.set(11);
		assert_eq!(runs.get(), 2);
		assert_eq!(sum.get(), 13);

		subscription.unsubscribe();
		assert_eq!(sum.phase(), Phase::Idle);
		assert_eq!(sum.dependency_count(), 0);
	}

	#[test]
	fn panic_during_discovery_rolls_back() {
		let a = writable(1);
		let b = writable(2);
		let fail = Rc::new(Cell::new(true));

		let sum = Reactive::new({
			let (a, b, fail) = (a.clone(), b.clone(), fail.clone());
			move |cx| {
				let a = cx.get(&a);
				if fail.get() {
					panic!("evaluation failed");
				}
				a + cx.get(&b)
			}
		});

		let result = catch_unwind(AssertUnwindSafe(|| sum.get()));
		assert!(result.is_err());
		assert_eq!(sum.phase(), Phase::Idle);
		assert_eq!(sum.dependency_count(), 0);
		assert_eq!(a.subscriber_count(), 0);
		assert!(!a.is_active());

		fail.set(false);
		assert_eq!(sum.get(), 3);
	}

	#[test]
	fn panic_in_steady_state_keeps_subscriptions() {
		let a = writable(1);
		let sum = Reactive::new({
			let a = a.clone();
			move |cx| {
				let value = cx.get(&a);
				if value == 13 {
					panic!("unlucky");
				}
				value
			}
		});

		let seen = Rc::new(Cell::new(0));
		let _subscription = sum.subscribe(Box::new({
			let seen = seen.clone();
			move |value: &i32| seen.set(*value)
		}));

		let result = catch_unwind(AssertUnwindSafe(|| a.set(13)));
		assert!(result.is_err());
		assert_eq!(sum.phase(), Phase::Steady);
		assert_eq!(sum.dependency_count(), 1);
		assert_eq!(seen.get(), 1);

		a.set(2);
		assert_eq!(seen.get(), 2);
	}

	#[test]
	fn panic_in_one_computation_still_updates_siblings() {
		let a = writable(1);
		let bad = Reactive::new({
			let a = a.clone();
			move |cx| {
				let value = cx.get(&a);
				if value == 13 {
					panic!("unlucky");
				}
				value
			}
		});
		let good = Reactive::new({
			let a = a.clone();
			move |cx| cx.get(&a) * 2
		});

		let _bad = bad.subscribe(Box::new(|_: &i32| {}));
		let seen = Rc::new(Cell::new(0));
		let _good = good.subscribe(Box::new({
			let seen = seen.clone();
			move |value: &i32| seen.set(*value)
		}));

		let result = catch_unwind(AssertUnwindSafe(|| a.set(13)));
		assert!(result.is_err());
		assert_eq!(seen.get(), 26);
		assert_eq!(good.get(), 26);

		a.set(4);
		assert_eq!(seen.get(), 8);
		assert_eq!(bad.get(), 4);
	}
}
