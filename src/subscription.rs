use std::cell::Cell;
use std::fmt::Debug;

/// Handle returned by [`Readable::subscribe`](crate::Readable::subscribe).
///
/// Dropping it (or calling [`Unsubscriber::unsubscribe`]) detaches the
/// subscriber; nothing is delivered to it afterwards.
#[must_use = "dropping an Unsubscriber detaches the subscriber right away"]
pub struct Unsubscriber {
	stop: Option<Box<dyn FnOnce()>>,
}

impl Unsubscriber {
	pub fn new(stop: impl FnOnce() + 'static) -> Self {
		Unsubscriber {
			stop: Some(Box::new(stop)),
		}
	}

	pub fn noop() -> Self {
		Unsubscriber { stop: None }
	}

	pub fn unsubscribe(mut self) {
		self.run();
	}

	fn run(&mut self) {
		if let Some(stop) = self.stop.take() {
			stop()
		}
	}
}

impl Drop for Unsubscriber {
	fn drop(&mut self) {
		self.run();
	}
}

impl Debug for Unsubscriber {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Unsubscriber")
			.field("attached", &self.stop.is_some())
			.finish()
	}
}

pub(crate) struct Subscriber<T> {
	pub(crate) id: u64,
	live: Cell<bool>,
	run: Box<dyn Fn(&T)>,
}

impl<T> Subscriber<T> {
	pub(crate) fn new(id: u64, run: Box<dyn Fn(&T)>) -> Self {
		Subscriber {
			id,
			live: Cell::new(true),
			run,
		}
	}

	/// Deliveries may sit in the queue after the subscriber left.
	pub(crate) fn deliver(&self, value: &T) {
		if self.live.get() {
			(self.run)(value)
		}
	}

	pub(crate) fn close(&self) {
		self.live.set(false);
	}
}
