use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

pub(crate) type Delivery = Box<dyn FnOnce()>;

thread_local! {
	static DRAINING: Cell<bool> = const { Cell::new(false) };
	static PENDING: RefCell<VecDeque<Delivery>> = RefCell::new(VecDeque::new());
}

pub(crate) fn is_draining() -> bool {
	DRAINING.with(Cell::get)
}

/// Appends `deliveries` to the pending queue. The outermost caller drains it,
/// nested callers return right away and their deliveries run in order after
/// the ones already queued.
///
/// A panicking delivery does not stop the drain: every other subscriber still
/// gets its value, then the first panic is resumed.
pub(crate) fn notify(deliveries: impl IntoIterator<Item = Delivery>) {
	PENDING.with(|pending| pending.borrow_mut().extend(deliveries));

	if DRAINING.with(|draining| draining.replace(true)) {
		return;
	}

	let _drain = Drain;
	let mut fault = None;
	loop {
		let next = PENDING.with(|pending| pending.borrow_mut().pop_front());
		match next {
			Some(delivery) => {
				if let Err(payload) = catch_unwind(AssertUnwindSafe(delivery)) {
					fault.get_or_insert(payload);
				}
			}
			None => break,
		}
	}

	if let Some(payload) = fault {
		resume_unwind(payload);
	}
}

struct Drain;

impl Drop for Drain {
	fn drop(&mut self) {
		DRAINING.with(|draining| draining.set(false));
	}
}
