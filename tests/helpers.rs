use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reactive_store::{Readable, Unsubscriber};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub type Values<T> = Rc<RefCell<Vec<T>>>;

/// Records every value `store` delivers while the returned handle lives.
pub fn collect<S: Readable>(store: &S) -> (Values<S::Value>, Unsubscriber) {
	let values = Rc::new(RefCell::new(Vec::new()));
	let subscription = store.subscribe(Box::new({
		let values = values.clone();
		move |value: &S::Value| values.borrow_mut().push(value.clone())
	}));
	(values, subscription)
}

/// Counts `WARN` events.
#[derive(Clone, Default)]
pub struct Warnings(Arc<AtomicUsize>);

impl Warnings {
	pub fn count(&self) -> usize {
		self.0.load(Ordering::SeqCst)
	}
}

impl<S: Subscriber> Layer<S> for Warnings {
	fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
		if *event.metadata().level() == Level::WARN {
			self.0.fetch_add(1, Ordering::SeqCst);
		}
	}
}
