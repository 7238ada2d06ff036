use std::fmt::Debug;
use std::rc::Rc;

/// Reference identity of a store.
///
/// Two handles are the same dependency iff they point at the same body,
/// whatever the value says.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreAddr {
	ptr: *const (),
}

impl StoreAddr {
	pub fn of<T: ?Sized>(ptr: &Rc<T>) -> Self {
		StoreAddr {
			ptr: Rc::as_ptr(ptr) as *const (),
		}
	}
}

impl Debug for StoreAddr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "StoreAddr({:p})", self.ptr)
	}
}
