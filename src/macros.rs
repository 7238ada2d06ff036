pub use enclose::*;

/// Builds a [`Reactive`](crate::Reactive), optionally cloning the listed
/// stores into the closure first.
///
/// ```
/// use reactive_store::{reactive, writable, Readable};
///
/// let a = writable(1);
/// let b = writable(2);
/// let sum = reactive!((a, b) cx => cx.get(&a) + cx.get(&b));
/// assert_eq!(sum.get(), 3);
/// ```
#[macro_export]
macro_rules! reactive {
    (( $($d_tt:tt)* ) $ctx:ident => $($b:tt)*) => {
        $crate::Reactive::new($crate::macros::enclose!(($( $d_tt )*) move |$ctx: &$crate::Evaluation| { $($b)* }))
    };
    ($ctx:ident => $($b:tt)*) => {
        $crate::Reactive::new(move |$ctx: &$crate::Evaluation| { $($b)* })
    };
}
