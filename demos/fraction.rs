use reactive_store::{reactive, writable, Readable};
use tracing_subscriber::EnvFilter;

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let numerator = writable(1.0_f64);
	let denominator = writable(2.0_f64);
	let fraction = reactive!((numerator, denominator) cx => {
		cx.get(&numerator) / cx.get(&denominator)
	});

	let _subscription = fraction.subscribe(Box::new(|value: &f64| {
		tracing::info!(value = *value, "fraction");
	}));

	numerator.set(3.0);
	denominator.set(4.0);
	// Unchanged, nothing is logged.
	numerator.set(3.0);
	denominator.update(|value| *value *= 2.0);
}
