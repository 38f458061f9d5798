//! Property streams fed through combine-latest, end to end.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use bindery_reactive::{
	BoxedObservable, HandlerToken, NotifyPropertyChanging, ObservableExt, PropertyChangingEvent, PropertyChangingHandler, combine_latest2,
	combine_latest_all, observe_property_changing,
};
use parking_lot::Mutex;

fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// A settings object that announces changes before applying them.
#[derive(Default)]
struct Window {
	width: AtomicU32,
	height: AtomicU32,
	changing: PropertyChangingEvent,
}

impl Window {
	fn set_width(&self, value: u32) {
		self.changing.raise_property("width");
		self.width.store(value, Ordering::SeqCst);
	}

	fn set_height(&self, value: u32) {
		self.changing.raise_property("height");
		self.height.store(value, Ordering::SeqCst);
	}
}

impl NotifyPropertyChanging for Window {
	fn add_property_changing_handler(&self, handler: PropertyChangingHandler) -> HandlerToken {
		self.changing.add(handler)
	}

	fn remove_property_changing_handler(&self, token: HandlerToken) {
		self.changing.remove(token)
	}
}

#[test]
fn combined_properties_emit_on_subscribe_and_on_change() {
	init_tracing();

	let window = Arc::new(Window::default());
	window.set_width(640);
	window.set_height(480);

	let width = observe_property_changing::<_, _, _, ()>(Arc::clone(&window), "width", |w: &Window| w.width.load(Ordering::SeqCst)).expect("width");
	let height =
		observe_property_changing::<_, _, _, ()>(Arc::clone(&window), "height", |w: &Window| w.height.load(Ordering::SeqCst)).expect("height");
	let label = combine_latest2(width, height, |w: &u32, h: &u32| format!("{w}x{h}"));

	let seen = Arc::new(Mutex::new(Vec::new()));
	let sink = Arc::clone(&seen);
	let sub = label.subscribe_fn(move |text| sink.lock().push(text));
	assert_eq!(*seen.lock(), vec!["640x480"], "both property streams emit synchronously on subscribe");

	// Notifications fire before the store, so the emitted value is the previous one.
	window.set_width(800);
	window.changing.raise_all();
	assert_eq!(*seen.lock(), vec!["640x480", "640x480", "800x480", "800x480"]);

	sub.dispose();
	assert_eq!(window.changing.handler_count(), 0);
	window.set_height(600);
	assert_eq!(seen.lock().len(), 4);
}

#[test]
fn dynamic_combination_survives_concurrent_raises_and_dispose() {
	init_tracing();

	let windows: Vec<Arc<Window>> = (0..4).map(|_| Arc::new(Window::default())).collect();
	let sources: Vec<BoxedObservable<u32, ()>> = windows
		.iter()
		.map(|w| {
			observe_property_changing::<_, _, _, ()>(Arc::clone(w), "width", |w: &Window| w.width.load(Ordering::SeqCst))
				.expect("width")
				.boxed()
		})
		.collect();
	let total = combine_latest_all(sources, |widths: &[&u32]| widths.iter().copied().sum::<u32>()).expect("non-empty");

	let emissions = Arc::new(AtomicU32::new(0));
	let counter = Arc::clone(&emissions);
	let sub = total.subscribe_fn(move |_| {
		counter.fetch_add(1, Ordering::SeqCst);
	});
	assert_eq!(emissions.load(Ordering::SeqCst), 1);

	std::thread::scope(|s| {
		for window in &windows {
			s.spawn(move || {
				for n in 0..100 {
					window.set_width(n);
				}
			});
		}
		s.spawn(|| {
			std::thread::yield_now();
			sub.dispose();
		});
	});

	for window in &windows {
		assert_eq!(window.changing.handler_count(), 0);
	}
	let settled = emissions.load(Ordering::SeqCst);
	windows[0].set_width(7);
	assert_eq!(emissions.load(Ordering::SeqCst), settled, "nothing is delivered after dispose");
}
