use std::sync::Arc;

use parking_lot::Mutex;

use super::*;
use crate::observable::ObservableExt;

struct Person {
	name: Mutex<String>,
	age: Mutex<u32>,
	changing: PropertyChangingEvent,
}

impl Person {
	fn new(name: &str, age: u32) -> Arc<Self> {
		Arc::new(Self {
			name: Mutex::new(name.to_string()),
			age: Mutex::new(age),
			changing: PropertyChangingEvent::new(),
		})
	}

	fn set_name(&self, name: &str) {
		self.changing.raise_property("name");
		*self.name.lock() = name.to_string();
	}
}

impl NotifyPropertyChanging for Person {
	fn add_property_changing_handler(&self, handler: PropertyChangingHandler) -> HandlerToken {
		self.changing.add(handler)
	}

	fn remove_property_changing_handler(&self, token: HandlerToken) {
		self.changing.remove(token)
	}
}

fn observe_name(person: &Arc<Person>) -> (Arc<Mutex<Vec<String>>>, Subscription) {
	let names = observe_property_changing::<_, _, _, ()>(Arc::clone(person), "name", |p: &Person| p.name.lock().clone()).expect("valid name");
	let seen = Arc::new(Mutex::new(Vec::new()));
	let s = Arc::clone(&seen);
	let sub = names.subscribe_fn(move |name| s.lock().push(name));
	(seen, sub)
}

#[test]
fn emits_current_value_on_subscribe() {
	let person = Person::new("Ada", 36);
	let (seen, _sub) = observe_name(&person);
	assert_eq!(*seen.lock(), vec!["Ada"]);
	assert_eq!(person.changing.handler_count(), 1);
}

#[test]
fn re_reads_on_matching_or_blank_names_only() {
	let person = Person::new("Ada", 36);
	let (seen, _sub) = observe_name(&person);

	person.changing.raise_property("age");
	assert_eq!(seen.lock().len(), 1, "other properties are ignored");

	person.changing.raise_property("name");
	person.changing.raise_property("");
	person.changing.raise_all();
	assert_eq!(seen.lock().len(), 4);
}

#[test]
fn reads_before_the_change_is_applied() {
	let person = Person::new("Ada", 36);
	let (seen, _sub) = observe_name(&person);

	person.set_name("Grace");
	person.set_name("Hedy");
	assert_eq!(*seen.lock(), vec!["Ada", "Ada", "Grace"]);
}

#[test]
fn repeated_values_are_not_filtered() {
	let person = Person::new("Ada", 36);
	let ages = observe_property_changing::<_, _, _, ()>(Arc::clone(&person), "age", |p: &Person| *p.age.lock()).expect("valid name");
	let seen = Arc::new(Mutex::new(Vec::new()));
	let s = Arc::clone(&seen);
	let _sub = ages.subscribe_fn(move |age| s.lock().push(age));

	person.changing.raise_property("age");
	person.changing.raise_property("age");
	assert_eq!(*seen.lock(), vec![36, 36, 36]);
}

#[test]
fn dispose_is_idempotent() {
	let person = Person::new("Ada", 36);
	let (seen, sub) = observe_name(&person);

	sub.dispose();
	sub.dispose();
	assert_eq!(person.changing.handler_count(), 0);

	person.changing.raise_property("name");
	assert_eq!(*seen.lock(), vec!["Ada"]);
}

#[test]
fn concurrent_dispose_detaches_once() {
	let person = Person::new("Ada", 36);
	// An unrelated handler that must survive.
	let other = person.changing.add(Arc::new(|_: &PropertyChanging| {}));
	let (_seen, sub) = observe_name(&person);

	std::thread::scope(|s| {
		for _ in 0..8 {
			s.spawn(|| sub.dispose());
		}
	});
	assert_eq!(person.changing.handler_count(), 1);
	person.changing.remove(other);
	assert_eq!(person.changing.handler_count(), 0);
}

#[test]
fn dispose_after_source_dropped() {
	let person = Person::new("Ada", 36);
	let names = observe_property_changing::<_, _, _, ()>(Arc::clone(&person), "name", |p: &Person| p.name.lock().clone()).expect("valid name");
	let sub = names.subscribe_fn(|_| {});
	drop(names);
	drop(person);
	sub.dispose();
}

#[test]
fn empty_property_name_is_rejected() {
	let person = Person::new("Ada", 36);
	let result = observe_property_changing::<_, _, _, ()>(person, "", |p: &Person| *p.age.lock());
	assert_eq!(result.err(), Some(ReactiveError::EmptyPropertyName));
}

#[test]
fn handler_may_remove_itself_while_raised() {
	let event = Arc::new(PropertyChangingEvent::new());
	let token: Arc<Mutex<Option<HandlerToken>>> = Arc::new(Mutex::new(None));
	let calls = Arc::new(Mutex::new(0));

	let handler: PropertyChangingHandler = {
		let (event, token, calls) = (Arc::downgrade(&event), Arc::clone(&token), Arc::clone(&calls));
		Arc::new(move |_: &PropertyChanging| {
			*calls.lock() += 1;
			if let (Some(event), Some(token)) = (event.upgrade(), *token.lock()) {
				event.remove(token);
			}
		})
	};
	*token.lock() = Some(event.add(handler));

	event.raise_all();
	event.raise_all();
	assert_eq!(*calls.lock(), 1);
	assert_eq!(event.handler_count(), 0);
}

#[test]
fn affects_treats_missing_and_empty_names_as_any() {
	assert!(PropertyChanging::all().affects("name"));
	assert!(PropertyChanging::new("").affects("name"));
	assert!(PropertyChanging::new("name").affects("name"));
	assert!(!PropertyChanging::new("age").affects("name"));
	assert_eq!(PropertyChanging::new("age").property_name(), Some("age"));
}

/// Adapter that keeps its own callback ids instead of embedding `PropertyChangingEvent`.
#[derive(Default)]
struct Counter {
	value: Mutex<u32>,
	callbacks: Mutex<Vec<(u64, PropertyChangingHandler)>>,
	next_id: Mutex<u64>,
}

impl Counter {
	fn bump(&self) {
		let callbacks: Vec<PropertyChangingHandler> = self.callbacks.lock().iter().map(|(_, h)| Arc::clone(h)).collect();
		for callback in callbacks {
			callback(&PropertyChanging::new("value"));
		}
		*self.value.lock() += 1;
	}
}

impl NotifyPropertyChanging for Counter {
	fn add_property_changing_handler(&self, handler: PropertyChangingHandler) -> HandlerToken {
		let mut next = self.next_id.lock();
		*next += 10;
		self.callbacks.lock().push((*next, handler));
		HandlerToken::new(NonZeroU64::new(*next).expect("ids start above zero"))
	}

	fn remove_property_changing_handler(&self, token: HandlerToken) {
		self.callbacks.lock().retain(|(id, _)| *id != token.get());
	}
}

#[test]
fn adapter_with_own_ids_attaches_and_detaches() {
	let counter = Arc::new(Counter::default());
	let values = observe_property_changing::<_, _, _, ()>(Arc::clone(&counter), "value", |c: &Counter| *c.value.lock()).expect("valid name");
	let seen = Arc::new(Mutex::new(Vec::new()));
	let s = Arc::clone(&seen);
	let sub = values.subscribe_fn(move |v| s.lock().push(v));

	counter.bump();
	counter.bump();
	assert_eq!(*seen.lock(), vec![0, 0, 1]);

	sub.dispose();
	assert!(counter.callbacks.lock().is_empty());
	counter.bump();
	assert_eq!(seen.lock().len(), 3);
}
