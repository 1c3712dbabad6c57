//! Integration tests for properties and their change signals.

use std::sync::Arc;

use horizon_fields_core::{Property, Signal};
use parking_lot::Mutex;

#[derive(Default)]
struct Spinner {
    value: Property<i32>,
    wrapped: Signal<i32>,
}

impl Spinner {
    fn step(&self, max: i32) {
        let next = self.value.get() + 1;
        if next > max {
            self.value.set(0);
            self.wrapped.emit(max);
        } else {
            self.value.set(next);
        }
    }
}

#[test]
fn property_and_signal_compose() {
    let spinner = Spinner::default();
    let values = Arc::new(Mutex::new(Vec::new()));
    let wraps = Arc::new(Mutex::new(0));

    let v = values.clone();
    spinner.value.changed().connect(move |n| v.lock().push(*n));
    let w = wraps.clone();
    spinner.wrapped.connect(move |_| *w.lock() += 1);

    for _ in 0..4 {
        spinner.step(2);
    }

    assert_eq!(*values.lock(), vec![1, 2, 0, 1]);
    assert_eq!(*wraps.lock(), 1);
}

#[test]
fn property_is_shareable_across_threads() {
    let prop = Arc::new(Property::new(0u64));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let p = prop.clone();
            std::thread::spawn(move || {
                p.set_silent(i);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert!(prop.get() < 4);
}
