//! Observable value cells.
//!
//! A [`Property`] holds a value behind a lock and owns the [`Signal`] that
//! announces changes to it. Field engines publish their typed value and their
//! display text through properties so that a UI layer can bind to them.
//!
//! # Example
//!
//! ```
//! use horizon_fields_core::Property;
//!
//! let text = Property::new(String::from("__:__"));
//! text.changed().connect(|t| println!("now {t}"));
//!
//! assert!(text.set("12:__".to_string()));
//! assert!(!text.set("12:__".to_string()));
//! assert_eq!(text.get(), "12:__");
//! ```

use std::fmt;

use parking_lot::RwLock;

use crate::logging::targets;
use crate::signal::Signal;

/// A value cell with change detection and change notification.
///
/// `set()` compares with the current value and, only when it differs, stores
/// the new value and emits [`changed`](Self::changed). The lock is released
/// before the signal fires, so slots may read the property.
///
/// # Thread Safety
///
/// `Property<T>` uses interior mutability with `RwLock` and is `Send + Sync`
/// whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
    changed: Signal<T>,
}

impl<T: Clone + 'static> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
            changed: Signal::new(),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change notification.
    ///
    /// Used to seed the initial value before anyone could be listening.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }

    /// The signal emitted with the new value after every effective change.
    pub fn changed(&self) -> &Signal<T> {
        &self.changed
    }

}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Set the value, returning `true` and notifying if the value changed.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let old = {
            let mut current = self.value.write();
            if *current == value {
                return None;
            }
            std::mem::replace(&mut *current, value.clone())
        };
        tracing::trace!(target: targets::PROPERTY, "property changed");
        self.changed.emit(value);
        Some(old)
    }
}

impl<T: Clone + Default + 'static> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .field("listeners", &self.changed.connection_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_property_basic() {
        let prop = Property::new(42);
        assert_eq!(prop.get(), 42);
    }

    #[test]
    fn test_property_set_detects_change() {
        let prop = Property::new(10);
        assert!(!prop.set(10));
        assert!(prop.set(20));
        assert_eq!(prop.get(), 20);
    }

    #[test]
    fn test_property_set_notifies_once_per_change() {
        let prop = Property::new(Some(1));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        prop.changed().connect(move |v| seen_clone.lock().push(*v));

        prop.set(Some(2));
        prop.set(Some(2));
        prop.set(None);

        assert_eq!(*seen.lock(), vec![Some(2), None]);
    }

    #[test]
    fn test_property_set_silent() {
        let prop = Property::new(String::from("a"));
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = hits.clone();
        prop.changed().connect(move |_| *hits_clone.lock() += 1);

        prop.set_silent("b".into());
        assert_eq!(prop.get(), "b");
        assert_eq!(*hits.lock(), 0);
    }

    #[test]
    fn test_property_replace() {
        let prop = Property::new(1);
        assert_eq!(prop.replace(1), None);
        assert_eq!(prop.replace(2), Some(1));
    }

    #[test]
    fn test_slot_can_read_property() {
        let prop = Arc::new(Property::new(0));
        let observed = Arc::new(Mutex::new(None));
        let (p, o) = (prop.clone(), observed.clone());
        prop.changed().connect(move |_| *o.lock() = Some(p.get()));

        prop.set(5);
        assert_eq!(*observed.lock(), Some(5));
    }
}
