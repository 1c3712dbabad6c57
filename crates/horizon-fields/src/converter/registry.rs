//! Type- and context-keyed converter registry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use horizon_fields_core::logging::targets;
use parking_lot::{Once, RwLock};

use super::{
    ArrayConverter, BooleanConverter, ELEMENT_SEPARATOR, ColorConverter, ConverterContext, DeferredConverter,
    DisplayConverter, GeometryConverter, NumberConverter, StringConverter, TemporalConverter,
    ValueConverter, names,
};
use super::{Color, Dimension, Insets, Point, Rectangle};

/// Global registry instance.
static GLOBAL_REGISTRY: OnceLock<ConverterRegistry> = OnceLock::new();

/// Get the process-wide converter registry.
pub fn global_registry() -> &'static ConverterRegistry {
    GLOBAL_REGISTRY.get_or_init(ConverterRegistry::new)
}

/// An `Arc<dyn ValueConverter<T>>` with `T` erased.
type Erased = Box<dyn Any + Send + Sync>;

type Key = (TypeId, ConverterContext);

enum Entry {
    Ready(Erased),
    Deferred(Arc<dyn Fn() -> Erased + Send + Sync>),
}

fn erase<T: 'static>(converter: Arc<dyn ValueConverter<T>>) -> Erased {
    Box::new(converter)
}

fn downcast<T: 'static>(erased: &Erased) -> Option<Arc<dyn ValueConverter<T>>> {
    erased.downcast_ref::<Arc<dyn ValueConverter<T>>>().cloned()
}

/// Maps (type, context) pairs to converters.
///
/// Lookup order for a type `T` and context `c`:
///
/// 1. the entry for `(T, c)`; a deferred entry is initialized and replaced
///    (initialization runs without the registry lock held, so initializers
///    may use the registry themselves)
/// 2. the entry for `(T, default context)`, still called with `c`
/// 3. `Display`/`FromStr` on `T`
///
/// Built-in converters are registered on first use unless the registry was
/// created with [`without_defaults`](Self::without_defaults). Registrations
/// made afterwards replace them.
///
/// # Example
///
/// ```
/// use horizon_fields::converter::{BooleanConverter, ConverterContext, ConverterRegistry};
///
/// let registry = ConverterRegistry::new();
/// let ctx = ConverterContext::default();
/// assert_eq!(registry.to_text(Some(&true), &ctx), "True");
///
/// registry.register(ConverterContext::default(), BooleanConverter::with_labels("Yes", "No"));
/// assert_eq!(registry.to_text(Some(&true), &ctx), "Yes");
/// assert_eq!(registry.from_text::<bool>("no", &ctx), Some(false));
/// ```
pub struct ConverterRegistry {
    entries: RwLock<HashMap<Key, Entry>>,
    load_defaults: bool,
    defaults: Once,
}

impl ConverterRegistry {
    /// Create a registry with the built-in converters.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            load_defaults: true,
            defaults: Once::new(),
        }
    }

    /// Create an empty registry.
    pub fn without_defaults() -> Self {
        Self {
            load_defaults: false,
            ..Self::new()
        }
    }

    fn ensure_defaults(&self) {
        if self.load_defaults {
            self.defaults.call_once(|| self.register_defaults());
        }
    }

    fn insert(&self, key: Key, entry: Entry) {
        self.entries.write().insert(key, entry);
    }

    fn insert_ready<T: 'static>(&self, context: &str, converter: impl ValueConverter<T> + 'static) {
        let converter: Arc<dyn ValueConverter<T>> = Arc::new(converter);
        self.insert(
            (TypeId::of::<T>(), ConverterContext::new(context)),
            Entry::Ready(erase(converter)),
        );
    }

    /// Register a converter for `T` under `context`.
    pub fn register<T: 'static>(
        &self,
        context: impl Into<ConverterContext>,
        converter: impl ValueConverter<T> + 'static,
    ) {
        self.ensure_defaults();
        let context = context.into();
        tracing::debug!(
            target: targets::CONVERTER,
            type_name = std::any::type_name::<T>(),
            context = %context,
            "registered converter"
        );
        let converter: Arc<dyn ValueConverter<T>> = Arc::new(converter);
        self.insert((TypeId::of::<T>(), context), Entry::Ready(erase(converter)));
    }

    /// Register a converter that is completed on its first lookup.
    pub fn register_deferred<T: 'static, D: DeferredConverter<T>>(
        &self,
        context: impl Into<ConverterContext>,
        deferred: D,
    ) {
        self.ensure_defaults();
        let init = move || {
            let ready: Arc<dyn ValueConverter<T>> = Arc::new(deferred.initialize());
            erase(ready)
        };
        self.insert((TypeId::of::<T>(), context.into()), Entry::Deferred(Arc::new(init)));
    }

    /// Remove the converter for `T` under `context`. Returns whether one was
    /// registered.
    pub fn unregister<T: 'static>(&self, context: &ConverterContext) -> bool {
        self.ensure_defaults();
        self.entries
            .write()
            .remove(&(TypeId::of::<T>(), context.clone()))
            .is_some()
    }

    /// Whether a converter is registered for exactly `T` and `context`.
    pub fn contains<T: 'static>(&self, context: &ConverterContext) -> bool {
        self.ensure_defaults();
        self.entries
            .read()
            .contains_key(&(TypeId::of::<T>(), context.clone()))
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.ensure_defaults();
        self.entries.read().len()
    }

    /// Whether no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn resolve<T: 'static>(&self, key: &Key) -> Option<Arc<dyn ValueConverter<T>>> {
        let init = match self.entries.read().get(key)? {
            Entry::Ready(erased) => return downcast(erased),
            Entry::Deferred(init) => Arc::clone(init),
        };

        tracing::debug!(
            target: targets::CONVERTER,
            type_name = std::any::type_name::<T>(),
            context = %key.1,
            "initializing deferred converter"
        );
        let erased = init();

        let mut entries = self.entries.write();
        match entries.get(key) {
            // Another thread finished first.
            Some(Entry::Ready(existing)) => downcast(existing),
            Some(Entry::Deferred(pending)) if Arc::ptr_eq(pending, &init) => {
                let converter = downcast(&erased);
                entries.insert(key.clone(), Entry::Ready(erased));
                converter
            }
            // Unregistered or replaced while initializing; the result is not stored.
            _ => downcast(&erased),
        }
    }

    /// Find the converter for `T` in `context`, falling back to the default
    /// context.
    pub fn lookup<T: 'static>(&self, context: &ConverterContext) -> Option<Arc<dyn ValueConverter<T>>> {
        self.ensure_defaults();
        let type_id = TypeId::of::<T>();
        self.resolve(&(type_id, context.clone())).or_else(|| {
            if context.is_default() {
                None
            } else {
                self.resolve(&(type_id, ConverterContext::default()))
            }
        })
    }

    /// Render `value`. `None` is the empty string; a converter failure is
    /// logged and replaced by the `Display` form.
    pub fn to_text<T: Display + 'static>(&self, value: Option<&T>, context: &ConverterContext) -> String {
        let Some(value) = value else {
            return String::new();
        };
        match self.lookup::<T>(context) {
            Some(converter) => converter.to_text(value, context).unwrap_or_else(|err| {
                tracing::warn!(target: targets::CONVERTER, context = %context, error = %err, "converter failed, using Display");
                value.to_string()
            }),
            None => value.to_string(),
        }
    }

    /// Parse `text`. Blank text and text no strategy understands are `None`.
    pub fn from_text<T: FromStr + 'static>(&self, text: &str, context: &ConverterContext) -> Option<T> {
        if text.trim().is_empty() {
            return None;
        }
        match self.lookup::<T>(context) {
            Some(converter) => converter.from_text(text, context),
            None => text.trim().parse().ok(),
        }
    }

    fn array_converter<T>(&self, context: &ConverterContext) -> Arc<dyn ValueConverter<Vec<T>>>
    where
        T: Display + FromStr + 'static,
    {
        if let Some(converter) = self.lookup::<Vec<T>>(context) {
            return converter;
        }
        let element: Arc<dyn ValueConverter<T>> = match self.lookup::<T>(context) {
            Some(element) => element,
            None => Arc::new(DisplayConverter::<T>::new()),
        };
        let array: Arc<dyn ValueConverter<Vec<T>>> = Arc::new(ArrayConverter::new(element));
        tracing::debug!(
            target: targets::CONVERTER,
            type_name = std::any::type_name::<T>(),
            context = %context,
            "registered array converter"
        );
        self.insert(
            (TypeId::of::<Vec<T>>(), context.clone()),
            Entry::Ready(erase(Arc::clone(&array))),
        );
        array
    }

    /// Render a sequence, elements joined by `"; "`.
    pub fn to_text_array<T>(&self, values: Option<&Vec<T>>, context: &ConverterContext) -> String
    where
        T: Display + FromStr + 'static,
    {
        let Some(values) = values else {
            return String::new();
        };
        self.array_converter::<T>(context)
            .to_text(values, context)
            .unwrap_or_else(|err| {
                tracing::warn!(target: targets::CONVERTER, context = %context, error = %err, "array converter failed, using Display");
                values
                    .iter()
                    .map(T::to_string)
                    .collect::<Vec<_>>()
                    .join(ELEMENT_SEPARATOR)
            })
    }

    /// Parse a sequence. Blank text is an empty sequence.
    pub fn from_text_array<T>(&self, text: &str, context: &ConverterContext) -> Option<Vec<T>>
    where
        T: Display + FromStr + 'static,
    {
        self.array_converter::<T>(context).from_text(text, context)
    }

    fn register_defaults(&self) {
        const FRACTIONS: [&str; 5] = ["Fraction0", "Fraction1", "Fraction2", "Fraction3", "Fraction4"];

        self.insert_ready::<String>(names::DEFAULT, StringConverter);
        self.insert_ready::<bool>(names::DEFAULT, BooleanConverter::new());

        macro_rules! display {
            ($($ty:ty),+) => {
                $(self.insert_ready::<$ty>(names::DEFAULT, DisplayConverter::<$ty>::new());)+
            };
        }
        display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, char, Ipv4Addr, Ipv6Addr);

        for context in [names::DEFAULT, names::PERCENT, names::CURRENCY].into_iter().chain(FRACTIONS) {
            self.insert_ready::<f64>(context, NumberConverter::new());
            self.insert_ready::<f32>(context, NumberConverter::new());
        }

        for context in [names::DEFAULT, names::SHORT, names::MEDIUM, names::LONG] {
            self.insert_ready::<NaiveDate>(context, TemporalConverter::<NaiveDate>::new());
            self.insert_ready::<NaiveDateTime>(context, TemporalConverter::<NaiveDateTime>::new());
        }
        self.insert_ready::<NaiveTime>(names::DEFAULT, TemporalConverter::<NaiveTime>::new());
        self.insert_ready::<NaiveTime>(names::TIME, TemporalConverter::<NaiveTime>::new());
        self.insert_ready::<NaiveDateTime>(names::DATE_TIME, TemporalConverter::<NaiveDateTime>::new());

        self.insert_ready::<Point>(names::DEFAULT, GeometryConverter::<Point>::new());
        self.insert_ready::<Dimension>(names::DEFAULT, GeometryConverter::<Dimension>::new());
        self.insert_ready::<Rectangle>(names::DEFAULT, GeometryConverter::<Rectangle>::new());
        self.insert_ready::<Insets>(names::DEFAULT, GeometryConverter::<Insets>::new());
        self.insert_ready::<Color>(names::DEFAULT, ColorConverter::new());

        tracing::debug!(
            target: targets::CONVERTER,
            count = self.entries.read().len(),
            "registered default converters"
        );
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("entries", &self.entries.read().len())
            .field("load_defaults", &self.load_defaults)
            .finish()
    }
}

static_assertions::assert_impl_all!(ConverterRegistry: Send, Sync);
