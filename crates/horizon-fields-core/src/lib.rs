//! Core systems for Horizon Fields.
//!
//! This crate provides the small observable layer that the formatted field
//! engines in `horizon-fields` publish into:
//!
//! - **Signal/Slot System**: Type-safe, direct change notification
//! - **Property System**: Value cells that notify on effective change
//! - **Logging**: `tracing` target and span name constants
//!
//! # Property Example
//!
//! ```
//! use horizon_fields_core::{Property, Signal};
//!
//! // A field value with its own change signal plus a separate commit signal
//! struct Field {
//!     value: Property<Option<i64>>,
//!     committed: Signal<()>,
//! }
//!
//! impl Field {
//!     fn new() -> Self {
//!         Self {
//!             value: Property::new(None),
//!             committed: Signal::new(),
//!         }
//!     }
//!
//!     fn commit(&self, parsed: Option<i64>) {
//!         if parsed.is_some() {
//!             self.value.set(parsed);
//!         }
//!         self.committed.emit(());
//!     }
//! }
//!
//! let field = Field::new();
//! field.commit(Some(7));
//! assert_eq!(field.value.get(), Some(7));
//! ```

pub mod logging;
pub mod property;
pub mod signal;

pub use property::Property;
pub use signal::{ConnectionId, Signal};
