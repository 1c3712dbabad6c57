//! Horizon Fields - formatted text field engines.
//!
//! This crate holds the editing core of formatted text fields, without any
//! widget attached:
//!
//! - **Edit Engine** ([`edit`]): edits a typed value through a group pattern
//!   such as `"h.h.h.h"` or `"yyyy-MM-dd"`
//! - **Mask Engine** ([`mask`]): fixed-width character masks such as
//!   `"(999) 999-9999"`
//! - **Verifiers** ([`verifier`]): per-group validation, formatting and
//!   adjustment
//! - **Grammar** ([`grammar`]): derives and caches the expression that splits
//!   text into groups
//! - **Converters** ([`converter`]): typed values to text and back, with a
//!   registry keyed by type and context
//!
//! # Example
//!
//! ```
//! use horizon_fields::converter::TemporalConverter;
//! use horizon_fields::edit::EditEngine;
//! use horizon_fields::verifier::TemporalFieldVerifier;
//! use chrono::NaiveDate;
//!
//! let mut engine = EditEngine::builder("yyyy-MM-dd", TemporalConverter::<NaiveDate>::with_format("%Y-%m-%d"))
//!     .verifier("yyyy", TemporalFieldVerifier::<NaiveDate>::for_token("yyyy").unwrap())
//!     .verifier("MM", TemporalFieldVerifier::<NaiveDate>::for_token("MM").unwrap())
//!     .verifier("dd", TemporalFieldVerifier::<NaiveDate>::for_token("dd").unwrap())
//!     .value(NaiveDate::from_ymd_opt(2024, 1, 31))
//!     .build()
//!     .unwrap();
//!
//! engine.set_caret(5);
//! engine.increase_value();
//! assert_eq!(engine.text(), "2024-02-29");
//! ```

pub mod converter;
pub mod edit;
pub mod error;
pub mod grammar;
pub mod mask;
pub mod verifier;

pub use converter::{ConverterContext, ConverterRegistry, ValueConverter, global_registry};
pub use edit::{EditConfig, EditEngine, EditState};
pub use error::{ConvertError, Error, GrammarError, MaskError, Result, VerifyError};
pub use mask::{Mask, MaskEngine};
pub use verifier::{Adjustment, Capability, GroupValue, GroupVerifier};
