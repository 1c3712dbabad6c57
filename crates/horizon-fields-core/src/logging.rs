//! Logging facilities for Horizon Fields.
//!
//! Horizon Fields uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_fields::edit=trace,horizon_fields::grammar=debug")
//!         .init();
//! }
//! ```
//!
//! The [`targets`] constants name each subsystem so that filters can be
//! written without guessing module paths.

/// Span names used throughout Horizon Fields for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Grammar derivation span.
    pub const GRAMMAR_COMPILE: &str = "horizon_fields::grammar::compile";
    /// Commit of displayed text into a typed value.
    pub const COMMIT: &str = "horizon_fields::edit::commit";
    /// Value adjustment (spinner step) span.
    pub const ADJUST: &str = "horizon_fields::edit::adjust";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_fields_core::signal";
    /// Property system target.
    pub const PROPERTY: &str = "horizon_fields_core::property";
    /// Grammar derivation and caching.
    pub const GRAMMAR: &str = "horizon_fields::grammar";
    /// Pattern edit engine.
    pub const EDIT: &str = "horizon_fields::edit";
    /// Character mask engine.
    pub const MASK: &str = "horizon_fields::mask";
    /// Value converters and the converter registry.
    pub const CONVERTER: &str = "horizon_fields::converter";
    /// Performance spans.
    pub const PERF: &str = "horizon_fields::perf";
}

/// A guard for timing a section of work.
///
/// Creates a tracing span on construction that closes when dropped, so the
/// duration shows up in any subscriber that records span timings.
///
/// # Example
///
/// ```ignore
/// use horizon_fields_core::logging::PerfSpan;
///
/// fn compile() {
///     let _span = PerfSpan::new("compile");
///     // ... work ...
/// } // Span ends here
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_are_prefixed_by_crate() {
        for target in [targets::GRAMMAR, targets::EDIT, targets::MASK, targets::CONVERTER] {
            assert!(target.starts_with("horizon_fields::"));
        }
        for target in [targets::SIGNAL, targets::PROPERTY] {
            assert!(target.starts_with("horizon_fields_core::"));
        }
    }

    #[test]
    fn perf_span_without_subscriber() {
        let span = PerfSpan::new("noop");
        drop(span);
    }
}
