//! Error types for the formatted field engines.
//!
//! Only configuration problems ([`GrammarError`], [`MaskError`]) are meant to
//! reach the caller. [`VerifyError`] and [`ConvertError`] are produced inside
//! the engines and turned into "rejected" or "no change" outcomes there.

/// Result type alias for field operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the field engines.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Pattern grammar could not be derived.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// Group verifier failure.
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// Value conversion failure.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// Character mask configuration failure.
    #[error(transparent)]
    Mask(#[from] MaskError),
}

/// Errors raised while deriving a grammar from a pattern.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GrammarError {
    /// The pattern string was empty.
    #[error("Pattern is empty")]
    EmptyPattern,

    /// No registered group name occurs in the pattern.
    #[error("Pattern '{pattern}' contains no group placeholders")]
    NoGroups { pattern: String },

    /// The derived expression cannot partition the pattern back into its groups.
    #[error("Pattern '{pattern}' is ambiguous: {reason}")]
    AmbiguousGrammar { pattern: String, reason: String },

    /// The derived expression failed to compile.
    #[error("Derived expression for '{pattern}' is invalid: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl GrammarError {
    /// Create an ambiguity error.
    pub fn ambiguous(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AmbiguousGrammar {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by group verifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// The verifier does not implement the requested capability.
    #[error("Verifier does not support {operation}")]
    Unsupported { operation: &'static str },

    /// Group text could not be parsed into a sub-value.
    #[error("Cannot parse '{text}': {message}")]
    Parse { text: String, message: String },

    /// A sub-value could not be formatted.
    #[error("Cannot format value: {message}")]
    Format { message: String },

    /// A sub-value lies outside the verifier's range.
    #[error("Value {value} outside range [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },
}

impl VerifyError {
    /// Create an unsupported-capability error.
    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    /// Create a parse error.
    pub fn parse(text: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            text: text.into(),
            message: message.into(),
        }
    }

    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}

/// Errors raised by value converters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// The value could not be rendered in the requested context.
    #[error("Cannot format {type_name}: {message}")]
    Format {
        type_name: &'static str,
        message: String,
    },
}

impl ConvertError {
    /// Create a format error for type `T`.
    pub fn format<T: ?Sized>(message: impl Into<String>) -> Self {
        Self::Format {
            type_name: std::any::type_name::<T>(),
            message: message.into(),
        }
    }
}

/// Errors raised while building a character mask.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    /// The mask string was empty.
    #[error("Mask is empty")]
    EmptyMask,

    /// A conversion or required mask does not line up with the input mask.
    #[error("{which} mask has length {actual}, expected {expected}")]
    LengthMismatch {
        which: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Text could not be placed into the mask.
    #[error("Character '{ch}' rejected at position {position}")]
    Rejected { position: usize, ch: char },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = GrammarError::ambiguous("XY", "groups 'X' and 'Y' abut");
        assert_eq!(err.to_string(), "Pattern 'XY' is ambiguous: groups 'X' and 'Y' abut");

        let err = VerifyError::OutOfRange { value: 256, min: 0, max: 255 };
        assert_eq!(err.to_string(), "Value 256 outside range [0, 255]");
    }

    #[test]
    fn crate_error_wraps_sources() {
        let err: Error = MaskError::EmptyMask.into();
        assert!(matches!(err, Error::Mask(MaskError::EmptyMask)));
        assert_eq!(err.to_string(), "Mask is empty");
    }
}
