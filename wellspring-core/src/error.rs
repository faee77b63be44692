//! Error types for Wellspring generation.

use thiserror::Error;

/// Main error type for generation failures.
///
/// Every error surfaces to the calling trial and fails it; the engine never
/// retries or swallows an error on its own. The one internal retry budget
/// (distinct-element draws for sets and maps) is documented on the methods
/// that use it and ends in [`SourceError::ElementExhaustion`] when spent.
#[derive(Error, Debug)]
pub enum SourceError {
    /// A supplied `(min, max)` pair has `min > max`, a multi-range list is
    /// empty or contains an invalid sub-range, or a draw was requested from
    /// an empty collection.
    #[error("invalid range: {message}")]
    InvalidRange { message: String },

    /// Interval frames were still open when the trial finished.
    ///
    /// This is a bug in a custom generator, not a test failure: some
    /// `push_interval` was never matched by a `pop_interval`. The inverse
    /// mistake, popping with no open frame, panics at the call site.
    #[error("{open_frames} interval frame(s) left open at end of trial")]
    IntervalStackViolation { open_frames: usize },

    /// Structural construction found no descriptor it could satisfy for the
    /// requested type.
    #[error("no usable constructor for `{type_name}`")]
    NoUsableConstructor { type_name: &'static str },

    /// A selected constructor failed: either one of its arguments could not
    /// be generated (`param` names which one) or the factory itself returned
    /// an error (`param` is `None`).
    #[error("failed to construct `{type_name}`{}: {message}", fmt_param(.param))]
    ReflectiveConstruction {
        type_name: &'static str,
        param: Option<usize>,
        message: String,
    },

    /// A set or map could not reach its minimum distinct size within the
    /// retry budget.
    #[error("wanted at least {wanted} distinct elements, only found {got}")]
    ElementExhaustion { wanted: usize, got: usize },
}

impl SourceError {
    pub(crate) fn invalid_range(message: impl Into<String>) -> Self {
        SourceError::InvalidRange {
            message: message.into(),
        }
    }
}

fn fmt_param(param: &Option<usize>) -> String {
    match param {
        Some(index) => format!(" (parameter {index})"),
        None => String::new(),
    }
}

/// Result type for Wellspring operations.
pub type Result<T> = std::result::Result<T, SourceError>;
