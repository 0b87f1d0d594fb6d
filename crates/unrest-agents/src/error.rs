//! Error types for the unrest-agents crate.
//!
//! Decision rules are total and never fail. The only fallible operation in
//! this crate is building a legitimacy sampler from configured parameters.

/// Errors raised when legitimacy distribution parameters are unusable.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LegitimacyError {
    /// Uniform bounds are non-finite or reversed.
    #[error("uniform bounds are invalid: low={low}, high={high}")]
    InvalidBounds {
        /// Configured lower bound.
        low: f64,
        /// Configured upper bound.
        high: f64,
    },

    /// A distribution parameter is non-finite or outside its domain.
    #[error("{name} must be finite and {requirement} (got {value})")]
    InvalidParameter {
        /// Parameter name as it appears in configuration.
        name: &'static str,
        /// Human-readable domain constraint.
        requirement: &'static str,
        /// The rejected value.
        value: f64,
    },
}
