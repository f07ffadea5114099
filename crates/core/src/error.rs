//! Error types for U-Crating.

use crate::progress::Stage;
use thiserror::Error;

/// Result type alias for U-Crating operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while laying out or serializing a crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-positive or non-finite input; raised before any layout stage runs.
    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfiguration {
        /// Dotted path of the offending field (e.g. `product.width`).
        field: String,
        /// Human readable reason.
        reason: String,
    },

    /// A stage cannot satisfy its structural invariant with the given catalog.
    #[error("Layout infeasible in {stage} stage (span {span:.3}in): {reason}")]
    LayoutInfeasible {
        /// Stage that failed.
        stage: Stage,
        /// The span (inches) the stage was asked to cover.
        span: f64,
        /// Human readable reason.
        reason: String,
    },

    /// A derived spacing exceeds its configured maximum.
    #[error("Spacing violation in {context}: {spacing:.3}in exceeds maximum {max:.3}in")]
    SpacingViolation {
        /// Where the violation was detected (e.g. `FRONT_PANEL vertical cleats`).
        context: String,
        /// The offending spacing.
        spacing: f64,
        /// The configured maximum.
        max: f64,
    },

    /// Two-point and 7-parameter expression forms disagree for a piece.
    #[error(
        "Serialization mismatch for {name}_{parameter}: expected {expected:.6}, got {actual:.6}"
    )]
    SerializationMismatch {
        /// Block name.
        name: String,
        /// Parameter suffix (e.g. `WIDTH`).
        parameter: &'static str,
        /// Value derived from the two-point form.
        expected: f64,
        /// Value written in the 7-parameter form.
        actual: f64,
    },

    /// Computation cancelled.
    #[error("Computation cancelled")]
    Cancelled,
}

impl Error {
    /// Shorthand for [`Error::InvalidConfiguration`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::LayoutInfeasible`].
    pub fn infeasible(stage: Stage, span: f64, reason: impl Into<String>) -> Self {
        Self::LayoutInfeasible {
            stage,
            span,
            reason: reason.into(),
        }
    }

    /// Returns true if the caller can recover by adjusting the input and retrying.
    ///
    /// Spacing and serialization failures are internal invariant violations and
    /// only abort the current run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. } | Self::LayoutInfeasible { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::invalid("product.width", "must be positive").is_recoverable());
        assert!(Error::infeasible(Stage::Floor, 1.0, "too narrow").is_recoverable());
        assert!(!Error::Cancelled.is_recoverable());
        assert!(!Error::SpacingViolation {
            context: "skids".into(),
            spacing: 31.0,
            max: 30.0,
        }
        .is_recoverable());
    }

    #[test]
    fn test_display_carries_context() {
        let err = Error::infeasible(Stage::Floor, 1.25, "below minimum custom width");
        let text = err.to_string();
        assert!(text.contains("floor"));
        assert!(text.contains("1.250"));

        let err = Error::invalid("product.weight", "must be finite");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: product.weight: must be finite"
        );
    }
}
