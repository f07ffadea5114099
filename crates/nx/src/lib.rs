//! # U-Crating NX
//!
//! Expression synthesis for parametric CAD import.
//!
//! - [`generate_expressions`] turns a crate's block model into an [`ExpressionSet`]
//! - [`calculate_markings`] sizes logo, fragile and handling decals
//!
//! The rendered listing is one `NAME=VALUE` line per expression with `#`
//! comment lines. Real numbers are written with three decimals.

pub mod expression;
pub mod markings;
pub mod synthesizer;

// Re-exports
pub use expression::{
    parse_listing, Expression, ExpressionKind, ExpressionSet, ExpressionValue, ExpressionWriter,
};
pub use markings::{calculate_markings, Marking, MarkingSet, MarkingType, MARKINGS_PER_TYPE};
pub use synthesizer::{generate_expressions, seven_parameters, SevenParameters, ROUNDING_TOLERANCE};
