//! # U-Crating Layout
//!
//! Layout stages of the U-Crating pipeline.
//!
//! - **Skids**: weight-keyed cross-section, minimal count under a spacing limit
//! - **Floor**: symmetric outside-in board arrangement with custom center fill
//! - **Plywood**: grid tiling of panel faces with stock sheets and splice lines
//! - **Cleats**: perimeter, splice and intermediate cleats on each panel face
//!
//! Every stage is a pure function of its inputs and returns a fresh value.

pub mod cleat;
pub mod floor;
pub mod plywood;
pub mod skid;

// Re-exports
pub use cleat::{
    calculate_cleat_positions, Cleat, CleatKind, CleatMaterialSummary, CleatOptions,
    CleatOrientation, CleatPlacement,
};
pub use floor::{
    calculate_floor_boards, calculate_uniform_floor_boards, FloorBoard, FloorBoardKind,
    FloorConfiguration, FloorLayoutEngine,
};
pub use plywood::{
    calculate_crate_splicing, calculate_plywood_pieces, CutPiece, MaterialUsage, PlywoodLayout,
    PlywoodOptions, SheetPlacement, SpliceLine, SpliceOrientation,
};
pub use skid::{calculate_skid_configuration, skid_rule_for_weight, SkidConfiguration, SkidSize};
pub use u_crating_core::{Error, Result};
