//! # U-Crating Assembly
//!
//! Composes the layout stages into a single two-point block model of a crate.
//!
//! - [`CrateAssembler`] runs skids, floor, plywood and cleats for one configuration
//! - [`CrateGeometry`] holds every structural [`Block`] and the overall bounding box
//! - [`calculate_hardware`] places klimp clamps and lag screws
//! - [`build_bill_of_materials`] groups purchasable stock
//!
//! [`Block`]: u_crating_core::Block

pub mod assembler;
pub mod bom;
pub mod hardware;

// Re-exports
pub use assembler::{
    build_crate_geometry, CrateAssembler, CrateGeometry, PanelLayout, FLOORBOARD_SLOTS,
    PLYWOOD_SLOTS_PER_PANEL,
};
pub use bom::{build_bill_of_materials, BillOfMaterials, BomCategory, BomLine};
pub use hardware::{
    calculate_hardware, calculate_klimps, calculate_lag_screws, HardwareLayout, KlimpEdge,
    KlimpLayout, KlimpPlacement, LagScrew, LagScrewLayout, KLIMP_SLOTS,
};
