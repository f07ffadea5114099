//! # U-Crating Core
//!
//! Core types for the U-Crating parametric shipping-crate engine.
//!
//! This crate provides the foundational types shared between the layout,
//! assembly and expression crates.
//!
//! ## Core Components
//!
//! - **Configuration**: `CrateConfiguration` and the derived `CrateDimensions`
//! - **Lumber catalog**: static descending table and span-based selection
//! - **Block**: the two-point box primitive for every structural piece
//! - **Transforms**: panel-face frames and bounding boxes
//! - **Progress**: pipeline stages and progress callbacks
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod block;
pub mod config;
pub mod error;
pub mod lumber;
pub mod panel;
pub mod progress;
pub mod transform;

// Re-exports
pub use block::{Block, BlockKind, Point3};
pub use config::{
    Clearances, CleatMaterial, CleatProfile, CleatType, CrateConfiguration, CrateDimensions,
    LayoutOptions, LumberGrade, MarkingFlags, MaterialSelection, ProductDimensions, StockSheet,
    FLOORBOARD_THICKNESS, PRODUCT_DIMENSION_RANGE, PRODUCT_WEIGHT_RANGE,
};
pub use error::{Error, Result};
pub use lumber::{select_lumber_for_space, LumberCatalog, LumberSize, STANDARD_LUMBER};
pub use panel::{PanelDimensions, PanelFace, PerimeterStyle};
pub use progress::{ProgressCallback, ProgressInfo, Stage};
pub use transform::{BoundingBox, FaceFrame};
