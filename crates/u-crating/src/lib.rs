//! # U-Crating
//!
//! Parametric shipping-crate design engine.
//!
//! Turns a product envelope, weight and material choices into:
//! - **Geometry**: every skid, floor board, plywood piece and cleat as a two-point box
//! - **Expressions**: a deterministic NX expression listing for CAD import
//! - **Bill of materials**: grouped purchasable stock
//!
//! ## Quick Start
//!
//! ```rust
//! use u_crating::{CrateConfiguration, CratePipeline};
//!
//! let config = CrateConfiguration::new()
//!     .with_product(48.0, 40.0, 40.0)
//!     .with_weight(500.0);
//!
//! let design = CratePipeline::new().run(&config)?;
//! assert_eq!(design.geometry.skid_layout.size.nominal, "4x4");
//! println!("{}", design.expressions.text);
//! # Ok::<(), u_crating::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support for configurations and every output

pub mod pipeline;

/// Configuration, blocks, catalogs and errors.
pub use u_crating_core as core;

/// Skid, floor, plywood and cleat layout.
pub use u_crating_layout as layout;

/// Geometry assembly, hardware and bill of materials.
pub use u_crating_assembly as assembly;

/// NX expression synthesis.
pub use u_crating_nx as nx;

// Re-export commonly used types at root level
pub use pipeline::{design_crate, CrateDesign, CratePipeline};
pub use u_crating_assembly::{BillOfMaterials, CrateGeometry, HardwareLayout};
pub use u_crating_core::{
    Block, BlockKind, CrateConfiguration, Error, PanelFace, ProgressCallback, ProgressInfo,
    Result, Stage,
};
pub use u_crating_nx::{ExpressionSet, MarkingSet};
