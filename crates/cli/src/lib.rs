//! Command line support for U-Crating.
//!
//! This crate provides:
//! - JSON configuration parsing with defaults for missing fields
//! - Expression, geometry and bill of materials output files
//! - Parallel batch runs over many configurations

mod parser;
mod report;

pub use parser::{ConfigParser, ParseError};
pub use report::{
    batch_output_names, run_batch, save_bom_json, save_geometry_json, summary, write_expressions,
    BatchOutcome, GeometryExport,
};
