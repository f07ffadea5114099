//! Output files and summaries for a crate design.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use u_crating::core::BoundingBox;
use u_crating::{design_crate, Block, CrateDesign};

use crate::parser::ConfigParser;

/// Geometry file contents: structural blocks, hardware envelopes and bounds.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryExport<'a> {
    /// Structural blocks in output order, placeholders included.
    pub blocks: Vec<&'a Block>,
    /// Klimp and lag screw envelopes.
    pub hardware: &'a [Block],
    /// Overall bounding box.
    pub bounds: &'a BoundingBox,
}

impl<'a> GeometryExport<'a> {
    /// Collects the geometry of a design.
    pub fn new(design: &'a CrateDesign) -> Self {
        Self {
            blocks: design.geometry.blocks().collect(),
            hardware: &design.hardware.blocks,
            bounds: &design.geometry.bounds,
        }
    }
}

/// Writes the expression listing.
pub fn write_expressions(design: &CrateDesign, path: impl AsRef<Path>) -> io::Result<()> {
    fs::write(path, &design.expressions.text)
}

/// Writes the geometry as pretty JSON.
pub fn save_geometry_json(design: &CrateDesign, path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&GeometryExport::new(design))?;
    fs::write(path, json)
}

/// Writes the bill of materials as pretty JSON.
pub fn save_bom_json(design: &CrateDesign, path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&design.bom)?;
    fs::write(path, json)
}

/// Human readable summary of a design.
pub fn summary(design: &CrateDesign) -> String {
    let g = &design.geometry;
    let d = &g.dimensions;
    let mut lines = vec![
        format!(
            "Overall: {:.3} W x {:.3} L x {:.3} H in",
            d.overall_width, d.overall_length, d.overall_height
        ),
        format!(
            "Skids: {} x {} @ {:.3} in{}",
            g.skid_layout.count,
            g.skid_layout.size.nominal,
            g.skid_layout.spacing,
            if g.skid_layout.requires_rub_strips { " (rub strips)" } else { "" }
        ),
        format!(
            "Floor: {} lumber, {} custom{}",
            g.floor_layout.lumber_count(),
            g.floor_layout.custom_count(),
            if g.floor_layout.uniform { " (uniform)" } else { "" }
        ),
    ];
    for panel in &g.panels {
        lines.push(format!(
            "{:<16} {:>7.2} x {:<7.2} sheets={} splices={} cleats={}",
            panel.face.name(),
            panel.dimensions.width,
            panel.dimensions.height,
            panel.plywood.sheet_count,
            panel.plywood.splices.len(),
            panel.cleats.cleats.len()
        ));
    }
    lines.push(format!(
        "Plywood: {} sheets, {:.1}% efficiency",
        design.material_usage.total_sheets,
        design.material_usage.efficiency * 100.0
    ));
    lines.push(format!(
        "Hardware: {} klimps, {} lag screws",
        design.hardware.klimps.count(),
        design.hardware.lag_screws.count()
    ));
    lines.push(format!(
        "Blocks: {} ({} active), expressions: {}",
        g.block_count(),
        g.active_blocks().count(),
        design.expressions.len()
    ));
    lines.join("\n")
}

/// Result of one configuration in a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Input configuration file.
    pub input: PathBuf,
    /// Written expression file, or the error message.
    pub output: Result<PathBuf, String>,
}

impl BatchOutcome {
    /// Returns true if the run produced an expression file.
    pub fn is_ok(&self) -> bool {
        self.output.is_ok()
    }
}

fn run_one(input: &Path, path: PathBuf) -> Result<PathBuf, String> {
    let config = ConfigParser::new().parse_file(input).map_err(|e| e.to_string())?;
    let design = design_crate(&config).map_err(|e| e.to_string())?;
    write_expressions(&design, &path).map_err(|e| e.to_string())?;
    Ok(path)
}

fn file_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "crate".to_string())
}

/// Output file names for a batch, one per input.
///
/// A stem used by a single input keeps its name. Shared stems are numbered
/// by input position (`crate-1`, `crate-3`), skipping names already taken.
pub fn batch_output_names(inputs: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = inputs.iter().map(|p| file_stem(p)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for stem in &stems {
        *counts.entry(stem.as_str()).or_default() += 1;
    }

    let mut taken: HashSet<String> = stems
        .iter()
        .filter(|s| counts[s.as_str()] == 1)
        .cloned()
        .collect();
    stems
        .iter()
        .enumerate()
        .map(|(i, stem)| {
            if counts[stem.as_str()] == 1 {
                return stem.clone();
            }
            let mut n = i + 1;
            let mut name = format!("{}-{}", stem, n);
            while taken.contains(&name) {
                n += inputs.len();
                name = format!("{}-{}", stem, n);
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Designs every configuration in parallel and writes one `.exp` file each.
///
/// Runs are independent; one failing input does not affect the others, and
/// inputs sharing a file stem never write the same output file.
pub fn run_batch(inputs: &[PathBuf], out_dir: &Path) -> io::Result<Vec<BatchOutcome>> {
    fs::create_dir_all(out_dir)?;
    let names = batch_output_names(inputs);
    let outcomes: Vec<BatchOutcome> = inputs
        .par_iter()
        .zip(names.par_iter())
        .map(|(input, name)| BatchOutcome {
            input: input.clone(),
            output: run_one(input, out_dir.join(format!("{}.exp", name))),
        })
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    if failed > 0 {
        log::warn!("{} of {} configurations failed", failed, outcomes.len());
    }
    Ok(outcomes)
}
