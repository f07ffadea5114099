//! NX expression synthesis.
//!
//! Walks the unified block model and writes one expression listing per crate.
//! Every active block contributes its two corners (`_X1.._Z2`); plywood and
//! cleat pieces also carry the base-corner-plus-extent form, which is checked
//! against the corners before it is written. Suppressed slots keep their name
//! and are written as a single `_SUPPRESSED=TRUE` marker.
//!
//! Hardware and markings are written as counts, spacings and instance scalars
//! only. Their solids come from external CAD assets.

use crate::expression::{ExpressionKind, ExpressionSet, ExpressionValue, ExpressionWriter};
use crate::markings::MarkingSet;
use u_crating_assembly::{
    CrateGeometry, HardwareLayout, KlimpEdge, FLOORBOARD_SLOTS, PLYWOOD_SLOTS_PER_PANEL,
};
use u_crating_core::{Block, BlockKind, CrateDimensions, Error, FaceFrame, PanelFace, Result};
use u_crating_layout::{MaterialUsage, SpliceOrientation};

/// Largest disagreement allowed between a rounded extent and the difference
/// of its rounded corners (three roundings of half a unit in the last place).
pub const ROUNDING_TOLERANCE: f64 = 0.0015;

/// Tolerance for the panel-normal thickness check.
const THICKNESS_TOLERANCE: f64 = 1e-6;

const TWO_POINT_SUFFIXES: [&str; 6] = ["X1", "Y1", "Z1", "X2", "Y2", "Z2"];

/// Base corner plus extents of a panel piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SevenParameters {
    /// Base corner X.
    pub x: f64,
    /// Base corner Y.
    pub y: f64,
    /// Base corner Z.
    pub z: f64,
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub length: f64,
    /// Extent along Z.
    pub height: f64,
    /// Extent along the owning panel's normal.
    pub thickness: f64,
}

impl SevenParameters {
    fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("X", self.x),
            ("Y", self.y),
            ("Z", self.z),
            ("WIDTH", self.width),
            ("LENGTH", self.length),
            ("HEIGHT", self.height),
            ("THICKNESS", self.thickness),
        ]
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Derives and checks the 7-parameter form of a plywood or cleat block.
///
/// # Arguments
///
/// * `block` - An active plywood or cleat block with a panel name
/// * `dims` - Crate dimensions the block was placed with
/// * `expected_thickness` - Plywood or cleat thickness for the block kind
///
/// # Returns
///
/// The seven parameters, or [`Error::SerializationMismatch`] if the panel
/// thickness or any rounded extent disagrees with the two-point corners.
pub fn seven_parameters(
    block: &Block,
    dims: &CrateDimensions,
    expected_thickness: f64,
) -> Result<SevenParameters> {
    let face = block
        .panel_name
        .as_deref()
        .and_then(PanelFace::from_name)
        .ok_or_else(|| Error::SerializationMismatch {
            name: block.name.clone(),
            parameter: "THICKNESS",
            expected: expected_thickness,
            actual: f64::NAN,
        })?;

    let thickness = FaceFrame::for_face(face, dims).normal_extent(block);
    if (thickness - expected_thickness).abs() > THICKNESS_TOLERANCE {
        return Err(Error::SerializationMismatch {
            name: block.name.clone(),
            parameter: "THICKNESS",
            expected: expected_thickness,
            actual: thickness,
        });
    }

    let (p1, p2) = (block.point1, block.point2);
    let params = SevenParameters {
        x: p1.x,
        y: p1.y,
        z: p1.z,
        width: block.width(),
        length: block.length(),
        height: block.height(),
        thickness,
    };

    let extents = [
        ("WIDTH", p1.x, p2.x, params.width),
        ("LENGTH", p1.y, p2.y, params.length),
        ("HEIGHT", p1.z, p2.z, params.height),
    ];
    for (parameter, lo, hi, extent) in extents {
        let expected = round3(hi) - round3(lo);
        let actual = round3(extent);
        if (expected - actual).abs() > ROUNDING_TOLERANCE + 1e-9 {
            return Err(Error::SerializationMismatch {
                name: block.name.clone(),
                parameter,
                expected,
                actual,
            });
        }
    }

    Ok(params)
}

fn edge_label(edge: KlimpEdge) -> &'static str {
    match edge {
        KlimpEdge::Top => "top",
        KlimpEdge::Left => "left",
        KlimpEdge::Right => "right",
    }
}

fn write_header(
    w: &mut ExpressionWriter,
    geometry: &CrateGeometry,
    usage: &MaterialUsage,
    hardware: &HardwareLayout,
) {
    let floor_active = geometry.floorboards.iter().filter(|b| b.is_active()).count();
    w.comment("NX expressions for a parametric shipping crate");
    w.comment("Coordinate system: X=width, Y=length (front 0, back negative), Z=height");
    w.comment("Origin at the front-bottom-center of the footprint; all values in inches");
    w.comment("");
    w.comment("PLYWOOD:");
    w.comment(format!("- Total plywood sheets required: {}", usage.total_sheets));
    w.comment(format!("- Material efficiency: {:.1}%", usage.efficiency * 100.0));
    w.comment("");
    w.comment("SKIDS:");
    w.comment("- Create one SKID at the leftmost position and pattern it along X");
    w.comment("- Count: pattern_count, spacing: pattern_spacing (center-to-center)");
    w.comment("");
    w.comment("KLIMPS:");
    w.comment(format!(
        "- Active instances: {} of {}",
        hardware.klimps.count(),
        hardware.klimps.slots()
    ));
    w.comment("");
    w.comment("LAG SCREWS:");
    w.comment(format!("- Total lag screws: {}", hardware.lag_screws.count()));
    w.comment("");
    w.comment("FLOORBOARDS:");
    w.comment(format!(
        "- Active floorboards: {} of {} slots",
        floor_active,
        FLOORBOARD_SLOTS.max(geometry.floorboards.len())
    ));
    w.comment("");
}

fn write_dimensions(w: &mut ExpressionWriter, dims: &CrateDimensions) {
    let product = dims.product;
    w.comment("Product and crate dimensions");
    w.scalar("product_length", product.length);
    w.scalar("product_width", product.width);
    w.scalar("product_height", product.height);
    w.scalar("product_weight", product.weight);
    w.scalar("clearance_side", (dims.internal_width - product.width) / 2.0);
    w.scalar("clearance_end", (dims.internal_length - product.length) / 2.0);
    w.scalar("clearance_top", dims.internal_height - product.height);
    w.scalar("internal_width", dims.internal_width);
    w.scalar("internal_length", dims.internal_length);
    w.scalar("internal_height", dims.internal_height);
    w.scalar("overall_width", dims.overall_width);
    w.scalar("overall_length", dims.overall_length);
    w.scalar("overall_height", dims.overall_height);
    w.scalar("plywood_thickness", dims.plywood_thickness);
    w.scalar("cleat_thickness", dims.cleat_thickness);
    w.scalar("panel_thickness", dims.panel_thickness);
    w.scalar("skid_height", dims.skid_height);
    w.scalar("floorboard_thickness", dims.floorboard_thickness);
    w.blank();
}

fn write_skids_and_floor(w: &mut ExpressionWriter, geometry: &CrateGeometry) {
    let skids = &geometry.skid_layout;
    w.comment("Skids");
    w.scalar("skid_nominal", skids.size.nominal);
    w.scalar("skid_width", skids.size.width);
    w.scalar("skid_length", skids.length);
    w.scalar("pattern_count", skids.count);
    w.scalar("pattern_spacing", skids.spacing);
    w.scalar("skid_max_spacing", skids.max_spacing);
    w.scalar("skid_first_x", skids.positions.first().copied().unwrap_or(0.0));
    w.scalar("rub_strips_required", skids.requires_rub_strips);
    w.scalar("rub_strip_count", skids.rub_strip_count());
    w.blank();

    let floor = &geometry.floor_layout;
    w.comment("Floorboards");
    w.scalar("floorboard_count", floor.boards.len());
    w.scalar("floorboard_lumber_count", floor.lumber_count());
    w.scalar("floorboard_custom_count", floor.custom_count());
    w.scalar("floorboard_slots", geometry.floorboards.len());
    w.scalar("floor_usable_width", floor.usable_width);
    w.scalar("floor_gap_total", floor.gap_total());
    w.blank();
}

fn write_panels(w: &mut ExpressionWriter, geometry: &CrateGeometry, usage: &MaterialUsage) {
    w.comment("Plywood splicing and cleats");
    for panel in &geometry.panels {
        let name = panel.face.name();
        let plywood = &panel.plywood;
        w.comment(format!(
            "{}: {:.1}\" x {:.1}\", {} sheet(s), {} splice(s)",
            name,
            plywood.panel_width,
            plywood.panel_height,
            plywood.sheet_count,
            plywood.splices.len()
        ));
        w.scalar(format!("{}_SHEETS", name), plywood.sheet_count);
        w.scalar(format!("{}_PIECES", name), plywood.sheets.len());
        w.scalar(format!("{}_SPLICES", name), plywood.splices.len());
        for (i, splice) in plywood.splices.iter().enumerate() {
            let orientation = match splice.orientation {
                SpliceOrientation::Vertical => "vertical",
                SpliceOrientation::Horizontal => "horizontal",
            };
            w.scalar(format!("{}_SPLICE_{}_ORIENTATION", name, i + 1), orientation);
            w.scalar(format!("{}_SPLICE_{}_POS", name, i + 1), splice.position);
        }
        w.scalar(format!("{}_CLEATS", name), panel.cleats.cleats.len());
        if panel.plywood.sheets.len() > PLYWOOD_SLOTS_PER_PANEL {
            w.comment(format!(
                "{} uses {} pieces; template has {} slots",
                name,
                panel.plywood.sheets.len(),
                PLYWOOD_SLOTS_PER_PANEL
            ));
        }
    }
    w.scalar("total_plywood_sheets", usage.total_sheets);
    w.scalar("plywood_efficiency", usage.efficiency * 100.0);

    let linear_inches: f64 = geometry.panels.iter().map(|p| p.cleats.linear_inches()).sum();
    let cleat_count: usize = geometry.panels.iter().map(|p| p.cleats.cleats.len()).sum();
    w.scalar("cleat_count", cleat_count);
    w.scalar("cleat_linear_feet", linear_inches / 12.0);
    w.blank();
}

fn write_hardware(w: &mut ExpressionWriter, hardware: &HardwareLayout) {
    let klimps = &hardware.klimps;
    w.comment("Klimp spring clamps");
    w.scalar("klimp_count", klimps.count());
    w.scalar("klimp_top_count", klimps.top_count);
    w.scalar("klimp_left_count", klimps.side_count);
    w.scalar("klimp_right_count", klimps.side_count);
    w.scalar("klimp_top_spacing", klimps.top_spacing);
    w.scalar("klimp_side_spacing", klimps.side_spacing);
    w.scalar("klimp_instances_total", klimps.slots());
    w.scalar("klimp_instances_active", klimps.count());
    w.scalar("klimp_packages", klimps.packages());

    for i in 0..klimps.slots() {
        let prefix = format!("KLIMP_{}", i + 1);
        match klimps.placements.get(i) {
            Some(k) => {
                w.scalar(format!("{}_ACTIVE", prefix), true);
                w.scalar(format!("{}_EDGE", prefix), edge_label(k.edge));
                w.scalar(format!("{}_POS_X", prefix), k.position.x);
                w.scalar(format!("{}_POS_Y", prefix), k.position.y);
                w.scalar(format!("{}_POS_Z", prefix), k.position.z);
                w.scalar(format!("{}_ROT_X", prefix), ExpressionValue::Angle(0.0));
                w.scalar(format!("{}_ROT_Y", prefix), ExpressionValue::Angle(k.rotation));
                w.scalar(format!("{}_ROT_Z", prefix), ExpressionValue::Angle(0.0));
            }
            None => w.scalar(format!("{}_ACTIVE", prefix), false),
        }
    }
    w.blank();

    let lags = &hardware.lag_screws;
    w.comment("Lag screws (3/8\" x 2.50\")");
    w.scalar("lag_screw_count", lags.count());
    w.scalar("lag_screw_max_spacing", lags.max_spacing);
    for face in PanelFace::ALL.iter().filter(|f| f.receives_lag_screws()) {
        w.scalar(format!("{}_LAG_SCREWS", face.name()), lags.count_for(*face));
    }
    w.blank();
}

fn write_markings(w: &mut ExpressionWriter, markings: &MarkingSet) {
    w.comment("Markings and decals");
    for marking in &markings.markings {
        let key = marking.kind.key();
        w.scalar(format!("{}_count", key), marking.count);
        w.scalar(format!("{}_width", key), marking.width);
        w.scalar(format!("{}_height", key), marking.height);
    }
    w.scalar("marking_total_count", markings.total_count());
    w.blank();
}

fn write_bounds(w: &mut ExpressionWriter, geometry: &CrateGeometry) {
    let b = &geometry.bounds;
    w.comment("Bounding box");
    w.scalar("bbox_min_x", b.min.x);
    w.scalar("bbox_min_y", b.min.y);
    w.scalar("bbox_min_z", b.min.z);
    w.scalar("bbox_max_x", b.max.x);
    w.scalar("bbox_max_y", b.max.y);
    w.scalar("bbox_max_z", b.max.z);
    w.scalar("bbox_size_x", b.size.x);
    w.scalar("bbox_size_y", b.size.y);
    w.scalar("bbox_size_z", b.size.z);
    w.scalar("bbox_diagonal", b.diagonal);
    w.blank();
}

fn write_block(w: &mut ExpressionWriter, block: &Block, dims: &CrateDimensions) -> Result<()> {
    if block.suppressed {
        w.comment(format!("{} (suppressed)", block.name));
        w.push(format!("{}_SUPPRESSED", block.name), true, ExpressionKind::Suppression);
        return Ok(());
    }

    match (&block.panel_name, block.plywood_piece_index) {
        (Some(panel), Some(index)) => w.comment(format!(
            "{}: panel {}, piece {}",
            block.name,
            panel,
            index + 1
        )),
        _ if block.metadata.is_empty() => w.comment(&block.name),
        _ => w.comment(format!("{}: {}", block.name, block.metadata)),
    }

    let corners = [
        block.point1.x,
        block.point1.y,
        block.point1.z,
        block.point2.x,
        block.point2.y,
        block.point2.z,
    ];
    for (suffix, value) in TWO_POINT_SUFFIXES.iter().zip(corners) {
        w.push(format!("{}_{}", block.name, suffix), value, ExpressionKind::TwoPoint);
    }

    let thickness = match block.kind {
        BlockKind::Plywood => Some(dims.plywood_thickness),
        BlockKind::Cleat => Some(dims.cleat_thickness),
        _ => None,
    };
    if let Some(expected) = thickness {
        let params = seven_parameters(block, dims, expected)?;
        for (suffix, value) in params.entries() {
            w.push(format!("{}_{}", block.name, suffix), value, ExpressionKind::SevenParameter);
        }
    }
    Ok(())
}

/// Generates the expression listing for a crate.
///
/// # Arguments
///
/// * `geometry` - Unified block model of the crate
/// * `markings` - Sized markings
/// * `hardware` - Klimp and lag screw placements
///
/// # Returns
///
/// The ordered expressions and their rendered text. Output is deterministic
/// for a given geometry.
pub fn generate_expressions(
    geometry: &CrateGeometry,
    markings: &MarkingSet,
    hardware: &HardwareLayout,
) -> Result<ExpressionSet> {
    let dims = &geometry.dimensions;
    let usage = MaterialUsage::from_layouts(geometry.panels.iter().map(|p| &p.plywood));

    let mut w = ExpressionWriter::new();
    write_header(&mut w, geometry, &usage, hardware);
    write_dimensions(&mut w, dims);
    write_skids_and_floor(&mut w, geometry);
    write_panels(&mut w, geometry, &usage);
    write_hardware(&mut w, hardware);
    write_markings(&mut w, markings);
    write_bounds(&mut w, geometry);

    w.comment("Components (two-point convention)");
    for block in geometry.blocks() {
        write_block(&mut w, block, dims)?;
    }

    let set = w.finish();
    log::debug!(
        "expressions: {} total, {} two-point, {} seven-parameter, {} suppressed",
        set.len(),
        set.count_of(ExpressionKind::TwoPoint),
        set.count_of(ExpressionKind::SevenParameter),
        set.count_of(ExpressionKind::Suppression)
    );
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markings::calculate_markings;
    use approx::assert_relative_eq;
    use u_crating_assembly::{build_crate_geometry, calculate_hardware};
    use u_crating_core::CrateConfiguration;

    fn generate(config: &CrateConfiguration) -> (CrateGeometry, ExpressionSet) {
        let geometry = build_crate_geometry(config).unwrap();
        let hardware = calculate_hardware(&geometry);
        let markings = calculate_markings(&config.markings, geometry.dimensions.overall_height);
        let set = generate_expressions(&geometry, &markings, &hardware).unwrap();
        (geometry, set)
    }

    #[test]
    fn test_two_point_count() {
        let (g, set) = generate(&CrateConfiguration::default());
        let active = g.active_blocks().count();
        let suppressed = g.blocks().count() - active;
        assert_eq!(set.count_of(ExpressionKind::TwoPoint), 6 * active);
        assert_eq!(set.count_of(ExpressionKind::Suppression), suppressed);
    }

    #[test]
    fn test_seven_parameters_agree_with_corners() {
        let (g, set) = generate(&CrateConfiguration::default());
        let panel_pieces = g
            .active_blocks()
            .filter(|b| matches!(b.kind, BlockKind::Plywood | BlockKind::Cleat));
        for block in panel_pieces {
            let x1 = set.number(&format!("{}_X1", block.name)).unwrap();
            let x2 = set.number(&format!("{}_X2", block.name)).unwrap();
            let width = set.number(&format!("{}_WIDTH", block.name)).unwrap();
            assert_relative_eq!(x2 - x1, width, epsilon = 1e-9);
            let thickness = set.number(&format!("{}_THICKNESS", block.name)).unwrap();
            let expected = if block.kind == BlockKind::Plywood {
                g.dimensions.plywood_thickness
            } else {
                g.dimensions.cleat_thickness
            };
            assert_relative_eq!(thickness, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_suppressed_slot_has_only_marker() {
        let (g, set) = generate(&CrateConfiguration::default());
        let slot = g.floorboards.iter().find(|b| b.suppressed).unwrap();
        assert!(set.text.contains(&format!("{}_SUPPRESSED=TRUE\n", slot.name)));
        assert!(set.get(&format!("{}_X1", slot.name)).is_none());
    }

    #[test]
    fn test_listing_is_deterministic() {
        let config = CrateConfiguration::new().with_product(72.0, 40.0, 50.0).with_weight(2_000.0);
        let (_, a) = generate(&config);
        let (_, b) = generate(&config);
        assert_eq!(a.text, b.text);
        assert!(a.text.starts_with("# NX expressions"));
    }

    #[test]
    fn test_klimp_instances_fill_slots() {
        let (_, set) = generate(&CrateConfiguration::default());
        let slots = set.number("klimp_instances_total").unwrap() as usize;
        let active = set.number("klimp_count").unwrap() as usize;
        assert!(slots >= active);
        assert!(set.text.contains(&format!("KLIMP_{}_ACTIVE=TRUE\n", active)));
        assert!(set.text.contains(&format!("KLIMP_{}_ACTIVE=FALSE\n", slots)));
        assert!(set.text.contains("KLIMP_1_ROT_Y=0.0\n"));
    }

    #[test]
    fn test_thickness_mismatch_is_reported() {
        let geometry = build_crate_geometry(&CrateConfiguration::default()).unwrap();
        let mut block = geometry
            .plywood
            .iter()
            .find(|b| b.is_active() && b.panel_name.as_deref() == Some("FRONT_PANEL"))
            .cloned()
            .unwrap();
        block.point1.y -= 0.5;
        let dims = &geometry.dimensions;
        let err = seven_parameters(&block, dims, dims.plywood_thickness).unwrap_err();
        match err {
            Error::SerializationMismatch { parameter, .. } => assert_eq!(parameter, "THICKNESS"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
