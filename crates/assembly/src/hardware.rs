//! Klimp clamp and lag screw placement.
//!
//! Hardware is instanced from external CAD assets, so only positions,
//! rotations and counts are produced. Each instance also gets a small envelope
//! [`Block`] for renderers; these blocks are kept apart from the structural
//! blocks of [`CrateGeometry`].

use crate::assembler::CrateGeometry;
use u_crating_core::transform::FaceFrame;
use u_crating_core::{Block, BlockKind, PanelFace, Point3};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Maximum spacing between klimps along an edge.
pub const KLIMP_MAX_SPACING: f64 = 24.0;

/// Klimp inset from each end of the top edge.
pub const KLIMP_TOP_INSET: f64 = 4.5;

/// Klimp inset from the bottom of the side edges.
pub const KLIMP_SIDE_BOTTOM_INSET: f64 = 5.5;

/// Klimp inset from the top of the side edges.
pub const KLIMP_SIDE_TOP_INSET: f64 = 4.0;

/// Klimp instance slots in the CAD template.
pub const KLIMP_SLOTS: usize = 20;

/// Klimps per purchased package.
pub const KLIMPS_PER_PACKAGE: usize = 25;

/// Klimp envelope: length along the edge.
const KLIMP_LENGTH: f64 = 4.0;
/// Klimp envelope: reach across the edge.
const KLIMP_REACH: f64 = 2.0;
/// Klimp envelope: thickness outside the face.
const KLIMP_DEPTH: f64 = 0.5;

/// Lag screw shank diameter (3/8 in).
pub const LAG_SCREW_DIAMETER: f64 = 0.38;

/// Lag screw length.
pub const LAG_SCREW_LENGTH: f64 = 2.5;

/// Lag screw head diameter.
pub const LAG_HEAD_DIAMETER: f64 = 0.75;

/// Lag screw head height.
pub const LAG_HEAD_HEIGHT: f64 = 0.25;

/// Front panel edge a klimp is fastened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum KlimpEdge {
    /// Top edge, joining the top panel.
    Top,
    /// Left edge, joining the left end panel.
    Left,
    /// Right edge, joining the right end panel.
    Right,
}

impl KlimpEdge {
    /// Rotation about Y in degrees.
    pub fn rotation(&self) -> f64 {
        match self {
            KlimpEdge::Top => 0.0,
            KlimpEdge::Left => 90.0,
            KlimpEdge::Right => -90.0,
        }
    }
}

/// One klimp instance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct KlimpPlacement {
    /// Edge it sits on.
    pub edge: KlimpEdge,
    /// Offset along the front panel width.
    pub u: f64,
    /// Offset along the front panel height.
    pub v: f64,
    /// Position on the outside of the front face.
    pub position: Point3,
    /// Rotation about Y, degrees.
    pub rotation: f64,
}

/// All klimps of a crate.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct KlimpLayout {
    /// Active instances: top edge left to right, then left edge, then right edge.
    pub placements: Vec<KlimpPlacement>,
    /// Count along the top edge.
    pub top_count: usize,
    /// Count along each side edge.
    pub side_count: usize,
    /// Spacing along the top edge.
    pub top_spacing: f64,
    /// Spacing along the side edges.
    pub side_spacing: f64,
}

impl KlimpLayout {
    /// Active instance count.
    pub fn count(&self) -> usize {
        self.placements.len()
    }

    /// Template slots: at least [`KLIMP_SLOTS`], more if overflowing.
    pub fn slots(&self) -> usize {
        self.count().max(KLIMP_SLOTS)
    }

    /// Packages to purchase.
    pub fn packages(&self) -> usize {
        self.count().div_ceil(KLIMPS_PER_PACKAGE)
    }
}

/// One lag screw.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LagScrew {
    /// Panel it fastens to the floor.
    pub panel: PanelFace,
    /// Offset along the panel width.
    pub u: f64,
    /// Head position on the outside face.
    pub position: Point3,
}

/// Lag screws of a crate.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LagScrewLayout {
    /// Screws, grouped by panel in [`PanelFace::ALL`] order.
    pub screws: Vec<LagScrew>,
    /// Largest spacing between neighbouring screws on one panel.
    pub max_spacing: f64,
}

impl LagScrewLayout {
    /// Total screw count.
    pub fn count(&self) -> usize {
        self.screws.len()
    }

    /// Screws on one panel.
    pub fn count_for(&self, panel: PanelFace) -> usize {
        self.screws.iter().filter(|s| s.panel == panel).count()
    }
}

/// Hardware of a crate plus renderer envelopes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct HardwareLayout {
    /// Klimp clamps.
    pub klimps: KlimpLayout,
    /// Lag screws.
    pub lag_screws: LagScrewLayout,
    /// `KLIMP_n` and `LAG_SCREW_n` envelopes.
    pub blocks: Vec<Block>,
}

/// Evenly spaced stations over `[start, end]` no farther apart than `max`.
fn stations(start: f64, end: f64, max: f64) -> (Vec<f64>, f64) {
    let span = end - start;
    if span <= 0.0 {
        return (vec![(start + end) / 2.0], 0.0);
    }
    let count = ((span / max).ceil() as usize + 1).max(2);
    let spacing = span / (count - 1) as f64;
    ((0..count).map(|i| start + spacing * i as f64).collect(), spacing)
}

/// Places klimps along the front panel's top and side edges.
pub fn calculate_klimps(geometry: &CrateGeometry) -> KlimpLayout {
    let dims = &geometry.dimensions;
    let face = PanelFace::Front;
    let panel = face.dimensions(dims);
    let frame = FaceFrame::for_face(face, dims);

    let (top, top_spacing) = stations(
        KLIMP_TOP_INSET,
        panel.width - KLIMP_TOP_INSET,
        KLIMP_MAX_SPACING,
    );
    let (side, side_spacing) = stations(
        KLIMP_SIDE_BOTTOM_INSET,
        panel.height - KLIMP_SIDE_TOP_INSET,
        KLIMP_MAX_SPACING,
    );

    let place = |edge: KlimpEdge, u: f64, v: f64| KlimpPlacement {
        edge,
        u,
        v,
        position: frame.map_point(u, v, 0.0),
        rotation: edge.rotation(),
    };

    let mut placements: Vec<KlimpPlacement> = top
        .iter()
        .map(|&u| place(KlimpEdge::Top, u, panel.height))
        .collect();
    placements.extend(side.iter().map(|&v| place(KlimpEdge::Left, 0.0, v)));
    placements.extend(side.iter().map(|&v| place(KlimpEdge::Right, panel.width, v)));

    if placements.len() > KLIMP_SLOTS {
        log::warn!(
            "{} klimps exceed the {} template slots; extra instances are kept",
            placements.len(),
            KLIMP_SLOTS
        );
    }
    log::debug!(
        "klimps: {} top @ {:.3}in, {} per side @ {:.3}in",
        top.len(),
        top_spacing,
        side.len(),
        side_spacing
    );

    KlimpLayout {
        placements,
        top_count: top.len(),
        side_count: side.len(),
        top_spacing,
        side_spacing,
    }
}

/// Places lag screws through the back and end panels into the floor.
///
/// Screws go at interior vertical cleats, at the floor board centerline.
/// Panels without interior verticals use their perimeter verticals.
pub fn calculate_lag_screws(geometry: &CrateGeometry) -> LagScrewLayout {
    let dims = &geometry.dimensions;
    let v = dims.floorboard_thickness / 2.0;
    let mut screws = Vec::new();
    let mut max_spacing: f64 = 0.0;

    for panel in geometry.panels.iter().filter(|p| p.face.receives_lag_screws()) {
        let frame = FaceFrame::for_face(panel.face, dims);
        let interior = panel.cleats.interior_verticals();
        let columns = if interior.is_empty() {
            panel.cleats.perimeter_verticals()
        } else {
            interior
        };
        let us: Vec<f64> = columns.iter().map(|c| c.center_x()).collect();
        max_spacing = us.windows(2).map(|w| w[1] - w[0]).fold(max_spacing, f64::max);
        screws.extend(us.into_iter().map(|u| LagScrew {
            panel: panel.face,
            u,
            position: frame.map_point(u, v, 0.0),
        }));
    }

    log::debug!("lag screws: {} (max spacing {:.3}in)", screws.len(), max_spacing);
    LagScrewLayout {
        screws,
        max_spacing,
    }
}

fn klimp_block(index: usize, klimp: &KlimpPlacement, geometry: &CrateGeometry) -> Block {
    let frame = FaceFrame::for_face(PanelFace::Front, &geometry.dimensions);
    let (u, v) = (klimp.u, klimp.v);
    let (along, across) = (KLIMP_LENGTH / 2.0, KLIMP_REACH / 2.0);
    let (us, vs) = match klimp.edge {
        KlimpEdge::Top => ((u - along, u + along), (v - across, v + across)),
        KlimpEdge::Left | KlimpEdge::Right => ((u - across, u + across), (v - along, v + along)),
    };
    let (p1, p2) = frame.map_box(us, vs, (-KLIMP_DEPTH, 0.0));
    Block::from_corners(format!("KLIMP_{}", index + 1), BlockKind::Klimp, p1, p2)
        .with_panel(PanelFace::Front.name())
        .with_metadata(format!("klimp {:?} edge, rot {:.0}", klimp.edge, klimp.rotation))
}

fn lag_block(index: usize, screw: &LagScrew, geometry: &CrateGeometry) -> Block {
    let dims = &geometry.dimensions;
    let frame = FaceFrame::for_face(screw.panel, dims);
    let r = LAG_HEAD_DIAMETER / 2.0;
    let v = dims.floorboard_thickness / 2.0;
    let (p1, p2) = frame.map_box(
        (screw.u - r, screw.u + r),
        (v - r, v + r),
        (-LAG_HEAD_HEIGHT, LAG_SCREW_LENGTH),
    );
    Block::from_corners(format!("LAG_SCREW_{}", index + 1), BlockKind::Hardware, p1, p2)
        .with_panel(screw.panel.name())
        .with_metadata(format!(
            "lag screw {:.2}x{:.1}",
            LAG_SCREW_DIAMETER, LAG_SCREW_LENGTH
        ))
}

/// Places all hardware for a crate.
pub fn calculate_hardware(geometry: &CrateGeometry) -> HardwareLayout {
    let klimps = calculate_klimps(geometry);
    let lag_screws = calculate_lag_screws(geometry);

    let mut blocks: Vec<Block> = klimps
        .placements
        .iter()
        .enumerate()
        .map(|(i, k)| klimp_block(i, k, geometry))
        .collect();
    blocks.extend((klimps.count()..KLIMP_SLOTS).map(|i| {
        Block::placeholder(format!("KLIMP_{}", i + 1), BlockKind::Klimp)
    }));
    blocks.extend(
        lag_screws
            .screws
            .iter()
            .enumerate()
            .map(|(i, s)| lag_block(i, s, geometry)),
    );

    HardwareLayout {
        klimps,
        lag_screws,
        blocks,
    }
}
