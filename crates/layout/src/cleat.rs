//! Cleat placement on a panel face.
//!
//! Cleats frame all four edges, sit centered over every plywood splice and
//! are added wherever consecutive centerlines would otherwise exceed the
//! maximum spacing. Positions are in the panel's 2-D frame: `x` along the
//! width, `y` along the height, both from the lower-left corner.

use crate::plywood::{SpliceLine, SpliceOrientation};
use u_crating_core::config::{CleatMaterial, CleatProfile, CleatType};
use u_crating_core::panel::{PanelDimensions, PerimeterStyle};
use u_crating_core::{Error, Result, Stage};

#[cfg(feature = "serde")]
use serde::Serialize;

const TOLERANCE: f64 = 1e-9;

/// Length of one purchased cleat board, inches.
pub const CLEAT_BOARD_LENGTH: f64 = 96.0;

/// Why a cleat is where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CleatKind {
    /// Edge framing.
    Perimeter,
    /// Added to satisfy the spacing limit.
    Intermediate,
    /// Centered over a plywood seam.
    Splice,
}

impl CleatKind {
    /// Lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            CleatKind::Perimeter => "perimeter",
            CleatKind::Intermediate => "intermediate",
            CleatKind::Splice => "splice",
        }
    }
}

/// Long axis of a cleat in the panel frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CleatOrientation {
    /// Runs along the panel width.
    Horizontal,
    /// Runs along the panel height.
    Vertical,
}

/// A single cleat rectangle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Cleat {
    /// Expression name (e.g. `FRONT_PANEL_CLEAT_V_1`).
    pub name: String,
    /// Placement reason.
    pub kind: CleatKind,
    /// Long axis.
    pub orientation: CleatOrientation,
    /// Left edge.
    pub x: f64,
    /// Bottom edge.
    pub y: f64,
    /// Extent along the panel width.
    pub width: f64,
    /// Extent along the panel height.
    pub height: f64,
}

impl Cleat {
    /// Cut length.
    pub fn length(&self) -> f64 {
        match self.orientation {
            CleatOrientation::Horizontal => self.width,
            CleatOrientation::Vertical => self.height,
        }
    }

    /// Center along the panel width.
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Center along the panel height.
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    fn overlaps(&self, other: &Cleat) -> bool {
        self.x < other.x + other.width - TOLERANCE
            && other.x < self.x + self.width - TOLERANCE
            && self.y < other.y + other.height - TOLERANCE
            && other.y < self.y + self.height - TOLERANCE
    }
}

/// Cleat placement options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleatOptions {
    /// Cleat cross-section.
    pub profile: CleatProfile,
    /// Maximum center-to-center spacing.
    pub max_spacing: f64,
    /// Corner ownership.
    pub style: PerimeterStyle,
}

impl Default for CleatOptions {
    fn default() -> Self {
        Self {
            profile: CleatType::default().profile(),
            max_spacing: 24.0,
            style: PerimeterStyle::HorizontalFullWidth,
        }
    }
}

impl CleatOptions {
    /// Sets the cross-section from a cleat type.
    pub fn with_cleat_type(mut self, cleat_type: CleatType) -> Self {
        self.profile = cleat_type.profile();
        self
    }

    /// Sets the maximum spacing.
    pub fn with_max_spacing(mut self, max_spacing: f64) -> Self {
        self.max_spacing = max_spacing;
        self
    }

    /// Sets the perimeter style.
    pub fn with_style(mut self, style: PerimeterStyle) -> Self {
        self.style = style;
        self
    }
}

/// Cleats for one panel face.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CleatPlacement {
    /// Panel label.
    pub panel_name: String,
    /// Panel width.
    pub panel_width: f64,
    /// Panel height.
    pub panel_height: f64,
    /// Cross-section used.
    pub profile: CleatProfile,
    /// Spacing limit applied.
    pub max_spacing: f64,
    /// Centerlines of every vertical cleat, ascending.
    pub vertical_centers: Vec<f64>,
    /// Centerlines of every horizontal cleat, ascending.
    pub horizontal_centers: Vec<f64>,
    /// All cleats, perimeter first.
    pub cleats: Vec<Cleat>,
}

impl CleatPlacement {
    /// Largest gap between consecutive vertical centerlines.
    pub fn vertical_spacing(&self) -> f64 {
        max_gap(&self.vertical_centers)
    }

    /// Largest gap between consecutive horizontal centerlines.
    pub fn horizontal_spacing(&self) -> f64 {
        max_gap(&self.horizontal_centers)
    }

    /// Cleats of a given kind.
    pub fn of_kind(&self, kind: CleatKind) -> impl Iterator<Item = &Cleat> {
        self.cleats.iter().filter(move |c| c.kind == kind)
    }

    /// Vertical cleats away from the panel edges, left to right.
    pub fn interior_verticals(&self) -> Vec<&Cleat> {
        let mut v: Vec<&Cleat> = self
            .cleats
            .iter()
            .filter(|c| {
                c.orientation == CleatOrientation::Vertical && c.kind != CleatKind::Perimeter
            })
            .collect();
        v.sort_by(|a, b| a.x.total_cmp(&b.x));
        v
    }

    /// The left and right perimeter verticals.
    pub fn perimeter_verticals(&self) -> Vec<&Cleat> {
        let mut v: Vec<&Cleat> = self
            .cleats
            .iter()
            .filter(|c| {
                c.orientation == CleatOrientation::Vertical && c.kind == CleatKind::Perimeter
            })
            .collect();
        v.sort_by(|a, b| a.x.total_cmp(&b.x));
        v
    }

    /// Total cut length in inches.
    pub fn linear_inches(&self) -> f64 {
        self.cleats.iter().map(Cleat::length).sum()
    }
}

fn max_gap(centers: &[f64]) -> f64 {
    centers
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(0.0, f64::max)
}

/// Centerline set along one axis, tagged by reason.
fn centerlines(
    extent: f64,
    cleat_width: f64,
    splices: &[f64],
    max_spacing: f64,
) -> Vec<(f64, CleatKind)> {
    let mut lines: Vec<(f64, CleatKind)> = vec![
        (cleat_width / 2.0, CleatKind::Perimeter),
        (extent - cleat_width / 2.0, CleatKind::Perimeter),
    ];
    lines.extend(splices.iter().map(|&s| (s, CleatKind::Splice)));
    lines.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut filled = Vec::with_capacity(lines.len());
    for pair in lines.windows(2) {
        let (a, b) = (pair[0].0, pair[1].0);
        filled.push(pair[0]);
        let gap = b - a;
        if gap > max_spacing + TOLERANCE {
            let segments = ((gap / max_spacing) - TOLERANCE).ceil() as usize;
            let step = gap / segments as f64;
            filled.extend((1..segments).map(|i| (a + step * i as f64, CleatKind::Intermediate)));
        }
    }
    if let Some(&last) = lines.last() {
        filled.push(last);
    }
    filled
}

fn rect(
    name: String,
    kind: CleatKind,
    orientation: CleatOrientation,
    x: (f64, f64),
    y: (f64, f64),
) -> Cleat {
    Cleat {
        name,
        kind,
        orientation,
        x: x.0,
        y: y.0,
        width: x.1 - x.0,
        height: y.1 - y.0,
    }
}

/// Places cleats on a panel face.
///
/// # Arguments
///
/// * `panel` - Panel width and height
/// * `panel_label` - Prefix for cleat names (e.g. `FRONT_PANEL`)
/// * `splices` - Seams from the plywood optimizer; each receives one centered cleat
/// * `options` - Cross-section, spacing limit and corner ownership
///
/// # Errors
///
/// `LayoutInfeasible` when the panel cannot hold its perimeter frame or a
/// splice cleat would collide with another cleat.
pub fn calculate_cleat_positions(
    panel: PanelDimensions,
    panel_label: &str,
    splices: &[SpliceLine],
    options: &CleatOptions,
) -> Result<CleatPlacement> {
    let (w, h) = (panel.width, panel.height);
    let cw = options.profile.width;

    if !(options.max_spacing.is_finite() && options.max_spacing > cw) {
        return Err(Error::invalid(
            "options.maxCleatSpacing",
            format!("must exceed the cleat width ({:.2}in)", cw),
        ));
    }
    for (axis, extent) in [("width", w), ("height", h)] {
        if !(extent.is_finite() && extent > 2.0 * cw + TOLERANCE) {
            return Err(Error::infeasible(
                Stage::Cleats,
                extent,
                format!(
                    "{} {} cannot hold two {} cleats",
                    panel_label, axis, options.profile.nominal
                ),
            ));
        }
    }

    let positions = |orientation: SpliceOrientation| -> Vec<f64> {
        splices
            .iter()
            .filter(|s| s.orientation == orientation)
            .map(|s| s.position)
            .collect()
    };
    let columns = centerlines(w, cw, &positions(SpliceOrientation::Vertical), options.max_spacing);
    let rows = centerlines(h, cw, &positions(SpliceOrientation::Horizontal), options.max_spacing);

    let name = |suffix: &str| format!("{}_CLEAT_{}", panel_label, suffix);
    let mut cleats = Vec::new();

    // Horizontal perimeter span along u, vertical span along v.
    let (across, up) = match options.style {
        PerimeterStyle::HorizontalFullWidth => ((0.0, w), (cw, h - cw)),
        PerimeterStyle::VerticalFullHeight => ((cw, w - cw), (0.0, h)),
    };
    let perimeter = [
        ("TOP", CleatOrientation::Horizontal, across, (h - cw, h)),
        ("BOTTOM", CleatOrientation::Horizontal, across, (0.0, cw)),
        ("LEFT", CleatOrientation::Vertical, (0.0, cw), up),
        ("RIGHT", CleatOrientation::Vertical, (w - cw, w), up),
    ];
    for (suffix, orientation, x, y) in perimeter {
        cleats.push(rect(name(suffix), CleatKind::Perimeter, orientation, x, y));
    }

    let interior_columns: Vec<&(f64, CleatKind)> = columns
        .iter()
        .filter(|(_, kind)| *kind != CleatKind::Perimeter)
        .collect();
    for (i, &&(center, kind)) in interior_columns.iter().enumerate() {
        cleats.push(rect(
            name(&format!("V_{}", i + 1)),
            kind,
            CleatOrientation::Vertical,
            (center - cw / 2.0, center + cw / 2.0),
            (cw, h - cw),
        ));
    }

    // Horizontal interiors are cut between adjacent verticals.
    let gaps: Vec<(f64, f64)> = columns
        .windows(2)
        .map(|pair| (pair[0].0 + cw / 2.0, pair[1].0 - cw / 2.0))
        .filter(|(a, b)| b - a > TOLERANCE)
        .collect();
    let interior_rows = rows.iter().filter(|(_, kind)| *kind != CleatKind::Perimeter);
    for (r, &(center, kind)) in interior_rows.enumerate() {
        for (c, &(a, b)) in gaps.iter().enumerate() {
            cleats.push(rect(
                name(&format!("H_{}_{}", r + 1, c + 1)),
                kind,
                CleatOrientation::Horizontal,
                (a, b),
                (center - cw / 2.0, center + cw / 2.0),
            ));
        }
    }

    for (i, a) in cleats.iter().enumerate() {
        if a.width <= TOLERANCE || a.height <= TOLERANCE {
            return Err(Error::infeasible(
                Stage::Cleats,
                a.length(),
                format!("{} has no room between its neighbours", a.name),
            ));
        }
        if let Some(b) = cleats[i + 1..].iter().find(|b| a.overlaps(b)) {
            return Err(Error::infeasible(
                Stage::Cleats,
                (a.center_x() - b.center_x()).abs().max((a.center_y() - b.center_y()).abs()),
                format!("{} overlaps {}", a.name, b.name),
            ));
        }
    }

    let placement = CleatPlacement {
        panel_name: panel_label.to_string(),
        panel_width: w,
        panel_height: h,
        profile: options.profile,
        max_spacing: options.max_spacing,
        vertical_centers: columns.iter().map(|c| c.0).collect(),
        horizontal_centers: rows.iter().map(|c| c.0).collect(),
        cleats,
    };

    for (context, spacing) in [
        ("vertical cleats", placement.vertical_spacing()),
        ("horizontal cleats", placement.horizontal_spacing()),
    ] {
        if spacing > options.max_spacing + 1e-6 {
            return Err(Error::SpacingViolation {
                context: format!("{} {}", panel_label, context),
                spacing,
                max: options.max_spacing,
            });
        }
    }

    log::debug!(
        "{}: {} cleats ({} splice, {} intermediate), max spacing {:.3}/{:.3}",
        panel_label,
        placement.cleats.len(),
        placement.of_kind(CleatKind::Splice).count(),
        placement.of_kind(CleatKind::Intermediate).count(),
        placement.vertical_spacing(),
        placement.horizontal_spacing()
    );

    Ok(placement)
}

/// Cleat stock needed for a set of panels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CleatMaterialSummary {
    /// Number of cleats.
    pub count: usize,
    /// Total cut length, inches.
    pub linear_inches: f64,
    /// Total cut length, feet.
    pub linear_feet: f64,
    /// 8 ft boards to purchase.
    pub boards: usize,
    /// Estimated weight, pounds.
    pub weight_lb: f64,
}

impl CleatMaterialSummary {
    /// Totals cleat stock across panels.
    pub fn from_placements<'a>(
        placements: impl IntoIterator<Item = &'a CleatPlacement>,
        material: CleatMaterial,
    ) -> Self {
        let mut count = 0;
        let mut linear_inches = 0.0;
        let mut volume = 0.0;
        for placement in placements {
            let section = placement.profile.width * placement.profile.thickness;
            count += placement.cleats.len();
            let length = placement.linear_inches();
            linear_inches += length;
            volume += length * section;
        }
        let linear_feet = linear_inches / 12.0;
        Self {
            count,
            linear_inches,
            linear_feet,
            boards: (linear_inches / CLEAT_BOARD_LENGTH - TOLERANCE).ceil().max(0.0) as usize,
            weight_lb: volume * material.density_lb_in3(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertical(position: f64, height: f64) -> SpliceLine {
        SpliceLine {
            orientation: SpliceOrientation::Vertical,
            position,
            start: 0.0,
            end: height,
        }
    }

    #[test]
    fn test_small_panel_perimeter_only() {
        let p = calculate_cleat_positions(
            PanelDimensions::new(20.0, 20.0),
            "FRONT_PANEL",
            &[],
            &CleatOptions::default(),
        )
        .unwrap();
        assert_eq!(p.cleats.len(), 4);
        assert!(p.cleats.iter().all(|c| c.kind == CleatKind::Perimeter));
        let top = &p.cleats[0];
        assert_eq!(top.name, "FRONT_PANEL_CLEAT_TOP");
        assert_relative_eq!(top.width, 20.0);
        let left = &p.cleats[2];
        assert_relative_eq!(left.height, 13.0);
    }

    #[test]
    fn test_end_panel_verticals_own_corners() {
        let options = CleatOptions::default().with_style(PerimeterStyle::VerticalFullHeight);
        let panel = PanelDimensions::new(20.0, 20.0);
        let p = calculate_cleat_positions(panel, "LEFT_END_PANEL", &[], &options).unwrap();
        let left = p.cleats.iter().find(|c| c.name == "LEFT_END_PANEL_CLEAT_LEFT").unwrap();
        assert_relative_eq!(left.height, 20.0);
        let top = p.cleats.iter().find(|c| c.name == "LEFT_END_PANEL_CLEAT_TOP").unwrap();
        assert_relative_eq!(top.width, 13.0);
    }

    #[test]
    fn test_intermediates_fill_wide_gap() {
        let p = calculate_cleat_positions(
            PanelDimensions::new(60.0, 20.0),
            "BACK_PANEL",
            &[],
            &CleatOptions::default(),
        )
        .unwrap();
        // 60 - 3.5 = 56.5 between perimeter centers -> 3 segments
        assert_eq!(p.of_kind(CleatKind::Intermediate).count(), 2);
        assert!(p.vertical_spacing() <= 24.0);
        assert_relative_eq!(p.vertical_spacing(), 56.5 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_splice_gets_centered_cleat() {
        let p = calculate_cleat_positions(
            PanelDimensions::new(96.0, 40.0),
            "TOP_PANEL",
            &[vertical(48.0, 40.0)],
            &CleatOptions::default(),
        )
        .unwrap();
        let splice: Vec<&Cleat> = p.of_kind(CleatKind::Splice).collect();
        assert_eq!(splice.len(), 1);
        assert_relative_eq!(splice[0].center_x(), 48.0);
        assert_eq!(splice[0].orientation, CleatOrientation::Vertical);
        assert!(p.vertical_spacing() <= 24.0 + 1e-9);
    }

    #[test]
    fn test_horizontal_segments_between_verticals() {
        let splices = [
            vertical(30.0, 60.0),
            SpliceLine {
                orientation: SpliceOrientation::Horizontal,
                position: 30.0,
                start: 0.0,
                end: 50.0,
            },
        ];
        let p = calculate_cleat_positions(
            PanelDimensions::new(50.0, 60.0),
            "TOP_PANEL",
            &splices,
            &CleatOptions::default(),
        )
        .unwrap();
        let segments: Vec<&Cleat> = p
            .of_kind(CleatKind::Splice)
            .filter(|c| c.orientation == CleatOrientation::Horizontal)
            .collect();
        // Verticals at 1.75, 15.875 (intermediate), 30 (splice) and 48.25.
        assert_eq!(segments.len(), 3);
        // Row 1 is the intermediate at 15.875; the splice is row 2.
        assert_eq!(segments[0].name, "TOP_PANEL_CLEAT_H_2_1");
        assert_relative_eq!(segments[0].x, 3.5);
        assert_relative_eq!(segments[0].x + segments[0].width, 14.125);
        assert_relative_eq!(segments[1].x, 17.625);
        for s in &segments {
            assert_relative_eq!(s.center_y(), 30.0);
        }
    }

    #[test]
    fn test_narrow_panel_is_infeasible() {
        let err = calculate_cleat_positions(
            PanelDimensions::new(6.0, 40.0),
            "FRONT_PANEL",
            &[],
            &CleatOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::LayoutInfeasible { stage: Stage::Cleats, .. }));
    }

    #[test]
    fn test_material_summary() {
        let p = calculate_cleat_positions(
            PanelDimensions::new(20.0, 20.0),
            "FRONT_PANEL",
            &[],
            &CleatOptions::default(),
        )
        .unwrap();
        // 20 + 20 + 13 + 13
        let summary = CleatMaterialSummary::from_placements([&p], CleatMaterial::Pine);
        assert_eq!(summary.count, 4);
        assert_relative_eq!(summary.linear_inches, 66.0);
        assert_relative_eq!(summary.linear_feet, 5.5);
        assert_eq!(summary.boards, 1);
        assert!(summary.weight_lb > 0.0);
    }
}
