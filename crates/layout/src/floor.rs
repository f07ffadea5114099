//! Floor board layout.
//!
//! Boards are placed symmetrically from the outside in: each step asks the
//! lumber catalog for the widest board that fits half of the remaining center
//! span and places a mirrored pair. When no pair fits, a single centered board
//! is tried, then a custom-width plywood fill. Whatever remains is recorded as
//! a gap so that `sum(widths) + sum(gaps) == usable width`.

use u_crating_core::lumber::{LumberCatalog, LumberSize, LUMBER_THICKNESS};
use u_crating_core::{Error, Result, Stage};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Distance kept clear at each side of the floor.
pub const EDGE_OFFSET: f64 = 1.0;

/// Gap inserted between board pairs when space allows.
pub const MAX_GAP: f64 = 0.25;

/// Narrowest custom plywood fill board.
pub const MIN_CUSTOM_WIDTH: f64 = 2.5;

/// Target board width for the uniform fallback layout.
pub const UNIFORM_TARGET_WIDTH: f64 = 11.25;

const TOLERANCE: f64 = 1e-9;

/// Floor board material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum FloorBoardKind {
    /// Standard dimensional lumber.
    Lumber,
    /// Custom-width plywood fill.
    Plywood,
}

/// Board position: X is the board center relative to the crate centerline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BoardPosition {
    /// Center X.
    pub x: f64,
    /// Y offset from the floor's front edge.
    pub y: f64,
    /// Z offset from the top of the skids.
    pub z: f64,
}

/// A single floor board.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FloorBoard {
    /// Lumber or plywood fill.
    pub kind: FloorBoardKind,
    /// Nominal label (lumber only).
    pub nominal: Option<&'static str>,
    /// Width across the crate.
    pub width: f64,
    /// Thickness.
    pub thickness: f64,
    /// Length along the crate depth.
    pub depth: f64,
    /// Position relative to the crate center and floor.
    pub position: BoardPosition,
}

impl FloorBoard {
    fn lumber(size: &LumberSize, center_x: f64, depth: f64) -> Self {
        Self {
            kind: FloorBoardKind::Lumber,
            nominal: Some(size.nominal),
            width: size.width,
            thickness: size.thickness,
            depth,
            position: BoardPosition {
                x: center_x,
                ..Default::default()
            },
        }
    }

    fn custom(width: f64, center_x: f64, depth: f64) -> Self {
        Self {
            kind: FloorBoardKind::Plywood,
            nominal: None,
            width,
            thickness: LUMBER_THICKNESS,
            depth,
            position: BoardPosition {
                x: center_x,
                ..Default::default()
            },
        }
    }

    /// Returns true for custom plywood fill.
    pub fn is_custom(&self) -> bool {
        self.kind == FloorBoardKind::Plywood
    }

    /// Display label: the nominal size or `custom`.
    pub fn label(&self) -> &'static str {
        self.nominal.unwrap_or("custom")
    }

    /// Left edge X.
    pub fn left(&self) -> f64 {
        self.position.x - self.width / 2.0
    }

    /// Right edge X.
    pub fn right(&self) -> f64 {
        self.position.x + self.width / 2.0
    }
}

/// Result of a floor layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FloorConfiguration {
    /// Boards ordered left to right.
    pub boards: Vec<FloorBoard>,
    /// Width the floor was laid out for.
    pub total_width: f64,
    /// `total_width - 2 * edge_offset`.
    pub usable_width: f64,
    /// Clearance kept at each side.
    pub edge_offset: f64,
    /// True if a custom plywood fill board is present.
    pub has_custom_plywood: bool,
    /// Every uncovered span inside the usable width, left to right.
    pub gaps: Vec<f64>,
    /// True if the uniform fallback produced this layout.
    pub uniform: bool,
}

impl FloorConfiguration {
    /// Sum of board widths.
    pub fn covered_width(&self) -> f64 {
        self.boards.iter().map(|b| b.width).sum()
    }

    /// Sum of gaps.
    pub fn gap_total(&self) -> f64 {
        self.gaps.iter().sum()
    }

    /// Number of lumber boards.
    pub fn lumber_count(&self) -> usize {
        self.boards.iter().filter(|b| !b.is_custom()).count()
    }

    /// Number of custom plywood boards.
    pub fn custom_count(&self) -> usize {
        self.boards.iter().filter(|b| b.is_custom()).count()
    }

    /// The unpaired center board, if the board count is odd.
    pub fn center_board(&self) -> Option<&FloorBoard> {
        if self.boards.len() % 2 == 1 {
            self.boards.get(self.boards.len() / 2)
        } else {
            None
        }
    }

    /// Checks mirror symmetry about the crate centerline.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let n = self.boards.len();
        (0..n / 2).all(|i| {
            let a = &self.boards[i];
            let b = &self.boards[n - 1 - i];
            (a.width - b.width).abs() <= tol && (a.position.x + b.position.x).abs() <= tol
        }) && self
            .center_board()
            .map_or(true, |c| c.position.x.abs() <= tol)
    }
}

/// Floor layout engine over a lumber catalog.
#[derive(Debug, Clone, Copy)]
pub struct FloorLayoutEngine<'a> {
    catalog: LumberCatalog<'a>,
    edge_offset: f64,
    max_gap: f64,
    min_custom_width: f64,
}

impl FloorLayoutEngine<'static> {
    /// Engine over the floor catalog.
    pub fn standard(allow_narrow_lumber: bool) -> Self {
        Self::new(LumberCatalog::floor(allow_narrow_lumber))
    }
}

impl<'a> FloorLayoutEngine<'a> {
    /// Creates an engine over the given catalog with default constants.
    pub fn new(catalog: LumberCatalog<'a>) -> Self {
        Self {
            catalog,
            edge_offset: EDGE_OFFSET,
            max_gap: MAX_GAP,
            min_custom_width: MIN_CUSTOM_WIDTH,
        }
    }

    /// Sets the side edge offset.
    pub fn with_edge_offset(mut self, offset: f64) -> Self {
        self.edge_offset = offset;
        self
    }

    /// Sets the pair gap.
    pub fn with_max_gap(mut self, gap: f64) -> Self {
        self.max_gap = gap;
        self
    }

    /// Sets the minimum custom fill width.
    pub fn with_min_custom_width(mut self, width: f64) -> Self {
        self.min_custom_width = width;
        self
    }

    fn usable_width(&self, crate_width: f64, crate_depth: f64) -> Result<f64> {
        if !(crate_width.is_finite() && crate_width > 0.0) {
            return Err(Error::invalid("floor width", "must be positive and finite"));
        }
        if !(crate_depth.is_finite() && crate_depth > 0.0) {
            return Err(Error::invalid("floor depth", "must be positive and finite"));
        }
        let usable = crate_width - 2.0 * self.edge_offset;
        if usable <= 0.0 {
            return Err(Error::infeasible(
                Stage::Floor,
                usable,
                "edge offsets consume the whole floor width",
            ));
        }
        Ok(usable)
    }

    /// Lays out the floor, falling back to the uniform layout if the
    /// symmetric pass places nothing.
    pub fn layout(&self, crate_width: f64, crate_depth: f64) -> Result<FloorConfiguration> {
        let symmetric = self.symmetric(crate_width, crate_depth)?;
        if !symmetric.boards.is_empty() {
            return Ok(symmetric);
        }

        log::warn!(
            "symmetric floor layout placed no boards for width {:.3}in; using uniform layout",
            crate_width
        );
        let uniform = self.uniform(crate_width, crate_depth)?;
        if uniform.boards.is_empty() {
            return Err(Error::infeasible(
                Stage::Floor,
                uniform.usable_width,
                format!(
                    "usable width is below the minimum custom width ({:.2}in)",
                    self.min_custom_width
                ),
            ));
        }
        Ok(uniform)
    }

    /// Symmetric outside-in layout.
    pub fn symmetric(&self, crate_width: f64, crate_depth: f64) -> Result<FloorConfiguration> {
        let usable = self.usable_width(crate_width, crate_depth)?;

        let mut left = -usable / 2.0;
        let mut right = usable / 2.0;
        let mut left_boards = Vec::new();
        let mut right_boards = Vec::new();
        let mut left_gaps = Vec::new();
        let mut center_boards = Vec::new();
        let mut center_gaps = Vec::new();

        loop {
            let center = right - left;
            if center <= TOLERANCE {
                break;
            }

            if let Some(size) = self.catalog.select_for_space(center / 2.0) {
                left_boards.push(FloorBoard::lumber(size, left + size.width / 2.0, crate_depth));
                right_boards.push(FloorBoard::lumber(size, right - size.width / 2.0, crate_depth));
                left += size.width;
                right -= size.width;

                if right - left > 2.0 * self.max_gap + TOLERANCE {
                    left += self.max_gap;
                    right -= self.max_gap;
                    left_gaps.push(self.max_gap);
                }
                continue;
            }

            let mid = (left + right) / 2.0;
            if let Some(size) = self.catalog.select_for_space(center) {
                center_boards.push(FloorBoard::lumber(size, mid, crate_depth));
                let slack = (center - size.width) / 2.0;
                if slack > TOLERANCE {
                    center_gaps.push(slack);
                    center_gaps.push(slack);
                }
            } else if center + TOLERANCE >= self.min_custom_width {
                center_boards.push(FloorBoard::custom(center, mid, crate_depth));
            } else {
                center_gaps.push(center);
            }
            break;
        }

        let mut gaps = left_gaps.clone();
        gaps.extend(center_gaps);
        gaps.extend(left_gaps.iter().rev());

        right_boards.reverse();
        let mut boards = left_boards;
        boards.extend(center_boards);
        boards.extend(right_boards);

        let has_custom_plywood = boards.iter().any(FloorBoard::is_custom);
        log::debug!(
            "floor: {} boards over {:.3}in usable ({} custom, {:.3}in gaps)",
            boards.len(),
            usable,
            boards.iter().filter(|b| b.is_custom()).count(),
            gaps.iter().sum::<f64>()
        );

        Ok(FloorConfiguration {
            boards,
            total_width: crate_width,
            usable_width: usable,
            edge_offset: self.edge_offset,
            has_custom_plywood,
            gaps,
            uniform: false,
        })
    }

    /// Uniform fallback: equal-width boards with evenly distributed gaps.
    pub fn uniform(&self, crate_width: f64, crate_depth: f64) -> Result<FloorConfiguration> {
        let usable = self.usable_width(crate_width, crate_depth)?;
        let count = ((usable / UNIFORM_TARGET_WIDTH).floor() as usize).max(1);

        let mut boards = Vec::new();
        let mut gaps = Vec::new();

        match self.catalog.select_for_space(usable / count as f64) {
            Some(size) => {
                let slack_total = usable - count as f64 * size.width;
                let gap = if count > 1 {
                    (slack_total / (count - 1) as f64).min(self.max_gap)
                } else {
                    0.0
                };
                let group = count as f64 * size.width + (count - 1) as f64 * gap;
                let side = (usable - group) / 2.0;

                if side > TOLERANCE {
                    gaps.push(side);
                }
                let mut cursor = -usable / 2.0 + side;
                for i in 0..count {
                    boards.push(FloorBoard::lumber(size, cursor + size.width / 2.0, crate_depth));
                    cursor += size.width;
                    if i + 1 < count && gap > TOLERANCE {
                        gaps.push(gap);
                        cursor += gap;
                    }
                }
                if side > TOLERANCE {
                    gaps.push(side);
                }
            }
            None if usable + TOLERANCE >= self.min_custom_width => {
                boards.push(FloorBoard::custom(usable, 0.0, crate_depth));
            }
            None => gaps.push(usable),
        }

        let has_custom_plywood = boards.iter().any(FloorBoard::is_custom);
        Ok(FloorConfiguration {
            boards,
            total_width: crate_width,
            usable_width: usable,
            edge_offset: self.edge_offset,
            has_custom_plywood,
            gaps,
            uniform: true,
        })
    }
}

/// Lays out floor boards with the standard floor catalog.
pub fn calculate_floor_boards(crate_width: f64, crate_depth: f64) -> Result<FloorConfiguration> {
    FloorLayoutEngine::standard(false).layout(crate_width, crate_depth)
}

/// Uniform fallback layout with the standard floor catalog.
pub fn calculate_uniform_floor_boards(
    crate_width: f64,
    crate_depth: f64,
) -> Result<FloorConfiguration> {
    FloorLayoutEngine::standard(false).uniform(crate_width, crate_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_covers(floor: &FloorConfiguration) {
        assert_relative_eq!(
            floor.covered_width() + floor.gap_total(),
            floor.usable_width,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_narrow_floor_gets_custom_center() {
        let floor = calculate_floor_boards(24.0, 48.0).unwrap();
        assert_relative_eq!(floor.usable_width, 22.0);
        assert_eq!(floor.custom_count(), 1);
        assert!(floor.has_custom_plywood);

        let center = floor.center_board().unwrap();
        assert!(center.is_custom());
        assert_relative_eq!(center.position.x, 0.0);
        assert_relative_eq!(center.width, 3.0);
        assert_eq!(floor.boards[0].nominal, Some("2x10"));
        assert_covers(&floor);
        assert!(floor.is_symmetric(1e-9));
    }

    #[test]
    fn test_pairs_descend_toward_center() {
        let floor = calculate_floor_boards(44.0, 52.0).unwrap();
        assert_covers(&floor);
        assert!(floor.is_symmetric(1e-9));
        let half = floor.boards.len() / 2;
        for w in floor.boards[..half].windows(2) {
            assert!(w[0].width >= w[1].width);
        }
        // Boards stay inside the usable width and never overlap.
        for w in floor.boards.windows(2) {
            assert!(w[0].right() <= w[1].left() + 1e-9);
        }
        assert!(floor.boards[0].left() >= -floor.usable_width / 2.0 - 1e-9);
    }

    #[test]
    fn test_single_center_lumber_board() {
        // usable 30: pair of 2x12 (22.5), gaps 0.5, center 7.0 -> 2x6 single
        let floor = calculate_floor_boards(32.0, 40.0).unwrap();
        let center = floor.center_board().unwrap();
        assert_eq!(center.nominal, Some("2x6"));
        assert!(!floor.has_custom_plywood);
        assert_covers(&floor);
    }

    #[test]
    fn test_residual_gap_below_custom_minimum() {
        // usable 24.5: pair of 2x12 (22.5), gap 0.25 each side -> 1.5 residual
        let floor = calculate_floor_boards(26.5, 40.0).unwrap();
        assert_eq!(floor.boards.len(), 2);
        assert!(floor.center_board().is_none());
        assert_covers(&floor);
        assert!(floor.gaps.iter().any(|g| (*g - 1.5).abs() < 1e-9));
    }

    #[test]
    fn test_tiny_floor_is_infeasible() {
        let err = calculate_floor_boards(4.0, 20.0).unwrap_err();
        assert!(matches!(err, Error::LayoutInfeasible { stage: Stage::Floor, .. }));
    }

    #[test]
    fn test_uniform_layout() {
        let floor = calculate_uniform_floor_boards(48.0, 40.0).unwrap();
        assert!(floor.uniform);
        // usable 46 -> 4 boards of <= 11.5 -> 2x12
        assert_eq!(floor.boards.len(), 4);
        assert!(floor.boards.iter().all(|b| b.nominal == Some("2x12")));
        assert_covers(&floor);
        assert!(floor.is_symmetric(1e-9));
    }

    #[test]
    fn test_narrow_lumber_option() {
        // usable 28: 2x12 pair, gaps, 5.0 left in the center
        let narrow = FloorLayoutEngine::standard(true).layout(30.0, 48.0).unwrap();
        assert_eq!(narrow.center_board().unwrap().nominal, Some("2x4"));
        assert_covers(&narrow);

        let standard = FloorLayoutEngine::standard(false).layout(30.0, 48.0).unwrap();
        assert!(standard.center_board().unwrap().is_custom());
        assert_covers(&standard);
    }

    #[test]
    fn test_depth_is_propagated() {
        let floor = calculate_floor_boards(40.0, 63.5).unwrap();
        assert!(floor.boards.iter().all(|b| b.depth == 63.5));
    }
}
