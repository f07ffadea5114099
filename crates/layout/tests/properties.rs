//! Property-based tests for the layout stages.
//!
//! Run with: cargo test -p u-crating-layout -- prop

use proptest::prelude::*;
use u_crating_core::panel::{PanelDimensions, PerimeterStyle};
use u_crating_layout::{
    calculate_cleat_positions, calculate_floor_boards, calculate_plywood_pieces,
    calculate_skid_configuration, skid_rule_for_weight, Cleat, CleatKind, CleatOptions,
    CleatOrientation, CutPiece, PlywoodOptions, SpliceOrientation,
};

const EPS: f64 = 1e-6;

fn arb_style() -> impl Strategy<Value = PerimeterStyle> {
    prop_oneof![
        Just(PerimeterStyle::HorizontalFullWidth),
        Just(PerimeterStyle::VerticalFullHeight),
    ]
}

proptest! {
    #[test]
    fn prop_floor_covers_usable_width(width in 12.0..120.0f64, depth in 20.0..150.0f64) {
        let floor = calculate_floor_boards(width, depth).unwrap();
        let total = floor.covered_width() + floor.gap_total();
        prop_assert!((total - floor.usable_width).abs() <= EPS,
            "width {}: boards + gaps = {}, usable = {}", width, total, floor.usable_width);
        prop_assert!(!floor.boards.is_empty());
    }

    #[test]
    fn prop_floor_is_mirror_symmetric(width in 12.0..120.0f64) {
        let floor = calculate_floor_boards(width, 48.0).unwrap();
        prop_assert!(floor.is_symmetric(EPS));
        prop_assert!(floor.custom_count() <= 1);
        for pair in floor.boards.windows(2) {
            prop_assert!(pair[0].right() <= pair[1].left() + EPS);
        }
    }

    #[test]
    fn prop_skid_count_is_minimal(width in 40.0..200.0f64, weight in 1.0..60_000.0f64) {
        let skids = calculate_skid_configuration(width, 60.0, weight, false).unwrap();
        let rule = skid_rule_for_weight(weight, false);
        let span = width - skids.size.width;

        prop_assert!(skids.spacing <= rule.max_spacing + EPS);
        prop_assert!(skids.count >= rule.min_count.max(2));
        if skids.count > rule.min_count.max(2) {
            let fewer = span / (skids.count - 2) as f64;
            prop_assert!(fewer > rule.max_spacing);
        }
        for pair in skids.positions.windows(2) {
            prop_assert!((pair[1] - pair[0] - skids.spacing).abs() <= EPS);
        }
    }

    #[test]
    fn prop_plywood_pieces_fit_stock(
        width in 12.0..240.0f64,
        height in 12.0..160.0f64,
        rotation in any::<bool>(),
    ) {
        let options = PlywoodOptions::default().with_rotation(rotation);
        let panel = PanelDimensions::new(width, height);
        let layout = calculate_plywood_pieces(panel, "P", &options).unwrap();

        let pieces: f64 = layout.pieces.iter().map(CutPiece::area).sum();
        prop_assert!(pieces <= layout.sheet_area() + EPS);
        prop_assert!((pieces - layout.panel_area()).abs() <= EPS);

        for splice in &layout.splices {
            let on_boundary = layout.sheets.iter().any(|s| match splice.orientation {
                SpliceOrientation::Vertical => (s.x - splice.position).abs() <= EPS,
                SpliceOrientation::Horizontal => (s.y - splice.position).abs() <= EPS,
            });
            prop_assert!(on_boundary, "splice {:?} is not a cell boundary", splice);
        }
        for piece in &layout.sheets {
            prop_assert!(piece.width >= options.min_piece - EPS || piece.width >= width - EPS);
        }
    }

    #[test]
    fn prop_cleats_cover_splices_within_spacing(
        width in 20.0..240.0f64,
        height in 20.0..160.0f64,
        style in arb_style(),
    ) {
        let panel = PanelDimensions::new(width, height);
        let layout = calculate_plywood_pieces(panel, "P", &PlywoodOptions::default()).unwrap();
        let options = CleatOptions::default().with_style(style);
        let cleats = calculate_cleat_positions(panel, "P", &layout.splices, &options).unwrap();

        prop_assert!(cleats.vertical_spacing() <= options.max_spacing + EPS);
        prop_assert!(cleats.horizontal_spacing() <= options.max_spacing + EPS);

        for splice in &layout.splices {
            let centered = |c: &&Cleat| c.kind == CleatKind::Splice && match splice.orientation {
                SpliceOrientation::Vertical => c.orientation == CleatOrientation::Vertical
                    && (c.center_x() - splice.position).abs() <= EPS,
                SpliceOrientation::Horizontal => c.orientation == CleatOrientation::Horizontal
                    && (c.center_y() - splice.position).abs() <= EPS,
            };
            let hits: Vec<_> = cleats.cleats.iter().filter(centered).collect();
            prop_assert!(!hits.is_empty(), "splice {:?} has no cleat", splice);
            if splice.orientation == SpliceOrientation::Vertical {
                prop_assert_eq!(hits.len(), 1);
            }
            let covered: f64 = hits.iter().map(|c| c.length()).sum();
            prop_assert!(covered > 0.0);
        }
    }
}
