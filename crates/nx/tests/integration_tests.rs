//! Integration tests for expression synthesis.

use approx::assert_relative_eq;
use u_crating_assembly::{build_crate_geometry, calculate_hardware, CrateGeometry};
use u_crating_core::{BlockKind, CrateConfiguration, MarkingFlags};
use u_crating_nx::{
    calculate_markings, generate_expressions, parse_listing, ExpressionKind, ExpressionSet,
    MarkingType,
};

fn synthesize(config: &CrateConfiguration) -> (CrateGeometry, ExpressionSet) {
    let geometry = build_crate_geometry(config).expect("geometry should build");
    let hardware = calculate_hardware(&geometry);
    let markings = calculate_markings(&config.markings, geometry.dimensions.overall_height);
    let set = generate_expressions(&geometry, &markings, &hardware).expect("expressions");
    (geometry, set)
}

mod listing_tests {
    use super::*;

    #[test]
    fn test_text_matches_entries() {
        let (_, set) = synthesize(&CrateConfiguration::default());
        let parsed = parse_listing(&set.text);
        assert_eq!(parsed.len(), set.len());
        for ((name, value), entry) in parsed.iter().zip(&set.entries) {
            assert_eq!(*name, entry.name);
            assert_eq!(*value, entry.value.to_string());
        }
    }

    #[test]
    fn test_names_are_unique() {
        let (_, set) = synthesize(&CrateConfiguration::new().with_product(120.0, 60.0, 72.0));
        let mut names: Vec<&str> = set.entries.iter().map(|e| e.name.as_str()).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_lines_have_no_spaces_around_equals() {
        let (_, set) = synthesize(&CrateConfiguration::default());
        for line in set.text.lines().filter(|l| !l.is_empty() && !l.starts_with('#')) {
            assert!(!line.contains(" ="), "{line}");
            assert!(!line.contains("= "), "{line}");
        }
    }
}

mod contract_tests {
    use super::*;

    #[test]
    fn test_two_point_count_across_configurations() {
        let configs = [
            CrateConfiguration::default(),
            CrateConfiguration::new().with_product(130.0, 50.0, 80.0).with_weight(9_000.0),
            CrateConfiguration::new().with_product(20.0, 20.0, 20.0).with_weight(100.0),
        ];
        for config in &configs {
            let (g, set) = synthesize(config);
            assert_eq!(set.count_of(ExpressionKind::TwoPoint), 6 * g.active_blocks().count());
            let panel_pieces = g
                .active_blocks()
                .filter(|b| matches!(b.kind, BlockKind::Plywood | BlockKind::Cleat))
                .count();
            assert_eq!(set.count_of(ExpressionKind::SevenParameter), 7 * panel_pieces);
        }
    }

    #[test]
    fn test_expression_count_is_stable_when_slots_fit() {
        // Both crates stay within every template slot count.
        let (_, a) = synthesize(&CrateConfiguration::new().with_product(48.0, 40.0, 40.0));
        let (_, b) = synthesize(&CrateConfiguration::new().with_product(48.0, 44.0, 40.0));
        let slots = |s: &ExpressionSet| {
            s.entries
                .iter()
                .filter(|e| {
                    let floor_slot = e.name.starts_with("FLOORBOARD_")
                        && (e.name.ends_with("_X1") || e.name.ends_with("_SUPPRESSED"));
                    let klimp_slot = e.name.starts_with("KLIMP_") && e.name.ends_with("_ACTIVE");
                    floor_slot || klimp_slot
                })
                .count()
        };
        assert_eq!(slots(&a), slots(&b));
    }

    #[test]
    fn test_dimension_scalars() {
        let config = CrateConfiguration::new().with_product(48.0, 40.0, 40.0).with_weight(500.0);
        let (g, set) = synthesize(&config);
        assert_relative_eq!(set.number("overall_width").unwrap(), g.dimensions.overall_width);
        assert_relative_eq!(set.number("clearance_side").unwrap(), 2.0);
        assert_relative_eq!(set.number("pattern_count").unwrap(), 3.0);
        assert!(set.text.contains("skid_nominal=\"4x4\"\n"));
        assert_relative_eq!(set.number("bbox_diagonal").unwrap(), g.bounds.diagonal);
    }

    #[test]
    fn test_disabled_markings_report_zero() {
        let config = CrateConfiguration::new().with_markings(MarkingFlags {
            logo: false,
            fragile: true,
            handling: false,
        });
        let (g, set) = synthesize(&config);
        assert_relative_eq!(set.number("logo_count").unwrap(), 0.0);
        assert_relative_eq!(set.number("fragile_count").unwrap(), 4.0);
        let expected = MarkingType::Fragile.size_for_height(g.dimensions.overall_height);
        assert_relative_eq!(set.number("fragile_width").unwrap(), expected.0);
    }
}
