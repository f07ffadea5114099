//! Skid sizing and spacing.
//!
//! The skid cross-section comes from a weight-keyed lookup table. The count is
//! the smallest value that meets both the table's structural minimum and the
//! maximum center-to-center spacing across the crate's inside width.

use u_crating_core::{Error, Result, Stage};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Crates longer than this (inches) need rub strips under the skids.
pub const RUB_STRIP_LENGTH_THRESHOLD: f64 = 96.0;

/// Tolerance applied to spacing comparisons.
const SPACING_TOLERANCE: f64 = 1e-9;

/// Skid cross-section (width across the crate, height off the ground).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SkidSize {
    /// Nominal label (e.g. "4x4").
    pub nominal: &'static str,
    /// Actual width, inches.
    pub width: f64,
    /// Actual height, inches.
    pub height: f64,
}

const SKID_3X4: SkidSize = SkidSize {
    nominal: "3x4",
    width: 2.5,
    height: 3.5,
};
const SKID_4X4: SkidSize = SkidSize {
    nominal: "4x4",
    width: 3.5,
    height: 3.5,
};
const SKID_4X6: SkidSize = SkidSize {
    nominal: "4x6",
    width: 5.5,
    height: 3.5,
};
const SKID_6X6: SkidSize = SkidSize {
    nominal: "6x6",
    width: 5.5,
    height: 5.5,
};
const SKID_8X8: SkidSize = SkidSize {
    nominal: "8x8",
    width: 7.25,
    height: 7.25,
};

/// One row of the weight lookup table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkidRule {
    /// Upper weight bound (inclusive), pounds.
    pub max_weight: f64,
    /// Skid cross-section.
    pub size: SkidSize,
    /// Maximum center-to-center spacing, inches.
    pub max_spacing: f64,
    /// Structural minimum skid count.
    pub min_count: usize,
}

const fn rule(max_weight: f64, size: SkidSize, max_spacing: f64, min_count: usize) -> SkidRule {
    SkidRule {
        max_weight,
        size,
        max_spacing,
        min_count,
    }
}

/// Weight breakpoints, ascending.
pub static SKID_RULES: [SkidRule; 7] = [
    rule(500.0, SKID_4X4, 30.0, 3),
    rule(4_500.0, SKID_4X4, 30.0, 3),
    rule(6_000.0, SKID_4X6, 41.0, 3),
    rule(12_000.0, SKID_4X6, 28.0, 4),
    rule(30_000.0, SKID_6X6, 24.0, 4),
    rule(40_000.0, SKID_6X6, 20.0, 5),
    rule(f64::INFINITY, SKID_8X8, 24.0, 5),
];

/// Returns the lookup row for a gross weight.
///
/// Loads up to 500 lb may use a 3x4 when `allow_3x4` is set.
pub fn skid_rule_for_weight(weight: f64, allow_3x4: bool) -> SkidRule {
    let row = SKID_RULES
        .iter()
        .find(|r| weight <= r.max_weight)
        .copied()
        .unwrap_or(SKID_RULES[SKID_RULES.len() - 1]);

    if allow_3x4 && weight <= SKID_RULES[0].max_weight {
        SkidRule {
            size: SKID_3X4,
            ..row
        }
    } else {
        row
    }
}

/// Derived skid layout. Replaced wholesale whenever inputs change.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SkidConfiguration {
    /// Chosen cross-section.
    pub size: SkidSize,
    /// Number of skids.
    pub count: usize,
    /// Center-to-center spacing, inches.
    pub spacing: f64,
    /// Spacing limit from the lookup table.
    pub max_spacing: f64,
    /// Structural minimum count from the lookup table.
    pub min_count: usize,
    /// Skid length (crate depth).
    pub length: f64,
    /// Skid center X positions, left to right, relative to the crate centerline.
    pub positions: Vec<f64>,
    /// Distance the skids extend past the front face.
    pub overhang_front: f64,
    /// Distance the skids extend past the back face.
    pub overhang_back: f64,
    /// Long crates need continuous rub strips.
    pub requires_rub_strips: bool,
}

impl SkidConfiguration {
    /// Number of rub strips (one per skid when required).
    pub fn rub_strip_count(&self) -> usize {
        if self.requires_rub_strips {
            self.count
        } else {
            0
        }
    }

    /// Total skid lumber length in inches.
    pub fn total_length(&self) -> f64 {
        self.length * self.count as f64
    }
}

/// Computes skid size, count and spacing.
///
/// `crate_width` is the inside width the skids are spread across, and
/// `crate_depth` is the skid length.
pub fn calculate_skid_configuration(
    crate_width: f64,
    crate_depth: f64,
    max_gross_weight: f64,
    allow_3x4: bool,
) -> Result<SkidConfiguration> {
    if !(crate_width.is_finite() && crate_width > 0.0) {
        return Err(Error::invalid("crate width", "must be positive and finite"));
    }
    if !(crate_depth.is_finite() && crate_depth > 0.0) {
        return Err(Error::invalid("crate depth", "must be positive and finite"));
    }
    if !(max_gross_weight.is_finite() && max_gross_weight > 0.0) {
        return Err(Error::invalid("product.weight", "must be positive and finite"));
    }

    let rule = skid_rule_for_weight(max_gross_weight, allow_3x4);
    let size = rule.size;
    let span = crate_width - size.width;
    if span <= 0.0 {
        return Err(Error::infeasible(
            Stage::Skids,
            crate_width,
            format!("crate is narrower than one {} skid", size.nominal),
        ));
    }

    let mut count = rule
        .min_count
        .max(2)
        .max((span / rule.max_spacing).ceil() as usize + 1);
    let mut spacing = span / (count - 1) as f64;
    while spacing > rule.max_spacing + SPACING_TOLERANCE {
        count += 1;
        spacing = span / (count - 1) as f64;
    }

    if spacing < size.width - SPACING_TOLERANCE {
        return Err(Error::infeasible(
            Stage::Skids,
            crate_width,
            format!(
                "{} {} skids do not fit side by side ({:.3}in spacing)",
                count, size.nominal, spacing
            ),
        ));
    }
    if spacing > rule.max_spacing + SPACING_TOLERANCE {
        return Err(Error::SpacingViolation {
            context: "skids".to_string(),
            spacing,
            max: rule.max_spacing,
        });
    }

    let positions: Vec<f64> = (0..count)
        .map(|i| -span / 2.0 + i as f64 * spacing)
        .collect();

    log::debug!(
        "skids: {} x {} at {:.3}in spacing (weight {:.0} lb, width {:.3}in)",
        count,
        size.nominal,
        spacing,
        max_gross_weight,
        crate_width
    );

    Ok(SkidConfiguration {
        size,
        count,
        spacing,
        max_spacing: rule.max_spacing,
        min_count: rule.min_count,
        length: crate_depth,
        positions,
        overhang_front: 0.0,
        overhang_back: 0.0,
        requires_rub_strips: crate_depth > RUB_STRIP_LENGTH_THRESHOLD,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rule_lookup() {
        assert_eq!(skid_rule_for_weight(500.0, false).size.nominal, "4x4");
        assert_eq!(skid_rule_for_weight(500.0, true).size.nominal, "3x4");
        assert_eq!(skid_rule_for_weight(501.0, true).size.nominal, "4x4");
        assert_eq!(skid_rule_for_weight(5_000.0, false).size.nominal, "4x6");
        assert_eq!(skid_rule_for_weight(15_000.0, false).size.nominal, "6x6");
        assert_eq!(skid_rule_for_weight(35_000.0, false).max_spacing, 20.0);
        assert_eq!(skid_rule_for_weight(60_000.0, false).size.nominal, "8x8");
    }

    #[test]
    fn test_light_crate() {
        let skids = calculate_skid_configuration(44.0, 54.0, 500.0, false).unwrap();
        assert_eq!(skids.size.nominal, "4x4");
        assert_eq!(skids.count, 3);
        assert_relative_eq!(skids.spacing, 20.25);
        assert!(skids.spacing <= 30.0);
        assert!(!skids.requires_rub_strips);
        assert_relative_eq!(skids.positions[0], -20.25);
        assert_relative_eq!(skids.positions[2], 20.25);
    }

    #[test]
    fn test_wide_crate_adds_skids() {
        let skids = calculate_skid_configuration(120.0, 54.0, 1_000.0, false).unwrap();
        // (120 - 3.5) / 30 = 3.88 -> 4 gaps -> 5 skids
        assert_eq!(skids.count, 5);
        assert!(skids.spacing <= 30.0);
        let fewer = (120.0 - 3.5) / (skids.count - 2) as f64;
        assert!(fewer > 30.0);
    }

    #[test]
    fn test_rub_strips_on_long_crates() {
        let skids = calculate_skid_configuration(44.0, 120.0, 800.0, false).unwrap();
        assert!(skids.requires_rub_strips);
        assert_eq!(skids.rub_strip_count(), skids.count);
        assert_relative_eq!(skids.total_length(), 120.0 * skids.count as f64);
    }

    #[test]
    fn test_too_narrow_is_infeasible() {
        let err = calculate_skid_configuration(8.0, 40.0, 300.0, false).unwrap_err();
        assert!(matches!(err, Error::LayoutInfeasible { stage: Stage::Skids, .. }));
    }

    #[test]
    fn test_invalid_weight() {
        assert!(matches!(
            calculate_skid_configuration(40.0, 40.0, 0.0, false),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
