//! Crate configuration and derived dimensions.
//!
//! [`CrateConfiguration`] is the immutable input to the whole pipeline. Every
//! field is required and defaulted at construction, so stages always receive a
//! fully-resolved configuration.

use crate::lumber::LUMBER_THICKNESS;
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Floor board thickness (2x lumber and custom plywood fill alike).
pub const FLOORBOARD_THICKNESS: f64 = LUMBER_THICKNESS;

/// Accepted product dimension range, inches.
pub const PRODUCT_DIMENSION_RANGE: (f64, f64) = (1.0, 10_000.0);

/// Accepted product weight range, pounds.
pub const PRODUCT_WEIGHT_RANGE: (f64, f64) = (0.1, 100_000.0);

/// Product envelope and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct ProductDimensions {
    /// Length along the crate depth (Y), inches.
    pub length: f64,
    /// Width along X, inches.
    pub width: f64,
    /// Height along Z, inches.
    pub height: f64,
    /// Weight in pounds.
    pub weight: f64,
}

impl Default for ProductDimensions {
    fn default() -> Self {
        Self {
            length: 48.0,
            width: 40.0,
            height: 40.0,
            weight: 500.0,
        }
    }
}

/// Clearance between the product and the inside of the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Clearances {
    /// Applied on each side (X).
    pub side: f64,
    /// Applied on each end (Y).
    pub end: f64,
    /// Applied once, above the product.
    pub top: f64,
}

impl Default for Clearances {
    fn default() -> Self {
        Self {
            side: 2.0,
            end: 2.0,
            top: 3.0,
        }
    }
}

/// Lumber grade, carried into block metadata and the bill of materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum LumberGrade {
    /// No. 2 and better.
    #[default]
    No2,
    /// No. 1.
    No1,
    /// Select structural.
    Select,
}

impl LumberGrade {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            LumberGrade::No2 => "No.2",
            LumberGrade::No1 => "No.1",
            LumberGrade::Select => "Select Structural",
        }
    }
}

/// Cleat cross-section selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CleatType {
    /// 1x4 framing.
    #[default]
    Standard,
    /// 1x6 framing.
    Reinforced,
    /// 2x4 framing for heavy corner loads.
    Corner,
}

/// Cleat cross-section in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CleatProfile {
    /// Nominal label.
    pub nominal: &'static str,
    /// Face width.
    pub width: f64,
    /// Thickness normal to the panel.
    pub thickness: f64,
}

impl CleatType {
    /// Returns the catalog cross-section for this cleat type.
    pub fn profile(&self) -> CleatProfile {
        match self {
            CleatType::Standard => CleatProfile {
                nominal: "1x4",
                width: 3.5,
                thickness: 0.75,
            },
            CleatType::Reinforced => CleatProfile {
                nominal: "1x6",
                width: 5.5,
                thickness: 0.75,
            },
            CleatType::Corner => CleatProfile {
                nominal: "2x4",
                width: 3.5,
                thickness: 1.5,
            },
        }
    }
}

/// Cleat material; a strength/density lookup only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CleatMaterial {
    /// Pine.
    #[default]
    Pine,
    /// Oak.
    Oak,
    /// Steel.
    Metal,
}

impl CleatMaterial {
    /// Allowable strength in MPa.
    pub fn strength_mpa(&self) -> f64 {
        match self {
            CleatMaterial::Pine => 35.0,
            CleatMaterial::Oak => 50.0,
            CleatMaterial::Metal => 250.0,
        }
    }

    /// Density in kg/m³.
    pub fn density_kg_m3(&self) -> f64 {
        match self {
            CleatMaterial::Pine => 500.0,
            CleatMaterial::Oak => 700.0,
            CleatMaterial::Metal => 7850.0,
        }
    }

    /// Density in lb/in³.
    pub fn density_lb_in3(&self) -> f64 {
        // 1 kg/m³ = 3.6127e-5 lb/in³
        self.density_kg_m3() * 3.612_729e-5
    }
}

/// Material selections.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct MaterialSelection {
    /// Lumber grade.
    pub lumber_grade: LumberGrade,
    /// Plywood sheathing thickness, inches.
    pub plywood_thickness: f64,
    /// Cleat cross-section.
    pub cleat_type: CleatType,
    /// Cleat material.
    pub cleat_material: CleatMaterial,
    /// Permits 2x4 floor boards.
    pub allow_narrow_lumber: bool,
    /// Permits 3x4 skids for light loads.
    pub allow_3x4_skids: bool,
}

impl Default for MaterialSelection {
    fn default() -> Self {
        Self {
            lumber_grade: LumberGrade::default(),
            plywood_thickness: 0.25,
            cleat_type: CleatType::default(),
            cleat_material: CleatMaterial::default(),
            allow_narrow_lumber: false,
            allow_3x4_skids: false,
        }
    }
}

/// Which markings/decals to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct MarkingFlags {
    /// Company logo.
    pub logo: bool,
    /// "Fragile" stencil.
    pub fragile: bool,
    /// Handling symbols.
    pub handling: bool,
}

impl Default for MarkingFlags {
    fn default() -> Self {
        Self {
            logo: true,
            fragile: true,
            handling: true,
        }
    }
}

/// A rectangular stock plywood sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct StockSheet {
    /// Width, inches.
    pub width: f64,
    /// Height, inches.
    pub height: f64,
}

impl StockSheet {
    /// Creates a stock sheet.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Sheet area in square inches.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl Default for StockSheet {
    /// A standard 4x8 ft sheet.
    fn default() -> Self {
        Self {
            width: 48.0,
            height: 96.0,
        }
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct LayoutOptions {
    /// Stock sheet used by the plywood optimizer.
    pub stock_sheet: StockSheet,
    /// Allows rotated sheet cells.
    pub allow_rotation: bool,
    /// Maximum center-to-center cleat spacing, inches.
    pub max_cleat_spacing: f64,
    /// Narrowest plywood strip the optimizer may leave at a panel edge.
    pub min_plywood_piece: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            stock_sheet: StockSheet::default(),
            allow_rotation: true,
            max_cleat_spacing: 24.0,
            min_plywood_piece: 12.0,
        }
    }
}

/// Complete input to the crate design pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct CrateConfiguration {
    /// Product envelope and weight.
    pub product: ProductDimensions,
    /// Clearances around the product.
    pub clearances: Clearances,
    /// Material selections.
    pub materials: MaterialSelection,
    /// Marking flags.
    pub markings: MarkingFlags,
    /// Per-call overrides.
    pub options: LayoutOptions,
}

impl CrateConfiguration {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the product envelope (length, width, height).
    pub fn with_product(mut self, length: f64, width: f64, height: f64) -> Self {
        self.product.length = length;
        self.product.width = width;
        self.product.height = height;
        self
    }

    /// Sets the product weight in pounds.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.product.weight = weight;
        self
    }

    /// Sets side, end and top clearances.
    pub fn with_clearances(mut self, side: f64, end: f64, top: f64) -> Self {
        self.clearances = Clearances { side, end, top };
        self
    }

    /// Sets the plywood thickness.
    pub fn with_plywood_thickness(mut self, thickness: f64) -> Self {
        self.materials.plywood_thickness = thickness;
        self
    }

    /// Sets the cleat type.
    pub fn with_cleat_type(mut self, cleat_type: CleatType) -> Self {
        self.materials.cleat_type = cleat_type;
        self
    }

    /// Sets the lumber grade.
    pub fn with_lumber_grade(mut self, grade: LumberGrade) -> Self {
        self.materials.lumber_grade = grade;
        self
    }

    /// Allows 2x4 floor boards.
    pub fn with_allow_narrow_lumber(mut self, allow: bool) -> Self {
        self.materials.allow_narrow_lumber = allow;
        self
    }

    /// Allows 3x4 skids for light loads.
    pub fn with_allow_3x4_skids(mut self, allow: bool) -> Self {
        self.materials.allow_3x4_skids = allow;
        self
    }

    /// Sets the marking flags.
    pub fn with_markings(mut self, markings: MarkingFlags) -> Self {
        self.markings = markings;
        self
    }

    /// Sets the stock sheet size.
    pub fn with_stock_sheet(mut self, width: f64, height: f64) -> Self {
        self.options.stock_sheet = StockSheet::new(width, height);
        self
    }

    /// Enables or disables rotated plywood cells.
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.options.allow_rotation = allow;
        self
    }

    /// Sets the maximum cleat spacing.
    pub fn with_max_cleat_spacing(mut self, spacing: f64) -> Self {
        self.options.max_cleat_spacing = spacing;
        self
    }

    /// Validates the configuration; the first offending field is reported.
    pub fn validate(&self) -> Result<()> {
        positive("product.length", self.product.length)?;
        positive("product.width", self.product.width)?;
        positive("product.height", self.product.height)?;
        positive("product.weight", self.product.weight)?;
        within("product.length", self.product.length, PRODUCT_DIMENSION_RANGE)?;
        within("product.width", self.product.width, PRODUCT_DIMENSION_RANGE)?;
        within("product.height", self.product.height, PRODUCT_DIMENSION_RANGE)?;
        within("product.weight", self.product.weight, PRODUCT_WEIGHT_RANGE)?;

        non_negative("clearances.side", self.clearances.side)?;
        non_negative("clearances.end", self.clearances.end)?;
        non_negative("clearances.top", self.clearances.top)?;

        positive("materials.plywoodThickness", self.materials.plywood_thickness)?;

        positive("options.stockSheet.width", self.options.stock_sheet.width)?;
        positive("options.stockSheet.height", self.options.stock_sheet.height)?;
        non_negative("options.minPlywoodPiece", self.options.min_plywood_piece)?;
        if self.options.min_plywood_piece * 2.0
            > self.options.stock_sheet.width.min(self.options.stock_sheet.height)
        {
            return Err(Error::invalid(
                "options.minPlywoodPiece",
                "must not exceed half the short side of the stock sheet",
            ));
        }

        positive("options.maxCleatSpacing", self.options.max_cleat_spacing)?;
        let cleat = self.materials.cleat_type.profile();
        if self.options.max_cleat_spacing <= cleat.width {
            return Err(Error::invalid(
                "options.maxCleatSpacing",
                format!("must exceed the cleat width ({:.2}in)", cleat.width),
            ));
        }

        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid(field, "must be finite"));
    }
    if value <= 0.0 {
        return Err(Error::invalid(field, "must be positive"));
    }
    Ok(())
}

fn within(field: &str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if value < min || value > max {
        return Err(Error::invalid(field, format!("must be between {} and {}", min, max)));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid(field, "must be finite"));
    }
    if value < 0.0 {
        return Err(Error::invalid(field, "must not be negative"));
    }
    Ok(())
}

/// Dimensions derived from a configuration and the chosen skid height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CrateDimensions {
    /// Product envelope.
    pub product: ProductDimensions,
    /// Inside width between end panels (X).
    pub internal_width: f64,
    /// Inside length between front and back panels (Y).
    pub internal_length: f64,
    /// Inside height above the floor boards (Z).
    pub internal_height: f64,
    /// Plywood thickness.
    pub plywood_thickness: f64,
    /// Cleat thickness.
    pub cleat_thickness: f64,
    /// Plywood plus cleat.
    pub panel_thickness: f64,
    /// Skid height.
    pub skid_height: f64,
    /// Floor board thickness.
    pub floorboard_thickness: f64,
    /// Outside width.
    pub overall_width: f64,
    /// Outside length.
    pub overall_length: f64,
    /// Outside height.
    pub overall_height: f64,
}

impl CrateDimensions {
    /// Derives crate dimensions from a configuration and the skid height.
    pub fn new(config: &CrateConfiguration, skid_height: f64) -> Self {
        let product = config.product;
        let clear = config.clearances;
        let plywood_thickness = config.materials.plywood_thickness;
        let cleat_thickness = config.materials.cleat_type.profile().thickness;
        let panel_thickness = plywood_thickness + cleat_thickness;

        let internal_width = product.width + 2.0 * clear.side;
        let internal_length = product.length + 2.0 * clear.end;
        let internal_height = product.height + clear.top;

        Self {
            product,
            internal_width,
            internal_length,
            internal_height,
            plywood_thickness,
            cleat_thickness,
            panel_thickness,
            skid_height,
            floorboard_thickness: FLOORBOARD_THICKNESS,
            overall_width: internal_width + 2.0 * panel_thickness,
            overall_length: internal_length + 2.0 * panel_thickness,
            overall_height: skid_height + FLOORBOARD_THICKNESS + internal_height + panel_thickness,
        }
    }

    /// Height of the floor deck surface above the ground.
    pub fn deck_height(&self) -> f64 {
        self.skid_height + self.floorboard_thickness
    }

    /// Height of front, back and end panels (floor board edge to ceiling).
    pub fn wall_height(&self) -> f64 {
        self.floorboard_thickness + self.internal_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CrateConfiguration::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let err = CrateConfiguration::new()
            .with_product(48.0, 0.0, 40.0)
            .validate()
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfiguration { ref field, .. } if field == "product.width")
        );

        let err = CrateConfiguration::new()
            .with_weight(f64::NAN)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn test_rejects_out_of_range_product() {
        let err = CrateConfiguration::new()
            .with_product(48.0, 1e12, 40.0)
            .validate()
            .unwrap_err();
        assert!(
            matches!(err, Error::InvalidConfiguration { ref field, .. } if field == "product.width")
        );

        let err = CrateConfiguration::new()
            .with_product(0.5, 40.0, 40.0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("product.length"));

        let err = CrateConfiguration::new()
            .with_weight(150_000.0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("product.weight"));

        assert!(CrateConfiguration::new()
            .with_product(10_000.0, 10_000.0, 10_000.0)
            .with_weight(100_000.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_rejects_negative_clearance() {
        let err = CrateConfiguration::new()
            .with_clearances(2.0, -1.0, 3.0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("clearances.end"));
    }

    #[test]
    fn test_rejects_spacing_below_cleat_width() {
        let err = CrateConfiguration::new()
            .with_max_cleat_spacing(3.0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("maxCleatSpacing"));
    }

    #[test]
    fn test_derived_dimensions() {
        let config = CrateConfiguration::new()
            .with_product(48.0, 40.0, 40.0)
            .with_clearances(2.0, 2.0, 3.0);
        let dims = CrateDimensions::new(&config, 3.5);

        assert_relative_eq!(dims.panel_thickness, 1.0);
        assert_relative_eq!(dims.internal_width, 44.0);
        assert_relative_eq!(dims.internal_length, 52.0);
        assert_relative_eq!(dims.internal_height, 43.0);
        assert_relative_eq!(dims.overall_width, 46.0);
        assert_relative_eq!(dims.overall_length, 54.0);
        assert_relative_eq!(dims.overall_height, 3.5 + 1.5 + 43.0 + 1.0);
        assert_relative_eq!(dims.deck_height(), 5.0);
    }

    #[test]
    fn test_cleat_profiles() {
        assert_relative_eq!(CleatType::Standard.profile().width, 3.5);
        assert_relative_eq!(CleatType::Reinforced.profile().width, 5.5);
        assert_relative_eq!(CleatType::Corner.profile().thickness, 1.5);
        assert!(CleatMaterial::Metal.density_lb_in3() > CleatMaterial::Oak.density_lb_in3());
    }
}
