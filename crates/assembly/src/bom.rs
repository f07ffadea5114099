//! Bill of materials.

use crate::assembler::CrateGeometry;
use crate::hardware::{HardwareLayout, LAG_SCREW_DIAMETER, LAG_SCREW_LENGTH};
use std::collections::BTreeMap;
use u_crating_core::CrateConfiguration;
use u_crating_layout::{CleatMaterialSummary, MaterialUsage};

#[cfg(feature = "serde")]
use serde::Serialize;

/// BOM line category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum BomCategory {
    /// Skids and rub strips.
    Skids,
    /// Floor boards and plywood fill.
    Floor,
    /// Panel sheathing.
    Plywood,
    /// Cleat stock.
    Cleats,
    /// Fasteners and clamps.
    Hardware,
}

/// One purchasable line.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BomLine {
    /// Category.
    pub category: BomCategory,
    /// Description.
    pub description: String,
    /// Quantity.
    pub quantity: usize,
    /// Unit of measure.
    pub unit: &'static str,
    /// Length of each piece in inches, where it applies.
    pub length: Option<f64>,
}

/// Grouped bill of materials, read by external cost modules.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BillOfMaterials {
    /// Lines ordered by category.
    pub lines: Vec<BomLine>,
    /// Plywood totals.
    pub plywood: MaterialUsage,
    /// Cleat stock totals.
    pub cleats: CleatMaterialSummary,
}

impl BillOfMaterials {
    /// Lines of one category.
    pub fn category(&self, category: BomCategory) -> impl Iterator<Item = &BomLine> {
        self.lines.iter().filter(move |l| l.category == category)
    }

    /// Sum of quantities in one category.
    pub fn quantity(&self, category: BomCategory) -> usize {
        self.category(category).map(|l| l.quantity).sum()
    }
}

/// Builds the bill of materials for an assembled crate.
pub fn build_bill_of_materials(
    config: &CrateConfiguration,
    geometry: &CrateGeometry,
    hardware: &HardwareLayout,
) -> BillOfMaterials {
    let grade = config.materials.lumber_grade.label();
    let mut lines = Vec::new();

    let skids = &geometry.skid_layout;
    lines.push(BomLine {
        category: BomCategory::Skids,
        description: format!("{} skid, {}", skids.size.nominal, grade),
        quantity: skids.count,
        unit: "ea",
        length: Some(skids.length),
    });
    if skids.requires_rub_strips {
        lines.push(BomLine {
            category: BomCategory::Skids,
            description: "rub strip".to_string(),
            quantity: skids.rub_strip_count(),
            unit: "ea",
            length: Some(skids.length),
        });
    }

    let floor = &geometry.floor_layout;
    let mut by_nominal: BTreeMap<&str, usize> = BTreeMap::new();
    for board in floor.boards.iter().filter(|b| !b.is_custom()) {
        *by_nominal.entry(board.label()).or_default() += 1;
    }
    for (nominal, quantity) in by_nominal {
        lines.push(BomLine {
            category: BomCategory::Floor,
            description: format!("{} floorboard, {}", nominal, grade),
            quantity,
            unit: "ea",
            length: Some(geometry.dimensions.internal_length),
        });
    }
    for board in floor.boards.iter().filter(|b| b.is_custom()) {
        lines.push(BomLine {
            category: BomCategory::Floor,
            description: format!("custom plywood fill {:.3}in wide", board.width),
            quantity: 1,
            unit: "ea",
            length: Some(board.depth),
        });
    }

    let plywood = MaterialUsage::from_layouts(geometry.panels.iter().map(|p| &p.plywood));
    let stock = config.options.stock_sheet;
    lines.push(BomLine {
        category: BomCategory::Plywood,
        description: format!(
            "{:.3}in plywood sheet {}x{}",
            config.materials.plywood_thickness, stock.width, stock.height
        ),
        quantity: plywood.total_sheets,
        unit: "sheet",
        length: None,
    });

    let cleats = CleatMaterialSummary::from_placements(
        geometry.panels.iter().map(|p| &p.cleats),
        config.materials.cleat_material,
    );
    lines.push(BomLine {
        category: BomCategory::Cleats,
        description: format!(
            "{} cleat board, {:.1} linear ft",
            config.materials.cleat_type.profile().nominal,
            cleats.linear_feet
        ),
        quantity: cleats.boards,
        unit: "board",
        length: Some(u_crating_layout::cleat::CLEAT_BOARD_LENGTH),
    });

    let klimps = &hardware.klimps;
    if klimps.count() > 0 {
        lines.push(BomLine {
            category: BomCategory::Hardware,
            description: format!("klimp clamp ({} packages)", klimps.packages()),
            quantity: klimps.count(),
            unit: "ea",
            length: None,
        });
    }
    if hardware.lag_screws.count() > 0 {
        lines.push(BomLine {
            category: BomCategory::Hardware,
            description: format!("lag screw {:.2}in dia", LAG_SCREW_DIAMETER),
            quantity: hardware.lag_screws.count(),
            unit: "ea",
            length: Some(LAG_SCREW_LENGTH),
        });
    }

    log::debug!("bill of materials: {} lines", lines.len());
    BillOfMaterials {
        lines,
        plywood,
        cleats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::build_crate_geometry;
    use crate::hardware::calculate_hardware;

    #[test]
    fn test_default_bom() {
        let config = CrateConfiguration::default();
        let geometry = build_crate_geometry(&config).unwrap();
        let hardware = calculate_hardware(&geometry);
        let bom = build_bill_of_materials(&config, &geometry, &hardware);

        assert_eq!(bom.quantity(BomCategory::Skids), geometry.skid_layout.count);
        assert_eq!(
            bom.quantity(BomCategory::Floor),
            geometry.floor_layout.boards.len()
        );
        assert_eq!(bom.quantity(BomCategory::Plywood), bom.plywood.total_sheets);
        assert!(bom.quantity(BomCategory::Cleats) >= 1);
        assert_eq!(
            bom.quantity(BomCategory::Hardware),
            hardware.klimps.count() + hardware.lag_screws.count()
        );
    }

    #[test]
    fn test_long_crate_lists_rub_strips() {
        let config = CrateConfiguration::new().with_product(120.0, 40.0, 40.0);
        let geometry = build_crate_geometry(&config).unwrap();
        let hardware = calculate_hardware(&geometry);
        let bom = build_bill_of_materials(&config, &geometry, &hardware);
        assert!(bom
            .category(BomCategory::Skids)
            .any(|l| l.description == "rub strip"));
    }
}
