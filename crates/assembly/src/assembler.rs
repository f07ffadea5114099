//! Crate geometry assembly.
//!
//! Runs the layout stages in dependency order and maps every piece into the
//! crate coordinate system as a two-point [`Block`]:
//!
//! - origin at the front-bottom-center of the footprint
//! - X across the width, Y along the depth (front 0, back negative), Z up
//!
//! Skids stand on the ground and run the full overall length. Floor boards sit
//! on the skids between the front and back panels. Each panel face is mapped
//! through its [`FaceFrame`]: plywood occupies the outer layer and cleats the
//! inner layer of the panel thickness.

use std::time::Instant;

use u_crating_core::lumber::LumberCatalog;
use u_crating_core::transform::{BoundingBox, FaceFrame};
use u_crating_core::{
    Block, BlockKind, CrateConfiguration, CrateDimensions, Error, PanelDimensions, PanelFace,
    Point3, Result, Stage,
};
use u_crating_layout::{
    calculate_cleat_positions, calculate_crate_splicing, calculate_skid_configuration, CleatKind,
    CleatOptions, CleatOrientation, CleatPlacement, FloorConfiguration, FloorLayoutEngine,
    PlywoodLayout, PlywoodOptions, SkidConfiguration,
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Plywood piece slots per panel in the CAD template.
pub const PLYWOOD_SLOTS_PER_PANEL: usize = 6;

/// Floor board slots in the CAD template.
pub const FLOORBOARD_SLOTS: usize = 40;

/// Color of custom plywood floor fill.
pub const CUSTOM_FLOOR_COLOR: &str = "#D4B896";

/// Color of cleats that back a splice.
pub const SPLICE_CLEAT_COLOR: &str = "#E6C88A";

/// Overlap tolerance between structural blocks.
const OVERLAP_TOLERANCE: f64 = 1e-6;

/// Plywood and cleats of one panel face.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PanelLayout {
    /// Which face.
    pub face: PanelFace,
    /// Face size in its own frame.
    pub dimensions: PanelDimensions,
    /// Plywood splicing.
    pub plywood: PlywoodLayout,
    /// Cleat placement.
    pub cleats: CleatPlacement,
}

/// The unified structural model of a crate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CrateGeometry {
    /// Derived crate dimensions.
    pub dimensions: CrateDimensions,
    /// Skid stage output.
    pub skid_layout: SkidConfiguration,
    /// Floor stage output.
    pub floor_layout: FloorConfiguration,
    /// Plywood and cleat stage outputs, in [`PanelFace::ALL`] order.
    pub panels: Vec<PanelLayout>,
    /// `SKID_n` blocks.
    pub skids: Vec<Block>,
    /// `FLOORBOARD_n` blocks, padded with suppressed slots.
    pub floorboards: Vec<Block>,
    /// `{PANEL}_PLY_n` blocks, padded per panel with suppressed slots.
    pub plywood: Vec<Block>,
    /// `{PANEL}_CLEAT_*` blocks.
    pub cleats: Vec<Block>,
    /// Bounding box of every active block.
    pub bounds: BoundingBox,
}

impl CrateGeometry {
    /// All blocks in output order: skids, floor boards, plywood, cleats.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.skids
            .iter()
            .chain(&self.floorboards)
            .chain(&self.plywood)
            .chain(&self.cleats)
    }

    /// Non-suppressed blocks.
    pub fn active_blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks().filter(|b| b.is_active())
    }

    /// Looks up a block by name.
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks().find(|b| b.name == name)
    }

    /// Layout of one panel face.
    pub fn panel(&self, face: PanelFace) -> Option<&PanelLayout> {
        self.panels.iter().find(|p| p.face == face)
    }

    /// Total block count including placeholders.
    pub fn block_count(&self) -> usize {
        self.skids.len() + self.floorboards.len() + self.plywood.len() + self.cleats.len()
    }
}

/// Runs the layout stages for one configuration.
///
/// Each method is one pipeline stage and a pure function of its arguments.
#[derive(Debug, Clone, Copy)]
pub struct CrateAssembler<'a> {
    config: &'a CrateConfiguration,
}

impl<'a> CrateAssembler<'a> {
    /// Creates an assembler over a configuration.
    pub fn new(config: &'a CrateConfiguration) -> Self {
        Self { config }
    }

    /// The configuration being assembled.
    pub fn config(&self) -> &'a CrateConfiguration {
        self.config
    }

    /// Skid stage. Skids are spread across the inside width and run the
    /// overall length.
    pub fn skids(&self) -> Result<SkidConfiguration> {
        let provisional = CrateDimensions::new(self.config, 0.0);
        calculate_skid_configuration(
            provisional.internal_width,
            provisional.overall_length,
            self.config.product.weight,
            self.config.materials.allow_3x4_skids,
        )
    }

    /// Dimensions once the skid height is known.
    pub fn dimensions(&self, skids: &SkidConfiguration) -> CrateDimensions {
        CrateDimensions::new(self.config, skids.size.height)
    }

    /// Lumber stage: the floor board catalog for this configuration.
    pub fn lumber(&self) -> Result<LumberCatalog<'static>> {
        let catalog = LumberCatalog::floor(self.config.materials.allow_narrow_lumber);
        if catalog.is_empty() {
            return Err(Error::infeasible(Stage::Lumber, 0.0, "floor lumber catalog is empty"));
        }
        Ok(catalog)
    }

    /// Floor stage. Boards span the inside width and inside length.
    pub fn floor(
        &self,
        catalog: LumberCatalog<'_>,
        dims: &CrateDimensions,
    ) -> Result<FloorConfiguration> {
        FloorLayoutEngine::new(catalog).layout(dims.internal_width, dims.internal_length)
    }

    /// Plywood stage for all five faces.
    pub fn plywood(&self, dims: &CrateDimensions) -> Result<Vec<(PanelFace, PlywoodLayout)>> {
        calculate_crate_splicing(dims, &PlywoodOptions::from(&self.config.options))
    }

    /// Cleat stage for all five faces.
    pub fn cleats(
        &self,
        dims: &CrateDimensions,
        plywood: Vec<(PanelFace, PlywoodLayout)>,
    ) -> Result<Vec<PanelLayout>> {
        plywood
            .into_iter()
            .map(|(face, plywood)| {
                let dimensions = face.dimensions(dims);
                let options = CleatOptions::default()
                    .with_cleat_type(self.config.materials.cleat_type)
                    .with_max_spacing(self.config.options.max_cleat_spacing)
                    .with_style(face.perimeter_style());
                let cleats =
                    calculate_cleat_positions(dimensions, face.name(), &plywood.splices, &options)?;
                Ok(PanelLayout {
                    face,
                    dimensions,
                    plywood,
                    cleats,
                })
            })
            .collect()
    }

    /// Geometry stage: maps every stage output into crate coordinates.
    pub fn geometry(
        &self,
        dims: CrateDimensions,
        skid_layout: SkidConfiguration,
        floor_layout: FloorConfiguration,
        panels: Vec<PanelLayout>,
    ) -> Result<CrateGeometry> {
        let grade = self.config.materials.lumber_grade.label();

        let skids = skid_blocks(&dims, &skid_layout, grade);
        let floorboards = floor_blocks(&dims, &floor_layout, grade);
        let mut plywood = Vec::new();
        let mut cleats = Vec::new();
        for panel in &panels {
            let frame = FaceFrame::for_face(panel.face, &dims);
            plywood.extend(plywood_blocks(&frame, &dims, panel));
            cleats.extend(cleat_blocks(&frame, &dims, panel));
        }

        let all = skids
            .iter()
            .chain(&floorboards)
            .chain(&plywood)
            .chain(&cleats);
        let bounds = BoundingBox::from_blocks(all)
            .ok_or_else(|| Error::infeasible(Stage::Geometry, 0.0, "crate has no active blocks"))?;

        let geometry = CrateGeometry {
            dimensions: dims,
            skid_layout,
            floor_layout,
            panels,
            skids,
            floorboards,
            plywood,
            cleats,
            bounds,
        };
        verify(&geometry)?;
        Ok(geometry)
    }

    /// Runs every layout stage and assembles the geometry.
    pub fn build(&self) -> Result<CrateGeometry> {
        let start = Instant::now();
        self.config.validate()?;

        let catalog = self.lumber()?;
        let skids = self.skids()?;
        let dims = self.dimensions(&skids);
        let floor = self.floor(catalog, &dims)?;
        let plywood = self.plywood(&dims)?;
        let panels = self.cleats(&dims, plywood)?;
        let geometry = self.geometry(dims, skids, floor, panels)?;

        log::debug!(
            "assembled {} blocks ({} active) in {:?}",
            geometry.block_count(),
            geometry.active_blocks().count(),
            start.elapsed()
        );
        Ok(geometry)
    }
}

/// Validates the configuration and builds the full crate geometry.
pub fn build_crate_geometry(config: &CrateConfiguration) -> Result<CrateGeometry> {
    CrateAssembler::new(config).build()
}

fn skid_blocks(dims: &CrateDimensions, skids: &SkidConfiguration, grade: &str) -> Vec<Block> {
    let half = skids.size.width / 2.0;
    skids
        .positions
        .iter()
        .enumerate()
        .map(|(i, &x)| {
            Block::from_corners(
                format!("SKID_{}", i + 1),
                BlockKind::Skid,
                Point3::new(x - half, -dims.overall_length, 0.0),
                Point3::new(x + half, 0.0, dims.skid_height),
            )
            .with_metadata(format!("{} skid, {}", skids.size.nominal, grade))
        })
        .collect()
}

fn floor_blocks(dims: &CrateDimensions, floor: &FloorConfiguration, grade: &str) -> Vec<Block> {
    let y_front = -dims.panel_thickness;
    let y_back = -dims.overall_length + dims.panel_thickness;
    let z = dims.skid_height;

    let mut blocks: Vec<Block> = floor
        .boards
        .iter()
        .enumerate()
        .map(|(i, board)| {
            let block = Block::from_corners(
                format!("FLOORBOARD_{}", i + 1),
                BlockKind::Floor,
                Point3::new(board.left(), y_back, z + board.position.z),
                Point3::new(board.right(), y_front, z + board.position.z + board.thickness),
            );
            if board.is_custom() {
                block
                    .with_color(CUSTOM_FLOOR_COLOR)
                    .with_metadata(format!("custom plywood fill {:.3}in", board.width))
            } else {
                block.with_metadata(format!("{} floorboard, {}", board.label(), grade))
            }
        })
        .collect();

    pad_slots(&mut blocks, FLOORBOARD_SLOTS, "floorboard", |i| {
        Block::placeholder(format!("FLOORBOARD_{}", i + 1), BlockKind::Floor)
    });
    blocks
}

fn plywood_blocks(frame: &FaceFrame, dims: &CrateDimensions, panel: &PanelLayout) -> Vec<Block> {
    let name = panel.face.name();
    let mut blocks: Vec<Block> = panel
        .plywood
        .sheets
        .iter()
        .map(|sheet| {
            let (p1, p2) = frame.map_box(
                (sheet.x, sheet.x + sheet.width),
                (sheet.y, sheet.y + sheet.height),
                (dims.cleat_thickness, dims.panel_thickness),
            );
            let block_name = format!("{}_PLY_{}", name, sheet.index + 1);
            Block::from_corners(block_name, BlockKind::Plywood, p1, p2)
                .with_panel(name)
                .with_piece_index(sheet.index)
                .with_metadata(format!(
                    "{:.3}x{:.3} from sheet {}{}",
                    sheet.width,
                    sheet.height,
                    sheet.sheet_id + 1,
                    if sheet.rotated { " (rotated)" } else { "" }
                ))
        })
        .collect();

    pad_slots(&mut blocks, PLYWOOD_SLOTS_PER_PANEL, name, |i| {
        Block::placeholder(format!("{}_PLY_{}", name, i + 1), BlockKind::Plywood)
            .with_panel(name)
            .with_piece_index(i)
    });
    blocks
}

fn cleat_blocks(frame: &FaceFrame, dims: &CrateDimensions, panel: &PanelLayout) -> Vec<Block> {
    let name = panel.face.name();
    let nominal = panel.cleats.profile.nominal;
    panel
        .cleats
        .cleats
        .iter()
        .map(|cleat| {
            let (p1, p2) = frame.map_box(
                (cleat.x, cleat.x + cleat.width),
                (cleat.y, cleat.y + cleat.height),
                (0.0, dims.cleat_thickness),
            );
            let orientation = match cleat.orientation {
                CleatOrientation::Horizontal => "horizontal",
                CleatOrientation::Vertical => "vertical",
            };
            let block = Block::from_corners(cleat.name.clone(), BlockKind::Cleat, p1, p2)
                .with_panel(name)
                .with_metadata(format!("{} {} {} cleat", cleat.kind.label(), orientation, nominal));
            if cleat.kind == CleatKind::Splice {
                block.with_color(SPLICE_CLEAT_COLOR)
            } else {
                block
            }
        })
        .collect()
}

/// Pads `blocks` with placeholders up to `slots`; never truncates.
fn pad_slots(
    blocks: &mut Vec<Block>,
    slots: usize,
    what: &str,
    placeholder: impl Fn(usize) -> Block,
) {
    if blocks.len() > slots {
        log::warn!(
            "{}: {} pieces exceed the {} template slots; extra pieces are kept",
            what,
            blocks.len(),
            slots
        );
        return;
    }
    let start = blocks.len();
    blocks.extend((start..slots).map(placeholder));
}

fn verify(geometry: &CrateGeometry) -> Result<()> {
    for block in geometry.blocks() {
        block.validate()?;
    }

    let active: Vec<&Block> = geometry.active_blocks().collect();
    for (i, a) in active.iter().enumerate() {
        if let Some(b) = active[i + 1..].iter().find(|b| a.overlaps(b, OVERLAP_TOLERANCE)) {
            return Err(Error::infeasible(
                Stage::Geometry,
                geometry.bounds.diagonal,
                format!("{} overlaps {}", a.name, b.name),
            ));
        }
    }
    Ok(())
}
