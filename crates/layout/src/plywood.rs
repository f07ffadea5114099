//! Plywood splicing optimizer.
//!
//! A panel face is tiled with a grid of stock-sheet-sized cells. The final row
//! and column are clipped to the panel; a clipped strip narrower than the
//! minimum piece width is merged with its neighbour and the pair is split
//! evenly. Cells are then packed onto physical stock sheets with first-fit
//! decreasing shelves so that several small cells can share one sheet.
//!
//! Both sheet orientations are evaluated when rotation is allowed. The layout
//! with fewer stock sheets wins, then the one with fewer cells (fewer splices),
//! then the unrotated one.

use u_crating_core::config::{CrateDimensions, LayoutOptions, StockSheet};
use u_crating_core::panel::{PanelDimensions, PanelFace};
use u_crating_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::Serialize;

const TOLERANCE: f64 = 1e-9;

/// Optimizer options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlywoodOptions {
    /// Stock sheet size.
    pub stock: StockSheet,
    /// Allows cells to use the rotated sheet orientation.
    pub allow_rotation: bool,
    /// Narrowest strip allowed at a panel edge.
    pub min_piece: f64,
}

impl Default for PlywoodOptions {
    fn default() -> Self {
        Self::from(&LayoutOptions::default())
    }
}

impl From<&LayoutOptions> for PlywoodOptions {
    fn from(options: &LayoutOptions) -> Self {
        Self {
            stock: options.stock_sheet,
            allow_rotation: options.allow_rotation,
            min_piece: options.min_plywood_piece,
        }
    }
}

impl PlywoodOptions {
    /// Sets the stock sheet.
    pub fn with_stock(mut self, stock: StockSheet) -> Self {
        self.stock = stock;
        self
    }

    /// Enables or disables rotation.
    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }

    /// Sets the minimum edge piece.
    pub fn with_min_piece(mut self, min_piece: f64) -> Self {
        self.min_piece = min_piece;
        self
    }
}

/// Direction of a splice seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SpliceOrientation {
    /// Seam parallel to the panel height, at a fixed `u`.
    Vertical,
    /// Seam parallel to the panel width, at a fixed `v`.
    Horizontal,
}

/// A seam between two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SpliceLine {
    /// Seam direction.
    pub orientation: SpliceOrientation,
    /// `u` for vertical seams, `v` for horizontal seams.
    pub position: f64,
    /// Seam start along its length.
    pub start: f64,
    /// Seam end along its length.
    pub end: f64,
}

/// A cell placed on the panel face.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SheetPlacement {
    /// Placement index within the panel.
    pub index: usize,
    /// Offset along the panel width.
    pub x: f64,
    /// Offset along the panel height.
    pub y: f64,
    /// Cell width.
    pub width: f64,
    /// Cell height.
    pub height: f64,
    /// Source stock sheet.
    pub sheet_id: usize,
    /// Cell uses the rotated sheet orientation.
    pub rotated: bool,
}

/// Where a cell is cut from on its stock sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CutPiece {
    /// Matching [`SheetPlacement::index`].
    pub placement: usize,
    /// Source stock sheet.
    pub sheet_id: usize,
    /// Offset on the sheet (in the chosen orientation).
    pub sheet_x: f64,
    /// Offset on the sheet (in the chosen orientation).
    pub sheet_y: f64,
    /// Piece width.
    pub width: f64,
    /// Piece height.
    pub height: f64,
}

impl CutPiece {
    /// Piece area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Plywood layout for one panel face.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PlywoodLayout {
    /// Panel label (e.g. `FRONT_PANEL`).
    pub panel_name: String,
    /// Panel width.
    pub panel_width: f64,
    /// Panel height.
    pub panel_height: f64,
    /// Stock sheet used.
    pub stock: StockSheet,
    /// Distinct stock sheets consumed.
    pub sheet_count: usize,
    /// Cells on the panel face.
    pub sheets: Vec<SheetPlacement>,
    /// Cut records, one per cell.
    pub pieces: Vec<CutPiece>,
    /// Seams between cells.
    pub splices: Vec<SpliceLine>,
    /// True if the rotated orientation was chosen.
    pub has_rotations: bool,
}

impl PlywoodLayout {
    /// Panel face area.
    pub fn panel_area(&self) -> f64 {
        self.panel_width * self.panel_height
    }

    /// Area of all stock sheets consumed.
    pub fn sheet_area(&self) -> f64 {
        self.sheet_count as f64 * self.stock.area()
    }

    /// `panel_area / (sheet_count * sheet_area)`.
    pub fn efficiency(&self) -> f64 {
        let used = self.sheet_area();
        if used <= 0.0 {
            return 0.0;
        }
        self.panel_area() / used
    }

    /// Offcut area.
    pub fn waste_area(&self) -> f64 {
        self.sheet_area() - self.panel_area()
    }

    /// Seams of the given orientation.
    pub fn splices_of(&self, orientation: SpliceOrientation) -> impl Iterator<Item = &SpliceLine> {
        self.splices
            .iter()
            .filter(move |s| s.orientation == orientation)
    }

    /// Internal column boundaries (`u` positions of vertical seams).
    pub fn vertical_splice_positions(&self) -> Vec<f64> {
        self.splices_of(SpliceOrientation::Vertical)
            .map(|s| s.position)
            .collect()
    }

    /// Internal row boundaries (`v` positions of horizontal seams).
    pub fn horizontal_splice_positions(&self) -> Vec<f64> {
        self.splices_of(SpliceOrientation::Horizontal)
            .map(|s| s.position)
            .collect()
    }
}

/// Splits `total` into strips no longer than `cell`.
fn strips(total: f64, cell: f64, min_piece: f64) -> Vec<f64> {
    let n = ((total / cell) - TOLERANCE).ceil().max(1.0) as usize;
    let mut widths = vec![cell; n - 1];
    widths.push(total - (n - 1) as f64 * cell);

    if n >= 2 && widths[n - 1] < min_piece - TOLERANCE {
        let merged = (widths[n - 2] + widths[n - 1]) / 2.0;
        widths[n - 2] = merged;
        widths[n - 1] = merged;
    }
    widths
}

fn boundaries(widths: &[f64]) -> Vec<f64> {
    widths
        .iter()
        .take(widths.len().saturating_sub(1))
        .scan(0.0, |acc, w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

#[derive(Debug)]
struct Shelf {
    y: f64,
    height: f64,
    used: f64,
}

#[derive(Debug, Default)]
struct Bin {
    shelves: Vec<Shelf>,
    used_height: f64,
}

/// A fully evaluated orientation candidate.
struct Candidate {
    rotated: bool,
    sheet_count: usize,
    columns: Vec<f64>,
    rows: Vec<f64>,
    cells: Vec<Cell>,
    cuts: Vec<(usize, f64, f64)>,
}

impl Candidate {
    fn evaluate(
        panel: PanelDimensions,
        sheet_w: f64,
        sheet_h: f64,
        rotated: bool,
        min_piece: f64,
    ) -> Self {
        let columns = strips(panel.width, sheet_w, min_piece);
        let rows = strips(panel.height, sheet_h, min_piece);

        let mut cells = Vec::with_capacity(columns.len() * rows.len());
        let mut y = 0.0;
        for &h in &rows {
            let mut x = 0.0;
            for &w in &columns {
                cells.push(Cell {
                    x,
                    y,
                    width: w,
                    height: h,
                });
                x += w;
            }
            y += h;
        }

        let (sheet_count, cuts) = pack_shelves(&cells, sheet_w, sheet_h);
        Self {
            rotated,
            sheet_count,
            columns,
            rows,
            cells,
            cuts,
        }
    }

    fn rank(&self) -> (usize, usize, bool) {
        (self.sheet_count, self.cells.len(), self.rotated)
    }
}

/// First-fit decreasing shelf packing of cells onto `sheet_w × sheet_h` sheets.
///
/// Returns the sheet count and, per cell, `(sheet_id, sheet_x, sheet_y)`.
fn pack_shelves(cells: &[Cell], sheet_w: f64, sheet_h: f64) -> (usize, Vec<(usize, f64, f64)>) {
    let mut order: Vec<usize> = (0..cells.len()).collect();
    order.sort_by(|&a, &b| {
        cells[b]
            .height
            .total_cmp(&cells[a].height)
            .then(cells[b].width.total_cmp(&cells[a].width))
            .then(a.cmp(&b))
    });

    let mut bins: Vec<Bin> = Vec::new();
    let mut cuts = vec![(0, 0.0, 0.0); cells.len()];

    'cells: for idx in order {
        let cell = cells[idx];
        for (bin_id, bin) in bins.iter_mut().enumerate() {
            for shelf in bin.shelves.iter_mut() {
                if cell.height <= shelf.height + TOLERANCE
                    && shelf.used + cell.width <= sheet_w + TOLERANCE
                {
                    cuts[idx] = (bin_id, shelf.used, shelf.y);
                    shelf.used += cell.width;
                    continue 'cells;
                }
            }
            if bin.used_height + cell.height <= sheet_h + TOLERANCE {
                cuts[idx] = (bin_id, 0.0, bin.used_height);
                bin.shelves.push(Shelf {
                    y: bin.used_height,
                    height: cell.height,
                    used: cell.width,
                });
                bin.used_height += cell.height;
                continue 'cells;
            }
        }

        cuts[idx] = (bins.len(), 0.0, 0.0);
        bins.push(Bin {
            shelves: vec![Shelf {
                y: 0.0,
                height: cell.height,
                used: cell.width,
            }],
            used_height: cell.height,
        });
    }

    (bins.len(), cuts)
}

/// Tiles a panel face with stock sheets.
///
/// # Arguments
///
/// * `panel` - Panel width (u) and height (v)
/// * `panel_label` - Name carried into the layout (e.g. `FRONT_PANEL`)
/// * `options` - Stock sheet, rotation allowance and minimum edge piece
///
/// # Returns
///
/// The layout with the fewest stock sheets; see the module docs for tie-breaks.
pub fn calculate_plywood_pieces(
    panel: PanelDimensions,
    panel_label: impl Into<String>,
    options: &PlywoodOptions,
) -> Result<PlywoodLayout> {
    let panel_name = panel_label.into();
    for (field, value) in [("width", panel.width), ("height", panel.height)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(Error::invalid(
                format!("{}.{}", panel_name, field),
                "must be positive and finite",
            ));
        }
    }
    let stock = options.stock;
    if !(stock.width > 0.0 && stock.height > 0.0 && stock.area().is_finite()) {
        return Err(Error::invalid("options.stockSheet", "must be positive and finite"));
    }
    if !(options.min_piece >= 0.0 && options.min_piece * 2.0 <= stock.width.min(stock.height)) {
        return Err(Error::invalid(
            "options.minPlywoodPiece",
            "must be between zero and half the short side of the stock sheet",
        ));
    }

    let mut best = Candidate::evaluate(panel, stock.width, stock.height, false, options.min_piece);
    let square = (stock.width - stock.height).abs() <= TOLERANCE;
    if options.allow_rotation && !square {
        let rotated =
            Candidate::evaluate(panel, stock.height, stock.width, true, options.min_piece);
        if rotated.rank() < best.rank() {
            best = rotated;
        }
    }

    let sheets: Vec<SheetPlacement> = best
        .cells
        .iter()
        .zip(&best.cuts)
        .enumerate()
        .map(|(index, (cell, &(sheet_id, _, _)))| SheetPlacement {
            index,
            x: cell.x,
            y: cell.y,
            width: cell.width,
            height: cell.height,
            sheet_id,
            rotated: best.rotated,
        })
        .collect();

    let pieces: Vec<CutPiece> = best
        .cells
        .iter()
        .zip(&best.cuts)
        .enumerate()
        .map(|(placement, (cell, &(sheet_id, sheet_x, sheet_y)))| CutPiece {
            placement,
            sheet_id,
            sheet_x,
            sheet_y,
            width: cell.width,
            height: cell.height,
        })
        .collect();

    let mut splices: Vec<SpliceLine> = boundaries(&best.columns)
        .into_iter()
        .map(|u| SpliceLine {
            orientation: SpliceOrientation::Vertical,
            position: u,
            start: 0.0,
            end: panel.height,
        })
        .collect();
    splices.extend(boundaries(&best.rows).into_iter().map(|v| SpliceLine {
        orientation: SpliceOrientation::Horizontal,
        position: v,
        start: 0.0,
        end: panel.width,
    }));

    log::debug!(
        "{}: {:.1}x{:.1} -> {} cells on {} sheets ({} splices, rotated={})",
        panel_name,
        panel.width,
        panel.height,
        sheets.len(),
        best.sheet_count,
        splices.len(),
        best.rotated
    );

    Ok(PlywoodLayout {
        panel_name,
        panel_width: panel.width,
        panel_height: panel.height,
        stock,
        sheet_count: best.sheet_count,
        sheets,
        pieces,
        splices,
        has_rotations: best.rotated,
    })
}

/// Lays out plywood for all five faces of a crate, in [`PanelFace::ALL`] order.
pub fn calculate_crate_splicing(
    dims: &CrateDimensions,
    options: &PlywoodOptions,
) -> Result<Vec<(PanelFace, PlywoodLayout)>> {
    PanelFace::ALL
        .iter()
        .map(|&face| {
            calculate_plywood_pieces(face.dimensions(dims), face.name(), options)
                .map(|layout| (face, layout))
        })
        .collect()
}

/// Plywood consumption across several panels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MaterialUsage {
    /// Stock sheets consumed.
    pub total_sheets: usize,
    /// Sum of panel face areas.
    pub total_area: f64,
    /// Area of consumed stock.
    pub sheet_area: f64,
    /// `total_area / sheet_area`.
    pub efficiency: f64,
}

impl MaterialUsage {
    /// Aggregates a set of layouts.
    pub fn from_layouts<'a>(layouts: impl IntoIterator<Item = &'a PlywoodLayout>) -> Self {
        let (total_sheets, total_area, sheet_area) =
            layouts
                .into_iter()
                .fold((0, 0.0, 0.0), |(sheets, area, stock), l| {
                    (sheets + l.sheet_count, area + l.panel_area(), stock + l.sheet_area())
                });
        Self {
            total_sheets,
            total_area,
            sheet_area,
            efficiency: if sheet_area > 0.0 {
                total_area / sheet_area
            } else {
                0.0
            },
        }
    }
}
