//! Two-point box primitive shared by every structural piece.

use crate::progress::Stage;
use crate::{Error, Result};
use nalgebra::{Point3 as NaPoint3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance below which an extent is treated as zero.
pub const EXTENT_TOLERANCE: f64 = 1e-9;

/// A point in crate coordinates (inches).
///
/// Origin is the front-bottom-center of the footprint: X across the width,
/// Y along the depth (front 0, back negative), Z up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point3 {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3 {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub const fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Component-wise minimum.
    pub fn min(&self, other: &Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    pub fn max(&self, other: &Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Returns this point as a nalgebra vector.
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<NaPoint3<f64>> for Point3 {
    fn from(p: NaPoint3<f64>) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

impl From<Vector3<f64>> for Point3 {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Structural category of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum BlockKind {
    /// Runner beam under the floor.
    Skid,
    /// Floor board (lumber or custom plywood fill).
    Floor,
    /// Plywood panel piece.
    Plywood,
    /// Panel cleat.
    Cleat,
    /// Lag screw or other fastener envelope.
    Hardware,
    /// Klimp clamp envelope.
    Klimp,
}

impl BlockKind {
    /// Default display color.
    pub fn default_color(&self) -> &'static str {
        match self {
            BlockKind::Skid => "#C8A882",
            BlockKind::Floor => "#E8D7B3",
            BlockKind::Plywood => "#F2E3C6",
            BlockKind::Cleat => "#D4A76A",
            BlockKind::Hardware => "#6B7280",
            BlockKind::Klimp => "#8B7355",
        }
    }

    /// Lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Skid => "skid",
            BlockKind::Floor => "floor",
            BlockKind::Plywood => "plywood",
            BlockKind::Cleat => "cleat",
            BlockKind::Hardware => "hardware",
            BlockKind::Klimp => "klimp",
        }
    }
}

/// An axis-aligned box given by two opposite corners.
///
/// `point2 >= point1` on every axis. Extents are always derived from the
/// corners and must be strictly positive unless the block is suppressed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Block {
    /// Expression-safe name (e.g. `FRONT_PANEL_PLY_1`).
    pub name: String,
    /// Minimum corner.
    pub point1: Point3,
    /// Maximum corner.
    pub point2: Point3,
    /// Structural category.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: BlockKind,
    /// Owning panel, for plywood and cleats.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub panel_name: Option<String>,
    /// Index of the plywood piece within its panel.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub plywood_piece_index: Option<usize>,
    /// Inactive template slot.
    pub suppressed: bool,
    /// Display color.
    pub color: String,
    /// Free-text metadata.
    pub metadata: String,
}

impl Block {
    /// Creates a block from any two opposite corners.
    pub fn from_corners(name: impl Into<String>, kind: BlockKind, a: Point3, b: Point3) -> Self {
        Self {
            name: name.into(),
            point1: a.min(&b),
            point2: a.max(&b),
            kind,
            panel_name: None,
            plywood_piece_index: None,
            suppressed: false,
            color: kind.default_color().to_string(),
            metadata: String::new(),
        }
    }

    /// Creates a suppressed, zero-size placeholder at the origin.
    pub fn placeholder(name: impl Into<String>, kind: BlockKind) -> Self {
        let mut block = Self::from_corners(name, kind, Point3::origin(), Point3::origin());
        block.suppressed = true;
        block.metadata = "UNUSED - SUPPRESSED".to_string();
        block
    }

    /// Sets the owning panel name.
    pub fn with_panel(mut self, panel: impl Into<String>) -> Self {
        self.panel_name = Some(panel.into());
        self
    }

    /// Sets the plywood piece index.
    pub fn with_piece_index(mut self, index: usize) -> Self {
        self.plywood_piece_index = Some(index);
        self
    }

    /// Sets the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Sets the metadata text.
    pub fn with_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.metadata = metadata.into();
        self
    }

    /// Returns true if the block is an active (non-suppressed) piece.
    pub fn is_active(&self) -> bool {
        !self.suppressed
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.point2.x - self.point1.x
    }

    /// Extent along Y.
    pub fn length(&self) -> f64 {
        self.point2.y - self.point1.y
    }

    /// Extent along Z.
    pub fn height(&self) -> f64 {
        self.point2.z - self.point1.z
    }

    /// Extents as a vector.
    pub fn size(&self) -> Vector3<f64> {
        self.point2.to_vector() - self.point1.to_vector()
    }

    /// Center point.
    pub fn center(&self) -> Point3 {
        ((self.point1.to_vector() + self.point2.to_vector()) * 0.5).into()
    }

    /// Volume in cubic inches.
    pub fn volume(&self) -> f64 {
        self.width() * self.length() * self.height()
    }

    /// Checks the corner ordering and extent invariants.
    pub fn validate(&self) -> Result<()> {
        let size = self.size();
        for (axis, extent) in ["x", "y", "z"].iter().zip(size.iter()) {
            if !extent.is_finite() {
                return Err(Error::infeasible(
                    Stage::Geometry,
                    *extent,
                    format!("{} has a non-finite {} extent", self.name, axis),
                ));
            }
            if *extent < -EXTENT_TOLERANCE {
                return Err(Error::infeasible(
                    Stage::Geometry,
                    *extent,
                    format!("{} has point2.{} < point1.{}", self.name, axis, axis),
                ));
            }
            if !self.suppressed && *extent <= EXTENT_TOLERANCE {
                return Err(Error::infeasible(
                    Stage::Geometry,
                    *extent,
                    format!("{} has a zero {} extent", self.name, axis),
                ));
            }
        }
        Ok(())
    }

    /// Returns true if the interiors of two blocks intersect by more than `tol`.
    pub fn overlaps(&self, other: &Block, tol: f64) -> bool {
        self.point1.x < other.point2.x - tol
            && other.point1.x < self.point2.x - tol
            && self.point1.y < other.point2.y - tol
            && other.point1.y < self.point2.y - tol
            && self.point1.z < other.point2.z - tol
            && other.point1.z < self.point2.z - tol
    }
}
