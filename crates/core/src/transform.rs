//! Panel-local to crate coordinate transforms and bounding boxes.

use crate::block::{Block, Point3};
use crate::config::CrateDimensions;
use crate::panel::PanelFace;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maps a panel's 2-D frame into crate coordinates.
///
/// Panel-local coordinates are `(u, v, w)`: `u` runs along the panel width,
/// `v` along its height and `w` inward from the outside face. A panel piece is
/// a `u × v` rectangle occupying a `w` layer (cleats outermost, plywood behind).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFrame {
    origin: Vector3<f64>,
    u_axis: Vector3<f64>,
    v_axis: Vector3<f64>,
    w_axis: Vector3<f64>,
}

impl FaceFrame {
    /// Creates a frame from an origin and three orthonormal axes.
    pub fn new(
        origin: Vector3<f64>,
        u_axis: Vector3<f64>,
        v_axis: Vector3<f64>,
        w_axis: Vector3<f64>,
    ) -> Self {
        Self {
            origin,
            u_axis,
            v_axis,
            w_axis,
        }
    }

    /// Frame for the given face of a crate.
    pub fn for_face(face: PanelFace, dims: &CrateDimensions) -> Self {
        let half_w = dims.overall_width / 2.0;
        let length = dims.overall_length;
        let pt = dims.panel_thickness;
        let base = dims.skid_height;

        let x = Vector3::x();
        let y = Vector3::y();
        let z = Vector3::z();

        match face {
            PanelFace::Front => Self::new(Vector3::new(-half_w, 0.0, base), x, z, -y),
            PanelFace::Back => Self::new(Vector3::new(-half_w, -length, base), x, z, y),
            PanelFace::LeftEnd => Self::new(Vector3::new(-half_w, -pt, base), -y, z, x),
            PanelFace::RightEnd => Self::new(Vector3::new(half_w, -pt, base), -y, z, -x),
            PanelFace::Top => {
                Self::new(Vector3::new(-half_w, 0.0, dims.overall_height), x, -y, -z)
            }
        }
    }

    /// Maps a panel-local point into crate coordinates.
    pub fn map_point(&self, u: f64, v: f64, w: f64) -> Point3 {
        (self.origin + self.u_axis * u + self.v_axis * v + self.w_axis * w).into()
    }

    /// Maps a panel-local box into normalized crate-space corners.
    pub fn map_box(&self, u: (f64, f64), v: (f64, f64), w: (f64, f64)) -> (Point3, Point3) {
        let a = self.map_point(u.0, v.0, w.0);
        let b = self.map_point(u.1, v.1, w.1);
        (a.min(&b), a.max(&b))
    }

    /// Extent of a block along this frame's normal.
    pub fn normal_extent(&self, block: &Block) -> f64 {
        block.size().dot(&self.w_axis).abs()
    }

    /// Outward unit normal of the face.
    pub fn outward_normal(&self) -> Vector3<f64> {
        -self.w_axis
    }
}

/// Axis-aligned bounding box of a set of blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
    /// `max - min`.
    pub size: Point3,
    /// Euclidean norm of `size`.
    pub diagonal: f64,
}

impl BoundingBox {
    /// Creates a bounding box from min/max corners.
    pub fn new(min: Point3, max: Point3) -> Self {
        let size = max.to_vector() - min.to_vector();
        Self {
            min,
            max,
            size: size.into(),
            diagonal: size.norm(),
        }
    }

    /// Min/max-reduces the corners of every active block.
    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a Block>) -> Option<Self> {
        blocks
            .into_iter()
            .filter(|b| b.is_active())
            .fold(None, |acc: Option<(Point3, Point3)>, b| match acc {
                None => Some((b.point1, b.point2)),
                Some((lo, hi)) => Some((lo.min(&b.point1), hi.max(&b.point2))),
            })
            .map(|(lo, hi)| Self::new(lo, hi))
    }

    /// Returns the union of two boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(&other.min), self.max.max(&other.max))
    }

    /// Volume of the box.
    pub fn volume(&self) -> f64 {
        self.size.x * self.size.y * self.size.z
    }

    /// Checks whether a block lies inside the box (within `tol`).
    pub fn contains(&self, block: &Block, tol: f64) -> bool {
        block.point1.x >= self.min.x - tol
            && block.point1.y >= self.min.y - tol
            && block.point1.z >= self.min.z - tol
            && block.point2.x <= self.max.x + tol
            && block.point2.y <= self.max.y + tol
            && block.point2.z <= self.max.z + tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockKind;
    use crate::config::CrateConfiguration;
    use approx::assert_relative_eq;

    fn dims() -> CrateDimensions {
        CrateDimensions::new(&CrateConfiguration::new().with_product(48.0, 40.0, 40.0), 3.5)
    }

    #[test]
    fn test_front_frame_maps_outside_face_to_y_zero() {
        let d = dims();
        let frame = FaceFrame::for_face(PanelFace::Front, &d);
        let (p1, p2) = frame.map_box((0.0, d.overall_width), (0.0, 10.0), (0.0, 0.25));
        assert_relative_eq!(p1.x, -23.0);
        assert_relative_eq!(p2.x, 23.0);
        assert_relative_eq!(p2.y, 0.0);
        assert_relative_eq!(p1.y, -0.25);
        assert_relative_eq!(p1.z, 3.5);
    }

    #[test]
    fn test_end_frames_mirror() {
        let d = dims();
        let left = FaceFrame::for_face(PanelFace::LeftEnd, &d);
        let right = FaceFrame::for_face(PanelFace::RightEnd, &d);
        let (l1, l2) = left.map_box((0.0, 5.0), (0.0, 1.0), (0.0, 1.0));
        let (r1, r2) = right.map_box((0.0, 5.0), (0.0, 1.0), (0.0, 1.0));
        assert_relative_eq!(l1.x, -23.0);
        assert_relative_eq!(l2.x, -22.0);
        assert_relative_eq!(r1.x, 22.0);
        assert_relative_eq!(r2.x, 23.0);
        assert_relative_eq!(l2.y, -1.0);
        assert_relative_eq!(l1.y, -6.0);
        assert_relative_eq!(r1.y, l1.y);
    }

    #[test]
    fn test_top_frame_points_down() {
        let d = dims();
        let frame = FaceFrame::for_face(PanelFace::Top, &d);
        let (p1, p2) = frame.map_box((0.0, 1.0), (0.0, 1.0), (0.0, 1.0));
        assert_relative_eq!(p2.z, d.overall_height);
        assert_relative_eq!(p1.z, d.overall_height - 1.0);
        assert_relative_eq!(frame.outward_normal().z, 1.0);
    }

    #[test]
    fn test_normal_extent() {
        let d = dims();
        let frame = FaceFrame::for_face(PanelFace::RightEnd, &d);
        let (p1, p2) = frame.map_box((0.0, 20.0), (0.0, 30.0), (0.25, 1.0));
        let block = Block::from_corners("C", BlockKind::Cleat, p1, p2);
        assert_relative_eq!(frame.normal_extent(&block), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_bounding_box_skips_suppressed() {
        let a = Block::from_corners(
            "A",
            BlockKind::Skid,
            Point3::new(-1.0, -2.0, 0.0),
            Point3::new(1.0, 0.0, 3.0),
        );
        let b = Block::from_corners(
            "B",
            BlockKind::Skid,
            Point3::new(0.0, -5.0, 1.0),
            Point3::new(4.0, -1.0, 2.0),
        );
        let mut c = Block::placeholder("C", BlockKind::Floor);
        c.point1 = Point3::new(-100.0, -100.0, -100.0);

        let bbox = BoundingBox::from_blocks([&a, &b, &c]).unwrap();
        assert_relative_eq!(bbox.min.x, -1.0);
        assert_relative_eq!(bbox.min.y, -5.0);
        assert_relative_eq!(bbox.max.x, 4.0);
        assert_relative_eq!(bbox.size.z, 3.0);
        assert_relative_eq!(bbox.diagonal, (25.0f64 + 25.0 + 9.0).sqrt());
        assert!(bbox.contains(&a, 1e-9));
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(BoundingBox::from_blocks(std::iter::empty()).is_none());
    }
}
