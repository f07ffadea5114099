//! Marking and decal sizing.
//!
//! Decal geometry comes from external CAD assets; only the size class and
//! instance count are decided here, keyed by the overall crate height.

use u_crating_core::MarkingFlags;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Instances applied per enabled marking.
pub const MARKINGS_PER_TYPE: usize = 4;

/// Kind of marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum MarkingType {
    /// Company logo.
    Logo,
    /// "Fragile" stencil.
    Fragile,
    /// Handling symbols.
    Handling,
}

impl MarkingType {
    /// All marking types in output order.
    pub const ALL: [MarkingType; 3] =
        [MarkingType::Logo, MarkingType::Fragile, MarkingType::Handling];

    /// Expression prefix.
    pub fn key(&self) -> &'static str {
        match self {
            MarkingType::Logo => "logo",
            MarkingType::Fragile => "fragile",
            MarkingType::Handling => "handling",
        }
    }

    /// Decal size for a crate of the given overall height.
    pub fn size_for_height(&self, overall_height: f64) -> (f64, f64) {
        match self {
            MarkingType::Logo if overall_height <= 37.0 => (5.56, 4.0),
            MarkingType::Logo if overall_height <= 73.0 => (8.34, 6.0),
            MarkingType::Logo => (11.13, 8.0),
            MarkingType::Fragile if overall_height <= 73.0 => (8.0, 2.31),
            MarkingType::Fragile => (12.0, 3.5),
            MarkingType::Handling if overall_height <= 37.0 => (3.0, 8.25),
            MarkingType::Handling => (4.0, 11.0),
        }
    }

    fn enabled(&self, flags: &MarkingFlags) -> bool {
        match self {
            MarkingType::Logo => flags.logo,
            MarkingType::Fragile => flags.fragile,
            MarkingType::Handling => flags.handling,
        }
    }
}

/// One marking type, sized for a crate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Marking {
    /// Marking type.
    pub kind: MarkingType,
    /// Decal width.
    pub width: f64,
    /// Decal height.
    pub height: f64,
    /// Instances; zero when disabled.
    pub count: usize,
}

/// Markings for a crate, one entry per type.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MarkingSet {
    /// Entries in [`MarkingType::ALL`] order.
    pub markings: Vec<Marking>,
}

impl MarkingSet {
    /// Total decal instances.
    pub fn total_count(&self) -> usize {
        self.markings.iter().map(|m| m.count).sum()
    }

    /// Entry for one type.
    pub fn get(&self, kind: MarkingType) -> Option<&Marking> {
        self.markings.iter().find(|m| m.kind == kind)
    }
}

/// Sizes every marking type; disabled types keep their size with a zero count.
pub fn calculate_markings(flags: &MarkingFlags, overall_height: f64) -> MarkingSet {
    let markings = MarkingType::ALL
        .iter()
        .map(|&kind| {
            let (width, height) = kind.size_for_height(overall_height);
            Marking {
                kind,
                width,
                height,
                count: if kind.enabled(flags) { MARKINGS_PER_TYPE } else { 0 },
            }
        })
        .collect();
    MarkingSet { markings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_size_classes() {
        assert_eq!(MarkingType::Logo.size_for_height(37.0), (5.56, 4.0));
        assert_eq!(MarkingType::Logo.size_for_height(50.0), (8.34, 6.0));
        assert_eq!(MarkingType::Logo.size_for_height(90.0), (11.13, 8.0));
        assert_eq!(MarkingType::Fragile.size_for_height(73.0), (8.0, 2.31));
        assert_eq!(MarkingType::Fragile.size_for_height(74.0), (12.0, 3.5));
        assert_eq!(MarkingType::Handling.size_for_height(30.0), (3.0, 8.25));
        assert_eq!(MarkingType::Handling.size_for_height(40.0), (4.0, 11.0));
    }

    #[test]
    fn test_disabled_marking_has_zero_count() {
        let flags = MarkingFlags {
            logo: true,
            fragile: false,
            handling: true,
        };
        let set = calculate_markings(&flags, 50.0);
        assert_eq!(set.markings.len(), 3);
        assert_eq!(set.get(MarkingType::Fragile).unwrap().count, 0);
        assert_eq!(set.total_count(), 2 * MARKINGS_PER_TYPE);
        assert_relative_eq!(set.get(MarkingType::Logo).unwrap().width, 8.34);
    }
}
