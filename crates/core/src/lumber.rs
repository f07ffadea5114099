//! Standard lumber catalog and span-based selection.
//!
//! The catalog is a static table of dimensional lumber ordered descending by
//! actual width. Selection walks the table and returns the first (largest)
//! entry that fits, so ties are always broken by catalog order.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Tolerance used when comparing a board width against an available span.
pub const FIT_TOLERANCE: f64 = 1e-9;

/// Actual thickness shared by all 2x dimensional lumber.
pub const LUMBER_THICKNESS: f64 = 1.5;

/// Narrowest board width used on floors unless narrow lumber is allowed.
pub const MIN_FLOOR_LUMBER_WIDTH: f64 = 5.5;

/// A standard lumber cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LumberSize {
    /// Nominal label (e.g. "2x6").
    pub nominal: &'static str,
    /// Actual width in inches.
    pub width: f64,
    /// Actual thickness in inches.
    pub thickness: f64,
}

impl LumberSize {
    /// Creates a new lumber size.
    pub const fn new(nominal: &'static str, width: f64, thickness: f64) -> Self {
        Self {
            nominal,
            width,
            thickness,
        }
    }

    /// Returns true if this board fits within `span` inches.
    pub fn fits(&self, span: f64) -> bool {
        self.width <= span + FIT_TOLERANCE
    }
}

/// Standard 2x lumber, sorted descending by actual width.
pub static STANDARD_LUMBER: [LumberSize; 5] = [
    LumberSize::new("2x12", 11.25, LUMBER_THICKNESS),
    LumberSize::new("2x10", 9.25, LUMBER_THICKNESS),
    LumberSize::new("2x8", 7.25, LUMBER_THICKNESS),
    LumberSize::new("2x6", 5.5, LUMBER_THICKNESS),
    LumberSize::new("2x4", 3.5, LUMBER_THICKNESS),
];

/// A read-only view over a descending lumber table.
#[derive(Debug, Clone, Copy)]
pub struct LumberCatalog<'a> {
    sizes: &'a [LumberSize],
}

impl LumberCatalog<'static> {
    /// The full standard catalog.
    pub fn standard() -> Self {
        Self {
            sizes: &STANDARD_LUMBER,
        }
    }

    /// Catalog used for floor boards.
    ///
    /// Boards narrower than [`MIN_FLOOR_LUMBER_WIDTH`] are excluded unless
    /// `allow_narrow` is set. Because the table is descending this is a prefix.
    pub fn floor(allow_narrow: bool) -> Self {
        if allow_narrow {
            return Self::standard();
        }
        let end = STANDARD_LUMBER
            .iter()
            .position(|l| l.width < MIN_FLOOR_LUMBER_WIDTH)
            .unwrap_or(STANDARD_LUMBER.len());
        Self {
            sizes: &STANDARD_LUMBER[..end],
        }
    }
}

impl<'a> LumberCatalog<'a> {
    /// Wraps a custom table. The table must be sorted descending by width.
    pub fn from_sorted(sizes: &'a [LumberSize]) -> Result<Self> {
        if sizes.windows(2).any(|w| w[0].width < w[1].width) {
            return Err(Error::invalid(
                "lumber_catalog",
                "entries must be sorted descending by actual width",
            ));
        }
        if let Some(bad) = sizes
            .iter()
            .find(|l| !(l.width.is_finite() && l.width > 0.0))
        {
            return Err(Error::invalid(
                "lumber_catalog",
                format!("{} has a non-positive width", bad.nominal),
            ));
        }
        Ok(Self { sizes })
    }

    /// Returns the entries, widest first.
    pub fn sizes(&self) -> &'a [LumberSize] {
        self.sizes
    }

    /// Returns true if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Returns the narrowest entry.
    pub fn narrowest(&self) -> Option<&'a LumberSize> {
        self.sizes.last()
    }

    /// Looks up an entry by nominal label.
    pub fn find(&self, nominal: &str) -> Option<&'a LumberSize> {
        self.sizes.iter().find(|l| l.nominal == nominal)
    }

    /// Returns the largest entry whose actual width is `<= available_width`.
    pub fn select_for_space(&self, available_width: f64) -> Option<&'a LumberSize> {
        if !available_width.is_finite() {
            return None;
        }
        self.sizes.iter().find(|l| l.fits(available_width))
    }
}

/// Selects from the full standard catalog.
pub fn select_lumber_for_space(available_width: f64) -> Option<&'static LumberSize> {
    LumberCatalog::standard().select_for_space(available_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sorted_descending() {
        let sizes = LumberCatalog::standard().sizes();
        assert!(sizes.windows(2).all(|w| w[0].width >= w[1].width));
        assert_eq!(sizes[0].nominal, "2x12");
    }

    #[test]
    fn test_select_largest_fit() {
        assert_eq!(select_lumber_for_space(12.0).unwrap().nominal, "2x12");
        assert_eq!(select_lumber_for_space(11.0).unwrap().nominal, "2x10");
        assert_eq!(select_lumber_for_space(7.25).unwrap().nominal, "2x8");
        assert_eq!(select_lumber_for_space(5.0).unwrap().nominal, "2x4");
    }

    #[test]
    fn test_select_none_below_narrowest() {
        assert!(select_lumber_for_space(3.49).is_none());
        assert!(select_lumber_for_space(0.0).is_none());
        assert!(select_lumber_for_space(f64::NAN).is_none());
    }

    #[test]
    fn test_floor_catalog_excludes_narrow() {
        let floor = LumberCatalog::floor(false);
        assert_eq!(floor.narrowest().unwrap().nominal, "2x6");
        assert!(floor.select_for_space(5.0).is_none());

        let narrow = LumberCatalog::floor(true);
        assert_eq!(narrow.select_for_space(5.0).unwrap().nominal, "2x4");
    }

    #[test]
    fn test_custom_catalog_must_be_sorted() {
        static UNSORTED: [LumberSize; 2] = [
            LumberSize::new("2x4", 3.5, 1.5),
            LumberSize::new("2x6", 5.5, 1.5),
        ];
        assert!(LumberCatalog::from_sorted(&UNSORTED).is_err());
        assert!(LumberCatalog::from_sorted(&STANDARD_LUMBER[1..]).is_ok());
    }

    #[test]
    fn test_selection_does_not_mutate_catalog() {
        let catalog = LumberCatalog::standard();
        let before: Vec<&str> = catalog.sizes().iter().map(|l| l.nominal).collect();
        let _ = catalog.select_for_space(8.0);
        let after: Vec<&str> = catalog.sizes().iter().map(|l| l.nominal).collect();
        assert_eq!(before, after);
    }
}
