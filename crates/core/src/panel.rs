//! The five panel faces of a crate.

use crate::config::CrateDimensions;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A crate panel face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum PanelFace {
    /// Front panel (y = 0).
    Front,
    /// Back panel (y = -length).
    Back,
    /// Left end panel (x = -width/2).
    LeftEnd,
    /// Right end panel (x = +width/2).
    RightEnd,
    /// Top panel.
    Top,
}

/// Which cleats own the panel corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerimeterStyle {
    /// Top and bottom cleats span the full width; verticals fit between them.
    HorizontalFullWidth,
    /// Left and right cleats span the full height; horizontals fit between them.
    VerticalFullHeight,
}

impl PanelFace {
    /// All faces in output order.
    pub const ALL: [PanelFace; 5] = [
        PanelFace::Front,
        PanelFace::Back,
        PanelFace::LeftEnd,
        PanelFace::RightEnd,
        PanelFace::Top,
    ];

    /// Expression name of the panel.
    pub fn name(&self) -> &'static str {
        match self {
            PanelFace::Front => "FRONT_PANEL",
            PanelFace::Back => "BACK_PANEL",
            PanelFace::LeftEnd => "LEFT_END_PANEL",
            PanelFace::RightEnd => "RIGHT_END_PANEL",
            PanelFace::Top => "TOP_PANEL",
        }
    }

    /// Looks up a face by its expression name.
    pub fn from_name(name: &str) -> Option<PanelFace> {
        Self::ALL.into_iter().find(|face| face.name() == name)
    }

    /// Corner ownership for perimeter cleats.
    pub fn perimeter_style(&self) -> PerimeterStyle {
        match self {
            PanelFace::LeftEnd | PanelFace::RightEnd => PerimeterStyle::VerticalFullHeight,
            _ => PerimeterStyle::HorizontalFullWidth,
        }
    }

    /// Faces fastened to the floor with lag screws.
    pub fn receives_lag_screws(&self) -> bool {
        matches!(self, PanelFace::Back | PanelFace::LeftEnd | PanelFace::RightEnd)
    }

    /// Panel face size for the given crate.
    pub fn dimensions(&self, dims: &CrateDimensions) -> PanelDimensions {
        match self {
            PanelFace::Front | PanelFace::Back => {
                PanelDimensions::new(dims.overall_width, dims.wall_height())
            }
            PanelFace::LeftEnd | PanelFace::RightEnd => {
                PanelDimensions::new(dims.internal_length, dims.wall_height())
            }
            PanelFace::Top => PanelDimensions::new(dims.overall_width, dims.overall_length),
        }
    }
}

impl fmt::Display for PanelFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Width and height of a panel face in its own 2-D frame.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanelDimensions {
    /// Extent along the panel's horizontal (u) axis.
    pub width: f64,
    /// Extent along the panel's vertical (v) axis.
    pub height: f64,
}

impl PanelDimensions {
    /// Creates panel dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Face area.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}
