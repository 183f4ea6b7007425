//! Discriminated kinds used to tag elements and their geometry

use serde::{Deserialize, Serialize};

/// Structural discipline of an [`Element`](super::Element)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementKind {
    /// Point-like vertical member
    Column,
    /// Planar vertical member
    Wall,
    /// Horizontal slab/floor panel
    Slab,
    /// Boundary-condition marker (point or line)
    Support,
    /// Linear horizontal member
    Beam,
}

impl ElementKind {
    /// Parse the wire tag, returning `None` for anything outside the discriminated set
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "COLUMN" => Some(Self::Column),
            "WALL" => Some(Self::Wall),
            "SLAB" => Some(Self::Slab),
            "SUPPORT" => Some(Self::Support),
            "BEAM" => Some(Self::Beam),
            _ => None,
        }
    }
}

/// Tag describing how an element's vertices are organized as geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeometryKind {
    Brep,
    LineCurve,
    PolyCurve,
    NurbsCurve,
    Point,
}

impl GeometryKind {
    /// Parse the wire tag, returning `None` for anything outside the discriminated set
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "BREP" => Some(Self::Brep),
            "LINE_CURVE" => Some(Self::LineCurve),
            "POLY_CURVE" => Some(Self::PolyCurve),
            "NURBS_CURVE" => Some(Self::NurbsCurve),
            "POINT" => Some(Self::Point),
            _ => None,
        }
    }
}

/// One of the two horizontal axes vertices are snapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisKind {
    X,
    Y,
}

impl AxisKind {
    /// Short label used in log messages and error variants
    pub fn label(self) -> &'static str {
        match self {
            AxisKind::X => "X",
            AxisKind::Y => "Y",
        }
    }
}

impl std::fmt::Display for AxisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
